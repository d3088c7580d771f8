// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, document_handler, test_settings};
use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_health_check_names_handler() {
    let app = create_test_app(document_handler(&test_settings()));

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"status": "ok", "handler": "document"})
    );
}

/// 同步执行作业，HTTP 状态码与信封一致
#[tokio::test]
async fn test_runsync_success() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/readme.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello\n\nworld"))
        .mount(&site)
        .await;

    let app = create_test_app(document_handler(&test_settings()));
    let response = app
        .server
        .post("/runsync")
        .json(&json!({
            "id": "job-42",
            "input": {"source": format!("{}/readme.txt", site.uri())}
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"id": "job-42", "output": "hello\n\nworld", "status_code": 200})
    );
}

#[tokio::test]
async fn test_runsync_validation_error() {
    let app = create_test_app(document_handler(&test_settings()));

    let response = app
        .server
        .post("/runsync")
        .json(&json!({"input": {"sources": []}}))
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["error"], json!("'sources' must not be empty"));
    assert_eq!(body["status_code"], json!(400));
    assert!(body["id"].as_str().unwrap().starts_with("sync-"));
}

#[tokio::test]
async fn test_runsync_malformed_body() {
    let app = create_test_app(document_handler(&test_settings()));

    let response = app
        .server
        .post("/runsync")
        .text("{not json")
        .content_type("application/json")
        .expect_failure()
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().unwrap().starts_with("Malformed job"));
}
