// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{docx_fixture, document_handler, pdf_fixture, test_settings};
use docrawl::domain::models::job::Job;
use docrawl::workers::handler::execute_job;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_bytes(server: &MockServer, route: &str, content_type: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

/// 一个成功、一个404：作业仍然成功，失败条目输出错误描述
#[tokio::test]
async fn test_good_and_missing_sources() {
    let server = MockServer::start().await;
    mount_bytes(
        &server,
        "/notes.md",
        "text/markdown",
        b"# Notes\n\n- one\n- two\n".to_vec(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let handler = document_handler(&test_settings());
    let job = Job::new(json!({"sources": [
        format!("{}/notes.md", server.uri()),
        format!("{}/missing.pdf", server.uri())
    ]}));
    let response = execute_job(handler.as_ref(), &job).await;

    assert_eq!(response.status_code(), 200);
    let envelope = serde_json::to_value(&response).unwrap();
    let output = envelope["output"].as_array().unwrap();
    assert_eq!(output.len(), 2);
    assert_eq!(output[0], json!("# Notes\n\n- one\n- two"));
    let error = output[1].as_str().unwrap();
    assert!(error.starts_with("Failed to retrieve document from URL:"));
    assert!(error.contains("404"));
}

/// PDF 文本层转换：good.pdf 输出正文，missing.pdf 输出错误描述
#[tokio::test]
async fn test_pdf_text_is_extracted() {
    let server = MockServer::start().await;
    mount_bytes(
        &server,
        "/good.pdf",
        "application/pdf",
        pdf_fixture("Quarterly revenue grew"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let handler = document_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"sources": [
            format!("{}/good.pdf", server.uri()),
            format!("{}/missing.pdf", server.uri())
        ]})))
        .await
        .unwrap();

    let values = output.as_array().unwrap();
    assert_eq!(values.len(), 2);
    assert!(
        values[0].as_str().unwrap().contains("Quarterly revenue grew"),
        "unexpected PDF text: {}",
        values[0]
    );
    assert!(values[1]
        .as_str()
        .unwrap()
        .starts_with("Failed to retrieve document from URL:"));
}

/// 单个来源输出字符串
#[tokio::test]
async fn test_single_source_returns_string() {
    let server = MockServer::start().await;
    mount_bytes(
        &server,
        "/page",
        "text/html; charset=utf-8",
        b"<h1>Title</h1><p>Body <em>text</em></p>".to_vec(),
    )
    .await;

    let handler = document_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"source": format!("{}/page", server.uri())})))
        .await
        .unwrap();

    assert_eq!(output, json!("# Title\n\nBody *text*"));
}

/// DOCX 文档转换
#[tokio::test]
async fn test_docx_fixture_round_trip() {
    let server = MockServer::start().await;
    let bytes = docx_fixture(&[
        ("Heading1", "Annual Summary"),
        ("", "Sales doubled in the second half."),
        ("Heading2", "Outlook"),
        ("", "Stable."),
    ]);
    mount_bytes(&server, "/files/summary.docx", "application/octet-stream", bytes).await;

    let handler = document_handler(&test_settings());
    let source = format!("{}/files/summary.docx", server.uri());

    let markdown = handler
        .handle(Some(&json!({"source": source})))
        .await
        .unwrap();
    assert_eq!(
        markdown,
        json!("# Annual Summary\n\nSales doubled in the second half.\n\n## Outlook\n\nStable.")
    );

    let text = handler
        .handle(Some(&json!({"source": source, "format": "text"})))
        .await
        .unwrap();
    assert_eq!(
        text,
        json!("Annual Summary\n\nSales doubled in the second half.\n\nOutlook\n\nStable.")
    );
}

#[tokio::test]
async fn test_unsupported_format_is_reported_in_place() {
    let server = MockServer::start().await;
    mount_bytes(
        &server,
        "/photo.png",
        "image/png",
        vec![0x89, b'P', b'N', b'G', 0, 0, 0, 13],
    )
    .await;

    let handler = document_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"source": format!("{}/photo.png", server.uri())})))
        .await
        .unwrap();

    assert_eq!(
        output,
        json!("Conversion failed: Unsupported document format for 'photo.png'")
    );
}

#[tokio::test]
async fn test_missing_source_is_validation_error() {
    let handler = document_handler(&test_settings());
    let response = execute_job(handler.as_ref(), &Job::new(json!({"format": "text"}))).await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"error": "Missing 'source' in input", "status_code": 400})
    );
}

#[tokio::test]
async fn test_oversized_document_is_rejected() {
    let server = MockServer::start().await;
    mount_bytes(&server, "/big.txt", "text/plain", vec![b'a'; 4096]).await;

    let mut settings = test_settings();
    settings.http.max_body_bytes = 1024;
    let handler = document_handler(&settings);
    let output = handler
        .handle(Some(&json!({"source": format!("{}/big.txt", server.uri())})))
        .await
        .unwrap();

    assert_eq!(
        output,
        json!("Failed to retrieve document from URL: Response body exceeds the limit of 1024 bytes")
    );
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut settings = test_settings();
    settings.documents.item_timeout_secs = 1;
    let handler = document_handler(&settings);
    let source = format!("{}/slow.txt", server.uri());
    let output = handler
        .handle(Some(&json!({"sources": [source.clone()]})))
        .await
        .unwrap();

    assert_eq!(
        output,
        json!([format!("Timed out after 1s while processing {}", source)])
    );
}
