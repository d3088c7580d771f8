// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{document_handler, test_settings};
use docrawl::config::settings::QueueSettings;
use docrawl::utils::errors::HostError;
use docrawl::workers::queue_worker::QueueWorker;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn queue_settings(server: &MockServer) -> QueueSettings {
    QueueSettings {
        job_url: Some(format!("{}/jobs/next", server.uri())),
        result_url: Some(format!("{}/jobs/result", server.uri())),
        poll_interval_ms: 20,
    }
}

#[tokio::test]
async fn test_job_is_processed_and_result_posted() {
    let queue = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("queued text"))
        .mount(&queue)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "input": {"source": format!("{}/doc.txt", queue.uri())}
        })))
        .up_to_n_times(1)
        .mount(&queue)
        .await;
    Mock::given(method("POST"))
        .and(path("/jobs/result"))
        .and(body_partial_json(json!({
            "id": "job-1",
            "output": "queued text",
            "status_code": 200
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&queue)
        .await;

    let worker = QueueWorker::new(
        document_handler(&test_settings()),
        Client::new(),
        &queue_settings(&queue),
    )
    .unwrap();

    assert!(worker.process_next_job().await.unwrap());
}

#[tokio::test]
async fn test_empty_queue_is_idle() {
    let queue = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/next"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&queue)
        .await;
    Mock::given(method("POST"))
        .and(path("/jobs/result"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&queue)
        .await;

    let worker = QueueWorker::new(
        document_handler(&test_settings()),
        Client::new(),
        &queue_settings(&queue),
    )
    .unwrap();

    assert!(!worker.process_next_job().await.unwrap());
}

#[tokio::test]
async fn test_validation_failure_is_posted_as_envelope() {
    let queue = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-2", "input": {}})))
        .mount(&queue)
        .await;
    Mock::given(method("POST"))
        .and(path("/jobs/result"))
        .and(body_partial_json(json!({
            "id": "job-2",
            "error": "Missing 'source' in input",
            "status_code": 400
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&queue)
        .await;

    let worker = QueueWorker::new(
        document_handler(&test_settings()),
        Client::new(),
        &queue_settings(&queue),
    )
    .unwrap();

    assert!(worker.process_next_job().await.unwrap());
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let queue = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/next"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&queue)
        .await;

    let worker = QueueWorker::new(
        document_handler(&test_settings()),
        Client::new(),
        &queue_settings(&queue),
    )
    .unwrap();

    let stopped = tokio::time::timeout(
        Duration::from_secs(5),
        worker.run(tokio::time::sleep(Duration::from_millis(100))),
    )
    .await;

    assert!(stopped.is_ok());
}

#[test]
fn test_worker_requires_queue_urls() {
    let settings = QueueSettings {
        job_url: None,
        result_url: None,
        poll_interval_ms: 1000,
    };

    let result = QueueWorker::new(document_handler(&test_settings()), Client::new(), &settings);

    assert!(matches!(
        result,
        Err(HostError::NotConfigured("queue.job_url"))
    ));
}
