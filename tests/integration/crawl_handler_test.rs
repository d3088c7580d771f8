// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{crawl_handler, mount_html, mount_html_expect, page, test_settings};
use docrawl::domain::models::job::Job;
use docrawl::workers::handler::execute_job;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn urls(output: &Value) -> Vec<String> {
    output
        .as_array()
        .expect("crawl output is an array")
        .iter()
        .map(|record| record["url"].as_str().unwrap().to_string())
        .collect()
}

/// 深度为0时只抓取起始页
#[tokio::test]
async fn test_depth_zero_fetches_single_page() {
    let site = MockServer::start().await;
    mount_html_expect(&site, "/", &page("Home", &["/a"]), 1).await;
    mount_html_expect(&site, "/a", &page("A", &[]), 0).await;

    let handler = crawl_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"url": site.uri()})))
        .await
        .unwrap();

    assert_eq!(urls(&output), vec![format!("{}/", site.uri())]);
    let markdown = output[0]["markdown"].as_str().unwrap();
    assert!(markdown.starts_with("# Home"));
    assert!(markdown.contains(&format!("- [/a]({}/a)", site.uri())));
}

/// 广度优先遍历受深度和主机约束
#[tokio::test]
async fn test_bfs_respects_depth_and_host() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let external = format!("{}/external", elsewhere.uri());

    mount_html(&site, "/", &page("Home", &["/a", "/b", &external])).await;
    mount_html(&site, "/a", &page("A", &["/a/deep", "/b#again"])).await;
    mount_html(&site, "/b", &page("B", &["/"])).await;
    mount_html_expect(&site, "/a/deep", &page("Deep", &[]), 0).await;
    mount_html_expect(&elsewhere, "/external", &page("External", &[]), 0).await;

    let handler = crawl_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"url": site.uri(), "max_depth": 1})))
        .await
        .unwrap();

    assert_eq!(
        urls(&output),
        vec![
            format!("{}/", site.uri()),
            format!("{}/a", site.uri()),
            format!("{}/b", site.uri()),
        ]
    );
}

/// 任一条目校验失败时整个作业返回400，且不发出任何请求
#[tokio::test]
async fn test_invalid_item_rejects_job_before_network() {
    let site = MockServer::start().await;
    mount_html_expect(&site, "/", &page("Home", &[]), 0).await;

    let handler = crawl_handler(&test_settings());
    let job = Job::new(json!({"sources": [site.uri(), "not a url"]}));
    let response = execute_job(handler.as_ref(), &job).await;

    assert_eq!(response.status_code(), 400);
    let envelope = serde_json::to_value(&response).unwrap();
    assert!(envelope["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid URL 'not a url'"));
}

#[tokio::test]
async fn test_missing_url_is_validation_error() {
    let handler = crawl_handler(&test_settings());
    let response = execute_job(handler.as_ref(), &Job::new(json!({}))).await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"error": "Missing 'url' in input", "status_code": 400})
    );
}

/// 批量中一个条目失败时，其余条目照常输出，失败条目以占位记录代替
#[tokio::test]
async fn test_one_failing_item_in_batch() {
    let site = MockServer::start().await;
    mount_html(&site, "/good", &page("Good", &[])).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let good = format!("{}/good", site.uri());
    let missing = format!("{}/missing", site.uri());
    let handler = crawl_handler(&test_settings());
    let job = Job::new(json!({"sources": [good, {"url": missing}]}));
    let response = execute_job(handler.as_ref(), &job).await;

    assert_eq!(response.status_code(), 200);
    let envelope = serde_json::to_value(&response).unwrap();
    let records = envelope["output"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["url"], json!(good));
    assert!(records[0]["markdown"].as_str().unwrap().contains("# Good"));
    assert_eq!(records[1]["url"], json!(missing));
    assert!(records[1]["markdown"].as_str().unwrap().contains("404"));
}

/// 批量输出按输入顺序拼接
#[tokio::test]
async fn test_batch_output_is_flattened_in_input_order() {
    let site = MockServer::start().await;
    mount_html(&site, "/one", &page("One", &["/one/child"])).await;
    mount_html(&site, "/one/child", &page("Child", &[])).await;
    mount_html(&site, "/two", &page("Two", &[])).await;

    let mut settings = test_settings();
    settings.crawler.concurrency = 2;
    let handler = crawl_handler(&settings);
    let output = handler
        .handle(Some(&json!({"sources": [
            {"url": format!("{}/one", site.uri()), "max_depth": 1},
            format!("{}/two", site.uri())
        ]})))
        .await
        .unwrap();

    assert_eq!(
        urls(&output),
        vec![
            format!("{}/one", site.uri()),
            format!("{}/one/child", site.uri()),
            format!("{}/two", site.uri()),
        ]
    );
}

#[tokio::test]
async fn test_text_format_strips_markup() {
    let site = MockServer::start().await;
    mount_html(&site, "/", "<h1>Plain</h1><p>Some <strong>bold</strong> words</p>").await;

    let handler = crawl_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"url": site.uri(), "format": "text"})))
        .await
        .unwrap();

    assert_eq!(output[0]["markdown"], json!("Plain\n\nSome bold words"));
}

/// 同主机链接重定向到其他主机时，目标页面不进入输出
#[tokio::test]
async fn test_redirect_to_other_host_is_dropped() {
    let site = MockServer::start().await;
    let elsewhere = MockServer::start().await;

    mount_html(&site, "/", &page("Home", &["/go", "/stay"])).await;
    mount_html(&site, "/stay", &page("Stay", &[])).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/external", elsewhere.uri()).as_str()),
        )
        .mount(&site)
        .await;
    mount_html(&elsewhere, "/external", &page("External", &["/more"])).await;
    mount_html_expect(&elsewhere, "/more", &page("More", &[]), 0).await;

    let handler = crawl_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"url": site.uri(), "max_depth": 2})))
        .await
        .unwrap();

    assert_eq!(
        urls(&output),
        vec![format!("{}/", site.uri()), format!("{}/stay", site.uri())]
    );
}

/// 多个链接重定向到同一地址时，该地址只输出一次
#[tokio::test]
async fn test_shared_redirect_target_is_emitted_once() {
    let site = MockServer::start().await;

    mount_html(&site, "/", &page("Home", &["/x", "/y"])).await;
    mount_html(&site, "/final", &page("Final", &[])).await;
    for from in ["/x", "/y"] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/final"))
            .mount(&site)
            .await;
    }

    let handler = crawl_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"url": site.uri(), "max_depth": 1})))
        .await
        .unwrap();

    assert_eq!(
        urls(&output),
        vec![format!("{}/", site.uri()), format!("{}/final", site.uri())]
    );
}

/// 占位记录原样返回作业中提交的地址
#[tokio::test]
async fn test_placeholder_keeps_requested_url_verbatim() {
    let handler = crawl_handler(&test_settings());
    let output = handler
        .handle(Some(&json!({"url": "http://127.0.0.1:1"})))
        .await
        .unwrap();

    let records = output.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["url"], json!("http://127.0.0.1:1"));
    assert!(records[0]["markdown"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch http://127.0.0.1:1/"));
}
