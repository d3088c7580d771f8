// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use docrawl::config::settings::Settings;
use docrawl::presentation::routes;
use docrawl::workers::crawl_handler::CrawlHandler;
use docrawl::workers::document_handler::DocumentHandler;
use docrawl::workers::handler::JobHandler;
use std::io::Write;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;
use zip::ZipWriter;

pub struct TestApp {
    pub server: TestServer,
}

/// 测试配置：较短的条目超时，其余使用默认值
pub fn test_settings() -> Settings {
    let mut settings = Settings::defaults().expect("defaults should deserialize");
    settings.http.request_timeout_secs = 10;
    settings.crawler.item_timeout_secs = 10;
    settings.documents.item_timeout_secs = 10;
    settings
}

pub fn crawl_handler(settings: &Settings) -> Arc<dyn JobHandler> {
    Arc::new(CrawlHandler::from_settings(settings).expect("crawl handler"))
}

pub fn document_handler(settings: &Settings) -> Arc<dyn JobHandler> {
    Arc::new(DocumentHandler::from_settings(settings).expect("document handler"))
}

pub fn create_test_app(handler: Arc<dyn JobHandler>) -> TestApp {
    let server = TestServer::new(routes::routes(handler)).unwrap();
    TestApp { server }
}

/// 挂载一个返回 HTML 的页面
pub async fn mount_html(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// 挂载一个页面，期望被请求的次数
pub async fn mount_html_expect(server: &MockServer, route: &str, html: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

/// 带链接列表的简单页面
pub fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<li><a href=\"{}\">{}</a></li>", href, href))
        .collect();
    format!(
        "<html><head><title>{title}</title></head><body><h1>{title}</h1><ul>{anchors}</ul></body></html>"
    )
}

/// 构建最小的 DOCX 文件
pub fn docx_fixture(paragraphs: &[(&str, &str)]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|(style, text)| {
            let style = if style.is_empty() {
                String::new()
            } else {
                format!("<w:pPr><w:pStyle w:val=\"{}\"/></w:pPr>", style)
            };
            format!("<w:p>{}<w:r><w:t>{}</w:t></w:r></w:p>", style, text)
        })
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body>{}</w:body></w:document>",
        body
    );

    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", FileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer
        .start_file("word/document.xml", FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// 构建只有一页、一行文本的最小 PDF 文件，交叉引用表按实际偏移生成
pub fn pdf_fixture(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 18 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        write!(pdf, "{} 0 obj\n{}\nendobj\n", i + 1, body).unwrap();
    }

    let xref_at = pdf.len();
    write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).unwrap();
    for offset in offsets {
        write!(pdf, "{:010} 00000 n \n", offset).unwrap();
    }
    write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    )
    .unwrap();
    pdf
}
