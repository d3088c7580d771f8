// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::converters::document::{has_visible_content, Block, Inline};
use regex::Regex;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// 正文部件在 DOCX 包内的路径
pub const DOCUMENT_PART: &str = "word/document.xml";

/// DOCX 读取器
///
/// 解压 `word/document.xml`，按段落提取文字，识别标题样式、列表和粗斜体
pub struct DocxReader {
    empty_element: Regex,
    paragraph: Regex,
    style: Regex,
    heading_style: Regex,
    list_level: Regex,
    run: Regex,
    run_content: Regex,
    bold: Regex,
    italic: Regex,
}

impl Default for DocxReader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxReader {
    pub fn new() -> Self {
        Self {
            empty_element: Regex::new(r"<w:(?:p|r)(?:\s[^>]*)?/>").expect("valid regex"),
            paragraph: Regex::new(r"(?s)<w:p[\s>].*?</w:p>").expect("valid regex"),
            style: Regex::new(r#"<w:pStyle w:val="([^"]+)""#).expect("valid regex"),
            heading_style: Regex::new(r"(?i)^heading\s*([1-6])$").expect("valid regex"),
            list_level: Regex::new(r#"<w:ilvl w:val="(\d+)""#).expect("valid regex"),
            run: Regex::new(r"(?s)<w:r[\s>].*?</w:r>").expect("valid regex"),
            run_content: Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>")
                .expect("valid regex"),
            bold: Regex::new(r#"<w:b(?: w:val="(?:true|1|on)")?/>"#).expect("valid regex"),
            italic: Regex::new(r#"<w:i(?: w:val="(?:true|1|on)")?/>"#).expect("valid regex"),
        }
    }

    /// 从 DOCX 字节中提取块
    pub fn extract_blocks(&self, bytes: &[u8]) -> Result<Vec<Block>, String> {
        let xml = read_document_part(bytes)?;
        Ok(self.parse_document_xml(&xml))
    }

    /// 解析 `word/document.xml` 内容
    pub fn parse_document_xml(&self, xml: &str) -> Vec<Block> {
        let xml = self.empty_element.replace_all(xml, "");
        let mut blocks = Vec::new();
        let mut list_counter = 0usize;

        for paragraph in self.paragraph.find_iter(&xml) {
            let paragraph = paragraph.as_str();
            let content = self.paragraph_inlines(paragraph);
            if !has_visible_content(&content) {
                continue;
            }

            let style = self
                .style
                .captures(paragraph)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .unwrap_or("");

            if let Some(level) = self.heading_level(style) {
                list_counter = 0;
                blocks.push(Block::Heading { level, content });
            } else if paragraph.contains("<w:numPr>") || style.eq_ignore_ascii_case("ListParagraph") {
                list_counter += 1;
                let depth = self
                    .list_level
                    .captures(paragraph)
                    .and_then(|c| c[1].parse().ok())
                    .unwrap_or(0);
                blocks.push(Block::ListItem {
                    ordered: false,
                    number: list_counter,
                    depth,
                    content,
                });
            } else {
                list_counter = 0;
                blocks.push(Block::Paragraph(content));
            }
        }

        blocks
    }

    fn heading_level(&self, style: &str) -> Option<u8> {
        if style.eq_ignore_ascii_case("Title") {
            return Some(1);
        }
        if style.eq_ignore_ascii_case("Subtitle") {
            return Some(2);
        }
        self.heading_style
            .captures(style)
            .and_then(|c| c[1].parse().ok())
    }

    fn paragraph_inlines(&self, paragraph: &str) -> Vec<Inline> {
        let mut inlines = Vec::new();
        for run in self.run.find_iter(paragraph) {
            let run = run.as_str();
            let mut parts = Vec::new();
            for token in self.run_content.captures_iter(run) {
                match token.get(1) {
                    Some(text) => parts.push(Inline::Text(
                        html_escape::decode_html_entities(text.as_str()).into_owned(),
                    )),
                    None if token[0].starts_with("<w:tab") => {
                        parts.push(Inline::Text("\t".to_string()))
                    }
                    None => parts.push(Inline::LineBreak),
                }
            }
            if parts.is_empty() {
                continue;
            }

            let properties = run_properties(run);
            let mut inline = parts;
            if self.italic.is_match(properties) {
                inline = vec![Inline::Emphasis(inline)];
            }
            if self.bold.is_match(properties) {
                inline = vec![Inline::Strong(inline)];
            }
            inlines.extend(inline);
        }
        inlines
    }
}

/// 截取运行属性 `<w:rPr>...</w:rPr>`，没有时返回空串
fn run_properties(run: &str) -> &str {
    match (run.find("<w:rPr>"), run.find("</w:rPr>")) {
        (Some(start), Some(end)) if start < end => &run[start..end],
        _ => "",
    }
}

fn read_document_part(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("invalid DOCX archive: {}", e))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("missing {}: {}", DOCUMENT_PART, e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| format!("unreadable {}: {}", DOCUMENT_PART, e))?;
    Ok(xml)
}

/// 判断 ZIP 包内是否含有 DOCX 正文部件
pub fn is_docx_archive(bytes: &[u8]) -> bool {
    ZipArchive::new(Cursor::new(bytes))
        .map(|archive| archive.file_names().any(|name| name == DOCUMENT_PART))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "docx_test.rs"]
mod tests;
