// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static SPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid space regex"));
static SPACE_AROUND_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" *\n *").expect("valid newline regex"));

/// 源文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Html,
    Markdown,
    PlainText,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Html => "html",
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::PlainText => "text",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 导出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Text,
}

impl OutputFormat {
    /// 解析作业输入中的 `format` 字段
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "text" | "plain" | "txt" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

/// 行内内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Code(String),
    Link { content: Vec<Inline>, href: String },
    Image { alt: String, src: String },
    LineBreak,
}

/// 块级内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    Paragraph(Vec<Inline>),
    /// `number` 仅对有序列表有意义，`depth` 为嵌套层级（从0开始）
    ListItem {
        ordered: bool,
        number: usize,
        depth: usize,
        content: Vec<Inline>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Quote(Vec<Inline>),
    /// 第一行作为表头
    Table(Vec<Vec<String>>),
    /// 原样输出的文本段落（纯文本和 Markdown 源文件）
    Verbatim(String),
    Rule,
}

/// 转换后的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// 文件名提示
    pub name: String,
    /// 检测到的源格式
    pub format: DocumentFormat,
    pub blocks: Vec<Block>,
}

impl ConvertedDocument {
    pub fn new(name: impl Into<String>, format: DocumentFormat, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            format,
            blocks,
        }
    }

    /// 按指定格式导出
    pub fn export(&self, format: OutputFormat) -> String {
        render_blocks(&self.blocks, format)
    }

    /// 导出为 Markdown
    pub fn export_to_markdown(&self) -> String {
        self.export(OutputFormat::Markdown)
    }

    /// 导出为纯文本，去掉所有标记
    pub fn export_to_text(&self) -> String {
        self.export(OutputFormat::Text)
    }
}

/// 判断行内内容是否包含可见文本或图片
pub fn has_visible_content(inlines: &[Inline]) -> bool {
    inlines.iter().any(|inline| match inline {
        Inline::Text(text) | Inline::Code(text) => !text.trim().is_empty(),
        Inline::Strong(inner) | Inline::Emphasis(inner) => has_visible_content(inner),
        Inline::Link { content, href } => has_visible_content(content) || !href.is_empty(),
        Inline::Image { .. } => true,
        Inline::LineBreak => false,
    })
}

fn render_blocks(blocks: &[Block], format: OutputFormat) -> String {
    let mut out = String::new();
    let mut previous_was_list = false;

    for block in blocks {
        let rendered = render_block(block, format);
        if rendered.is_empty() {
            continue;
        }
        let is_list = matches!(block, Block::ListItem { .. });
        if !out.is_empty() {
            out.push_str(if is_list && previous_was_list { "\n" } else { "\n\n" });
        }
        out.push_str(&rendered);
        previous_was_list = is_list;
    }

    out
}

fn render_block(block: &Block, format: OutputFormat) -> String {
    let markdown = format == OutputFormat::Markdown;
    match block {
        Block::Heading { level, content } => {
            let text = render_inlines(content, format);
            if text.is_empty() || !markdown {
                return text.replace('\n', " ");
            }
            format!("{} {}", "#".repeat((*level).clamp(1, 6) as usize), text.replace('\n', " "))
        }
        Block::Paragraph(content) => render_inlines(content, format),
        Block::ListItem {
            ordered,
            number,
            depth,
            content,
        } => {
            let text = render_inlines(content, format);
            if text.is_empty() {
                return text;
            }
            let indent = "  ".repeat(*depth);
            let marker = if *ordered {
                format!("{}.", number)
            } else {
                "-".to_string()
            };
            let text = text.replace('\n', &format!("\n{}  ", indent));
            format!("{}{} {}", indent, marker, text)
        }
        Block::CodeBlock { language, code } => {
            let code = code.trim_matches('\n');
            if code.trim().is_empty() {
                return String::new();
            }
            if markdown {
                let fence = if code.contains("```") { "~~~" } else { "```" };
                format!(
                    "{}{}\n{}\n{}",
                    fence,
                    language.as_deref().unwrap_or(""),
                    code,
                    fence
                )
            } else {
                code.to_string()
            }
        }
        Block::Quote(content) => {
            let text = render_inlines(content, format);
            if text.is_empty() || !markdown {
                return text;
            }
            text.lines()
                .map(|line| format!("> {}", line))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Block::Table(rows) => render_table(rows, format),
        Block::Verbatim(text) => text.trim_end().to_string(),
        Block::Rule => {
            if markdown {
                "---".to_string()
            } else {
                String::new()
            }
        }
    }
}

fn render_table(rows: &[Vec<String>], format: OutputFormat) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    if format == OutputFormat::Text {
        return rows
            .iter()
            .map(|row| row.join("\t").trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n");
    }

    let cell = |row: &Vec<String>, i: usize| -> String {
        row.get(i)
            .map(|c| c.replace('|', "\\|").replace('\n', " "))
            .unwrap_or_default()
    };
    let line = |row: &Vec<String>| -> String {
        let cells: Vec<String> = (0..width).map(|i| cell(row, i)).collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(line(&rows[0]));
    lines.push(format!("|{}", " --- |".repeat(width)));
    lines.extend(rows[1..].iter().map(line));
    lines.join("\n")
}

/// 渲染行内内容并规整空白
fn render_inlines(inlines: &[Inline], format: OutputFormat) -> String {
    let raw = render_raw(inlines, format);
    let collapsed = SPACE_RUNS.replace_all(&raw, " ");
    SPACE_AROUND_NEWLINE
        .replace_all(&collapsed, "\n")
        .trim()
        .to_string()
}

fn render_raw(inlines: &[Inline], format: OutputFormat) -> String {
    inlines
        .iter()
        .map(|inline| render_inline(inline, format))
        .collect()
}

fn render_inline(inline: &Inline, format: OutputFormat) -> String {
    let markdown = format == OutputFormat::Markdown;
    match inline {
        Inline::Text(text) => text.clone(),
        Inline::Strong(inner) if markdown => wrap_trimmed(&render_raw(inner, format), "**"),
        Inline::Emphasis(inner) if markdown => wrap_trimmed(&render_raw(inner, format), "*"),
        Inline::Strong(inner) | Inline::Emphasis(inner) => render_raw(inner, format),
        Inline::Code(code) if markdown => {
            if code.trim().is_empty() {
                code.clone()
            } else if code.contains('`') {
                format!("`` {} ``", code)
            } else {
                format!("`{}`", code)
            }
        }
        Inline::Code(code) => code.clone(),
        Inline::Link { content, href } => {
            let text = render_raw(content, format);
            let label = text.trim();
            if !markdown || href.is_empty() {
                if label.is_empty() {
                    return href.clone();
                }
                return text;
            }
            if label.is_empty() {
                format!("<{}>", href)
            } else {
                let lead = &text[..text.len() - text.trim_start().len()];
                let tail = &text[text.trim_end().len()..];
                format!("{}[{}]({}){}", lead, label, href, tail)
            }
        }
        Inline::Image { alt, src } if markdown => format!("![{}]({})", alt.trim(), src),
        Inline::Image { alt, .. } => alt.clone(),
        Inline::LineBreak => "\n".to_string(),
    }
}

/// 用标记包裹文本，标记紧贴可见字符，外侧空白保留
fn wrap_trimmed(inner: &str, marker: &str) -> String {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner.to_string();
    }
    let lead = &inner[..inner.len() - inner.trim_start().len()];
    let tail = &inner[inner.trim_end().len()..];
    format!("{}{}{}{}{}", lead, marker, trimmed, marker, tail)
}
