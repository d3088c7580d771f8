// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::converters::document::{Block, Inline};
use once_cell::sync::Lazy;
use regex::Regex;

// Only whole blank lines are consumed; the next paragraph keeps its indentation.
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)*").expect("valid blank line regex"));

/// 按空行切分，每段原样保留（Markdown 和纯文本源文件）
pub fn text_to_blocks(text: &str) -> Vec<Block> {
    split_paragraphs(text)
        .map(|chunk| Block::Verbatim(chunk.to_string()))
        .collect()
}

/// 按空行切分，段内换行合并为空格（PDF 等硬换行文本）
pub fn reflow_to_blocks(text: &str) -> Vec<Block> {
    split_paragraphs(text)
        .map(|chunk| {
            let joined = chunk
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            Block::Paragraph(vec![Inline::Text(joined)])
        })
        .collect()
}

fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    BLANK_LINES
        .split(text)
        .map(|chunk| chunk.trim_matches(|c| c == '\n' || c == '\r'))
        .filter(|chunk| !chunk.trim().is_empty())
}

/// 统一换行符并把分页符视为段落分隔
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\u{c}', "\n\n")
}
