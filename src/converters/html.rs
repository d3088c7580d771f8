// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::converters::document::{has_visible_content, Block, Inline};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));

/// 不产生任何正文内容的元素
const SKIPPED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe", "canvas", "object",
    "button", "select", "input", "textarea", "form",
];

/// 仅作为块容器、自身不带标记的元素
const CONTAINER_ELEMENTS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "nav", "aside",
    "figure", "figcaption", "details", "summary", "dl", "dt", "dd", "address", "center",
];

/// 将HTML转换为结构化块
///
/// 相对链接按 `base_url` 解析；`javascript:` 链接只保留文字
pub fn html_to_blocks(html: &str, base_url: Option<&Url>) -> Vec<Block> {
    let document = Html::parse_document(html);
    let mut builder = BlockBuilder::new(base_url);
    builder.visit_children(document.root_element());
    builder.flush();
    builder.blocks
}

enum Context {
    ListItem {
        ordered: bool,
        number: usize,
        depth: usize,
    },
    Quote,
}

struct ListState {
    ordered: bool,
    next: usize,
}

struct BlockBuilder<'u> {
    base_url: Option<&'u Url>,
    blocks: Vec<Block>,
    inline: Vec<Inline>,
    contexts: Vec<Context>,
    lists: Vec<ListState>,
}

impl<'u> BlockBuilder<'u> {
    fn new(base_url: Option<&'u Url>) -> Self {
        Self {
            base_url,
            blocks: Vec::new(),
            inline: Vec::new(),
            contexts: Vec::new(),
            lists: Vec::new(),
        }
    }

    fn visit_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.inline.push(Inline::Text(collapse_whitespace(text))),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit_element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        match name {
            _ if SKIPPED_ELEMENTS.contains(&name) => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                let content = self.inlines_of(element);
                if has_visible_content(&content) {
                    let level = name[1..].parse().unwrap_or(1);
                    self.blocks.push(Block::Heading { level, content });
                }
            }
            "p" => {
                self.flush();
                self.visit_children(element);
                self.flush();
            }
            "br" => self.inline.push(Inline::LineBreak),
            "hr" => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            "ul" | "ol" => {
                self.flush();
                let next = element
                    .value()
                    .attr("start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                self.lists.push(ListState {
                    ordered: name == "ol",
                    next,
                });
                self.visit_children(element);
                self.flush();
                self.lists.pop();
            }
            "li" => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let (ordered, number) = match self.lists.last_mut() {
                    Some(list) => {
                        let number = list.next;
                        list.next += 1;
                        (list.ordered, number)
                    }
                    None => (false, 1),
                };
                self.contexts.push(Context::ListItem {
                    ordered,
                    number,
                    depth,
                });
                self.visit_children(element);
                self.flush();
                self.contexts.pop();
            }
            "blockquote" => {
                self.flush();
                self.contexts.push(Context::Quote);
                self.visit_children(element);
                self.flush();
                self.contexts.pop();
            }
            "pre" => {
                self.flush();
                let code: String = element.text().collect();
                self.blocks.push(Block::CodeBlock {
                    language: code_language(element),
                    code,
                });
            }
            "table" => {
                self.flush();
                let rows = table_rows(element);
                if !rows.is_empty() {
                    self.blocks.push(Block::Table(rows));
                }
            }
            _ if CONTAINER_ELEMENTS.contains(&name) => {
                self.flush();
                self.visit_children(element);
                self.flush();
            }
            _ => {
                let inlines = self.inline_element(element);
                self.inline.extend(inlines);
            }
        }
    }

    /// 把累积的行内内容收束为一个块，块类型由当前上下文决定
    fn flush(&mut self) {
        let content = std::mem::take(&mut self.inline);
        if !has_visible_content(&content) {
            return;
        }
        let block = match self.contexts.last() {
            Some(Context::ListItem {
                ordered,
                number,
                depth,
            }) => Block::ListItem {
                ordered: *ordered,
                number: *number,
                depth: *depth,
                content,
            },
            Some(Context::Quote) => Block::Quote(content),
            None => Block::Paragraph(content),
        };
        self.blocks.push(block);
    }

    fn inlines_of(&self, element: ElementRef<'_>) -> Vec<Inline> {
        let mut inlines = Vec::new();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => inlines.push(Inline::Text(collapse_whitespace(text))),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        inlines.extend(self.inline_element(child));
                    }
                }
                _ => {}
            }
        }
        inlines
    }

    fn inline_element(&self, element: ElementRef<'_>) -> Vec<Inline> {
        let name = element.value().name();
        match name {
            _ if SKIPPED_ELEMENTS.contains(&name) => Vec::new(),
            "strong" | "b" => vec![Inline::Strong(self.inlines_of(element))],
            "em" | "i" => vec![Inline::Emphasis(self.inlines_of(element))],
            "code" | "kbd" | "samp" | "tt" => {
                vec![Inline::Code(collapse_whitespace(
                    &element.text().collect::<String>(),
                ))]
            }
            "br" => vec![Inline::LineBreak],
            "a" => {
                let content = self.inlines_of(element);
                match element.value().attr("href").and_then(|h| self.resolve(h)) {
                    Some(href) => vec![Inline::Link { content, href }],
                    None => content,
                }
            }
            "img" => {
                let alt = element.value().attr("alt").unwrap_or("").trim().to_string();
                match element.value().attr("src").and_then(|s| self.resolve(s)) {
                    Some(src) => vec![Inline::Image { alt, src }],
                    None if !alt.is_empty() => vec![Inline::Text(alt)],
                    None => Vec::new(),
                }
            }
            // Block elements nested in inline context are flattened, keeping a word gap.
            _ if CONTAINER_ELEMENTS.contains(&name) || name == "p" || name == "li" => {
                let mut inlines = vec![Inline::Text(" ".to_string())];
                inlines.extend(self.inlines_of(element));
                inlines.push(Inline::Text(" ".to_string()));
                inlines
            }
            _ => self.inlines_of(element),
        }
    }

    fn resolve(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() || raw.to_ascii_lowercase().starts_with("javascript:") {
            return None;
        }
        match self.base_url {
            Some(base) => base.join(raw).ok().map(|u| u.to_string()),
            None => Some(raw.to_string()),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

fn code_language(pre: ElementRef<'_>) -> Option<String> {
    let code = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "code")?;
    code.value()
        .attr("class")?
        .split_whitespace()
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .map(str::to_string)
}

fn table_rows(table: ElementRef<'_>) -> Vec<Vec<String>> {
    table
        .select(&ROW_SELECTOR)
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(|cell| {
                    collapse_whitespace(&cell.text().collect::<String>())
                        .trim()
                        .to_string()
                })
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
