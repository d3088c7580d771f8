// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 文档转换模块
///
/// 将下载得到的字节流识别格式后转换为结构化文档，再导出为 Markdown 或纯文本：
/// - document：结构化文档模型与导出
/// - html：HTML 页面
/// - pdf：PDF 文本层
/// - docx：Word 文档
/// - text：Markdown 与纯文本
pub mod document;
pub mod docx;
pub mod html;
pub mod pdf;
pub mod text;

pub use document::{Block, ConvertedDocument, DocumentFormat, Inline, OutputFormat};

use crate::utils::text_encoding::{self, TextEncodingError};
use bytes::Bytes;
use docx::DocxReader;
use thiserror::Error;
use tracing::debug;
use url::Url;

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// 文档转换错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Unsupported document format for '{name}'")]
    UnsupportedFormat { name: String },

    #[error("Document '{name}' is empty")]
    Empty { name: String },

    #[error("Failed to decode text of '{name}': {source}")]
    Encoding {
        name: String,
        source: TextEncodingError,
    },

    #[error("Failed to read {format} document '{name}': {reason}")]
    Malformed {
        name: String,
        format: DocumentFormat,
        reason: String,
    },
}

/// 内存中的文档字节流
#[derive(Debug, Clone)]
pub struct DocumentStream {
    /// 文件名提示，取自来源地址的最后一段
    pub name: String,
    pub bytes: Bytes,
    /// 服务器声明的内容类型
    pub content_type: Option<String>,
    /// 内容的来源地址，用于解析相对链接
    pub origin: Option<Url>,
}

impl DocumentStream {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            content_type: None,
            origin: None,
        }
    }

    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    /// 文件扩展名（小写）
    fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
    }

    /// 内容类型的主体部分（去掉参数，小写）
    fn mime_essence(&self) -> Option<String> {
        let content_type = self.content_type.as_deref()?;
        let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
        (!essence.is_empty()).then_some(essence)
    }

    fn declared_charset(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .and_then(text_encoding::charset_from_content_type)
    }
}

/// 文档转换器
///
/// 进程启动时创建一次，之后只读共享
#[derive(Default)]
pub struct DocumentConverter {
    docx: DocxReader,
}

impl DocumentConverter {
    pub fn new() -> Self {
        Self {
            docx: DocxReader::new(),
        }
    }

    /// 识别文档格式
    ///
    /// 依次检查魔数、文件扩展名、内容类型，最后嗅探内容
    pub fn detect_format(&self, stream: &DocumentStream) -> Option<DocumentFormat> {
        let bytes = stream.bytes.as_ref();
        if bytes.starts_with(PDF_MAGIC) {
            return Some(DocumentFormat::Pdf);
        }
        if bytes.starts_with(ZIP_MAGIC) {
            let named_docx = stream.extension().as_deref() == Some("docx");
            return (named_docx || docx::is_docx_archive(bytes)).then_some(DocumentFormat::Docx);
        }

        if let Some(format) = stream.extension().as_deref().and_then(format_from_extension) {
            return Some(format);
        }
        if let Some(format) = stream.mime_essence().as_deref().and_then(format_from_mime) {
            // Servers often label HTML pages as text/plain.
            if format == DocumentFormat::PlainText && sniff_format(bytes) == Some(DocumentFormat::Html) {
                return Some(DocumentFormat::Html);
            }
            return Some(format);
        }
        sniff_format(bytes)
    }

    /// 转换文档
    pub fn convert(&self, stream: &DocumentStream) -> Result<ConvertedDocument, ConversionError> {
        self.convert_with_source(stream).map(|(document, _)| document)
    }

    /// 转换文档，HTML 文档同时返回解码后的源码，供链接发现复用
    pub fn convert_with_source(
        &self,
        stream: &DocumentStream,
    ) -> Result<(ConvertedDocument, Option<String>), ConversionError> {
        if stream.bytes.is_empty() {
            return Err(ConversionError::Empty {
                name: stream.name.clone(),
            });
        }

        let format = self
            .detect_format(stream)
            .ok_or_else(|| ConversionError::UnsupportedFormat {
                name: stream.name.clone(),
            })?;
        debug!(name = %stream.name, format = %format, bytes = stream.bytes.len(), "Converting document");

        let malformed = |reason: String| ConversionError::Malformed {
            name: stream.name.clone(),
            format,
            reason,
        };

        let mut source = None;
        let blocks = match format {
            DocumentFormat::Pdf => pdf::extract_blocks(&stream.bytes).map_err(malformed)?,
            DocumentFormat::Docx => self.docx.extract_blocks(&stream.bytes).map_err(malformed)?,
            DocumentFormat::Html => {
                let html = self.decode_text(stream)?;
                let blocks = html::html_to_blocks(&html, stream.origin.as_ref());
                source = Some(html);
                blocks
            }
            DocumentFormat::Markdown | DocumentFormat::PlainText => {
                let text = self.decode_text(stream)?;
                text::text_to_blocks(&text::normalize_newlines(&text))
            }
        };

        Ok((ConvertedDocument::new(stream.name.clone(), format, blocks), source))
    }

    /// 将字节流解码为文本，遵循声明的字符集
    fn decode_text(&self, stream: &DocumentStream) -> Result<String, ConversionError> {
        text_encoding::decode_text(&stream.bytes, stream.declared_charset()).map_err(|source| {
            ConversionError::Encoding {
                name: stream.name.clone(),
                source,
            }
        })
    }
}

fn format_from_extension(ext: &str) -> Option<DocumentFormat> {
    match ext {
        "pdf" => Some(DocumentFormat::Pdf),
        "docx" => Some(DocumentFormat::Docx),
        "html" | "htm" | "xhtml" => Some(DocumentFormat::Html),
        "md" | "markdown" => Some(DocumentFormat::Markdown),
        "txt" | "text" | "csv" | "tsv" | "json" | "xml" | "log" | "rst" => {
            Some(DocumentFormat::PlainText)
        }
        _ => None,
    }
}

fn format_from_mime(essence: &str) -> Option<DocumentFormat> {
    match essence {
        "application/pdf" => Some(DocumentFormat::Pdf),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            Some(DocumentFormat::Docx)
        }
        "text/html" | "application/xhtml+xml" => Some(DocumentFormat::Html),
        "text/markdown" | "text/x-markdown" => Some(DocumentFormat::Markdown),
        "application/json" | "application/xml" => Some(DocumentFormat::PlainText),
        _ if essence.starts_with("text/") => Some(DocumentFormat::PlainText),
        _ => None,
    }
}

fn sniff_format(bytes: &[u8]) -> Option<DocumentFormat> {
    if text_encoding::looks_binary(bytes) {
        return None;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(1024)]).to_ascii_lowercase();
    let head = head.trim_start();
    if head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<body") {
        Some(DocumentFormat::Html)
    } else {
        Some(DocumentFormat::PlainText)
    }
}

#[cfg(test)]
#[path = "converter_test.rs"]
mod tests;
