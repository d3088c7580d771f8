// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::converters::document::Block;
use crate::converters::text::{normalize_newlines, reflow_to_blocks};
use std::panic;

/// 提取PDF文本层并按段落切分
///
/// 解析器在畸形文件上可能 panic，这里将其转换为错误
pub fn extract_blocks(bytes: &[u8]) -> Result<Vec<Block>, String> {
    let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| "PDF parser aborted on malformed input".to_string())?
        .map_err(|e| e.to_string())?;
    Ok(reflow_to_blocks(&normalize_newlines(&text)))
}
