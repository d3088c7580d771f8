// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;
use tracing::{debug, warn};

/// 文本编码处理错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextEncodingError {
    #[error("内容为二进制数据，无法作为文本解码")]
    BinaryContent,

    #[error("编码转换失败: {0}")]
    ConversionFailed(String),
}

/// 二进制嗅探窗口大小
const SNIFF_WINDOW: usize = 8 * 1024;

/// 将字节解码为UTF-8文本
///
/// 依次尝试 BOM、声明的字符集、严格UTF-8，最后使用 chardetng 检测
pub fn decode_text(input: &[u8], declared_charset: Option<&str>) -> Result<String, TextEncodingError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(input) {
        debug!("检测到BOM: {}", encoding.name());
        return convert(&input[bom_len..], encoding);
    }

    if looks_binary(input) {
        return Err(TextEncodingError::BinaryContent);
    }

    if let Some(encoding) = declared_charset.and_then(|label| Encoding::for_label(label.trim().as_bytes())) {
        debug!("使用声明的编码: {}", encoding.name());
        return convert(input, encoding);
    }

    if let Ok(text) = std::str::from_utf8(input) {
        return Ok(text.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(input, true);
    let encoding = detector.guess(None, true);
    debug!("检测到编码: {}", encoding.name());
    convert(input, encoding)
}

/// 从 Content-Type 头中提取 charset 参数
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// 粗略判断内容是否为二进制：嗅探窗口内出现 NUL 字节
pub fn looks_binary(input: &[u8]) -> bool {
    input.iter().take(SNIFF_WINDOW).any(|b| *b == 0)
}

fn convert(input: &[u8], encoding: &'static Encoding) -> Result<String, TextEncodingError> {
    let (decoded, actual, had_errors) = encoding.decode(input);
    if had_errors {
        if actual == UTF_8 {
            return Err(TextEncodingError::ConversionFailed(
                "invalid UTF-8 sequence".to_string(),
            ));
        }
        warn!("编码转换存在替换字符，编码: {}", actual.name());
    }
    Ok(decoded.into_owned())
}
