// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 解析作业中的来源地址，只接受 http/https 绝对地址
pub fn parse_source_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("Invalid URL '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        scheme => Err(format!(
            "Unsupported URL scheme '{}' in '{}' (expected http or https)",
            scheme, raw
        )),
    }
}

/// 去除片段标识，用于去重
pub fn normalize_link(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_fragment(None);
    clean
}

/// 判断两个地址是否属于同一主机（主机名和端口都相同）
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(x), Some(y)) => {
            x.eq_ignore_ascii_case(y) && a.port_or_known_default() == b.port_or_known_default()
        }
        _ => false,
    }
}

/// 从地址的最后一个非空路径段推导文件名
pub fn document_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| {
            urlencoding::decode(s)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}
