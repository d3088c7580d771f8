// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::converters::ConvertedDocument;
use crate::utils::errors::JobError;
use serde::{Deserialize, Serialize};
use url::Url;

/// 爬取处理器输出的页面记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRecord {
    /// 页面最终地址
    pub url: String,
    /// 页面内容
    pub markdown: String,
}

impl PageRecord {
    /// 条目失败时的占位记录：请求的地址加错误描述
    pub fn placeholder(requested: &str, error: &JobError) -> Self {
        Self {
            url: requested.to_string(),
            markdown: error.to_string(),
        }
    }
}

/// 广度优先遍历中抓取到的页面
#[derive(Debug, Clone)]
pub struct CrawledPage {
    /// 重定向后的最终地址
    pub url: Url,
    /// 与起始页的链接距离
    pub depth: u32,
    pub document: ConvertedDocument,
}
