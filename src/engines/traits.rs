// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败，包括非2xx状态码
    #[error("{0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 响应体超过大小限制
    #[error("Response body exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// 抓取到的响应
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// 重定向后的最终地址
    pub url: Url,
    /// HTTP状态码
    pub status_code: u16,
    /// 内容类型，服务器未提供时为空
    pub content_type: Option<String>,
    /// 响应体
    pub body: Bytes,
}

/// 页面抓取器特质
///
/// 爬取处理器和文档处理器通过它发出 HTTP GET，测试中可替换为内存站点
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 获取URL对应的内容，非2xx状态码视为错误
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, EngineError>;

    /// 获取引擎名称
    fn name(&self) -> &'static str;
}
