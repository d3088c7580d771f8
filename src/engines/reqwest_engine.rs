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

use crate::config::settings::HttpSettings;
use crate::engines::traits::{EngineError, FetchedPage, PageFetcher};
use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Instant;
use tracing::debug;
use url::Url;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎，所有请求共享同一个连接池
#[derive(Clone)]
pub struct ReqwestEngine {
    client: Client,
    max_body_bytes: u64,
}

impl ReqwestEngine {
    pub fn new(client: Client, max_body_bytes: u64) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// 按配置构建进程级共享的HTTP客户端
    pub fn build_client(settings: &HttpSettings) -> Result<Client, EngineError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()?;
        Ok(client)
    }

    /// 使用配置创建引擎
    pub fn from_settings(settings: &HttpSettings) -> Result<Self, EngineError> {
        Ok(Self::new(Self::build_client(settings)?, settings.max_body_bytes))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl PageFetcher for ReqwestEngine {
    /// 执行HTTP GET
    ///
    /// 响应在函数返回时释放，无论成功与否。响应体按块读取，超过上限立即中止
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, EngineError> {
        let start = Instant::now();
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let final_url = response.url().clone();
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if response
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes)
        {
            return Err(EngineError::TooLarge {
                limit: self.max_body_bytes,
            });
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if (body.len() + chunk.len()) as u64 > self.max_body_bytes {
                return Err(EngineError::TooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(
            url = %final_url,
            status_code,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched"
        );

        Ok(FetchedPage {
            url: final_url,
            status_code,
            content_type,
            body: body.freeze(),
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
