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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、HTTP客户端、爬取、文档转换和作业队列等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 本地API服务器配置
    pub server: ServerSettings,
    /// HTTP客户端配置
    pub http: HttpSettings,
    /// 爬取处理器配置
    pub crawler: CrawlerSettings,
    /// 文档处理器配置
    pub documents: DocumentSettings,
    /// 作业队列配置
    pub queue: QueueSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// HTTP客户端配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// User-Agent
    pub user_agent: String,
    /// 单次请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 响应体允许的最大字节数
    pub max_body_bytes: u64,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 作业未指定 max_depth 时的默认值
    pub default_max_depth: u32,
    /// 单个条目最多抓取的页面数
    pub max_pages: usize,
    /// 单个条目的超时时间（秒）
    pub item_timeout_secs: u64,
    /// 条目并发数，1 表示严格顺序处理
    pub concurrency: usize,
    /// 是否遵守 robots.txt
    pub respect_robots_txt: bool,
}

/// 文档处理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSettings {
    /// 单个条目的超时时间（秒），包含下载和转换
    pub item_timeout_secs: u64,
    /// 条目并发数，1 表示严格顺序处理
    pub concurrency: usize,
}

/// 作业队列配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// 获取作业的地址
    pub job_url: Option<String>,
    /// 回传结果的地址
    pub result_url: Option<String>,
    /// 队列为空时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl CrawlerSettings {
    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.item_timeout_secs)
    }
}

impl DocumentSettings {
    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.item_timeout_secs)
    }
}

impl QueueSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DOCRAWL").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 仅使用内置默认值的配置，不读取文件和环境变量
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            // HTTP client
            .set_default("http.user_agent", "Mozilla/5.0 (compatible; docrawl/0.1)")?
            .set_default("http.request_timeout_secs", 30)?
            .set_default("http.max_body_bytes", 50 * 1024 * 1024)?
            // Crawler
            .set_default("crawler.default_max_depth", 0)?
            .set_default("crawler.max_pages", 100)?
            .set_default("crawler.item_timeout_secs", 120)?
            .set_default("crawler.concurrency", 1)?
            .set_default("crawler.respect_robots_txt", false)?
            // Documents
            .set_default("documents.item_timeout_secs", 120)?
            .set_default("documents.concurrency", 1)?
            // Queue
            .set_default("queue.poll_interval_ms", 1000)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
