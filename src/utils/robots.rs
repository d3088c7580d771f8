// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::EngineError;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// 缓存有效期
const CACHE_TTL: Duration = Duration::from_secs(3600);
/// robots.txt 请求超时
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Robots.txt检查器接口
#[async_trait]
pub trait RobotsCheckerTrait: Send + Sync {
    /// 检查URL是否被允许访问
    async fn is_allowed(&self, url: &Url, user_agent: &str) -> Result<bool>;
}

/// 缓存的Robots.txt内容
#[derive(Clone)]
struct CachedRobots {
    /// 内容
    content: String,

    /// 过期时间
    expires_at: Instant,
}

/// Robots.txt检查器
///
/// 每个源站的 robots.txt 只获取一次并在内存中缓存一小时；
/// 获取失败或非2xx响应视为全部允许
#[derive(Clone)]
pub struct RobotsChecker {
    /// HTTP客户端
    client: Client,

    /// 内存缓存
    memory_cache: Arc<Mutex<HashMap<String, CachedRobots>>>,

    /// robots.txt 允许的最大字节数，超过时视为不可用
    max_body_bytes: u64,
}

#[async_trait]
impl RobotsCheckerTrait for RobotsChecker {
    async fn is_allowed(&self, url: &Url, user_agent: &str) -> Result<bool> {
        let content = self.get_robots_content(url).await?;
        let mut matcher = DefaultMatcher::default();
        Ok(matcher.one_agent_allowed_by_robots(&content, user_agent, url.as_str()))
    }
}

impl RobotsChecker {
    /// 创建新的Robots检查器实例
    pub fn new(client: Client, max_body_bytes: u64) -> Self {
        Self {
            client,
            memory_cache: Arc::new(Mutex::new(HashMap::new())),
            max_body_bytes,
        }
    }

    /// 获取Robots.txt内容（带缓存）
    async fn get_robots_content(&self, url: &Url) -> Result<String> {
        let robots_url = robots_url(url)?;

        if let Ok(mut cache) = self.memory_cache.lock() {
            if let Some(cached) = cache.get(&robots_url) {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.content.clone());
                }
                cache.remove(&robots_url);
            }
        }

        let content = match self
            .client
            .get(&robots_url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                match read_capped(resp, self.max_body_bytes).await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Ignoring robots.txt from {}: {}", robots_url, e);
                        String::new()
                    }
                }
            }
            Ok(resp) => {
                debug!("No usable robots.txt at {} ({})", robots_url, resp.status());
                String::new()
            }
            Err(e) => {
                warn!("Failed to fetch robots.txt from {}: {}", robots_url, e);
                String::new()
            }
        };

        if let Ok(mut cache) = self.memory_cache.lock() {
            cache.insert(
                robots_url,
                CachedRobots {
                    content: content.clone(),
                    expires_at: Instant::now() + CACHE_TTL,
                },
            );
        }

        Ok(content)
    }
}

/// 按块读取响应体，超过上限立即中止
async fn read_capped(mut resp: Response, limit: u64) -> std::result::Result<String, EngineError> {
    if resp.content_length().is_some_and(|len| len > limit) {
        return Err(EngineError::TooLarge { limit });
    }
    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(EngineError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// 计算源站的 robots.txt 地址
fn robots_url(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("URL has no host: {}", url))?;
    let port = url.port_or_known_default().unwrap_or(80);
    Ok(format!("{}://{}:{}/robots.txt", url.scheme(), host, port))
}
