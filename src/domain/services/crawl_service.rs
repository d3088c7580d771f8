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

use crate::converters::{ConvertedDocument, DocumentConverter, DocumentStream};
use crate::domain::models::page::CrawledPage;
use crate::engines::traits::PageFetcher;
use crate::utils::errors::JobError;
use crate::utils::robots::{RobotsChecker, RobotsCheckerTrait};
use crate::utils::url_utils::{document_name, normalize_link, resolve_url, same_host};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

/// 单次爬取的参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// 最大链接深度，0 表示只抓取起始页
    pub max_depth: u32,
    /// 最多抓取的页面数
    pub max_pages: usize,
    /// 是否对发现的链接检查 robots.txt
    pub respect_robots_txt: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 0,
            max_pages: 100,
            respect_robots_txt: false,
        }
    }
}

/// 爬取服务
///
/// 从起始地址做广度优先遍历：深度为 d 的页面全部抓取完才会抓取 d+1；
/// 只跟随与起始页同主机的链接，每个地址（去掉片段后）最多抓取一次
pub struct CrawlService<F: PageFetcher, C: RobotsCheckerTrait = RobotsChecker> {
    /// 页面抓取器
    fetcher: Arc<F>,
    /// 文档转换器
    converter: Arc<DocumentConverter>,
    /// Robots.txt检查器
    robots_checker: C,
    /// 检查 robots.txt 时使用的 User-Agent
    user_agent: String,
}

impl<F: PageFetcher> CrawlService<F, RobotsChecker> {
    /// 创建新的爬取服务实例
    pub fn new(
        fetcher: Arc<F>,
        converter: Arc<DocumentConverter>,
        robots_checker: RobotsChecker,
        user_agent: impl Into<String>,
    ) -> Self {
        Self::new_with_checker(fetcher, converter, robots_checker, user_agent)
    }
}

impl<F: PageFetcher, C: RobotsCheckerTrait> CrawlService<F, C> {
    /// 使用自定义Robots检查器创建新的爬取服务实例
    pub fn new_with_checker(
        fetcher: Arc<F>,
        converter: Arc<DocumentConverter>,
        checker: C,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            converter,
            robots_checker: checker,
            user_agent: user_agent.into(),
        }
    }

    /// 爬取起始地址
    ///
    /// 起始页失败时返回错误；遍历中发现的页面失败只记录日志并跳过
    #[instrument(skip_all, fields(origin = %origin, max_depth = options.max_depth))]
    pub async fn crawl(
        &self,
        origin: &Url,
        options: &CrawlOptions,
    ) -> Result<Vec<CrawledPage>, JobError> {
        let origin = normalize_link(origin);
        let mut queue = VecDeque::from([(origin.clone(), 0u32)]);
        let mut visited = HashSet::from([origin.to_string()]);
        // Hosts reachable from the origin, including its redirect target.
        let mut scope = vec![origin.clone()];
        let mut pages = Vec::new();

        while let Some((url, depth)) = queue.pop_front() {
            if pages.len() >= options.max_pages {
                debug!("Page limit {} reached", options.max_pages);
                break;
            }

            let (page, html) = match self.fetch_page(&url).await {
                Ok(fetched) => fetched,
                Err(e) if depth == 0 => return Err(e),
                Err(e) => {
                    warn!(url = %url, depth, "Skipping page: {}", e);
                    continue;
                }
            };

            let final_url = normalize_link(&page.url);
            if depth == 0 {
                if !same_host(&origin, &page.url) {
                    scope.push(page.url.clone());
                }
                visited.insert(final_url.to_string());
            } else if final_url != url {
                // Redirected: the target must stay in scope and must not have been seen yet.
                if !scope.iter().any(|allowed| same_host(allowed, &page.url)) {
                    debug!(url = %url, target = %page.url, "Redirected off-site, dropping");
                    continue;
                }
                if !visited.insert(final_url.to_string()) {
                    debug!(url = %url, target = %page.url, "Redirect target already visited");
                    continue;
                }
            }

            if depth < options.max_depth {
                if let Some(html) = html {
                    for link in LinkDiscoverer::extract_links(&html, &page.url) {
                        if !scope.iter().any(|allowed| same_host(allowed, &link)) {
                            continue;
                        }
                        if !visited.insert(link.to_string()) {
                            continue;
                        }
                        if options.respect_robots_txt && !self.robots_allow(&link).await {
                            debug!(url = %link, "Disallowed by robots.txt");
                            continue;
                        }
                        queue.push_back((link, depth + 1));
                    }
                }
            }

            pages.push(CrawledPage {
                url: page.url,
                depth,
                document: page.document,
            });
        }

        debug!(pages = pages.len(), "Crawl finished");
        Ok(pages)
    }

    /// 抓取并转换单个页面，HTML 页面同时返回源码用于链接发现
    async fn fetch_page(&self, url: &Url) -> Result<(FetchedDocument, Option<String>), JobError> {
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| JobError::Transport(format!("Failed to fetch {}: {}", url, e)))?;
        debug!(url = %url, status_code = fetched.status_code, final_url = %fetched.url, "Page fetched");

        let stream = DocumentStream::new(document_name(&fetched.url), fetched.body)
            .with_content_type(fetched.content_type)
            .with_origin(fetched.url.clone());
        let (document, html) = self
            .converter
            .convert_with_source(&stream)
            .map_err(|e| JobError::Conversion(format!("Failed to convert {}: {}", url, e)))?;

        Ok((
            FetchedDocument {
                url: fetched.url,
                document,
            },
            html,
        ))
    }

    async fn robots_allow(&self, url: &Url) -> bool {
        match self.robots_checker.is_allowed(url, &self.user_agent).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!(url = %url, "robots.txt check failed, allowing: {}", e);
                true
            }
        }
    }
}

struct FetchedDocument {
    url: Url,
    document: ConvertedDocument,
}

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// 链接发现器
///
/// 负责从HTML内容中提取链接
pub struct LinkDiscoverer;

impl LinkDiscoverer {
    /// 从HTML内容中提取链接
    ///
    /// 按文档顺序返回去重后的 http/https 绝对地址，片段已去除
    pub fn extract_links(html_content: &str, base: &Url) -> Vec<Url> {
        let fragment = Html::parse_document(html_content);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in fragment.select(&LINK_SELECTOR) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let href = href.trim();
            // Ignore fragment identifiers, mailto and javascript links
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
                || href.to_ascii_lowercase().starts_with("javascript:")
            {
                continue;
            }

            if let Ok(url) = resolve_url(base, href) {
                if url.scheme() == "http" || url.scheme() == "https" {
                    let url = normalize_link(&url);
                    if seen.insert(url.to_string()) {
                        links.push(url);
                    }
                }
            }
        }

        links
    }
}

#[cfg(test)]
#[path = "crawl_service_test.rs"]
mod tests;
