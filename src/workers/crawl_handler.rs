// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::job_input::{InputMode, JobInput, SourceItem};
use crate::config::settings::{CrawlerSettings, Settings};
use crate::converters::DocumentConverter;
use crate::domain::models::page::PageRecord;
use crate::domain::services::crawl_service::{CrawlOptions, CrawlService};
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{EngineError, PageFetcher};
use crate::utils::errors::JobError;
use crate::utils::robots::{RobotsChecker, RobotsCheckerTrait};
use crate::workers::handler::{process_in_order, with_timeout, JobHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 爬取处理器
///
/// 输入 `{"url", "max_depth"?}` 或 `{"sources": [...]}`，
/// 输出 `[{"url", "markdown"}]`；失败的条目输出一条占位记录
pub struct CrawlHandler<F: PageFetcher, C: RobotsCheckerTrait = RobotsChecker> {
    crawler: Arc<CrawlService<F, C>>,
    settings: CrawlerSettings,
}

impl CrawlHandler<ReqwestEngine, RobotsChecker> {
    /// 按配置组装处理器，HTTP客户端与转换器在进程内共享
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let engine = ReqwestEngine::from_settings(&settings.http)?;
        let robots = RobotsChecker::new(engine.client().clone(), settings.http.max_body_bytes);
        let crawler = CrawlService::new(
            Arc::new(engine),
            Arc::new(DocumentConverter::new()),
            robots,
            settings.http.user_agent.clone(),
        );
        Ok(Self::new(Arc::new(crawler), settings.crawler.clone()))
    }
}

impl<F: PageFetcher, C: RobotsCheckerTrait> CrawlHandler<F, C> {
    pub fn new(crawler: Arc<CrawlService<F, C>>, settings: CrawlerSettings) -> Self {
        Self { crawler, settings }
    }

    async fn crawl_item(&self, item: SourceItem) -> Vec<PageRecord> {
        let options = CrawlOptions {
            max_depth: item.max_depth.unwrap_or(self.settings.default_max_depth),
            max_pages: self.settings.max_pages,
            respect_robots_txt: self.settings.respect_robots_txt,
        };

        let crawled = with_timeout(
            self.settings.item_timeout(),
            item.url.as_str(),
            self.crawler.crawl(&item.url, &options),
        )
        .await;

        match crawled {
            Ok(pages) => {
                info!(url = %item.url, pages = pages.len(), "Crawled");
                pages
                    .into_iter()
                    .map(|page| {
                        debug!(url = %page.url, depth = page.depth, "Exporting page");
                        PageRecord {
                            url: page.url.to_string(),
                            markdown: page.document.export(item.format),
                        }
                    })
                    .collect()
            }
            Err(e) => {
                warn!(url = %item.url, kind = e.kind(), "Crawl failed: {}", e);
                vec![PageRecord::placeholder(&item.requested, &e)]
            }
        }
    }
}

#[async_trait]
impl<F, C> JobHandler for CrawlHandler<F, C>
where
    F: PageFetcher + 'static,
    C: RobotsCheckerTrait + 'static,
{
    fn name(&self) -> &'static str {
        "crawl"
    }

    async fn handle(&self, input: Option<&Value>) -> Result<Value, JobError> {
        let input = JobInput::parse(input, "url")?;

        let results = process_in_order(input.items, self.settings.concurrency, |item| {
            self.crawl_item(item)
        })
        .await;

        let records: Vec<PageRecord> = match input.mode {
            InputMode::Single => results.into_iter().next().unwrap_or_default(),
            InputMode::Batch => results.into_iter().flatten().collect(),
        };
        serde_json::to_value(records).map_err(|e| JobError::Unknown(e.to_string()))
    }
}
