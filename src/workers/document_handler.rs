// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::job_input::{InputMode, JobInput, SourceItem};
use crate::config::settings::{DocumentSettings, Settings};
use crate::converters::DocumentConverter;
use crate::domain::services::document_service::DocumentService;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{EngineError, PageFetcher};
use crate::utils::errors::JobError;
use crate::workers::handler::{process_in_order, with_timeout, JobHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// 文档处理器
///
/// 输入 `{"source", "format"?}` 或 `{"sources": [...]}`；单个来源输出字符串，
/// 批量输出字符串数组。失败的条目以错误描述代替转换结果
pub struct DocumentHandler<F: PageFetcher> {
    service: DocumentService<F>,
    settings: DocumentSettings,
}

impl DocumentHandler<ReqwestEngine> {
    /// 按配置组装处理器，转换器在进程启动时创建一次
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let engine = ReqwestEngine::from_settings(&settings.http)?;
        let service = DocumentService::new(Arc::new(engine), Arc::new(DocumentConverter::new()));
        Ok(Self::new(service, settings.documents.clone()))
    }
}

impl<F: PageFetcher> DocumentHandler<F> {
    pub fn new(service: DocumentService<F>, settings: DocumentSettings) -> Self {
        Self { service, settings }
    }

    async fn convert_item(&self, item: SourceItem) -> String {
        let converted = with_timeout(
            self.settings.item_timeout(),
            item.url.as_str(),
            self.service.convert_source(&item.url, item.format),
        )
        .await;

        match converted {
            Ok(text) => {
                info!(source = %item.url, chars = text.len(), "Converted");
                text
            }
            Err(e) => {
                warn!(source = %item.url, kind = e.kind(), "Conversion failed: {}", e);
                e.to_string()
            }
        }
    }
}

#[async_trait]
impl<F: PageFetcher + 'static> JobHandler for DocumentHandler<F> {
    fn name(&self) -> &'static str {
        "document"
    }

    async fn handle(&self, input: Option<&Value>) -> Result<Value, JobError> {
        let input = JobInput::parse(input, "source")?;

        let mut results = process_in_order(input.items, self.settings.concurrency, |item| {
            self.convert_item(item)
        })
        .await;

        Ok(match input.mode {
            InputMode::Single => Value::String(results.pop().unwrap_or_default()),
            InputMode::Batch => Value::from(results),
        })
    }
}
