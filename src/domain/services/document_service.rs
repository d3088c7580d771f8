// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::converters::{DocumentConverter, DocumentStream, OutputFormat};
use crate::engines::traits::PageFetcher;
use crate::utils::errors::JobError;
use crate::utils::url_utils::document_name;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

/// 文档服务
///
/// 下载远程文档并转换为 Markdown 或纯文本
pub struct DocumentService<F: PageFetcher> {
    fetcher: Arc<F>,
    converter: Arc<DocumentConverter>,
}

impl<F: PageFetcher> DocumentService<F> {
    pub fn new(fetcher: Arc<F>, converter: Arc<DocumentConverter>) -> Self {
        Self { fetcher, converter }
    }

    /// 下载并转换单个文档
    ///
    /// 转换在阻塞线程池中执行，避免占用异步工作线程
    #[instrument(skip_all, fields(source = %source, format = ?format))]
    pub async fn convert_source(
        &self,
        source: &Url,
        format: OutputFormat,
    ) -> Result<String, JobError> {
        let fetched = self.fetcher.fetch(source).await.map_err(|e| {
            JobError::Transport(format!("Failed to retrieve document from URL: {}", e))
        })?;

        // The filename hint comes from the requested URL, not the redirect target.
        let stream = DocumentStream::new(document_name(source), fetched.body)
            .with_content_type(fetched.content_type)
            .with_origin(fetched.url);
        debug!(name = %stream.name, bytes = stream.bytes.len(), "Document downloaded");

        let converter = Arc::clone(&self.converter);
        let document = tokio::task::spawn_blocking(move || converter.convert(&stream))
            .await
            .map_err(|e| JobError::Conversion(format!("Conversion task failed: {}", e)))?
            .map_err(|e| JobError::Conversion(format!("Conversion failed: {}", e)))?;

        Ok(document.export(format))
    }
}
