// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::QueueSettings;
use crate::domain::models::job::{Job, JobResult};
use crate::utils::errors::HostError;
use crate::workers::handler::{execute_job, JobHandler};
use futures::FutureExt;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// 队列工作器
///
/// 从作业地址轮询作业，交给处理器执行后把结果回传到结果地址。
/// 一次只处理一个作业
pub struct QueueWorker {
    handler: Arc<dyn JobHandler>,
    client: Client,
    job_url: String,
    result_url: String,
    poll_interval: Duration,
    worker_id: Uuid,
}

impl QueueWorker {
    /// 创建新的队列工作器实例
    ///
    /// 作业地址和结果地址都必须已配置
    pub fn new(
        handler: Arc<dyn JobHandler>,
        client: Client,
        settings: &QueueSettings,
    ) -> Result<Self, HostError> {
        let job_url = settings
            .job_url
            .clone()
            .ok_or(HostError::NotConfigured("queue.job_url"))?;
        let result_url = settings
            .result_url
            .clone()
            .ok_or(HostError::NotConfigured("queue.result_url"))?;

        Ok(Self {
            handler,
            client,
            job_url,
            result_url,
            poll_interval: settings.poll_interval(),
            worker_id: Uuid::new_v4(),
        })
    }

    /// 运行工作器，直到 `shutdown` 完成
    ///
    /// 正在执行的作业会完成并回传后再退出
    pub async fn run<S>(&self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            "Queue worker {} started for handler {}",
            self.worker_id,
            self.handler.name()
        );

        loop {
            let idle = match self.process_next_job().await {
                Ok(processed) => !processed,
                Err(e) => {
                    error!("Error processing job: {}", e);
                    true
                }
            };

            if idle {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = sleep(self.poll_interval) => {}
                }
            } else if shutdown.as_mut().now_or_never().is_some() {
                break;
            }
        }

        info!("Queue worker {} stopped", self.worker_id);
    }

    /// 获取并执行下一个作业
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 处理了一个作业
    /// * `Ok(false)` - 队列为空
    /// * `Err(HostError)` - 轮询或回传失败
    #[instrument(skip(self), fields(worker_id = %self.worker_id))]
    pub async fn process_next_job(&self) -> Result<bool, HostError> {
        let response = self
            .client
            .get(&self.job_url)
            .query(&[("worker_id", self.worker_id.to_string())])
            .send()
            .await?
            .error_for_status()?;

        if response.status() == StatusCode::NO_CONTENT {
            debug!("No job available");
            return Ok(false);
        }
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            debug!("No job available");
            return Ok(false);
        }

        let job: Job = serde_json::from_slice(&body)?;
        let response = execute_job(self.handler.as_ref(), &job).await;

        self.client
            .post(&self.result_url)
            .json(&JobResult::new(job.id.clone(), response))
            .send()
            .await?
            .error_for_status()?;
        debug!("Result delivered");

        Ok(true)
    }
}
