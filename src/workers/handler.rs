// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobResponse};
use crate::utils::errors::JobError;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// 作业处理器特质
///
/// 宿主每次把一个作业的 `input` 交给处理器。处理器只在输入校验失败时
/// 返回错误，单个条目的失败以占位结果的形式留在输出中
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// 处理器名称
    fn name(&self) -> &'static str;

    /// 处理作业输入，返回作业输出
    async fn handle(&self, input: Option<&Value>) -> Result<Value, JobError>;
}

/// 执行作业并生成响应信封
///
/// 处理器内部的 panic 会被捕获并报告为 500
#[instrument(skip_all, fields(handler = handler.name(), job_id = job.id.as_deref().unwrap_or("-")))]
pub async fn execute_job(handler: &dyn JobHandler, job: &Job) -> JobResponse {
    let start = Instant::now();
    info!("Processing job");

    let outcome = AssertUnwindSafe(handler.handle(job.input.as_ref()))
        .catch_unwind()
        .await;

    let response = match outcome {
        Ok(Ok(output)) => JobResponse::success(output),
        Ok(Err(e)) => {
            warn!(kind = e.kind(), "Job failed: {}", e);
            JobResponse::from(&e)
        }
        Err(panic) => {
            let e = JobError::Unknown(format!(
                "An unexpected error occurred: {}",
                panic_message(panic.as_ref())
            ));
            error!("Handler panicked: {}", e);
            JobResponse::from(&e)
        }
    };

    info!(
        status_code = response.status_code(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Job finished"
    );
    response
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// 以有限并发处理条目，输出顺序与输入一致
///
/// `concurrency` 为 1 时严格顺序执行
pub async fn process_in_order<T, O, F, Fut>(items: Vec<T>, concurrency: usize, f: F) -> Vec<O>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = O>,
{
    stream::iter(items)
        .map(f)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// 为单个条目加上超时，超时视为传输错误
pub async fn with_timeout<T, Fut>(limit: Duration, what: &str, future: Fut) -> Result<T, JobError>
where
    Fut: Future<Output = Result<T, JobError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(JobError::Transport(format!(
            "Timed out after {}s while processing {}",
            limit.as_secs_f64(),
            what
        ))),
    }
}
