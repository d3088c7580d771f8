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

use crate::config::settings::Settings;
use crate::domain::models::job::{Job, JobResponse};
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::presentation::routes;
use crate::utils::errors::HostError;
use crate::workers::handler::{execute_job, JobHandler};
use crate::workers::queue_worker::QueueWorker;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 作业宿主命令行参数
#[derive(Debug, Clone, Default, Parser)]
#[command(version, about = "Runs a job handler once, as a local API, or as a queue worker")]
pub struct HostArgs {
    /// 执行单个作业并输出响应信封；参数为 JSON 文本或 `@文件路径`
    #[arg(long = "test-input", value_name = "JSON|@FILE", conflicts_with_all = ["serve", "queue"])]
    pub test_input: Option<String>,

    /// 启动本地作业API
    #[arg(long, conflicts_with = "queue")]
    pub serve: bool,

    /// 以队列工作器模式运行
    #[arg(long)]
    pub queue: bool,

    /// 覆盖配置中的监听端口
    #[arg(long, env = "DOCRAWL_PORT")]
    pub port: Option<u16>,
}

/// 运行模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMode {
    Once(String),
    Serve,
    Queue,
}

impl HostArgs {
    /// 决定运行模式：未显式指定时，配置了队列则以队列模式运行，否则启动本地API
    pub fn mode(&self, settings: &Settings) -> HostMode {
        if let Some(raw) = &self.test_input {
            HostMode::Once(raw.clone())
        } else if self.queue || (!self.serve && settings.queue.job_url.is_some()) {
            HostMode::Queue
        } else {
            HostMode::Serve
        }
    }
}

/// 按命令行参数运行宿主
pub async fn run_host(
    handler: Arc<dyn JobHandler>,
    settings: &Settings,
    args: HostArgs,
) -> anyhow::Result<ExitCode> {
    match args.mode(settings) {
        HostMode::Once(raw) => {
            let response = run_once(handler.as_ref(), &raw).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        HostMode::Serve => {
            let port = args.port.unwrap_or(settings.server.port);
            serve(handler, &settings.server.host, port).await?;
            Ok(ExitCode::SUCCESS)
        }
        HostMode::Queue => {
            let client = ReqwestEngine::build_client(&settings.http)?;
            let worker = QueueWorker::new(handler, client, &settings.queue)?;
            worker.run(shutdown_signal()).await;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 执行单个作业
///
/// `raw` 以 `@` 开头时视为文件路径
pub async fn run_once(handler: &dyn JobHandler, raw: &str) -> Result<JobResponse, HostError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => raw.to_string(),
    };
    let job: Job = serde_json::from_str(&text)?;
    Ok(execute_job(handler, &job).await)
}

/// 启动本地作业API，Ctrl-C 时优雅退出
pub async fn serve(handler: Arc<dyn JobHandler>, host: &str, port: u16) -> Result<(), HostError> {
    let name = handler.name();
    let app = routes::routes(handler);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Handler {} listening on {}", name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
