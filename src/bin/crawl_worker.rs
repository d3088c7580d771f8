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

use clap::Parser;
use docrawl::config::settings::Settings;
use docrawl::utils::telemetry;
use docrawl::workers::crawl_handler::CrawlHandler;
use docrawl::workers::host::{self, HostArgs};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// 爬取处理器入口
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = HostArgs::parse();
    telemetry::init_telemetry();

    let settings = Settings::new()?;
    info!("Starting crawl worker...");

    let handler = Arc::new(CrawlHandler::from_settings(&settings)?);
    host::run_host(handler, &settings, args).await
}
