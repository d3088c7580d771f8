// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::presentation::handlers::runsync_handler;
use crate::workers::handler::JobHandler;
use axum::{
    extract::Extension,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 返回值
///
/// 返回挂载了处理器的路由
pub fn routes(handler: Arc<dyn JobHandler>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/runsync", post(runsync_handler::run_sync))
        .layer(Extension(handler))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回状态和处理器名称
pub async fn health_check(Extension(handler): Extension<Arc<dyn JobHandler>>) -> Json<Value> {
    Json(json!({"status": "ok", "handler": handler.name()}))
}
