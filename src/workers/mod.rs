// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供作业处理器及其运行宿主：
/// - handler：处理器特质、作业执行、有序并发和超时
/// - crawl_handler / document_handler：两个具体处理器
/// - queue_worker：轮询作业队列
/// - host：命令行入口和运行模式
pub mod crawl_handler;
pub mod document_handler;
pub mod handler;
pub mod host;
pub mod queue_worker;

pub use handler::JobHandler;
