// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含作业输入的校验与转换
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 文档转换模块
///
/// 识别文档格式并导出为 Markdown 或纯文本
pub mod converters;

/// 领域模块
///
/// 包含作业模型、爬取服务和文档服务
pub mod domain;

/// 引擎模块
///
/// 实现页面抓取引擎
pub mod engines;

/// 表示层模块
///
/// 本地作业API的路由和处理器
pub mod presentation;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 作业处理器、队列工作器和作业宿主
pub mod workers;
