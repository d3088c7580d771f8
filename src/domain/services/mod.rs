// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含系统的核心业务逻辑服务：
/// - 爬取服务（crawl_service）：从起始地址做广度优先遍历并转换页面
/// - 文档服务（document_service）：下载远程文档并转换为文本
///
/// 服务只处理单个条目，批量、超时和失败占位由工作器层负责。
pub mod crawl_service;
pub mod document_service;
