// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 作业（job）：宿主提交的工作单元及其响应信封
/// - 页面（page）：爬取得到的页面及输出记录
pub mod job;
pub mod page;
