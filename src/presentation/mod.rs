// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 表示层模块
///
/// 本地作业API：同步执行作业和健康检查
pub mod handlers;
pub mod routes;
