// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 将宿主传入的原始作业输入校验并转换为处理器使用的来源列表
pub mod job_input;
