// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 作业错误类型
///
/// 处理器内部的所有失败都归入这四类，并且只在边界处统一映射为状态码
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// 输入校验失败，在任何网络调用之前同步检测
    #[error("{0}")]
    Validation(String),

    /// 传输失败（DNS、连接、非2xx状态、超时）
    #[error("{0}")]
    Transport(String),

    /// 转换或内容提取失败
    #[error("{0}")]
    Conversion(String),

    /// 其他未预期的错误
    #[error("{0}")]
    Unknown(String),
}

impl JobError {
    /// 映射为响应状态码
    pub fn status_code(&self) -> u16 {
        match self {
            JobError::Validation(_) => 400,
            JobError::Transport(_) | JobError::Conversion(_) | JobError::Unknown(_) => 500,
        }
    }

    /// 错误类别名称，用于日志字段
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Validation(_) => "validation",
            JobError::Transport(_) => "transport",
            JobError::Conversion(_) => "conversion",
            JobError::Unknown(_) => "unknown",
        }
    }
}

/// 作业宿主错误类型
#[derive(Error, Debug)]
pub enum HostError {
    #[error("队列请求失败: {0}")]
    Queue(#[from] reqwest::Error),

    #[error("无效的作业数据: {0}")]
    InvalidJob(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("未配置: {0}")]
    NotConfigured(&'static str),
}
