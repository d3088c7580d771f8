// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::JobError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 作业
///
/// 宿主提交给处理器的一个工作单元，`input` 由具体处理器解释
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// 作业ID，由宿主分配
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 作业输入
    #[serde(default)]
    pub input: Option<Value>,
}

impl Job {
    pub fn new(input: Value) -> Self {
        Self {
            id: None,
            input: Some(input),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// 作业响应信封
///
/// 成功时为 `{"output": ..., "status_code": 200}`，
/// 失败时为 `{"error": "...", "status_code": 400|500}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JobResponse {
    Success { output: Value, status_code: u16 },
    Failure { error: String, status_code: u16 },
}

impl JobResponse {
    pub fn success(output: Value) -> Self {
        JobResponse::Success {
            output,
            status_code: 200,
        }
    }

    pub fn failure(status_code: u16, error: impl Into<String>) -> Self {
        JobResponse::Failure {
            error: error.into(),
            status_code,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            JobResponse::Success { status_code, .. } | JobResponse::Failure { status_code, .. } => {
                *status_code
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobResponse::Success { .. })
    }
}

impl From<&JobError> for JobResponse {
    fn from(error: &JobError) -> Self {
        JobResponse::failure(error.status_code(), error.to_string())
    }
}

/// 带作业ID的结果，用于回传队列和本地API响应
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub response: JobResponse,
}

impl JobResult {
    pub fn new(id: Option<String>, response: JobResponse) -> Self {
        Self { id, response }
    }
}
