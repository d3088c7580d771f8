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

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    domain::models::job::{Job, JobResponse, JobResult},
    workers::handler::{execute_job, JobHandler},
};

/// 同步执行作业
///
/// HTTP 状态码与响应信封中的 `status_code` 一致
pub async fn run_sync(
    Extension(handler): Extension<Arc<dyn JobHandler>>,
    payload: Result<Json<Job>, JsonRejection>,
) -> Response {
    let mut job = match payload {
        Ok(Json(job)) => job,
        Err(rejection) => {
            warn!("Rejected malformed job: {}", rejection.body_text());
            let response =
                JobResponse::failure(400, format!("Malformed job: {}", rejection.body_text()));
            return (StatusCode::BAD_REQUEST, Json(JobResult::new(None, response))).into_response();
        }
    };

    let id = job
        .id
        .get_or_insert_with(|| format!("sync-{}", Uuid::new_v4()))
        .clone();
    let response = execute_job(handler.as_ref(), &job).await;
    let status =
        StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(JobResult::new(Some(id), response))).into_response()
}
