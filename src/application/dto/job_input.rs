// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::converters::OutputFormat;
use crate::utils::errors::JobError;
use crate::utils::url_utils::parse_source_url;
use serde_json::{Map, Value};
use url::Url;

/// 输入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// 单个来源，输出为该条目的结果
    Single,
    /// `sources` 数组，输出为按输入顺序拼接的结果
    Batch,
}

/// 已校验的单个来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub url: Url,
    /// 作业中提交的原始地址字符串，失败占位记录中原样返回
    pub requested: String,
    /// 未指定时由处理器使用配置默认值
    pub max_depth: Option<u32>,
    pub format: OutputFormat,
}

/// 已校验的作业输入
///
/// 所有条目在任何网络请求之前完成校验，任一条目无效则整个作业失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInput {
    pub mode: InputMode,
    pub items: Vec<SourceItem>,
}

impl JobInput {
    /// 解析作业输入
    ///
    /// `key` 是处理器首选的地址字段（爬取为 `url`，文档为 `source`），
    /// 另一个字段名作为别名同样接受
    pub fn parse(input: Option<&Value>, key: &'static str) -> Result<Self, JobError> {
        let object = match input {
            None | Some(Value::Null) => {
                return Err(JobError::Validation("Missing 'input' in job".to_string()))
            }
            Some(Value::Object(object)) => object,
            Some(_) => {
                return Err(JobError::Validation(
                    "'input' must be a JSON object".to_string(),
                ))
            }
        };

        match object.get("sources") {
            None | Some(Value::Null) => Ok(Self {
                mode: InputMode::Single,
                items: vec![parse_item(object, key, "input")?],
            }),
            Some(Value::Array(sources)) if sources.is_empty() => Err(JobError::Validation(
                "'sources' must not be empty".to_string(),
            )),
            Some(Value::Array(sources)) => {
                let items = sources
                    .iter()
                    .enumerate()
                    .map(|(i, source)| {
                        let location = format!("sources[{}]", i);
                        match source {
                            Value::String(raw) => Ok(SourceItem {
                                url: parse_url(raw, key, &location)?,
                                requested: raw.clone(),
                                max_depth: None,
                                format: OutputFormat::default(),
                            }),
                            Value::Object(object) => parse_item(object, key, &location),
                            _ => Err(JobError::Validation(format!(
                                "{} must be a URL string or an object",
                                location
                            ))),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self {
                    mode: InputMode::Batch,
                    items,
                })
            }
            Some(_) => Err(JobError::Validation(
                "'sources' must be an array".to_string(),
            )),
        }
    }
}

fn alias_of(key: &str) -> &'static str {
    if key == "url" {
        "source"
    } else {
        "url"
    }
}

fn parse_item(
    object: &Map<String, Value>,
    key: &'static str,
    location: &str,
) -> Result<SourceItem, JobError> {
    let raw = match object.get(key).or_else(|| object.get(alias_of(key))) {
        Some(Value::String(raw)) => raw.as_str(),
        None | Some(Value::Null) => "",
        Some(_) => {
            return Err(JobError::Validation(format!(
                "'{}' in {} must be a string",
                key, location
            )))
        }
    };

    let max_depth = match object.get("max_depth") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_u64()
                .and_then(|depth| u32::try_from(depth).ok())
                .ok_or_else(|| {
                    JobError::Validation(format!(
                        "'max_depth' in {} must be a non-negative integer",
                        location
                    ))
                })?,
        ),
    };

    let format = match object.get("format") {
        None | Some(Value::Null) => OutputFormat::default(),
        Some(Value::String(raw)) => OutputFormat::parse(raw).ok_or_else(|| {
            JobError::Validation(format!(
                "Unsupported format '{}' in {} (expected markdown or text)",
                raw, location
            ))
        })?,
        Some(_) => {
            return Err(JobError::Validation(format!(
                "'format' in {} must be a string",
                location
            )))
        }
    };

    Ok(SourceItem {
        url: parse_url(raw, key, location)?,
        requested: raw.to_string(),
        max_depth,
        format,
    })
}

fn parse_url(raw: &str, key: &str, location: &str) -> Result<Url, JobError> {
    if raw.trim().is_empty() {
        return Err(JobError::Validation(format!(
            "Missing '{}' in {}",
            key, location
        )));
    }
    parse_source_url(raw).map_err(JobError::Validation)
}
