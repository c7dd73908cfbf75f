//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 核心错误类型
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// 请求未能发出或响应体读取失败
    #[error("网络传输失败: {0}")]
    Transport(String),
    /// 远程服务返回非成功状态码
    #[error("远程服务返回 {status}: {}", .message.as_deref().unwrap_or("<无错误信息>"))]
    Status { status: u16, message: Option<String> },
    #[error("响应体解析失败: {0}")]
    Decode(String),
    #[error("必填字段为空: {0}")]
    MissingField(&'static str),
    #[error("字段 {field} 不是有效数字: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("资源不存在: {0}")]
    NotFound(String),
    #[error("存储失败: {0}")]
    Storage(String),
    #[error("配置错误: {0}")]
    Config(String),
}

impl CoreError {
    /// 面向用户的错误说明；`None` 时由调用方使用各操作的兜底文案
    pub fn detail(&self) -> Option<String> {
        match self {
            CoreError::Status { message, .. } => message.clone(),
            CoreError::Transport(msg) => Some(msg.clone()),
            CoreError::MissingField(field) => {
                Some(format!("El campo «{}» es obligatorio", field_label(field)))
            }
            CoreError::InvalidNumber { field, value } => Some(format!(
                "«{}» no es un número válido para el campo «{}»",
                value,
                field_label(field)
            )),
            _ => None,
        }
    }

    /// 表单校验类错误，发生时不会有任何网络请求
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::MissingField(_) | CoreError::InvalidNumber { .. }
        )
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "name" => "Nombre",
        "features" => "Características",
        "price" => "Precio",
        "year" => "Año",
        other => other,
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CoreError::Decode(err.to_string())
        } else {
            CoreError::Transport(err.to_string())
        }
    }
}

/// 错误响应结构
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub timestamp: String,
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoreError::MissingField(_) | CoreError::InvalidNumber { .. } => {
                StatusCode::BAD_REQUEST
            }
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            CoreError::NotFound(msg) => msg,
            other => other.detail().unwrap_or_else(|| other.to_string()),
        };

        let error_response = ErrorResponse {
            error: message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, axum::Json(error_response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
