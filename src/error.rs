//! 错误处理模块
//!
//! 定义应用程序的错误类型以及到 HTTP 响应的映射。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求参数或图像校验失败
    #[error("{0}")]
    Validation(String),

    /// 认证失败（缺失/无效凭证，或用户不匹配）
    #[error("{0}")]
    Authentication(String),

    /// 远程图像获取失败
    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    /// 图像解码失败
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// 图像中未检测到人体
    #[error("No person detected in image")]
    NoDetection,

    /// 关键点缺失
    #[error("Missing pose landmarks: {0}")]
    IncompleteLandmarks(String),

    /// 姿态推理失败
    #[error("Failed to process image: {0}")]
    Inference(String),

    /// 持久化失败
    #[error("Failed to save data: {0}")]
    Persistence(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内部错误
    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Fetch(_)
            | AppError::Decode(_)
            | AppError::NoDetection => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::IncompleteLandmarks(_)
            | AppError::Inference(_)
            | AppError::Persistence(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 指标标签使用的短名称
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Authentication(_) => "authentication",
            AppError::Fetch(_) => "fetch",
            AppError::Decode(_) => "decode",
            AppError::NoDetection => "no_detection",
            AppError::IncompleteLandmarks(_) => "incomplete_landmarks",
            AppError::Inference(_) => "inference",
            AppError::Persistence(_) => "persistence",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl AppError {
    /// 返回给客户端的消息，服务端错误不带后端细节
    pub fn public_message(&self) -> String {
        match self {
            AppError::Inference(_) => "Failed to process image".to_string(),
            AppError::Persistence(_) => "Failed to save data".to_string(),
            AppError::Config(_) | AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(feature = "surrealdb")]
impl From<surrealdb::Error> for AppError {
    fn from(e: surrealdb::Error) -> Self {
        AppError::Persistence(e.to_string())
    }
}

/// Axum response implementation for AppError
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self);
        }
        (status, Json(ErrorResponse::new(&self.public_message()))).into_response()
    }
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误消息
    pub error: String,
}

impl ErrorResponse {
    /// 创建新错误响应
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Authentication("nope".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NoDetection.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Inference("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Persistence("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_has_single_error_field() {
        let response = AppError::NoDetection.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "No person detected in image"}));
    }

    #[tokio::test]
    async fn test_server_errors_hide_backend_detail() {
        let response = AppError::Inference("pose service returned 503: model loading".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "Failed to process image"}));
    }
}
