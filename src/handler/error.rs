use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;
use thiserror::Error;

use crate::utils::upstream::UpstreamError;

/// 统一错误响应 `{ success: false, error }`
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl AppError {
    /// 记录上游错误详情，只向调用方返回通用信息
    pub fn upstream(message: &str, err: &UpstreamError) -> Self {
        tracing::error!("{}: {}", message, err);
        AppError::Upstream(message.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) | AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({"success": false, "error": self.to_string()}))).into_response()
    }
}

/// 带上下文的数据库错误映射：唯一约束冲突 409，未找到 404，其余 500
pub fn db_error(context: &'static str) -> impl Fn(DieselError) -> AppError {
    move |e| match e {
        DieselError::NotFound => AppError::NotFound("Resource not found".to_string()),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            tracing::warn!("{}: {}", context, info.message());
            AppError::Conflict("Resource already exists".to_string())
        }
        other => {
            tracing::error!("{}: {}", context, other);
            AppError::InternalServerError
        }
    }
}

impl From<DieselError> for AppError {
    fn from(e: DieselError) -> Self {
        db_error("Database error")(e)
    }
}

impl From<PoolError> for AppError {
    fn from(e: PoolError) -> Self {
        tracing::error!("Failed to get DB connection: {}", e);
        AppError::InternalServerError
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn errors_use_the_envelope() {
        let (status, body) = body_of(AppError::BadRequest("Symbol is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Symbol is required"}));

        let (status, body) = body_of(AppError::InternalServerError).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn diesel_not_found_maps_to_404() {
        let (status, _) = body_of(AppError::from(DieselError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upstream_errors_hide_the_upstream_body() {
        let err = UpstreamError::Status {
            upstream: "prediction",
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "stack trace from model server".into(),
        };
        let (status, body) = body_of(AppError::upstream("Failed to fetch predictions", &err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch predictions");
        assert!(!body.to_string().contains("stack trace"));
    }
}
