use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::store::StoreError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `NOT_FOUND`,
    /// `CONFLICT`, `INTERNAL_ERROR`.
    #[schema(example = "CONFLICT")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Blueprint 'cluster1' already exists")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(detail) => {
                tracing::warn!("Duplicate key: {detail}");
                AppError::Conflict("Resource already exists".into())
            }
            StoreError::ForeignKeyViolation(detail) => {
                tracing::warn!("Missing parent: {detail}");
                AppError::NotFound("Blueprint not found".into())
            }
            StoreError::NotNullViolation(detail) => {
                tracing::warn!("Missing required column: {detail}");
                AppError::Validation("A required field is missing".into())
            }
            StoreError::ParentMismatch { .. } => {
                tracing::warn!("{err}");
                AppError::Validation(
                    "Configuration does not belong to the target blueprint".into(),
                )
            }
            StoreError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}
