// src/error.rs
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(StoreError),
    Unauthenticated(String),
    Forbidden(String),
    NotFound(String),
    ValidationError(String),
    Conflict(String),
    OperationFailed(String),
}

impl AppError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self { AppError::Unauthenticated(msg.into()) }
    pub fn forbidden(msg: impl Into<String>) -> Self { AppError::Forbidden(msg.into()) }
    pub fn not_found(msg: impl Into<String>) -> Self { AppError::NotFound(msg.into()) }
    pub fn validation(msg: impl Into<String>) -> Self { AppError::ValidationError(msg.into()) }
    pub fn conflict(msg: impl Into<String>) -> Self { AppError::Conflict(msg.into()) }
    pub fn internal(msg: impl Into<String>) -> Self { AppError::OperationFailed(msg.into()) }

    /// Generic write failure, reported to clients as `{"message": "failed"}`.
    pub fn failed() -> Self { AppError::OperationFailed("failed".to_string()) }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::DatabaseError(err) => {
                tracing::error!(error = %err, "store operation failed");
                "Database error occurred".to_string()
            }
            AppError::OperationFailed(msg) => {
                tracing::error!(%msg, "operation failed");
                msg
            }
            AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg)
            | AppError::Conflict(msg) => msg,
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(what) => AppError::Conflict(format!("{what} already exists")),
            other => AppError::DatabaseError(other),
        }
    }
}

// Body and query rejections are client errors with the usual `{message}` body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
