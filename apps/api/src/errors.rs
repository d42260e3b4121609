use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::blocks::BlockError;
use crate::optimizer::OptimizerError;
use crate::resume::ResumeError;
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deleting a heading with children needs an explicit cascade.
    #[error("{message}")]
    HasChildren { message: String, children: usize },

    #[error("Optimizer error: {0}")]
    Optimizer(String),

    #[error("Optimizer not configured")]
    OptimizerUnavailable,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<BlockError> for AppError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::NotFound(_) => AppError::NotFound(e.to_string()),
            BlockError::HasChildren { children, .. } => AppError::HasChildren {
                message: e.to_string(),
                children,
            },
            BlockError::DuplicateId(_) => AppError::Conflict(e.to_string()),
            BlockError::ShapeMismatch { .. }
            | BlockError::NestedHeading(_)
            | BlockError::DanglingParent { .. }
            | BlockError::OutOfScope { .. } => AppError::UnprocessableEntity(e.to_string()),
        }
    }
}

impl From<ResumeError> for AppError {
    fn from(e: ResumeError) -> Self {
        match e {
            ResumeError::Path(_) => AppError::Validation(e.to_string()),
            ResumeError::UnknownField(_)
            | ResumeError::IndexOutOfRange { .. }
            | ResumeError::InvalidValue { .. } => AppError::UnprocessableEntity(e.to_string()),
            ResumeError::Serialization(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Block(e) => e.into(),
            SessionError::Resume(e) => e.into(),
            SessionError::NotOptimizable { .. } => AppError::UnprocessableEntity(e.to_string()),
            SessionError::AlreadyPending(_) => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<OptimizerError> for AppError {
    fn from(e: OptimizerError) -> Self {
        match e {
            OptimizerError::NotConfigured => AppError::OptimizerUnavailable,
            OptimizerError::EmptyInput => AppError::Validation(e.to_string()),
            _ => AppError::Optimizer(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::HasChildren { message, children } => {
                let body = Json(json!({
                    "error": {
                        "code": "HAS_CHILDREN",
                        "message": message,
                        "children": children
                    }
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::Optimizer(msg) => {
                tracing::error!("Optimizer error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "OPTIMIZER_ERROR",
                    "The text optimizer could not process this request".to_string(),
                )
            }
            AppError::OptimizerUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "OPTIMIZER_NOT_CONFIGURED",
                "No optimizer API key is configured".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
