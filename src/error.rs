/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)。変換はここ一箇所のみ
 * - RepoError / validation error を統一的に変換
 */
use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// The original failure, attached to the response extensions so the outer
/// middleware (error log, metrics, shutdown) can see what the envelope hides.
#[derive(Debug, Clone)]
pub struct ErrorCause {
    pub message: Arc<str>,
    pub shutdown: bool,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("field validation error")]
    Validation { fields: Vec<FieldError> },
    #[error("{0}")]
    Unauthorized(String),
    #[error("request is forbidden")]
    Forbidden,
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("internal server error")]
    Internal(String),
    #[error("internal server error")]
    Shutdown(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// An error that additionally asks the process to terminate gracefully.
    /// Clients see a plain 500; the error middleware signals shutdown.
    pub fn shutdown(detail: impl Into<String>) -> Self {
        Self::Shutdown(detail.into())
    }

    // Internal detail for the error log. Display is already sanitized for
    // clients, so only the unclassified variants differ here.
    fn cause(&self) -> String {
        match self {
            AppError::Internal(detail) | AppError::Shutdown(detail) => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let cause = ErrorCause {
            message: Arc::from(self.cause()),
            shutdown: matches!(self, AppError::Shutdown(_)),
        };

        let (status, error) = match &self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            // unclassified errors never leak their message to clients
            AppError::Internal(_) | AppError::Shutdown(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        let fields = match self {
            AppError::Validation { fields } => fields,
            _ => Vec::new(),
        };

        let mut res = (status, Json(ErrorResponse { error, fields })).into_response();
        res.extensions_mut().insert(cause);
        res
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    error: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();

        AppError::Validation { fields }
    }
}
