use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::attendance::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid status `{0}`; expected one of Full Day, Half Day, Absent, Holiday")]
    InvalidStatus(String),

    #[error("invalid date `{0}`; expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid month `{0}`; expected YYYY-MM or `current`")]
    InvalidMonth(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("user {0} does not exist")]
    UnknownUser(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error("attendance store unavailable")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("failed to generate report")]
    Report(#[source] anyhow::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidStatus(_) => "INVALID_STATUS",
            AppError::InvalidDate(_) => "INVALID_DATE",
            AppError::InvalidMonth(_) => "INVALID_MONTH",
            AppError::Validation(_) => "VALIDATION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::UnknownUser(_) => "UNKNOWN_USER",
            AppError::Conflict(_) => "CONFLICT",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::Report(_) => "REPORT_FAILED",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidStatus(_)
            | AppError::InvalidDate(_)
            | AppError::InvalidMonth(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnknownUser(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Report(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownUser(id) => AppError::UnknownUser(id),
            StoreError::Unavailable(e) => AppError::StoreUnavailable(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal details stay in the logs.
        if status.is_server_error() {
            tracing::error!(error = ?self, code = self.code(), "request failed");
        }
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
