use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::repository::StoreError;
use crate::validation::FieldErrors;

/// Result type alias used by services and handlers.
pub type AppResult<T> = Result<T, AppError>;

/// AppError
///
/// Every failure a request can end with. Each variant maps to exactly one HTTP status;
/// the translation happens once, in `IntoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed pagination/query parameter.
    #[error("{0}")]
    ParameterValidation(String),

    /// Structural violations of a request body, aggregated per field.
    #[error("request body failed validation on {} field(s)", .0.len())]
    FormValidation(FieldErrors),

    /// A single-message client error (entity rules, unreadable JSON).
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Uniqueness or reference constraint violated.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Server(String),

    /// Unclassified persistence failure. The detail is logged, never returned.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ParameterValidation(_)
            | AppError::FormValidation(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Server(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ApiErrorResponse
///
/// Body returned for every single-message error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiErrorResponse {
    pub status_code: u16,
    pub message: String,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

/// FormValidationErrorResponse
///
/// Body returned when request validation fails: every offending field with all of its messages.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormValidationErrorResponse {
    pub status_code: u16,
    pub errors: BTreeMap<String, Vec<String>>,
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let timestamp = Utc::now();

        match self {
            AppError::FormValidation(errors) => {
                tracing::warn!(
                    status = %status,
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "Request body rejected"
                );
                let body = FormValidationErrorResponse {
                    status_code: status.as_u16(),
                    errors: errors.into_inner(),
                    timestamp,
                };
                (status, Json(body)).into_response()
            }
            other => {
                let message = match &other {
                    AppError::Store(e) => {
                        tracing::error!(error = ?e, "Store failure");
                        "Internal server error".to_string()
                    }
                    AppError::Server(msg) => {
                        tracing::error!(message = %msg, "Server error");
                        msg.clone()
                    }
                    client => {
                        tracing::warn!(status = %status, message = %client, "Request error");
                        client.to_string()
                    }
                };
                let body = ApiErrorResponse {
                    status_code: status.as_u16(),
                    message,
                    timestamp,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
