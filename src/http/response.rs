//! Response handling and transformation.
//!
//! # Responsibilities
//! - Render replies as JSON with their status
//! - Map dispatch and decoding errors to structured error bodies
//!
//! # Design Decisions
//! - Error bodies are `{statusCode, error, message}`; validation errors add
//!   `part` and `violations`
//! - Server faults never expose internals: contract breaches, storage and
//!   handler failures share one generic message

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::app::DispatchError;
use crate::http::request::RequestError;
use crate::routing::Reply;
use crate::schema::{FieldViolation, Part};

/// Message sent for every 5xx.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<FieldViolation>>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
            part: None,
            violations: None,
        }
    }

    fn with_violations(mut self, part: Part, violations: Vec<FieldViolation>) -> Self {
        self.part = Some(part);
        self.violations = Some(violations);
        self
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<DispatchError> for ErrorBody {
    fn from(err: DispatchError) -> Self {
        let status = err.status();
        match err {
            DispatchError::NotFound { .. } => ErrorBody::new(status, err.to_string()),
            DispatchError::Validation { part, violations } => {
                let message = violations
                    .iter()
                    .map(|v| v.describe(part))
                    .collect::<Vec<_>>()
                    .join(", ");
                ErrorBody::new(status, message).with_violations(part, violations)
            }
            DispatchError::ContractBreach { .. }
            | DispatchError::DataAccess { .. }
            | DispatchError::Handler { .. } => ErrorBody::new(status, INTERNAL_ERROR_MESSAGE),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        ErrorBody::from(self).into_response()
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        ErrorBody::new(self.status(), self.to_string()).into_response()
    }
}

/// Render a successful reply.
pub fn reply_response(reply: Reply) -> Response {
    let status = reply.status();
    (status, Json(reply.into_body())).into_response()
}
