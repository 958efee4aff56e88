use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;
use crate::validation::FieldError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str, String),
    BadRequest(&'static str, String),
    Validation(Vec<FieldError>),
    NotFound(&'static str, String),
    Conflict(&'static str, String),
    TooManyRequests,
    Internal(String),
}

impl ApiError {
    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("INVALID_CREDENTIALS", "Invalid email or password".into())
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("UNAUTHORIZED", "Admin session required".into())
    }

    pub fn appointment_not_found() -> Self {
        ApiError::NotFound("NOT_FOUND", "Appointment not found".into())
    }

    pub fn missing_id() -> Self {
        ApiError::BadRequest("VALIDATION_ERROR", "Appointment ID is required".into())
    }

    fn to_error_response(
        code: &str,
        message: &str,
        fields: Option<Vec<FieldError>>,
    ) -> Json<ErrorResponse> {
        Json(ErrorResponse {
            error: ErrorObject {
                code: code.to_string(),
                message: message.to_string(),
                fields,
            },
        })
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest("INVALID_BODY", e.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(format!("store error: {e}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(code, msg) => (
                StatusCode::UNAUTHORIZED,
                ApiError::to_error_response(code, &msg, None),
            )
                .into_response(),
            ApiError::BadRequest(code, msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::to_error_response(code, &msg, None),
            )
                .into_response(),
            ApiError::Validation(fields) => {
                let msg = fields
                    .first()
                    .map(|f| f.message.clone())
                    .unwrap_or_else(|| "Invalid input".to_string());
                (
                    StatusCode::BAD_REQUEST,
                    ApiError::to_error_response("VALIDATION_ERROR", &msg, Some(fields)),
                )
                    .into_response()
            }
            ApiError::NotFound(code, msg) => (
                StatusCode::NOT_FOUND,
                ApiError::to_error_response(code, &msg, None),
            )
                .into_response(),
            ApiError::Conflict(code, msg) => (
                StatusCode::CONFLICT,
                ApiError::to_error_response(code, &msg, None),
            )
                .into_response(),
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                ApiError::to_error_response(
                    "RATE_LIMITED",
                    "Too many requests. Please try again later.",
                    None,
                ),
            )
                .into_response(),
            // Details stay in the log, never in the body.
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::to_error_response("INTERNAL", "Something went wrong", None),
                )
                    .into_response()
            }
        }
    }
}
