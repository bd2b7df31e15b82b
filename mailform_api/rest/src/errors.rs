use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use mailform_models::contact::ValidationErrors;
use serde::Serialize;

use crate::middlewares::request_id::RequestId;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const VALIDATION_FAILED: &str = "Validation failed";
pub const RATE_LIMIT_EXCEEDED: &str = "Too many requests, please try again later.";
pub const EMAIL_NOT_CONFIGURED: &str = "Email service is not configured";
pub const EMAIL_UNAVAILABLE: &str = "Email service is temporarily unavailable";
pub const NOTIFICATION_FAILED: &str = "Failed to send your message. Please try again later.";
pub const AUTO_REPLY_FAILED: &str =
    "Your message was sent, but the confirmation email could not be delivered.";
pub const TEST_EMAIL_FAILED: &str = "Failed to send test email";

pub fn internal_server_error(request_id: RequestId, err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!(%request_id, "internal server error: {err:#}");
    failure(request_id, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

/// Failure response with a fixed message, the current time and the id of the
/// failed request, so a report can be matched with the server logs.
pub fn failure(request_id: RequestId, code: StatusCode, error: &'static str) -> Response {
    let body = ApiFailure {
        success: false,
        error,
        timestamp: Some(Utc::now()),
        request_id: Some(request_id.to_string()),
    };
    (code, Json(body)).into_response()
}

pub fn not_found() -> Response {
    let body = ApiFailure {
        success: false,
        error: ROUTE_NOT_FOUND,
        timestamp: None,
        request_id: None,
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

pub fn validation_failed(errors: ValidationErrors) -> Response {
    let body = ApiValidationFailure {
        success: false,
        error: VALIDATION_FAILED,
        errors,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

pub fn rate_limited(reset_at: DateTime<Utc>) -> Response {
    let retry_after = retry_after_secs(reset_at, Utc::now());
    let body = ApiRateLimited {
        success: false,
        error: RATE_LIMIT_EXCEEDED,
        status: "rate_limit_exceeded",
        retry_after,
    };
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(RETRY_AFTER, retry_after.to_string())],
        Json(body),
    )
        .into_response()
}

/// Whole seconds until `reset_at`, rounded up and at least one.
fn retry_after_secs(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (reset_at - now).num_milliseconds();
    ((millis + 999) / 1000).max(1)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFailure {
    pub success: bool,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Serialize)]
pub struct ApiValidationFailure {
    pub success: bool,
    pub error: &'static str,
    pub errors: ValidationErrors,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRateLimited {
    pub success: bool,
    pub error: &'static str,
    pub status: &'static str,
    pub retry_after: i64,
}
