// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Every variant aborts the invocation; the task platform decides whether to
/// redeliver.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("No database settings found for id {0}")]
    ConfigNotFound(String),

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when Strava answers with HTTP 429.
    pub const STRAVA_RATE_LIMIT: &'static str = "Rate limit exceeded";
    /// Message used when Strava rejects our credentials.
    pub const STRAVA_TOKEN_ERROR: &'static str = "Invalid or expired token";

    /// True if this is a Strava rate limit response.
    pub fn is_strava_rate_limited(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_RATE_LIMIT)
    }

    /// True if Strava answered HTTP 401 (access token rejected).
    ///
    /// Other failures may mention `invalid` in their body (a 404 for unknown
    /// gear does), so only the status-derived message counts.
    pub fn is_strava_token_error(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_TOKEN_ERROR)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Every failure is a 500 so the task queue redelivers the event.
        let (error, details) = match &self {
            AppError::Configuration(msg) => ("configuration_error", Some(msg.clone())),
            AppError::ConfigNotFound(id) => ("config_not_found", Some(id.clone())),
            AppError::Connection(_) => ("connection_error", None),
            AppError::Lookup(msg) => ("lookup_error", Some(msg.clone())),
            AppError::StravaApi(msg) => ("strava_error", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
