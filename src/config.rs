// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Database credentials are not part of this config: they live in the
//! `database_settings` collection and are fetched on every invocation,
//! keyed by `DATABASE_ID`.

use std::env;

/// Header Cloud Tasks sets on every task delivery.
pub const QUEUE_NAME_HEADER: &str = "x-cloudtasks-queuename";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project holding the Firestore configuration store
    pub gcp_project_id: String,
    /// Key of the `database_settings` entry to use.
    ///
    /// Optional at startup so the server can boot and report a
    /// configuration error per invocation.
    pub database_id: Option<String>,
    /// Expected Cloud Tasks queue; when unset the header is not checked.
    pub task_queue_name: Option<String>,

    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Long-lived refresh token for the athlete whose gear we mirror
    pub strava_refresh_token: String,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            database_id: Some("test-db".to_string()),
            task_queue_name: Some("gear-sync".to_string()),
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_refresh_token: "test_refresh".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            database_id: non_empty_var("DATABASE_ID"),
            task_queue_name: non_empty_var("TASK_QUEUE_NAME"),

            strava_client_id: required_var("STRAVA_CLIENT_ID")?,
            strava_client_secret: required_var("STRAVA_CLIENT_SECRET")?,
            strava_refresh_token: required_var("STRAVA_REFRESH_TOKEN")?,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    non_empty_var(name).ok_or(ConfigError::Missing(name))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
