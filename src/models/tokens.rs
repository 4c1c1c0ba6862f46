// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth tokens shared by every instance through the configuration store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latest token pair issued by Strava.
///
/// Strava revokes a refresh token once it hands out its successor, so this
/// document, not `STRAVA_REFRESH_TOKEN`, is the source of truth after the
/// first refresh.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StravaTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry (RFC 3339)
    pub expires_at: String,
    /// When this pair was written (RFC 3339)
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl StravaTokens {
    pub fn new(access_token: String, refresh_token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: expires_at.to_rfc3339(),
            updated_at: Some(Utc::now().to_rfc3339()),
        }
    }

    /// Parsed access token expiry; `None` if the stored value is unreadable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl fmt::Debug for StravaTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StravaTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
