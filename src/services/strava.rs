// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for fetching gear details.
//!
//! Handles:
//! - Gear fetching by ID
//! - Token refresh when expired, with the rotated pair persisted for other
//!   instances
//! - Rate limit detection (for Cloud Tasks retry)

use crate::db::TokenStore;
use crate::error::AppError;
use crate::models::StravaTokens;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: STRAVA_API_BASE.to_string(),
            token_url: STRAVA_TOKEN_URL.to_string(),
            client_id,
            client_secret,
        }
    }

    /// OAuth client ID (also the key of the stored token document).
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Point the client at a different API and token endpoint (local stubs).
    pub fn with_endpoints(mut self, base_url: &str, token_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.token_url = token_url.to_string();
        self
    }

    /// Get gear details by ID.
    ///
    /// A body that is not valid gear JSON, including one with a missing
    /// field, is a lookup failure rather than an API failure.
    pub async fn get_gear(&self, access_token: &str, gear_id: &str) -> Result<StravaGear, AppError> {
        let url = format!("{}/gear/{}", self.base_url, gear_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        let body = self
            .check_response(response)
            .await?
            .text()
            .await
            .map_err(|e| AppError::StravaApi(format!("Failed to read gear response: {}", e)))?;

        parse_gear(&body)
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        // Rate limit - should trigger Cloud Tasks retry
        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
            return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
        }

        // Unauthorized - token may be expired
        if status.as_u16() == 401 {
            return Err(AppError::StravaApi(
                AppError::STRAVA_TOKEN_ERROR.to_string(),
            ));
        }

        Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)))
    }
}

/// Parse a `GET /gear/{id}` body.
pub fn parse_gear(body: &str) -> Result<StravaGear, AppError> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Lookup(format!("Malformed Strava gear response: {}", e)))
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Detailed Strava gear response.
///
/// Every mapped field has to be present in the body; nullable ones may be
/// `null`. Other keys (including `id`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaGear {
    pub primary: bool,
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub nickname: Option<String>,
    pub resource_state: i32,
    pub retired: bool,
    pub distance: f64,
    pub converted_distance: f64,
    #[serde(deserialize_with = "nullable")]
    pub brand_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub model_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub description: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub notification_distance: Option<f64>,
}

/// Accept `null` but, unlike a plain `Option`, reject a missing key.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Remote source of gear details.
#[async_trait]
pub trait GearSource: Send + Sync {
    /// Fetch gear details by Strava gear ID.
    async fn fetch_gear(&self, gear_id: &str) -> Result<StravaGear, AppError>;
}

/// Cached access token with expiry information.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Token state shared by clones of one service.
struct TokenState {
    cached: Option<CachedToken>,
    /// Latest refresh token known to this process; seeded from the
    /// environment and replaced by whatever the token store holds.
    refresh_token: String,
    /// Access token Strava answered 401 to; never adopted from the store again.
    rejected: Option<String>,
}

/// True if a token expiring at `expires_at` is outside the refresh margin.
fn is_fresh(expires_at: DateTime<Utc>) -> bool {
    Utc::now() + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < expires_at
}

/// Take over a stored token pair, returning its access token if still usable.
fn adopt_stored(tokens: &mut TokenState, stored: StravaTokens) -> Option<String> {
    let expires_at = stored
        .expires_at()
        .filter(|t| is_fresh(*t))
        .filter(|_| tokens.rejected.as_ref() != Some(&stored.access_token));
    tokens.refresh_token = stored.refresh_token;
    let expires_at = expires_at?;
    tokens.cached = Some(CachedToken {
        access_token: stored.access_token.clone(),
        expires_at,
    });
    Some(stored.access_token)
}

/// High-level Strava service that manages the access token lifecycle.
///
/// Only one athlete is served, so a single mutex both guards the cache and
/// serializes refresh calls within this process. Across instances the token
/// store is authoritative: it is read before every refresh and written after.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    store: Arc<dyn TokenStore>,
    tokens: Arc<Mutex<TokenState>>,
}

impl StravaService {
    pub fn new(
        client_id: String,
        client_secret: String,
        refresh_token: String,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self::with_client(
            StravaClient::new(client_id, client_secret),
            refresh_token,
            store,
        )
    }

    /// Create a service around an existing client.
    pub fn with_client(
        client: StravaClient,
        refresh_token: String,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            client,
            store,
            tokens: Arc::new(Mutex::new(TokenState {
                cached: None,
                refresh_token,
                rejected: None,
            })),
        }
    }

    /// Get a valid (non-expired) access token, refreshing when needed.
    pub async fn get_valid_access_token(&self) -> Result<String, AppError> {
        let mut tokens = self.tokens.lock().await;

        if let Some(cached) = &tokens.cached {
            if is_fresh(cached.expires_at) {
                return Ok(cached.access_token.clone());
            }
        }

        // Another instance may have refreshed since we last looked.
        let client_id = self.client.client_id();
        if let Some(stored) = self.store.get_strava_tokens(client_id).await? {
            if let Some(access_token) = adopt_stored(&mut tokens, stored) {
                tracing::debug!("Using stored Strava access token");
                return Ok(access_token);
            }
        }

        tracing::info!("Refreshing Strava access token");
        let used = tokens.refresh_token.clone();
        let refreshed = match self.client.refresh_token(&used).await {
            Ok(t) => t,
            Err(e) => {
                // Lost a refresh race: the winner's pair is already stored.
                if let Some(stored) = self.store.get_strava_tokens(client_id).await? {
                    if stored.refresh_token != used {
                        tracing::info!("Refresh token rotated by another instance, using stored tokens");
                        if let Some(access_token) = adopt_stored(&mut tokens, stored) {
                            return Ok(access_token);
                        }
                    }
                }
                return Err(e);
            }
        };

        let expires_at = DateTime::from_timestamp(refreshed.expires_at, 0).unwrap_or_default();
        tokens.refresh_token = refreshed.refresh_token.clone();
        tokens.rejected = None;
        tokens.cached = Some(CachedToken {
            access_token: refreshed.access_token.clone(),
            expires_at,
        });

        let stored = StravaTokens::new(
            refreshed.access_token.clone(),
            refreshed.refresh_token,
            expires_at,
        );
        if let Err(e) = self.store.set_strava_tokens(client_id, &stored).await {
            tracing::error!(error = %e, "Failed to persist rotated Strava tokens");
        }

        tracing::info!(expires_at = %expires_at, "Strava access token refreshed");
        Ok(refreshed.access_token)
    }

    /// Drop the cached access token so the next call refreshes it.
    pub async fn invalidate_access_token(&self) {
        let mut tokens = self.tokens.lock().await;
        tokens.rejected = tokens.cached.take().map(|c| c.access_token);
    }

    /// True if an access token is cached (expired or not).
    pub async fn has_cached_token(&self) -> bool {
        self.tokens.lock().await.cached.is_some()
    }
}

#[async_trait]
impl GearSource for StravaService {
    async fn fetch_gear(&self, gear_id: &str) -> Result<StravaGear, AppError> {
        let access_token = self.get_valid_access_token().await?;

        match self.client.get_gear(&access_token, gear_id).await {
            Err(e) if e.is_strava_token_error() => {
                tracing::warn!(gear_id, "Strava rejected access token, dropping cache");
                self.invalidate_access_token().await;
                Err(e)
            }
            other => other,
        }
    }
}
