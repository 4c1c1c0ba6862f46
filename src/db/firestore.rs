// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Database settings (looked up by their `id` field; the document ID
//!   mirrors it)
//! - Strava tokens (one document per OAuth client ID)

use crate::db::{collections, ConfigStore, TokenStore};
use crate::error::AppError;
use crate::models::{DatabaseSettings, StravaTokens};
use async_trait::async_trait;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Database Settings Operations ────────────────────────────

    /// Query `table` for documents whose `id` field matches.
    pub async fn query_database_settings(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Vec<DatabaseSettings>, AppError> {
        let id = id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(table)
            .filter(move |q| q.field("id").eq(id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a settings document (used to provision environments).
    pub async fn put_database_settings(&self, settings: &DatabaseSettings) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::DATABASE_SETTINGS)
            .document_id(&settings.id)
            .object(settings)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Token Operations ────────────────────────────────────────

    /// Get the stored Strava tokens for an OAuth client.
    pub async fn get_tokens(&self, client_id: &str) -> Result<Option<StravaTokens>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STRAVA_TOKENS)
            .obj()
            .one(client_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the latest Strava tokens for an OAuth client.
    pub async fn set_tokens(&self, client_id: &str, tokens: &StravaTokens) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::STRAVA_TOKENS)
            .document_id(client_id)
            .object(tokens)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FirestoreDb {
    async fn lookup(&self, table: &str, id: &str) -> Result<Vec<DatabaseSettings>, AppError> {
        self.query_database_settings(table, id).await
    }
}

#[async_trait]
impl TokenStore for FirestoreDb {
    async fn get_strava_tokens(&self, client_id: &str) -> Result<Option<StravaTokens>, AppError> {
        self.get_tokens(client_id).await
    }

    async fn set_strava_tokens(
        &self,
        client_id: &str,
        tokens: &StravaTokens,
    ) -> Result<(), AppError> {
        self.set_tokens(client_id, tokens).await
    }
}
