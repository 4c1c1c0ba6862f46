// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gear-Sync API Server
//!
//! Receives one Cloud Tasks delivery per finished activity and mirrors the
//! activity's Strava gear into the `gear` table.

use gear_sync::{
    config::Config,
    db::{FirestoreDb, MySqlConnector},
    routes::create_router,
    services::{GearSync, StravaService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Gear-Sync API");

    if config.database_id.is_none() {
        tracing::warn!("DATABASE_ID is not set, every sync will fail until it is");
    }

    // Configuration store holding database settings and the Strava tokens
    let store = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);

    let strava_service = StravaService::new(
        config.strava_client_id.clone(),
        config.strava_client_secret.clone(),
        config.strava_refresh_token.clone(),
        store.clone(),
    );

    let workflow = GearSync::new(
        store,
        Arc::new(MySqlConnector),
        Arc::new(strava_service),
        config.database_id.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        gear_sync: workflow,
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
///
/// `with_current_span` puts the invocation's `correlation_id` on every line.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gear_sync=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
