// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gear-Sync: mirror Strava gear details into the activity database
//!
//! Each task delivery names one activity; the gear recorded with that
//! activity is fetched from Strava and upserted into the `gear` table.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::GearSync;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gear_sync: GearSync,
}
