// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer.
//!
//! - Firestore holds the configuration store (`database_settings`) and the
//!   rotating Strava tokens (`strava_tokens`).
//! - MySQL holds the `activity` and `gear` tables.

pub mod firestore;
pub mod mysql;

pub use firestore::FirestoreDb;
pub use mysql::{MySqlConnector, MySqlGearDb};

use crate::error::AppError;
use crate::models::{ActivityGear, ActivityId, DatabaseSettings, GearRecord, StravaTokens};
use async_trait::async_trait;

/// Configuration store collection names.
pub mod collections {
    pub const DATABASE_SETTINGS: &str = "database_settings";
    pub const STRAVA_TOKENS: &str = "strava_tokens";
}

/// Relational table names.
pub mod tables {
    pub const ACTIVITY: &str = "activity";
    pub const GEAR: &str = "gear";
}

/// Key-value store holding connection settings.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// All entries of `table` whose `id` equals `id`.
    ///
    /// Empty means not found; callers treat the first entry as authoritative.
    async fn lookup(&self, table: &str, id: &str) -> Result<Vec<DatabaseSettings>, AppError>;
}

/// Shared home of the Strava token pair, keyed by OAuth client ID.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get_strava_tokens(&self, client_id: &str) -> Result<Option<StravaTokens>, AppError>;

    async fn set_strava_tokens(&self, client_id: &str, tokens: &StravaTokens)
        -> Result<(), AppError>;
}

/// Opens one database connection per invocation.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: &DatabaseSettings)
        -> Result<Box<dyn GearDatabase>, AppError>;
}

/// An open connection to the activity/gear database.
///
/// Each statement commits on its own; there are no multi-statement
/// transactions.
#[async_trait]
pub trait GearDatabase: Send {
    /// Activity rows with this ID, newest first.
    async fn activity_gear(
        &mut self,
        activity_id: Option<&ActivityId>,
    ) -> Result<Vec<ActivityGear>, AppError>;

    /// IDs of gear rows with this ID (zero or one); only existence matters.
    async fn find_gear(&mut self, gear_id: &str) -> Result<Vec<String>, AppError>;

    async fn insert_gear(&mut self, gear: &GearRecord) -> Result<(), AppError>;

    /// Overwrite every column of the row keyed by `gear.id`.
    async fn update_gear(&mut self, gear: &GearRecord) -> Result<(), AppError>;

    /// Close the connection gracefully.
    async fn close(self: Box<Self>) -> Result<(), AppError>;
}
