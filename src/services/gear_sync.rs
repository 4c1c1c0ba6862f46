// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gear sync workflow.
//!
//! Handles one activity event:
//! 1. Resolve database settings from the configuration store
//! 2. Connect to the activity database
//! 3. Look up the gear recorded with the activity
//! 4. Fetch gear details from Strava
//! 5. Insert or update the gear row

use crate::context::InvocationContext;
use crate::db::{collections, ConfigStore, Connector, GearDatabase};
use crate::error::{AppError, Result};
use crate::models::{ActivityId, DatabaseSettings, GearRecord, GearSyncEvent};
use crate::services::GearSource;
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

/// Sequences the configuration store, database and Strava for one event.
#[derive(Clone)]
pub struct GearSync {
    config_store: Arc<dyn ConfigStore>,
    connector: Arc<dyn Connector>,
    gear_source: Arc<dyn GearSource>,
    /// Value of `DATABASE_ID`, checked on every invocation.
    database_id: Option<String>,
}

/// What an invocation did to the `gear` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The activity has no gear; nothing was written.
    NoGear,
    Inserted { gear_id: String, name: String },
    Updated { gear_id: String, name: String },
}

impl GearSync {
    pub fn new(
        config_store: Arc<dyn ConfigStore>,
        connector: Arc<dyn Connector>,
        gear_source: Arc<dyn GearSource>,
        database_id: Option<String>,
    ) -> Self {
        Self {
            config_store,
            connector,
            gear_source,
            database_id,
        }
    }

    /// Handle one event. Every error aborts the invocation.
    pub async fn handle(
        &self,
        ctx: &InvocationContext,
        event: &GearSyncEvent,
    ) -> Result<SyncOutcome> {
        self.run(event.activity_id.as_ref())
            .instrument(ctx.span().clone())
            .await
    }

    async fn run(&self, activity_id: Option<&ActivityId>) -> Result<SyncOutcome> {
        tracing::info!(activity_id = ?activity_id, "Start handling gear for activity");

        let settings = self.resolve_settings().await?;
        let mut db = self.connector.connect(&settings).await?;

        // The connection is closed whether or not the sync succeeded.
        let result = sync_gear(db.as_mut(), self.gear_source.as_ref(), activity_id).await;

        if let Err(e) = db.close().await {
            tracing::warn!(error = %e, "Failed to close database connection");
        }

        result
    }

    /// Fetch connection settings for `DATABASE_ID`.
    async fn resolve_settings(&self) -> Result<DatabaseSettings> {
        let database_id = self
            .database_id
            .as_deref()
            .ok_or_else(|| AppError::Configuration("DATABASE_ID is not set".to_string()))?;

        self.config_store
            .lookup(collections::DATABASE_SETTINGS, database_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ConfigNotFound(database_id.to_string()))
    }
}

async fn sync_gear(
    db: &mut dyn GearDatabase,
    gear_source: &dyn GearSource,
    activity_id: Option<&ActivityId>,
) -> Result<SyncOutcome> {
    let activity = db
        .activity_gear(activity_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            AppError::Lookup(format!(
                "Activity {} not found",
                activity_id.map(ToString::to_string).unwrap_or_default()
            ))
        })?;

    let Some(gear_id) = activity.gear_id else {
        tracing::info!(activity_id = activity.id, "Activity has no gear, nothing to update");
        return Ok(SyncOutcome::NoGear);
    };

    tracing::info!(activity_id = activity.id, gear_id = %gear_id, "Update gear");
    let strava_gear = gear_source.fetch_gear(&gear_id).await?;
    let record = GearRecord::from_strava(&gear_id, strava_gear);
    tracing::info!(gear_id = %gear_id, name = %record.name, "Fetched gear from Strava");

    let existing = db.find_gear(&gear_id).await?;
    if existing.is_empty() {
        db.insert_gear(&record).await?;
        tracing::info!(gear_id = %gear_id, "Inserted gear");
        Ok(SyncOutcome::Inserted {
            gear_id,
            name: record.name,
        })
    } else {
        db.update_gear(&record).await?;
        tracing::info!(gear_id = %gear_id, "Updated gear");
        Ok(SyncOutcome::Updated {
            gear_id,
            name: record.name,
        })
    }
}
