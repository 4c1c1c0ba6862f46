// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gear model for the relational `gear` table.

use crate::services::strava::StravaGear;
use serde::Serialize;
use sqlx::FromRow;

/// Stored gear record, one row per Strava gear ID.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GearRecord {
    /// Strava gear ID (primary key)
    pub id: String,
    /// Athlete's default gear for the sport
    pub is_primary: bool,
    pub name: String,
    pub nickname: Option<String>,
    /// Strava detail level (3 = detailed)
    pub resource_state: i32,
    pub is_retired: bool,
    /// Distance in meters
    pub distance: f64,
    /// Distance in the athlete's preferred unit
    pub converted_distance: f64,
    pub brand_name: Option<String>,
    pub model_name: Option<String>,
    pub description: Option<String>,
    /// Reminder threshold configured on Strava
    pub notification_distance: Option<f64>,
}

impl GearRecord {
    /// Map a Strava gear response onto the table layout, field for field.
    pub fn from_strava(id: &str, gear: StravaGear) -> Self {
        Self {
            id: id.to_string(),
            is_primary: gear.primary,
            name: gear.name,
            nickname: gear.nickname,
            resource_state: gear.resource_state,
            is_retired: gear.retired,
            distance: gear.distance,
            converted_distance: gear.converted_distance,
            brand_name: gear.brand_name,
            model_name: gear.model_name,
            description: gear.description,
            notification_distance: gear.notification_distance,
        }
    }
}
