// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity row projection.

use sqlx::FromRow;

/// The slice of an `activity` row this service reads.
///
/// Columns are read by name; the rest of the row is never selected.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ActivityGear {
    /// Strava activity ID
    pub id: i64,
    /// Strava gear ID, NULL when no gear was recorded with the activity
    pub gear_id: Option<String>,
}
