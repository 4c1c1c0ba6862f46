// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod gear_sync;
pub mod strava;

pub use gear_sync::{GearSync, SyncOutcome};
pub use strava::{GearSource, StravaService};
