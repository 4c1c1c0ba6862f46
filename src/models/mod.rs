// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod event;
pub mod gear;
pub mod settings;
pub mod tokens;

pub use activity::ActivityGear;
pub use event::{ActivityId, GearSyncEvent};
pub use gear::GearRecord;
pub use settings::DatabaseSettings;
pub use tokens::StravaTokens;
