// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Incoming task payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload delivered once per completed activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GearSyncEvent {
    /// Not validated: a missing ID simply matches no activity row.
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
}

/// Activity identifier as sent by the producer, either a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityId::Number(n) => write!(f, "{}", n),
            ActivityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ActivityId {
    fn from(id: i64) -> Self {
        ActivityId::Number(id)
    }
}
