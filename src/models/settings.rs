// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Database connection settings stored in the configuration store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entry of the `database_settings` collection.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Key referenced by `DATABASE_ID`
    pub id: String,
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    /// Default schema; when absent the server default for `user` applies
    #[serde(default)]
    pub database: Option<String>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}
