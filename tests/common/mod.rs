// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory stand-ins for the configuration store, the token store, the
//! database and Strava.

use async_trait::async_trait;
use gear_sync::config::Config;
use gear_sync::db::{ConfigStore, Connector, GearDatabase, TokenStore};
use gear_sync::error::AppError;
use gear_sync::models::{ActivityGear, ActivityId, DatabaseSettings, GearRecord, StravaTokens};
use gear_sync::routes::create_router;
use gear_sync::services::strava::{parse_gear, StravaGear};
use gear_sync::services::{GearSource, GearSync};
use gear_sync::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const DATABASE_ID: &str = "test-db";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// MySQL URL for database-backed tests, if one is configured.
#[allow(dead_code)]
pub fn mysql_url() -> Option<String> {
    std::env::var("TEST_MYSQL_URL").ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Bind the test MySQL URL or skip the test.
#[macro_export]
macro_rules! require_mysql {
    () => {
        match crate::common::mysql_url() {
            Some(url) => url,
            None => {
                eprintln!("⚠️  Skipping: TEST_MYSQL_URL not set");
                return;
            }
        }
    };
}

/// Settings entry matching `DATABASE_ID`.
#[allow(dead_code)]
pub fn test_settings() -> DatabaseSettings {
    DatabaseSettings {
        id: DATABASE_ID.to_string(),
        host: "db.test".to_string(),
        user: "strava".to_string(),
        password: "secret".to_string(),
        port: 3306,
        database: Some("strava".to_string()),
    }
}

/// Strava gear body as returned by `GET /gear/{id}`.
#[allow(dead_code)]
pub fn gear_json(id: &str, name: &str, distance: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "primary": true,
        "name": name,
        "nickname": null,
        "resource_state": 3,
        "retired": false,
        "distance": distance,
        "converted_distance": distance / 1000.0,
        "brand_name": "Hoka",
        "model_name": "Clifton 9",
        "description": "Long run shoes",
        "notification_distance": 500.0
    })
}

#[allow(dead_code)]
pub fn strava_gear(id: &str, name: &str, distance: f64) -> StravaGear {
    parse_gear(&gear_json(id, name, distance).to_string()).expect("valid gear json")
}

// ─── Configuration store ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryConfigStore {
    entries: Vec<DatabaseSettings>,
    pub lookups: Mutex<Vec<(String, String)>>,
}

impl MemoryConfigStore {
    #[allow(dead_code)]
    pub fn with(entries: Vec<DatabaseSettings>) -> Self {
        Self {
            entries,
            lookups: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn lookup(&self, table: &str, id: &str) -> Result<Vec<DatabaseSettings>, AppError> {
        self.lookups
            .lock()
            .unwrap()
            .push((table.to_string(), id.to_string()));
        Ok(self.entries.iter().filter(|s| s.id == id).cloned().collect())
    }
}

// ─── Token store ─────────────────────────────────────────────────────────────

/// Token documents keyed by client ID, shared like Firestore between services.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryTokenStore {
    pub tokens: Mutex<HashMap<String, StravaTokens>>,
    /// Served by the next read instead of the real document, then cleared.
    pub stale_read: Mutex<Option<StravaTokens>>,
    pub writes: Mutex<usize>,
}

impl MemoryTokenStore {
    #[allow(dead_code)]
    pub fn with(client_id: &str, tokens: StravaTokens) -> Self {
        let store = Self::default();
        store
            .tokens
            .lock()
            .unwrap()
            .insert(client_id.to_string(), tokens);
        store
    }

    #[allow(dead_code)]
    pub fn get(&self, client_id: &str) -> Option<StravaTokens> {
        self.tokens.lock().unwrap().get(client_id).cloned()
    }

    #[allow(dead_code)]
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get_strava_tokens(&self, client_id: &str) -> Result<Option<StravaTokens>, AppError> {
        if let Some(stale) = self.stale_read.lock().unwrap().take() {
            return Ok(Some(stale));
        }
        Ok(self.get(client_id))
    }

    async fn set_strava_tokens(
        &self,
        client_id: &str,
        tokens: &StravaTokens,
    ) -> Result<(), AppError> {
        *self.writes.lock().unwrap() += 1;
        self.tokens
            .lock()
            .unwrap()
            .insert(client_id.to_string(), tokens.clone());
        Ok(())
    }
}

// ─── Database ────────────────────────────────────────────────────────────────

/// Tables and call log shared by every connection from one connector.
#[derive(Default)]
pub struct DbState {
    pub activities: HashMap<i64, Option<String>>,
    pub gear: HashMap<String, GearRecord>,
    pub inserts: Vec<GearRecord>,
    pub updates: Vec<GearRecord>,
    pub connects: usize,
    pub closes: usize,
}

#[derive(Clone, Default)]
pub struct MemoryConnector {
    pub state: Arc<Mutex<DbState>>,
    pub refuse: bool,
}

impl MemoryConnector {
    #[allow(dead_code)]
    pub fn with_activity(self, id: i64, gear_id: Option<&str>) -> Self {
        self.state
            .lock()
            .unwrap()
            .activities
            .insert(id, gear_id.map(str::to_string));
        self
    }

    #[allow(dead_code)]
    pub fn with_gear(self, gear: GearRecord) -> Self {
        self.state.lock().unwrap().gear.insert(gear.id.clone(), gear);
        self
    }

    #[allow(dead_code)]
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        _settings: &DatabaseSettings,
    ) -> Result<Box<dyn GearDatabase>, AppError> {
        if self.refuse {
            return Err(AppError::Connection("connection refused".to_string()));
        }
        self.state.lock().unwrap().connects += 1;
        Ok(Box::new(MemoryDb {
            state: self.state.clone(),
        }))
    }
}

struct MemoryDb {
    state: Arc<Mutex<DbState>>,
}

#[async_trait]
impl GearDatabase for MemoryDb {
    async fn activity_gear(
        &mut self,
        activity_id: Option<&ActivityId>,
    ) -> Result<Vec<ActivityGear>, AppError> {
        let id = match activity_id {
            Some(ActivityId::Number(n)) => *n,
            Some(ActivityId::Text(s)) => match s.parse() {
                Ok(n) => n,
                Err(_) => return Ok(Vec::new()),
            },
            None => return Ok(Vec::new()),
        };
        let state = self.state.lock().unwrap();
        Ok(state
            .activities
            .get(&id)
            .map(|gear_id| ActivityGear {
                id,
                gear_id: gear_id.clone(),
            })
            .into_iter()
            .collect())
    }

    async fn find_gear(&mut self, gear_id: &str) -> Result<Vec<String>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.gear.keys().filter(|id| *id == gear_id).cloned().collect())
    }

    async fn insert_gear(&mut self, gear: &GearRecord) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        if state.gear.contains_key(&gear.id) {
            return Err(AppError::Database(format!("Duplicate entry '{}'", gear.id)));
        }
        state.gear.insert(gear.id.clone(), gear.clone());
        state.inserts.push(gear.clone());
        Ok(())
    }

    async fn update_gear(&mut self, gear: &GearRecord) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(row) = state.gear.get_mut(&gear.id) {
            *row = gear.clone();
        }
        state.updates.push(gear.clone());
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), AppError> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

// ─── Strava ──────────────────────────────────────────────────────────────────

/// Gear source answering from a fixed body, counting calls.
#[derive(Default)]
pub struct StubGearSource {
    bodies: Mutex<HashMap<String, String>>,
    pub calls: Mutex<Vec<String>>,
    pub error: Option<String>,
}

impl StubGearSource {
    #[allow(dead_code)]
    pub fn with_gear(self, id: &str, body: serde_json::Value) -> Self {
        self.bodies
            .lock()
            .unwrap()
            .insert(id.to_string(), body.to_string());
        self
    }

    #[allow(dead_code)]
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GearSource for StubGearSource {
    async fn fetch_gear(&self, gear_id: &str) -> Result<StravaGear, AppError> {
        self.calls.lock().unwrap().push(gear_id.to_string());
        if let Some(message) = &self.error {
            return Err(AppError::StravaApi(message.clone()));
        }
        let body = self
            .bodies
            .lock()
            .unwrap()
            .get(gear_id)
            .cloned()
            .ok_or_else(|| AppError::StravaApi("HTTP 404 Not Found: Record Not Found".to_string()))?;
        parse_gear(&body)
    }
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

/// Fakes behind one `GearSync`, kept so tests can inspect them.
pub struct Harness {
    pub store: Arc<MemoryConfigStore>,
    pub connector: MemoryConnector,
    pub strava: Arc<StubGearSource>,
    pub sync: GearSync,
}

impl Harness {
    #[allow(dead_code)]
    pub fn new(connector: MemoryConnector, strava: StubGearSource) -> Self {
        Self::build(
            MemoryConfigStore::with(vec![test_settings()]),
            connector,
            strava,
            Some(DATABASE_ID.to_string()),
        )
    }

    pub fn build(
        store: MemoryConfigStore,
        connector: MemoryConnector,
        strava: StubGearSource,
        database_id: Option<String>,
    ) -> Self {
        let store = Arc::new(store);
        let strava = Arc::new(strava);
        let sync = GearSync::new(
            store.clone(),
            Arc::new(connector.clone()),
            strava.clone(),
            database_id,
        );
        Self {
            store,
            connector,
            strava,
            sync,
        }
    }

    #[allow(dead_code)]
    pub fn db(&self) -> std::sync::MutexGuard<'_, DbState> {
        self.connector.state.lock().unwrap()
    }
}

/// Create a test app around a harness.
/// Returns the router and the harness for inspection.
#[allow(dead_code)]
pub fn create_test_app(harness: Harness) -> (axum::Router, Harness) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        gear_sync: harness.sync.clone(),
    });

    (create_router(state), harness)
}
