// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task handler routes for Cloud Tasks callbacks.
//!
//! These endpoints are called by Cloud Tasks, not directly by users.
//! A non-2xx response makes the queue redeliver the task.

use crate::context::InvocationContext;
use crate::error::AppError;
use crate::middleware::require_task_queue;
use crate::models::GearSyncEvent;
use crate::services::SyncOutcome;
use crate::AppState;
use axum::{
    extract::{Extension, Json, State},
    middleware,
    routing::post,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Task handler routes (called by Cloud Tasks).
pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks/sync-gear", post(sync_gear))
        .route_layer(middleware::from_fn_with_state(state, require_task_queue))
}

/// Successful sync response.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub correlation_id: Uuid,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

/// Sync the gear of one activity (called by Cloud Tasks).
async fn sync_gear(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<InvocationContext>,
    Json(event): Json<GearSyncEvent>,
) -> Result<Json<SyncResponse>, AppError> {
    match state.gear_sync.handle(&ctx, &event).await {
        Ok(outcome) => Ok(Json(SyncResponse {
            correlation_id: ctx.correlation_id(),
            outcome,
        })),
        Err(e) => {
            ctx.span().in_scope(|| {
                tracing::error!(
                    activity_id = ?event.activity_id,
                    error = %e,
                    rate_limited = e.is_strava_rate_limited(),
                    "Failed to sync gear"
                );
            });
            // Return 500 to trigger Cloud Tasks retry
            Err(e)
        }
    }
}
