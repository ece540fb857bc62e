//! Snapshot Routes
//!
//! - GET /api/v1/snapshot - Latest-day deaths per country, largest first

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{SnapshotParams, SnapshotResponse};
use crate::api::state::AppState;

/// GET /api/v1/snapshot?limit=10
pub async fn latest_snapshot(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SnapshotParams>,
) -> Json<SnapshotResponse> {
    let snapshot = state.dashboard.snapshot();

    let rows = match params.limit {
        Some(limit) => snapshot.top(limit).to_vec(),
        None => snapshot.rows.clone(),
    };

    Json(SnapshotResponse {
        kind: snapshot.kind.to_string(),
        date: snapshot.date,
        total: snapshot.rows.len(),
        rows,
    })
}
