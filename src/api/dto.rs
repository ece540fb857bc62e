//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::snapshot::SnapshotRow;

// ============================================
// HOVER CALLBACK DTOs
// ============================================

/// Plotly `hoverData` as forwarded by the page
///
/// Only the fields the dashboard reads are modelled; anything else in the
/// payload is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct HoverData {
    #[serde(default)]
    pub points: Vec<HoverPoint>,
}

/// One hovered point
#[derive(Debug, Default, Deserialize)]
pub struct HoverPoint {
    /// Country display name (the choropleth's hover name)
    #[serde(default)]
    pub hovertext: Option<String>,
    /// ISO3 code of the hovered location
    #[serde(default)]
    pub location: Option<String>,
}

impl HoverData {
    /// Display name of the first hovered country
    pub fn country(&self) -> Option<&str> {
        self.points
            .first()?
            .hovertext
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

// ============================================
// FIGURE DTOs
// ============================================

/// Query parameters for GET /api/v1/figures/timeseries
#[derive(Debug, Deserialize)]
pub struct TimeSeriesParams {
    pub country: String,
    /// confirmed, deaths or recovered (default deaths)
    #[serde(default)]
    pub kind: Option<String>,
}

// ============================================
// SNAPSHOT DTOs
// ============================================

/// Query parameters for GET /api/v1/snapshot
#[derive(Debug, Deserialize)]
pub struct SnapshotParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Latest-day leaderboard
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub kind: String,
    pub date: Option<NaiveDate>,
    pub total: usize,
    pub rows: Vec<SnapshotRow>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub observations: usize,
    pub latest_date: Option<NaiveDate>,
    pub countries: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
