//! # Covidash
//!
//! COVID-19 Europe dashboard: a choropleth of cumulative deaths (log-scaled)
//! next to a per-country time series that follows the mouse over the map.
//!
//! ## Pipeline
//!
//! 1. [`data`]: fetch the CSSE confirmed, deaths and recovered tables and
//!    reshape them into one long table keyed by (country, kind, date)
//! 2. [`snapshot`]: latest-day deaths per country, joined onto the
//!    [`geo`] country table
//! 3. [`charts`]: Plotly figures for the map and the time series
//! 4. [`api`]: page, figure endpoints and the hover callback, built with Axum
//!
//! Steps 1 to 3 run once at startup and produce an immutable [`Dashboard`]
//! shared by every request.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use covidash::api::{serve, AppState};
//! use covidash::{Config, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let dashboard = Dashboard::load(&config).await?;
//!
//!     println!("Latest data: {:?}", dashboard.snapshot().date);
//!
//!     serve(AppState::new(dashboard), &config.server).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod geo;
pub mod snapshot;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use charts::{Figure, MapOptions};

pub use config::{
    Config, ConfigError, DashboardConfig, DataConfig, GeoConfig, LoggingConfig, ServerConfig,
};

pub use dashboard::{Dashboard, LoadError};

pub use data::{
    DataError, DataResult, IndicatorKind, IndicatorSource, Observation, ObservationTable,
};

pub use geo::{CountryFeature, CountryTable, GeoError};

pub use snapshot::{MapRow, MapTable, Snapshot, SnapshotRow};
