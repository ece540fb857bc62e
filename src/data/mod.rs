//! Indicator Data
//!
//! Loading and reshaping of the CSSE COVID-19 global time series.
//!
//! ```text
//!   IndicatorSource ─fetch─▶ RawIndicatorTable (wide, per kind)
//!                              │
//!                           reshape (sum provinces, melt, parse dates)
//!                              ▼
//!                         ObservationTable (country, kind, date) → value
//! ```

pub mod error;
pub mod loader;
pub mod reshape;
pub mod types;

pub use error::{DataError, DataResult};
pub use loader::{
    csv_file_name, load_indicators, parse_indicator_csv, DirectorySource, HttpSource,
    IndicatorSource, MemorySource, DEFAULT_BASE_URL,
};
pub use reshape::{parse_date_header, reshape, DATE_HEADER_FORMAT};
pub use types::{IndicatorKind, Observation, ObservationTable, RawIndicatorTable, RawRow};
