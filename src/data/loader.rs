//! Indicator loader
//!
//! Fetches the three CSSE global time-series CSVs and parses them into
//! wide-format tables. Where the CSV text comes from is abstracted behind
//! [`IndicatorSource`] so the same parsing runs against GitHub, a local
//! checkout of the dataset, or in-memory fixtures.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{DataError, DataResult};
use super::types::{IndicatorKind, RawIndicatorTable, RawRow};

/// Directory holding the CSSE global time series on the `master` branch
pub const DEFAULT_BASE_URL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/";

pub const PROVINCE_COLUMN: &str = "Province/State";
pub const COUNTRY_COLUMN: &str = "Country/Region";
const LAT_COLUMN: &str = "Lat";
const LONG_COLUMN: &str = "Long";

/// File name of the global table for a kind
pub fn csv_file_name(kind: IndicatorKind) -> String {
    format!("time_series_covid19_{}_global.csv", kind)
}

/// Where indicator CSV text comes from
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Human-readable location of a kind's table, for logging
    fn location(&self, kind: IndicatorKind) -> String;

    /// Fetch the raw CSV text for a kind
    async fn fetch_csv(&self, kind: IndicatorKind) -> DataResult<String>;
}

/// Fetches tables over HTTPS
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DataResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl IndicatorSource for HttpSource {
    fn location(&self, kind: IndicatorKind) -> String {
        format!("{}{}", self.base_url, csv_file_name(kind))
    }

    async fn fetch_csv(&self, kind: IndicatorKind) -> DataResult<String> {
        let url = self.location(kind);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Reads tables from a local copy of the time-series directory
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl IndicatorSource for DirectorySource {
    fn location(&self, kind: IndicatorKind) -> String {
        self.dir.join(csv_file_name(kind)).display().to_string()
    }

    async fn fetch_csv(&self, kind: IndicatorKind) -> DataResult<String> {
        let path = self.dir.join(csv_file_name(kind));
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Serves tables held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<IndicatorKind, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: register CSV text for a kind
    pub fn with_table(mut self, kind: IndicatorKind, csv: impl Into<String>) -> Self {
        self.tables.insert(kind, csv.into());
        self
    }
}

#[async_trait]
impl IndicatorSource for MemorySource {
    fn location(&self, kind: IndicatorKind) -> String {
        format!("memory:{}", kind)
    }

    async fn fetch_csv(&self, kind: IndicatorKind) -> DataResult<String> {
        self.tables
            .get(&kind)
            .cloned()
            .ok_or(DataError::Missing(kind))
    }
}

/// Fetch and parse every indicator table, one after another
pub async fn load_indicators(source: &dyn IndicatorSource) -> DataResult<Vec<RawIndicatorTable>> {
    let mut tables = Vec::with_capacity(IndicatorKind::ALL.len());

    for kind in IndicatorKind::ALL {
        let location = source.location(kind);
        tracing::info!(kind = %kind, location = %location, "Fetching indicator table");

        let text = source.fetch_csv(kind).await?;
        let table = parse_indicator_csv(kind, &text)?;

        tracing::info!(
            kind = %kind,
            rows = table.rows.len(),
            dates = table.date_headers.len(),
            "Parsed indicator table"
        );
        tables.push(table);
    }

    Ok(tables)
}

/// Parse one wide-format CSSE table
///
/// Every column other than province, country, lat and long is a date
/// column. Empty count cells read as 0.
pub fn parse_indicator_csv(kind: IndicatorKind, text: &str) -> DataResult<RawIndicatorTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DataError::MissingColumn {
                kind,
                column: name.to_string(),
            })
    };

    let province_idx = column(PROVINCE_COLUMN)?;
    let country_idx = column(COUNTRY_COLUMN)?;
    let lat_idx = column(LAT_COLUMN)?;
    let long_idx = column(LONG_COLUMN)?;

    let date_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| ![province_idx, country_idx, lat_idx, long_idx].contains(idx))
        .map(|(idx, h)| (idx, h.trim().to_string()))
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;

        let country = record.get(country_idx).unwrap_or_default().trim().to_string();
        let province = record
            .get(province_idx)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let mut counts = Vec::with_capacity(date_columns.len());
        for (idx, header) in &date_columns {
            let cell = record.get(*idx).unwrap_or_default().trim();
            counts.push(parse_count(cell).ok_or_else(|| DataError::InvalidCount {
                kind,
                country: country.clone(),
                column: header.clone(),
                value: cell.to_string(),
            })?);
        }

        rows.push(RawRow {
            province,
            country,
            counts,
        });
    }

    Ok(RawIndicatorTable {
        kind,
        date_headers: date_columns.into_iter().map(|(_, h)| h).collect(),
        rows,
    })
}

fn parse_count(cell: &str) -> Option<u64> {
    if cell.is_empty() {
        return Some(0);
    }
    if let Ok(n) = cell.parse::<u64>() {
        return Some(n);
    }

    // Some revisions of the dataset carry counts as "12.0"
    match cell.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}
