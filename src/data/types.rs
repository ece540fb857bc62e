//! Core data types for the indicator pipeline
//!
//! - `IndicatorKind`: which CSSE table a value came from
//! - `RawIndicatorTable`: a wide-format table as fetched
//! - `Observation` / `ObservationTable`: the canonical long-format table

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::error::{DataError, DataResult};

/// Indicator published by the CSSE time series
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    /// Cumulative confirmed cases
    Confirmed,
    /// Cumulative deaths
    Deaths,
    /// Cumulative recovered cases
    Recovered,
}

impl IndicatorKind {
    /// All kinds, in fetch order
    pub const ALL: [IndicatorKind; 3] = [
        IndicatorKind::Confirmed,
        IndicatorKind::Deaths,
        IndicatorKind::Recovered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Confirmed => "confirmed",
            IndicatorKind::Deaths => "deaths",
            IndicatorKind::Recovered => "recovered",
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Ok(IndicatorKind::Confirmed),
            "deaths" => Ok(IndicatorKind::Deaths),
            "recovered" => Ok(IndicatorKind::Recovered),
            other => Err(format!(
                "Unknown indicator '{}'. Valid: confirmed, deaths, recovered",
                other
            )),
        }
    }
}

/// One row of a wide-format indicator table
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Sub-national region, absent for whole-country rows
    pub province: Option<String>,
    pub country: String,
    /// One cumulative count per date column, aligned with `date_headers`
    pub counts: Vec<u64>,
}

/// A wide-format indicator table tagged with its kind
#[derive(Debug, Clone)]
pub struct RawIndicatorTable {
    pub kind: IndicatorKind,
    /// Date column headers exactly as they appear in the CSV (e.g. `1/22/20`)
    pub date_headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// A single aggregated measurement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub country: String,
    pub kind: IndicatorKind,
    pub date: NaiveDate,
    pub value: u64,
}

type Series = BTreeMap<NaiveDate, u64>;

/// Long-format table keyed by (country, kind, date)
///
/// Each key holds exactly one value. Built once by the reshaper and only
/// read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    data: BTreeMap<String, BTreeMap<IndicatorKind, Series>>,
    len: usize,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the cell for (country, kind, date), creating it if needed
    ///
    /// A sum that does not fit in `u64` is an error; the cell keeps its
    /// previous total.
    pub(crate) fn accumulate(
        &mut self,
        country: &str,
        kind: IndicatorKind,
        date: NaiveDate,
        value: u64,
    ) -> DataResult<()> {
        let series = self
            .data
            .entry(country.to_string())
            .or_default()
            .entry(kind)
            .or_default();

        match series.get_mut(&date) {
            Some(total) => {
                *total = total.checked_add(value).ok_or_else(|| DataError::CountOverflow {
                    kind,
                    country: country.to_string(),
                    date,
                })?;
            }
            None => {
                series.insert(date, value);
                self.len += 1;
            }
        }
        Ok(())
    }

    /// Number of (country, kind, date) cells
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Latest date present for any country and kind
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.data
            .values()
            .flat_map(|kinds| kinds.values())
            .filter_map(|series| series.keys().next_back().copied())
            .max()
    }

    /// Country names, sorted
    pub fn countries(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.keys().map(String::as_str)
    }

    /// Slice for one country and kind, ordered by date ascending
    ///
    /// Unknown countries yield an empty slice.
    pub fn series(&self, country: &str, kind: IndicatorKind) -> Vec<Observation> {
        self.data
            .get(country)
            .and_then(|kinds| kinds.get(&kind))
            .map(|series| {
                series
                    .iter()
                    .map(|(date, value)| Observation {
                        country: country.to_string(),
                        kind,
                        date: *date,
                        value: *value,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn value_at(&self, country: &str, kind: IndicatorKind, date: NaiveDate) -> Option<u64> {
        self.data.get(country)?.get(&kind)?.get(&date).copied()
    }

    /// All rows with the given kind on the given date
    pub fn on_date(&self, kind: IndicatorKind, date: NaiveDate) -> Vec<Observation> {
        self.data
            .iter()
            .filter_map(|(country, kinds)| {
                let value = kinds.get(&kind)?.get(&date)?;
                Some(Observation {
                    country: country.clone(),
                    kind,
                    date,
                    value: *value,
                })
            })
            .collect()
    }

    /// Every row, ordered by country, kind, then date
    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.data.iter().flat_map(|(country, kinds)| {
            kinds.iter().flat_map(move |(kind, series)| {
                series.iter().map(move |(date, value)| Observation {
                    country: country.clone(),
                    kind: *kind,
                    date: *date,
                    value: *value,
                })
            })
        })
    }
}
