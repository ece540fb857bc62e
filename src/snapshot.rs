//! Latest snapshot and map join
//!
//! Takes the most recent day of one indicator, one value per country,
//! and attaches it to the country table that drives the choropleth.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::data::{IndicatorKind, ObservationTable};
use crate::geo::CountryTable;

/// One country's value on the snapshot date
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SnapshotRow {
    pub country: String,
    pub value: u64,
}

/// Values of one indicator on the latest date of the observation table
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub kind: IndicatorKind,
    /// Global maximum date of the observation table, `None` when it is empty
    pub date: Option<NaiveDate>,
    /// Sorted by value, largest first
    pub rows: Vec<SnapshotRow>,
}

impl Snapshot {
    /// Take the rows of `kind` on the table's latest date
    ///
    /// The latest date is computed over every kind, so a kind that lags
    /// behind the others produces an empty snapshot.
    pub fn latest(observations: &ObservationTable, kind: IndicatorKind) -> Self {
        let Some(date) = observations.max_date() else {
            return Self {
                kind,
                date: None,
                rows: Vec::new(),
            };
        };

        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for obs in observations.on_date(kind, date) {
            *totals.entry(obs.country).or_default() += obs.value;
        }

        let mut rows: Vec<SnapshotRow> = totals
            .into_iter()
            .map(|(country, value)| SnapshotRow { country, value })
            .collect();
        rows.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.country.cmp(&b.country)));

        Self {
            kind,
            date: Some(date),
            rows,
        }
    }

    pub fn get(&self, country: &str) -> Option<u64> {
        self.rows
            .iter()
            .find(|r| r.country == country)
            .map(|r| r.value)
    }

    /// The `n` largest rows
    pub fn top(&self, n: usize) -> &[SnapshotRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// ln(value + 1), so zero maps to zero
pub fn log_scale(value: u64) -> f64 {
    (value as f64 + 1.0).ln()
}

/// A country on the map with its snapshot value
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapRow {
    pub country: String,
    pub iso_a3: String,
    pub value: u64,
    pub log_value: f64,
}

/// Country table left-joined with a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct MapTable {
    pub date: Option<NaiveDate>,
    /// Exactly one row per country of the country table, in its order
    pub rows: Vec<MapRow>,
    /// Snapshot countries with no row in the country table
    pub unmatched: Vec<String>,
}

impl MapTable {
    pub fn get(&self, country: &str) -> Option<&MapRow> {
        self.rows.iter().find(|r| r.country == country)
    }
}

/// Left-join `snapshot` onto `countries` by name; missing values become 0
///
/// `countries` is expected to have had its name corrections applied.
pub fn join(countries: &CountryTable, snapshot: &Snapshot) -> MapTable {
    let values: BTreeMap<&str, u64> = snapshot
        .rows
        .iter()
        .map(|r| (r.country.as_str(), r.value))
        .collect();

    let mut zero_filled = 0usize;
    let rows: Vec<MapRow> = countries
        .iter()
        .map(|feature| {
            let value = match values.get(feature.name.as_str()) {
                Some(v) => *v,
                None => {
                    zero_filled += 1;
                    0
                }
            };
            MapRow {
                country: feature.name.clone(),
                iso_a3: feature.iso_a3.clone(),
                value,
                log_value: log_scale(value),
            }
        })
        .collect();

    let known: HashSet<&str> = countries.iter().map(|f| f.name.as_str()).collect();
    let unmatched: Vec<String> = snapshot
        .rows
        .iter()
        .filter(|r| !known.contains(r.country.as_str()))
        .map(|r| r.country.clone())
        .collect();

    for country in &unmatched {
        tracing::debug!(country = %country, "Snapshot country has no map feature");
    }
    tracing::info!(
        countries = rows.len(),
        zero_filled,
        unmatched = unmatched.len(),
        "Joined snapshot onto country table"
    );

    MapTable {
        date: snapshot.date,
        rows,
        unmatched,
    }
}
