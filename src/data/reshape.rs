//! Aggregation and reshaping
//!
//! Collapses sub-national rows into country totals and melts the
//! wide tables into the long [`ObservationTable`].

use chrono::NaiveDate;

use super::error::{DataError, DataResult};
use super::types::{ObservationTable, RawIndicatorTable};

/// Format of the CSSE date column headers (`1/22/20`)
pub const DATE_HEADER_FORMAT: &str = "%m/%d/%y";

/// Parse a date column header
pub fn parse_date_header(header: &str) -> DataResult<NaiveDate> {
    NaiveDate::parse_from_str(header.trim(), DATE_HEADER_FORMAT).map_err(|_| {
        DataError::InvalidDate {
            header: header.to_string(),
        }
    })
}

/// Combine the tagged tables into one long-format table
///
/// Rows sharing a country and kind are summed per date, so provinces
/// fold into their country. Coordinates never enter the aggregation.
pub fn reshape(tables: &[RawIndicatorTable]) -> DataResult<ObservationTable> {
    let mut observations = ObservationTable::new();

    for table in tables {
        let dates = table
            .date_headers
            .iter()
            .map(|h| parse_date_header(h))
            .collect::<DataResult<Vec<_>>>()?;

        for row in &table.rows {
            for (date, value) in dates.iter().zip(&row.counts) {
                observations.accumulate(&row.country, table.kind, *date, *value)?;
            }
        }
    }

    tracing::debug!(
        tables = tables.len(),
        observations = observations.len(),
        "Reshaped indicator tables"
    );

    Ok(observations)
}
