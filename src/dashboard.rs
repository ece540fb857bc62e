//! Dashboard model
//!
//! Everything computed once at startup and shared read-only by every
//! request: the observation table, the deaths snapshot, the joined map
//! table and the rendered choropleth.

use thiserror::Error;

use crate::charts::{self, Figure, MapOptions};
use crate::config::Config;
use crate::data::{
    load_indicators, reshape, DataError, DirectorySource, HttpSource, IndicatorKind,
    IndicatorSource, ObservationTable,
};
use crate::geo::{CountryTable, GeoError};
use crate::snapshot::{self, MapTable, Snapshot};

/// Startup failures
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load indicator data: {0}")]
    Data(#[from] DataError),

    #[error("Failed to load country boundaries: {0}")]
    Geo(#[from] GeoError),
}

/// Immutable dashboard state
#[derive(Debug, Clone)]
pub struct Dashboard {
    observations: ObservationTable,
    snapshot: Snapshot,
    map: MapTable,
    map_figure: Figure,
    initial_country: String,
}

impl Dashboard {
    /// Snapshot, join and render from already-loaded tables
    ///
    /// `countries` must already carry its name corrections.
    pub fn build(
        observations: ObservationTable,
        countries: &CountryTable,
        options: &MapOptions,
        initial_country: impl Into<String>,
    ) -> Self {
        let snapshot = Snapshot::latest(&observations, IndicatorKind::Deaths);
        let map = snapshot::join(countries, &snapshot);
        let map_figure = charts::choropleth(&map, options);

        Self {
            observations,
            snapshot,
            map,
            map_figure,
            initial_country: initial_country.into(),
        }
    }

    /// Fetch, reshape and join according to `config`
    pub async fn load(config: &Config) -> Result<Self, LoadError> {
        let source: Box<dyn IndicatorSource> = match &config.data.local_dir {
            Some(dir) => Box::new(DirectorySource::new(dir)),
            None => Box::new(HttpSource::new(
                config.data.base_url.clone(),
                config.data.request_timeout(),
            )?),
        };
        Self::load_from(source.as_ref(), config).await
    }

    /// Same as [`Dashboard::load`] with an explicit indicator source
    pub async fn load_from(source: &dyn IndicatorSource, config: &Config) -> Result<Self, LoadError> {
        let tables = load_indicators(source).await?;
        let observations = reshape(&tables)?;

        let countries = match &config.geo.path {
            Some(path) => CountryTable::from_path(path).await?,
            None => CountryTable::bundled()?,
        }
        .with_corrections();

        let dashboard = Self::build(
            observations,
            &countries,
            &config.dashboard.map_options(),
            config.dashboard.initial_country.clone(),
        );

        tracing::info!(
            observations = dashboard.observations.len(),
            latest = ?dashboard.snapshot.date,
            countries = dashboard.map.rows.len(),
            "Dashboard ready"
        );

        Ok(dashboard)
    }

    pub fn observations(&self) -> &ObservationTable {
        &self.observations
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn map(&self) -> &MapTable {
        &self.map
    }

    pub fn map_figure(&self) -> &Figure {
        &self.map_figure
    }

    pub fn initial_country(&self) -> &str {
        &self.initial_country
    }

    /// Time series of one country and kind, titled with the country name
    pub fn time_series(&self, country: &str, kind: IndicatorKind) -> Figure {
        let points = self.observations.series(country, kind);
        charts::time_series(&points, country)
    }

    /// The chart shown before any hover
    pub fn initial_time_series(&self) -> Figure {
        self.time_series(&self.initial_country, IndicatorKind::Deaths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemorySource;

    const CSV: &str = "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20
,Italy,41.87,12.56,30,100
,France,46.23,2.21,2,4
";

    fn source() -> MemorySource {
        MemorySource::new()
            .with_table(IndicatorKind::Confirmed, CSV)
            .with_table(IndicatorKind::Deaths, CSV)
            .with_table(IndicatorKind::Recovered, CSV)
    }

    #[tokio::test]
    async fn test_load_from_memory() {
        let dashboard = Dashboard::load_from(&source(), &Config::default())
            .await
            .unwrap();

        assert_eq!(dashboard.observations().len(), 12);
        assert_eq!(dashboard.snapshot().get("Italy"), Some(100));
        assert_eq!(dashboard.map().get("France").unwrap().value, 4);
        assert_eq!(dashboard.initial_country(), "Italy");
        assert_eq!(dashboard.map_figure().layout.width, Some(1000));
    }

    #[tokio::test]
    async fn test_initial_time_series_is_italy_deaths() {
        let dashboard = Dashboard::load_from(&source(), &Config::default())
            .await
            .unwrap();

        let figure = dashboard.initial_time_series();
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["y"], serde_json::json!([30, 100]));
        assert_eq!(value["layout"]["annotations"][0]["text"], "Italy");
    }

    #[tokio::test]
    async fn test_load_fails_on_missing_table() {
        let source = MemorySource::new().with_table(IndicatorKind::Confirmed, CSV);
        let err = Dashboard::load_from(&source, &Config::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Data(DataError::Missing(_))));
    }
}
