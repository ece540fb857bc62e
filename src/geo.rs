//! Country boundaries
//!
//! The country table the map is keyed on: one row per Natural Earth
//! 1:110m country with its display name and ISO3 code. A copy of the
//! attribute table is compiled in; a full GeoJSON file (with geometry)
//! can be loaded from disk instead.

use geojson::{Feature, GeoJson, Geometry};
use std::path::Path;
use thiserror::Error;

/// Natural Earth low-resolution countries, attributes only
pub const BUNDLED_COUNTRIES: &str = include_str!("../assets/naturalearth_lowres.geojson");

/// Natural Earth names that differ from the CSSE country names
pub const NAME_CORRECTIONS: &[(&str, &str)] = &[
    ("Bosnia and Herz.", "Bosnia and Herzegovina"),
    ("Macedonia", "North Macedonia"),
];

/// Countries whose Natural Earth ISO3 code is wrong (`-99`)
pub const ISO3_CORRECTIONS: &[(&str, &str)] = &[("France", "FRA"), ("Norway", "NOR")];

/// Errors loading the country table
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    #[error("Feature {index} has no '{property}' property")]
    MissingProperty { index: usize, property: &'static str },
}

pub type GeoResult<T> = Result<T, GeoError>;

/// One country polygon and its identifiers
#[derive(Debug, Clone)]
pub struct CountryFeature {
    pub name: String,
    pub iso_a3: String,
    pub continent: Option<String>,
    pub geometry: Option<Geometry>,
}

/// All countries of the boundary dataset, in file order
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    features: Vec<CountryFeature>,
}

impl CountryTable {
    /// The compiled-in Natural Earth table
    pub fn bundled() -> GeoResult<Self> {
        Self::from_geojson_str(BUNDLED_COUNTRIES)
    }

    /// Load a GeoJSON FeatureCollection from disk
    pub async fn from_path(path: &Path) -> GeoResult<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let table = Self::from_geojson_str(&text)?;
        tracing::info!(path = %path.display(), countries = table.len(), "Loaded country boundaries");
        Ok(table)
    }

    /// Parse a FeatureCollection with `name` and `iso_a3` properties
    pub fn from_geojson_str(text: &str) -> GeoResult<Self> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(GeoError::NotFeatureCollection),
        };

        let features = collection
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| country_from_feature(index, feature))
            .collect::<GeoResult<Vec<_>>>()?;

        Ok(Self { features })
    }

    /// Apply the name and ISO3 fix-ups so rows line up with CSSE names
    ///
    /// Names are corrected first; ISO3 fixes are keyed on the corrected name.
    pub fn with_corrections(mut self) -> Self {
        for feature in &mut self.features {
            if let Some((_, corrected)) = NAME_CORRECTIONS
                .iter()
                .find(|(original, _)| *original == feature.name)
            {
                feature.name = corrected.to_string();
            }

            if let Some((_, iso)) = ISO3_CORRECTIONS
                .iter()
                .find(|(name, _)| *name == feature.name)
            {
                feature.iso_a3 = iso.to_string();
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryFeature> {
        self.features.iter()
    }

    pub fn get(&self, name: &str) -> Option<&CountryFeature> {
        self.features.iter().find(|f| f.name == name)
    }
}

fn country_from_feature(index: usize, feature: Feature) -> GeoResult<CountryFeature> {
    let text = |property: &'static str| {
        feature
            .property(property)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let name = text("name").ok_or(GeoError::MissingProperty {
        index,
        property: "name",
    })?;
    let iso_a3 = text("iso_a3").ok_or(GeoError::MissingProperty {
        index,
        property: "iso_a3",
    })?;
    let continent = text("continent");

    Ok(CountryFeature {
        name,
        iso_a3,
        continent,
        geometry: feature.geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_table_loads() {
        let table = CountryTable::bundled().unwrap();
        assert_eq!(table.len(), 177);
        assert!(table.get("Italy").is_some());
        assert_eq!(table.get("France").unwrap().iso_a3, "-99");
    }

    #[test]
    fn test_corrections() {
        let table = CountryTable::bundled().unwrap().with_corrections();

        assert!(table.get("Bosnia and Herz.").is_none());
        assert_eq!(table.get("Bosnia and Herzegovina").unwrap().iso_a3, "BIH");
        assert_eq!(table.get("North Macedonia").unwrap().iso_a3, "MKD");
        assert_eq!(table.get("France").unwrap().iso_a3, "FRA");
        assert_eq!(table.get("Norway").unwrap().iso_a3, "NOR");
        assert_eq!(table.len(), 177);
    }

    #[test]
    fn test_keeps_geometry() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Malta","iso_a3":"MLT"},
             "geometry":{"type":"Point","coordinates":[14.5,35.9]}}]}"#;

        let table = CountryTable::from_geojson_str(text).unwrap();
        let malta = table.get("Malta").unwrap();
        assert!(malta.geometry.is_some());
        assert_eq!(malta.continent, None);
    }

    #[test]
    fn test_missing_iso_property() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"name":"Atlantis"},"geometry":null}]}"#;

        let err = CountryTable::from_geojson_str(text).unwrap_err();
        assert!(matches!(
            err,
            GeoError::MissingProperty {
                index: 0,
                property: "iso_a3"
            }
        ));
    }

    #[test]
    fn test_rejects_bare_geometry() {
        let text = r#"{"type":"Point","coordinates":[0.0,0.0]}"#;
        assert!(matches!(
            CountryTable::from_geojson_str(text),
            Err(GeoError::NotFeatureCollection)
        ));
    }
}
