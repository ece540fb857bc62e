//! Chart Builder
//!
//! Pure functions turning the joined map table and observation slices
//! into Plotly figures. Rendering happens in the browser.

mod figure;

pub use figure::{
    Annotation, Axis, ChoroplethTrace, ColorAxis, Figure, GeoLayout, Layout, Margin, ScatterTrace,
    Trace,
};

use crate::data::Observation;
use crate::snapshot::MapTable;

/// ColorBrewer OrRd, 9 classes
pub const OR_RD: [&str; 9] = [
    "#fff7ec", "#fee8c8", "#fdd49e", "#fdbb84", "#fc8d59", "#ef6548", "#d7301f", "#b30000",
    "#7f0000",
];

/// Choropleth appearance
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub width: u32,
    pub height: u32,
    /// Plotly geo scope (`europe`, `world`, ...)
    pub scope: String,
    /// Label for the raw value in the hover box
    pub value_label: String,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            scope: "europe".to_string(),
            value_label: "deaths".to_string(),
        }
    }
}

/// Evenly spaced stops over a palette
fn colorscale(palette: &[&str]) -> Vec<(f64, String)> {
    let last = palette.len().saturating_sub(1).max(1) as f64;
    palette
        .iter()
        .enumerate()
        .map(|(i, color)| (i as f64 / last, color.to_string()))
        .collect()
}

/// Map colored by `log_value`, with name, ISO3 code, raw and log value on hover
pub fn choropleth(map: &MapTable, options: &MapOptions) -> Figure {
    let trace = ChoroplethTrace {
        locations: map.rows.iter().map(|r| r.iso_a3.clone()).collect(),
        locationmode: "ISO-3".to_string(),
        z: map.rows.iter().map(|r| r.log_value).collect(),
        hovertext: map.rows.iter().map(|r| r.country.clone()).collect(),
        customdata: map.rows.iter().map(|r| [r.value]).collect(),
        hovertemplate: format!(
            "<b>%{{hovertext}}</b><br><br>iso_a3=%{{location}}<br>{}=%{{customdata[0]}}<br>logvalue=%{{z}}<extra></extra>",
            options.value_label
        ),
        coloraxis: "coloraxis".to_string(),
        name: String::new(),
    };

    Figure {
        data: vec![Trace::Choropleth(trace)],
        layout: Layout {
            height: Some(options.height),
            width: Some(options.width),
            geo: Some(GeoLayout {
                scope: options.scope.clone(),
            }),
            coloraxis: Some(ColorAxis {
                colorscale: colorscale(&OR_RD),
                showscale: false,
            }),
            dragmode: Some(false),
            ..Default::default()
        },
    }
}

/// Compact line-and-marker chart of one slice, titled by annotation
///
/// An empty slice gives a figure with one empty trace.
pub fn time_series(points: &[Observation], title: &str) -> Figure {
    let trace = ScatterTrace {
        x: points.iter().map(|p| p.date).collect(),
        y: points.iter().map(|p| p.value).collect(),
        mode: "lines+markers".to_string(),
    };

    Figure {
        data: vec![Trace::Scatter(trace)],
        layout: Layout {
            height: Some(200),
            margin: Some(Margin {
                l: 20,
                b: 30,
                r: 10,
                t: 10,
            }),
            annotations: vec![Annotation {
                x: 0.0,
                y: 0.85,
                xanchor: "left".to_string(),
                yanchor: "bottom".to_string(),
                xref: "paper".to_string(),
                yref: "paper".to_string(),
                showarrow: false,
                align: "left".to_string(),
                bgcolor: "rgba(255, 255, 255, 0.5)".to_string(),
                text: title.to_string(),
            }],
            xaxis: Some(Axis {
                showgrid: Some(false),
                ..Default::default()
            }),
            yaxis: Some(Axis {
                axis_type: Some("linear".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IndicatorKind;
    use crate::snapshot::{log_scale, MapRow};
    use chrono::NaiveDate;
    use serde_json::json;

    fn map() -> MapTable {
        MapTable {
            date: NaiveDate::from_ymd_opt(2020, 3, 2),
            rows: vec![
                MapRow {
                    country: "Italy".to_string(),
                    iso_a3: "ITA".to_string(),
                    value: 105,
                    log_value: log_scale(105),
                },
                MapRow {
                    country: "Germany".to_string(),
                    iso_a3: "DEU".to_string(),
                    value: 0,
                    log_value: 0.0,
                },
            ],
            unmatched: Vec::new(),
        }
    }

    #[test]
    fn test_choropleth_layout() {
        let figure = choropleth(&map(), &MapOptions::default());
        let value = serde_json::to_value(&figure).unwrap();

        assert_eq!(value["data"][0]["type"], "choropleth");
        assert_eq!(value["data"][0]["locations"], json!(["ITA", "DEU"]));
        assert_eq!(value["data"][0]["hovertext"], json!(["Italy", "Germany"]));
        assert_eq!(value["data"][0]["customdata"], json!([[105], [0]]));
        assert_eq!(value["layout"]["geo"]["scope"], "europe");
        assert_eq!(value["layout"]["width"], 1000);
        assert_eq!(value["layout"]["height"], 1000);
        assert_eq!(value["layout"]["coloraxis"]["showscale"], false);
        assert_eq!(value["layout"]["dragmode"], false);
        assert_eq!(value["layout"]["coloraxis"]["colorscale"][0], json!([0.0, "#fff7ec"]));
        assert_eq!(value["layout"]["coloraxis"]["colorscale"][8], json!([1.0, "#7f0000"]));
    }

    #[test]
    fn test_choropleth_hover_shows_raw_value() {
        let figure = choropleth(&map(), &MapOptions::default());
        let Trace::Choropleth(trace) = &figure.data[0] else {
            panic!("expected choropleth trace");
        };
        assert!(trace.hovertemplate.contains("deaths=%{customdata[0]}"));
        assert_eq!(trace.z[1], 0.0);
    }

    #[test]
    fn test_choropleth_hover_fields_in_order() {
        let options = MapOptions {
            value_label: "confirmed".to_string(),
            ..MapOptions::default()
        };
        let figure = choropleth(&map(), &options);
        let Trace::Choropleth(trace) = &figure.data[0] else {
            panic!("expected choropleth trace");
        };
        assert_eq!(
            trace.hovertemplate,
            "<b>%{hovertext}</b><br><br>iso_a3=%{location}<br>confirmed=%{customdata[0]}<br>logvalue=%{z}<extra></extra>"
        );
    }

    #[test]
    fn test_time_series_layout() {
        let points = vec![
            Observation {
                country: "France".to_string(),
                kind: IndicatorKind::Deaths,
                date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                value: 2,
            },
            Observation {
                country: "France".to_string(),
                kind: IndicatorKind::Deaths,
                date: NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
                value: 4,
            },
        ];

        let value = serde_json::to_value(time_series(&points, "France")).unwrap();
        assert_eq!(value["data"][0]["type"], "scatter");
        assert_eq!(value["data"][0]["mode"], "lines+markers");
        assert_eq!(value["data"][0]["x"], json!(["2020-03-01", "2020-03-02"]));
        assert_eq!(value["data"][0]["y"], json!([2, 4]));
        assert_eq!(value["layout"]["height"], 200);
        assert_eq!(value["layout"]["margin"], json!({"l": 20, "b": 30, "r": 10, "t": 10}));
        assert_eq!(value["layout"]["annotations"][0]["text"], "France");
        assert_eq!(value["layout"]["annotations"][0]["y"], 0.85);
        assert_eq!(value["layout"]["xaxis"], json!({"showgrid": false}));
        assert_eq!(value["layout"]["yaxis"], json!({"type": "linear"}));
        assert!(value["layout"].get("title").is_none());
    }

    #[test]
    fn test_time_series_empty_slice() {
        let figure = time_series(&[], "Atlantis");
        let value = serde_json::to_value(&figure).unwrap();

        assert_eq!(value["data"][0]["x"], json!([]));
        assert_eq!(value["data"][0]["y"], json!([]));
        assert_eq!(value["layout"]["annotations"][0]["text"], "Atlantis");
    }
}
