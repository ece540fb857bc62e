//! Plotly figure JSON
//!
//! Typed mirror of the subset of the Plotly.js figure schema the dashboard
//! emits. Serializes straight into the object `Plotly.react` expects.

use chrono::NaiveDate;
use serde::Serialize;

/// A complete figure: traces plus layout
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Choropleth(ChoroplethTrace),
    Scatter(ScatterTrace),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChoroplethTrace {
    pub locations: Vec<String>,
    pub locationmode: String,
    pub z: Vec<f64>,
    pub hovertext: Vec<String>,
    pub customdata: Vec<[u64; 1]>,
    pub hovertemplate: String,
    pub coloraxis: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScatterTrace {
    pub x: Vec<NaiveDate>,
    pub y: Vec<u64>,
    pub mode: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coloraxis: Option<ColorAxis>,
    /// `false` disables panning on the map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dragmode: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Margin {
    pub l: u32,
    pub b: u32,
    pub r: u32,
    pub t: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Annotation {
    pub x: f64,
    pub y: f64,
    pub xanchor: String,
    pub yanchor: String,
    pub xref: String,
    pub yref: String,
    pub showarrow: bool,
    pub align: String,
    pub bgcolor: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GeoLayout {
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColorAxis {
    /// `[position, color]` stops from 0.0 to 1.0
    pub colorscale: Vec<(f64, String)>,
    pub showscale: bool,
}
