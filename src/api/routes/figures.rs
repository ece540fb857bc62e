//! Figure Routes
//!
//! Plotly figures for the dashboard page.
//!
//! - GET /api/v1/figures/map - The precomputed choropleth
//! - GET /api/v1/figures/timeseries - Time series for a country and kind
//! - POST /api/v1/callbacks/hover - Time series for the hovered country

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{HoverData, TimeSeriesParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::charts::Figure;
use crate::data::IndicatorKind;

/// GET /api/v1/figures/map
///
/// The choropleth is built once at startup; every viewer gets the same one.
pub async fn map_figure(State(state): State<Arc<AppState>>) -> Json<Figure> {
    Json(state.dashboard.map_figure().clone())
}

/// GET /api/v1/figures/timeseries?country=France&kind=deaths
///
/// Unknown countries produce an empty chart rather than an error.
pub async fn time_series_figure(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeSeriesParams>,
) -> ApiResult<Json<Figure>> {
    let kind = match params.kind.as_deref() {
        Some(kind) => kind.parse::<IndicatorKind>().map_err(ApiError::Validation)?,
        None => IndicatorKind::Deaths,
    };

    Ok(Json(state.dashboard.time_series(&params.country, kind)))
}

/// POST /api/v1/callbacks/hover
///
/// Receives the map's hover payload and answers with the deaths curve of
/// the hovered country. A payload that does not parse, or has no hovered
/// country name, fails this update only; the page keeps its current chart.
pub async fn hover_callback(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HoverData>, JsonRejection>,
) -> ApiResult<Json<Figure>> {
    let Json(payload) = payload.map_err(|rejection| {
        ApiError::Validation(format!("malformed hover payload: {}", rejection.body_text()))
    })?;

    let country = payload.country().ok_or_else(|| {
        ApiError::Validation("hover payload has no points[0].hovertext".to_string())
    })?;

    tracing::debug!(country = %country, "Hover update");

    Ok(Json(
        state.dashboard.time_series(country, IndicatorKind::Deaths),
    ))
}
