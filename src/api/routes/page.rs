//! Page Route
//!
//! - GET / - The dashboard page (map plus time-series panel)

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::charts::Figure;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

/// Placeholder in the page replaced by the initial time-series figure
const INITIAL_FIGURE_SLOT: &str = "__INITIAL_FIGURE__";

/// GET /
///
/// The time-series panel starts on the configured country's deaths curve.
pub async fn index(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let figure = state.dashboard.initial_time_series();
    tracing::debug!(country = %state.dashboard.initial_country(), "Serving page");
    Ok(Html(render_index(&figure)?))
}

fn render_index(initial_figure: &Figure) -> ApiResult<String> {
    let literal = serde_json::to_string(initial_figure)
        .map_err(|e| ApiError::Internal(format!("Failed to encode initial figure: {}", e)))?
        .replace("</", "<\\/");
    Ok(INDEX_HTML.replace(INITIAL_FIGURE_SLOT, &literal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::time_series;
    use crate::data::{IndicatorKind, Observation};
    use chrono::NaiveDate;

    #[test]
    fn test_render_index_embeds_figure() {
        let points = vec![Observation {
            country: "Italy".to_string(),
            kind: IndicatorKind::Deaths,
            date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            value: 29,
        }];
        let html = render_index(&time_series(&points, "Italy")).unwrap();

        assert!(html.contains("const INITIAL_FIGURE = {"));
        assert!(html.contains(r#""x":["2020-03-01"],"y":[29]"#));
        assert!(!html.contains(INITIAL_FIGURE_SLOT));
    }

    #[test]
    fn test_render_index_escapes_script_end() {
        let html = render_index(&time_series(&[], "</script>")).unwrap();
        assert!(html.contains(r#""<\/script>""#));
        assert_eq!(html.matches("</script>").count(), INDEX_HTML.matches("</script>").count());
    }
}
