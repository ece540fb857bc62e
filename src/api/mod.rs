//! Dashboard HTTP API
//!
//! Serves the dashboard page and the figures it renders, built with Axum.
//!
//! # Endpoints
//!
//! ## Page
//! - `GET /` - Map and time-series panels
//!
//! ## Figures
//! - `GET /api/v1/figures/map` - Choropleth of latest deaths (log-scaled)
//! - `GET /api/v1/figures/timeseries` - Time series for `country` and `kind`
//! - `POST /api/v1/callbacks/hover` - Time series for a map hover payload
//!
//! ## Snapshot
//! - `GET /api/v1/snapshot` - Latest-day deaths leaderboard
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use covidash::api::{serve, AppState};
//! use covidash::{Config, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let dashboard = Dashboard::load(&config).await?;
//!
//!     let state = AppState::new(dashboard);
//!     serve(state, &config.server).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Figure routes
        .route("/figures/map", get(routes::figures::map_figure))
        .route("/figures/timeseries", get(routes::figures::time_series_figure))
        .route("/callbacks/hover", post(routes::figures::hover_callback))
        // Snapshot routes
        .route("/snapshot", get(routes::snapshot::latest_snapshot));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .route("/", get(routes::page::index))
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the HTTP server
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::MapOptions;
    use crate::dashboard::Dashboard;
    use crate::data::{parse_indicator_csv, reshape, IndicatorKind};
    use crate::geo::CountryTable;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const DEATHS_CSV: &str = "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20
,Italy,41.87,12.56,29,34,52
,France,46.23,2.21,2,3,4
French Polynesia,France,-17.7,-149.4,0,0,0
,Bosnia and Herzegovina,43.9,17.7,0,0,1
";

    const CONFIRMED_CSV: &str = "Province/State,Country/Region,Lat,Long,3/1/20,3/2/20,3/3/20
,France,46.23,2.21,130,191,204
";

    fn create_test_app() -> Router {
        let observations = reshape(&[
            parse_indicator_csv(IndicatorKind::Confirmed, CONFIRMED_CSV).unwrap(),
            parse_indicator_csv(IndicatorKind::Deaths, DEATHS_CSV).unwrap(),
        ])
        .unwrap();
        let countries = CountryTable::bundled().unwrap().with_corrections();
        let dashboard = Dashboard::build(observations, &countries, &MapOptions::default(), "Italy");

        build_router(AppState::new(dashboard))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn hover(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/callbacks/hover")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["latest_date"], "2020-03-03");
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("const INITIAL_FIGURE = {"));
        assert!(html.contains(r#""y":[29,34,52]"#));
        assert!(html.contains(r#""text":"Italy""#));
        assert!(html.contains("plotly_hover"));
    }

    #[tokio::test]
    async fn test_map_figure() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/figures/map")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let trace = &body["data"][0];
        let locations = trace["locations"].as_array().unwrap();
        let idx = locations.iter().position(|l| l == "BIH").unwrap();
        assert_eq!(trace["hovertext"][idx], "Bosnia and Herzegovina");
        assert_eq!(trace["customdata"][idx], json!([1]));
        assert_eq!(body["layout"]["geo"]["scope"], "europe");
    }

    #[tokio::test]
    async fn test_hover_france() {
        let app = create_test_app();

        let response = app
            .oneshot(hover(
                r#"{"points":[{"location":"FRA","hovertext":"France","z":1.6}]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body["data"][0]["x"],
            json!(["2020-03-01", "2020-03-02", "2020-03-03"])
        );
        assert_eq!(body["data"][0]["y"], json!([2, 3, 4]));
        assert_eq!(body["layout"]["annotations"][0]["text"], "France");
    }

    #[tokio::test]
    async fn test_hover_country_without_data() {
        let app = create_test_app();

        let response = app
            .oneshot(hover(r#"{"points":[{"hovertext":"Germany"}]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"][0]["y"], json!([]));
    }

    #[tokio::test]
    async fn test_hover_malformed_payload() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(hover(r#"{"points":[{"hoverinfo":"France"}]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let response = app.oneshot(hover("not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_hover_wrong_shape_is_validation_error() {
        let app = create_test_app();

        for payload in [r#"{"points":[{"hovertext":5}]}"#, r#"{"points":"x"}"#, "null", "not json"] {
            let response = app.clone().oneshot(hover(payload)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload {}", payload);

            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "payload {}", payload);
            assert!(body["request_id"].is_string());
        }
    }

    #[tokio::test]
    async fn test_hover_without_content_type_is_validation_error() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/callbacks/hover")
                    .body(Body::from(r#"{"points":[{"hovertext":"France"}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_time_series_by_kind() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/figures/timeseries?country=France&kind=confirmed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"][0]["y"], json!([130, 191, 204]));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/figures/timeseries?country=France&kind=vaccinated")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_snapshot_leaderboard() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/snapshot?limit=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["kind"], "deaths");
        assert_eq!(body["date"], "2020-03-03");
        assert_eq!(body["total"], 3);
        assert_eq!(
            body["rows"],
            json!([
                {"country": "Italy", "value": 52},
                {"country": "France", "value": 4}
            ])
        );
    }
}
