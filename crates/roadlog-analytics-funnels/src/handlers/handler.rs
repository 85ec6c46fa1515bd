use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::error;

use super::types::{AppState, GrowthMetricsQuery, GrowthMetricsResponse};
use crate::services::{EventStoreError, WindowSummary};
use crate::types::{ActivationMetrics, FunnelMetrics, InstallMetrics};
use roadlog_core::error_builder::{bad_request, internal_server_error};
use roadlog_core::problemdetails::Problem;

const GROWTH_PATH: &str = "/analytics/growth";

/// Get activation and install funnel metrics for the trailing event window
#[utoipa::path(
    get,
    path = "/analytics/growth",
    params(
        ("lookback_days" = Option<u32>, Query, description = "Days of events to include (default: 30, max: 365)"),
        ("max_rows" = Option<u64>, Query, description = "Newest events to aggregate at most (default: 5000, max: 50000)"),
        ("as_of" = Option<String>, Query, description = "End of the window (ISO 8601, default: now)")
    ),
    responses(
        (status = 200, description = "Growth funnel metrics", body = GrowthMetricsResponse),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Growth"
)]
pub async fn get_growth_metrics(
    State(state): State<Arc<AppState>>,
    query: Result<Query<GrowthMetricsQuery>, QueryRejection>,
) -> Result<Json<GrowthMetricsResponse>, Problem> {
    let Query(query) = query.map_err(|rejection| {
        bad_request()
            .detail(rejection.body_text())
            .instance(GROWTH_PATH)
            .build()
    })?;

    let service = &state.dashboard_service;
    let config = service
        .config()
        .with_overrides(query.lookback_days, query.max_rows);
    let now = query.as_of.map(|as_of| as_of.0).unwrap_or_else(Utc::now);

    let snapshot = service
        .growth_metrics_with(now, &config)
        .await
        .map_err(|e| match e {
            EventStoreError::InvalidWindow(detail) => {
                bad_request().detail(detail).instance(GROWTH_PATH).build()
            }
            other => {
                error!("Failed to compute growth metrics: {}", other);
                internal_server_error()
                    .title("Failed to compute growth metrics")
                    .detail(format!("Error: {}", other))
                    .instance(GROWTH_PATH)
                    .build()
            }
        })?;

    Ok(Json(GrowthMetricsResponse {
        metrics: snapshot.metrics,
        window: snapshot.window,
        generated_at: Utc::now(),
    }))
}

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(get_growth_metrics),
    components(
        schemas(
            GrowthMetricsQuery,
            GrowthMetricsResponse,
            FunnelMetrics,
            ActivationMetrics,
            InstallMetrics,
            WindowSummary
        )
    ),
    tags(
        (name = "Growth", description = "Growth dashboard analytics")
    )
)]
pub struct GrowthApiDoc;

pub fn configure_routes() -> axum::Router<Arc<AppState>> {
    use axum::routing::get;

    axum::Router::new().route(GROWTH_PATH, get(get_growth_metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{EventStore, GrowthDashboardService, MemoryEventStore};
    use crate::types::event_names::*;
    use crate::types::{Event, EventWindow, WindowQuery};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, TimeZone};
    use http_body_util::BodyExt;
    use roadlog_core::AnalyticsWindowConfig;
    use tower::ServiceExt;

    struct FailingStore;

    #[async_trait]
    impl EventStore for FailingStore {
        async fn fetch_window(&self, _query: &WindowQuery) -> Result<EventWindow, EventStoreError> {
            Err(EventStoreError::Database(sea_orm::DbErr::Custom(
                "connection refused".to_string(),
            )))
        }
    }

    fn app(store: Arc<dyn EventStore>) -> axum::Router {
        let service = GrowthDashboardService::new(store, AnalyticsWindowConfig::default());
        configure_routes().with_state(Arc::new(AppState {
            dashboard_service: Arc::new(service),
        }))
    }

    async fn send(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = send(app, uri).await;
        (status, body)
    }

    #[tokio::test]
    async fn test_growth_metrics_endpoint() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        let store = MemoryEventStore::new(vec![
            Event::anonymous(LANDING_VIEW, "S1", as_of - Duration::days(1)),
            Event::anonymous(LANDING_VIEW, "S2", as_of - Duration::days(1)),
            Event::anonymous(AUTH_SUBMIT, "S1", as_of - Duration::days(1)),
        ]);

        let (status, body) = get_json(
            app(Arc::new(store)),
            "/analytics/growth?as_of=2025-06-30T00:00:00Z",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"]["activation"]["landing"], 2);
        assert_eq!(body["metrics"]["activation"]["auth_conversion_pct"], "50.0");
        assert_eq!(body["metrics"]["install"]["install_view_to_cta_pct"], "0.0");
        assert_eq!(body["window"]["event_count"], 3);
        assert_eq!(body["window"]["lookback_days"], 30);
    }

    #[tokio::test]
    async fn test_lookback_override_narrows_window() {
        let as_of = Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap();
        let store = MemoryEventStore::new(vec![
            Event::anonymous(LANDING_VIEW, "recent", as_of - Duration::days(2)),
            Event::anonymous(LANDING_VIEW, "older", as_of - Duration::days(10)),
        ]);

        let (status, body) = get_json(
            app(Arc::new(store)),
            "/analytics/growth?lookback_days=7&as_of=2025-06-30T00:00:00Z",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"]["activation"]["landing"], 1);
    }

    #[tokio::test]
    async fn test_invalid_override_is_bad_request() {
        let (status, content_type, body) = send(
            app(Arc::new(MemoryEventStore::default())),
            "/analytics/growth?max_rows=0",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(body["error_code"], "BAD_REQUEST");
        assert_eq!(body["instance"], "/analytics/growth");
    }

    #[tokio::test]
    async fn test_malformed_as_of_is_problem_json() {
        let (status, content_type, body) = send(
            app(Arc::new(MemoryEventStore::default())),
            "/analytics/growth?as_of=yesterday",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(body["error_code"], "BAD_REQUEST");
        assert_eq!(body["instance"], "/analytics/growth");
        assert!(body["detail"].as_str().unwrap().contains("as_of"));
    }

    #[tokio::test]
    async fn test_non_numeric_lookback_is_problem_json() {
        let (status, content_type, body) = send(
            app(Arc::new(MemoryEventStore::default())),
            "/analytics/growth?lookback_days=abc",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(body["error_code"], "BAD_REQUEST");
        assert!(body["detail"].as_str().unwrap().contains("lookback_days"));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let (status, content_type, body) =
            send(app(Arc::new(FailingStore)), "/analytics/growth").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        assert_eq!(body["title"], "Failed to compute growth metrics");
        assert_eq!(body["error_code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["instance"], "/analytics/growth");
    }
}
