use roadlog_core::{AnalyticsWindowConfig, UtcDateTime};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::aggregator;
use super::event_store::{EventStore, EventStoreError};
use crate::types::{FunnelMetrics, WindowQuery};

/// What a metrics snapshot was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WindowSummary {
    #[schema(value_type = String, format = DateTime)]
    pub since: UtcDateTime,
    pub lookback_days: u32,
    pub max_rows: u64,
    pub event_count: u64,
    /// The row cap was reached; counts cover only the newest `max_rows` events
    pub capped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GrowthSnapshot {
    pub metrics: FunnelMetrics,
    pub window: WindowSummary,
}

/// Fetches the trailing event window and aggregates it, once per call.
pub struct GrowthDashboardService {
    store: Arc<dyn EventStore>,
    config: AnalyticsWindowConfig,
}

impl GrowthDashboardService {
    pub fn new(store: Arc<dyn EventStore>, config: AnalyticsWindowConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AnalyticsWindowConfig {
        &self.config
    }

    /// Metrics for the configured window ending at `now`.
    pub async fn growth_metrics(&self, now: UtcDateTime) -> Result<GrowthSnapshot, EventStoreError> {
        self.growth_metrics_with(now, &self.config).await
    }

    /// Metrics for an explicit window, e.g. one with request overrides applied.
    pub async fn growth_metrics_with(
        &self,
        now: UtcDateTime,
        config: &AnalyticsWindowConfig,
    ) -> Result<GrowthSnapshot, EventStoreError> {
        config
            .validate()
            .map_err(|e| EventStoreError::InvalidWindow(e.to_string()))?;

        let query = WindowQuery::trailing(now, config);
        let window = self.store.fetch_window(&query).await?;

        let started = Instant::now();
        let metrics = aggregator::compute(&window);
        debug!(
            "Computed growth funnels over {} events in {:?}",
            window.len(),
            started.elapsed()
        );

        if window.is_capped() {
            warn!(
                "Growth window hit the {} row cap; older events in the last {} days are not counted",
                config.max_rows, config.lookback_days
            );
        }

        Ok(GrowthSnapshot {
            metrics,
            window: WindowSummary {
                since: query.since,
                lookback_days: config.lookback_days,
                max_rows: config.max_rows,
                event_count: window.len() as u64,
                capped: window.is_capped(),
            },
        })
    }
}
