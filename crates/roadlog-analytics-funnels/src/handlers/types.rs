use serde::{Deserialize, Serialize};
use std::sync::Arc;
use roadlog_core::{DateTime, UtcDateTime};
use utoipa::ToSchema;

use crate::services::{GrowthDashboardService, WindowSummary};
use crate::types::FunnelMetrics;

pub struct AppState {
    pub dashboard_service: Arc<GrowthDashboardService>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GrowthMetricsQuery {
    /// Overrides the configured lookback (1-365 days)
    pub lookback_days: Option<u32>,
    /// Overrides the configured row cap (1-50000)
    pub max_rows: Option<u64>,
    /// End of the window; defaults to now
    pub as_of: Option<DateTime>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GrowthMetricsResponse {
    pub metrics: FunnelMetrics,
    pub window: WindowSummary,
    #[schema(value_type = String, format = DateTime)]
    pub generated_at: UtcDateTime,
}
