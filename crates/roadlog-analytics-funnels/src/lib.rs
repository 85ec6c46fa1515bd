//! Growth funnel analytics
//!
//! Turns a window of raw product analytics events into the activation and
//! install funnel figures shown on the admin growth dashboard.

pub mod handlers;
pub mod services;
pub mod types;
pub mod view;

pub use services::{
    compute, compute_events, DatabaseEventStore, EventStore, EventStoreError, GrowthDashboardService,
    GrowthSnapshot, MemoryEventStore, WindowSummary,
};
pub use types::{
    ActivationMetrics, Event, EventRow, EventWindow, FunnelMetrics, InstallMetrics, Percentage,
    WindowQuery,
};
