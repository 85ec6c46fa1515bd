pub mod aggregator;
mod event_store;
mod service;

pub use aggregator::{compute, compute_events, group_count_distinct, Stage, Tally};
pub use event_store::{DatabaseEventStore, EventStore, EventStoreError, MemoryEventStore};
pub use service::{GrowthDashboardService, GrowthSnapshot, WindowSummary};
