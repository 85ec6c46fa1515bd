//! Configuration management utilities

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

/// Longest lookback the growth dashboard accepts, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 365;
/// Largest window the growth dashboard will pull into memory.
pub const MAX_WINDOW_ROWS: u64 = 50_000;

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

/// Shape of the event window the growth dashboard aggregates over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsWindowConfig {
    /// Trailing period, counted back from "now"
    pub lookback_days: u32,
    /// Row cap applied to the newest-first query
    pub max_rows: u64,
    /// Table holding the raw analytics events
    pub events_table: String,
}

impl Default for AnalyticsWindowConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            max_rows: 5000,
            events_table: "analytics_events".to_string(),
        }
    }
}

impl AnalyticsWindowConfig {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.lookback_days == 0 || self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ServiceError::Validation {
                message: format!(
                    "lookback_days must be between 1 and {}, got {}",
                    MAX_LOOKBACK_DAYS, self.lookback_days
                ),
            });
        }

        if self.max_rows == 0 || self.max_rows > MAX_WINDOW_ROWS {
            return Err(ServiceError::Validation {
                message: format!(
                    "max_rows must be between 1 and {}, got {}",
                    MAX_WINDOW_ROWS, self.max_rows
                ),
            });
        }

        // Interpolated into SQL, so only plain (optionally schema-qualified) identifiers
        let valid_table = !self.events_table.is_empty()
            && self.events_table.split('.').all(|part| {
                !part.is_empty()
                    && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    && !part.starts_with(|c: char| c.is_ascii_digit())
            });
        if !valid_table {
            return Err(ServiceError::Configuration {
                message: format!("invalid events table name '{}'", self.events_table),
            });
        }

        Ok(())
    }

    /// Same config with the HTTP/CLI overrides applied.
    pub fn with_overrides(&self, lookback_days: Option<u32>, max_rows: Option<u64>) -> Self {
        Self {
            lookback_days: lookback_days.unwrap_or(self.lookback_days),
            max_rows: max_rows.unwrap_or(self.max_rows),
            events_table: self.events_table.clone(),
        }
    }
}
