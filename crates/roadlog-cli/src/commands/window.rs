use clap::Args;
use roadlog_core::AnalyticsWindowConfig;

/// Event window flags shared by `serve` and `report`.
#[derive(Args, Debug, Clone)]
pub struct WindowArgs {
    /// Days of events the growth dashboard looks back over
    #[arg(long, default_value_t = 30, env = "ROADLOG_LOOKBACK_DAYS")]
    pub lookback_days: u32,

    /// Newest events aggregated at most
    #[arg(long, default_value_t = 5000, env = "ROADLOG_MAX_ROWS")]
    pub max_rows: u64,

    /// Table holding the raw analytics events
    #[arg(long, default_value = "analytics_events", env = "ROADLOG_EVENTS_TABLE")]
    pub events_table: String,
}

impl WindowArgs {
    pub fn to_config(&self) -> anyhow::Result<AnalyticsWindowConfig> {
        let config = AnalyticsWindowConfig {
            lookback_days: self.lookback_days,
            max_rows: self.max_rows,
            events_table: self.events_table.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        window: WindowArgs,
    }

    #[test]
    fn test_defaults_match_dashboard_window() {
        let cli = TestCli::parse_from(["roadlog"]);
        assert_eq!(cli.window.to_config().unwrap(), AnalyticsWindowConfig::default());
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let cli = TestCli::parse_from(["roadlog", "--lookback-days", "0"]);
        assert!(cli.window.to_config().is_err());
    }
}
