use chrono::Utc;
use clap::Args;
use colored::Colorize;
use roadlog_analytics_funnels::view::{DashboardState, DashboardView, MetricSection};
use roadlog_analytics_funnels::{
    DatabaseEventStore, EventRow, EventStore, GrowthDashboardService, MemoryEventStore,
};
use roadlog_core::{AnalyticsWindowConfig, DatabaseConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

use super::WindowArgs;

#[derive(Args)]
pub struct ReportCommand {
    /// Database connection URL
    #[arg(long, env = "ROADLOG_DATABASE_URL", required_unless_present = "events_file")]
    pub database_url: Option<String>,

    /// JSON export of the events table (array of event rows); takes precedence
    /// over the database
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Print the metrics as JSON instead of text
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub window: WindowArgs,
}

impl ReportCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let window_config = self.window.to_config()?;

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run(window_config))
    }

    async fn run(self, window_config: AnalyticsWindowConfig) -> anyhow::Result<()> {
        let store: Arc<dyn EventStore> = match (&self.database_url, &self.events_file) {
            (_, Some(path)) => {
                let raw = tokio::fs::read_to_string(path).await?;
                let rows: Vec<EventRow> = serde_json::from_str(&raw)?;
                debug!("Loaded {} event rows from {}", rows.len(), path.display());
                Arc::new(MemoryEventStore::from_rows(rows)?)
            }
            (Some(url), None) => {
                let db =
                    roadlog_database::establish_connection(&DatabaseConfig::new(url.clone()))
                        .await?;
                Arc::new(DatabaseEventStore::new(db, &window_config))
            }
            (None, None) => anyhow::bail!("either --database-url or --events-file is required"),
        };

        let service = GrowthDashboardService::new(store, window_config);

        if !self.json {
            print_sections(&DashboardView::render(&DashboardState::Loading));
        }

        let snapshot = match service.growth_metrics(Utc::now()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Failed to load growth metrics: {}", e);
                if !self.json {
                    print_failure(&DashboardState::Failed(e.to_string()));
                }
                return Err(e.into());
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            return Ok(());
        }

        print_sections(&DashboardView::render(&DashboardState::Ready(
            snapshot.metrics,
        )));
        println!(
            "{} {} events since {}{}",
            "Window:".bright_white().bold(),
            snapshot.window.event_count,
            snapshot.window.since.format("%Y-%m-%d %H:%M UTC"),
            if snapshot.window.capped {
                " (row cap reached)".yellow().to_string()
            } else {
                String::new()
            }
        );
        Ok(())
    }
}

fn print_sections(sections: &[MetricSection]) {
    for section in sections {
        println!();
        println!("{}", section.title.bright_cyan().bold());
        for tile in &section.tiles {
            println!("  {:<22} {}", tile.label, tile.value.bright_white());
        }
    }
    println!();
}

fn print_failure(state: &DashboardState) {
    if let DashboardState::Failed(message) = state {
        eprintln!("{} {}", "Error:".bright_red().bold(), message);
    }
}
