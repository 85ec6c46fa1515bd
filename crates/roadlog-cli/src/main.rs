//! Roadlog CLI - admin analytics services
//!
//! Serves the growth dashboard API or prints the dashboard once to the terminal.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ReportCommand, ServeCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ROADLOG_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "ROADLOG_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the growth analytics HTTP API
    Serve(ServeCommand),
    /// Print the growth dashboard once
    Report(ReportCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise our crates at the requested level
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        _ => tracing_subscriber::EnvFilter::try_new(format!(
            "roadlog_cli={level},\
             roadlog_core={level},\
             roadlog_database={level},\
             roadlog_analytics_funnels={level},\
             sqlx=warn,\
             sea_orm=warn,\
             tower_http=warn,\
             hyper=warn",
            level = cli.log_level
        ))
        .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", cli.log_level, e))?,
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global default subscriber: {}", e))?;

    match cli.command {
        Commands::Serve(serve_cmd) => serve_cmd.execute(),
        Commands::Report(report_cmd) => report_cmd.execute(),
    }
}
