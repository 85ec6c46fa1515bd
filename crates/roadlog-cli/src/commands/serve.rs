use axum::Router;
use clap::Args;
use roadlog_analytics_funnels::handlers::{configure_routes, AppState, GrowthApiDoc};
use roadlog_analytics_funnels::{DatabaseEventStore, GrowthDashboardService};
use roadlog_core::{AnalyticsWindowConfig, DatabaseConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::WindowArgs;

#[derive(Args)]
pub struct ServeCommand {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1:3000", env = "ROADLOG_ADDRESS")]
    pub address: String,

    /// Database connection URL
    #[arg(long, env = "ROADLOG_DATABASE_URL")]
    pub database_url: String,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = 10, env = "ROADLOG_DB_MAX_CONNECTIONS")]
    pub max_connections: u32,

    #[command(flatten)]
    pub window: WindowArgs,
}

impl ServeCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let window_config = self.window.to_config()?;
        let db_config = DatabaseConfig {
            max_connections: self.max_connections,
            ..DatabaseConfig::new(self.database_url.clone())
        };

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run(db_config, window_config))
    }

    async fn run(
        self,
        db_config: DatabaseConfig,
        window_config: AnalyticsWindowConfig,
    ) -> anyhow::Result<()> {
        debug!("Initializing database connection...");
        let db = roadlog_database::establish_connection(&db_config).await?;

        let store = Arc::new(DatabaseEventStore::new(db, &window_config));
        let service = Arc::new(GrowthDashboardService::new(store, window_config));

        let app = build_application(service);

        let listener = TcpListener::bind(&self.address).await?;
        info!("Growth analytics API listening on {}", self.address);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Growth analytics API exited");
        Ok(())
    }
}

fn build_application(dashboard_service: Arc<GrowthDashboardService>) -> Router {
    configure_routes()
        .with_state(Arc::new(AppState { dashboard_service }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", GrowthApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received, draining connections");
}
