use anyhow::Context;
use dotenvy::dotenv;
use edudesk::edudesk_config::{DatabaseConfig, ServerConfig};
use edudesk::edudesk_db::{init_db_pool, run_migrations};
use edudesk::logging::{init_tracing, shutdown_tracer};
use edudesk::metrics::{init_metrics, metrics_app};
use edudesk::router::init_router;
use edudesk::state::AppState;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing().context("Failed to initialize tracing")?;

    let server = ServerConfig::from_env();

    if let Some(handle) = init_metrics().context("Failed to install metrics recorder")? {
        let metrics_address = server.metrics_address();
        let listener = tokio::net::TcpListener::bind(&metrics_address)
            .await
            .with_context(|| format!("Failed to bind metrics server on {}", metrics_address))?;
        info!(address = %metrics_address, "Metrics server listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                error!(error = %e, "Metrics server stopped");
            }
        });
    }

    let database = DatabaseConfig::from_env()?;
    let pool = init_db_pool(&database)
        .await
        .context("Failed to connect to the database")?;
    if database.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let app = init_router(AppState::new(pool));

    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(address = %address, "🚀 Server running");
    info!("📚 Swagger UI available at /swagger-ui, Scalar UI at /scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
