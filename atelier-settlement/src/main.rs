//! atelier-settlement: operator service for monthly creator settlement

use atelier_settlement::{AppState, Config, DbService, api, init_logger_with_file};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_logger_with_file(&config.log_level, config.log_dir.as_deref());

    tracing::info!(
        env = %config.environment,
        timezone = %config.timezone,
        "Starting atelier-settlement"
    );

    let db = DbService::new(&config.database_url).await?;
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let state = AppState::new(config, db.pool).await?;
    let app = api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("atelier-settlement HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("atelier-settlement stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
