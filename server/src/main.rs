use vivienda_server::{Config, Server, ServerState, cleanup_old_logs, init_logger_with_file};

const LOG_RETENTION_DAYS: i64 = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let log_dir = config.log_dir();
    let _guard = init_logger_with_file(&log_level, config.is_production(), Some(&log_dir))?;

    if let Err(e) = cleanup_old_logs(std::path::Path::new(&log_dir), LOG_RETENTION_DAYS) {
        tracing::warn!(error = %e, "Log cleanup failed");
    }

    tracing::info!(environment = %config.environment, "Vivienda server starting...");

    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
