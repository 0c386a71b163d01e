use anyhow::Result;
use carecms_cli::{bootstrap, config::Config, logging};
use persistence::ConnectionManager;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    logging::init_logging(&config.logging);

    info!("Starting CareCMS v{}", env!("CARGO_PKG_VERSION"));

    let environment = config.active_environment()?;
    let manager = match ConnectionManager::connect(environment, &config.database).await {
        Ok(manager) => manager,
        Err(e) => {
            error!(environment = %environment, error = %e, "Unable to open database connection");
            std::process::exit(1);
        }
    };

    manager.run_migrations().await?;
    bootstrap::ensure_settings(&manager, &config.bootstrap).await?;

    info!(environment = %environment, "Ready, waiting for shutdown signal");

    let mut health = tokio::time::interval(manager.health_check_interval());
    health.tick().await;
    loop {
        tokio::select! {
            _ = health.tick() => {
                // Failures are logged by the manager; keep waiting.
                manager.health_check().await.ok();
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("Shutdown signal received");
                break;
            }
        }
    }

    manager.disconnect().await;
    Ok(())
}
