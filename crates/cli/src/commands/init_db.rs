//! `taskpilot init-db`: create the task schema.

use taskpilot_config::{AppConfig, StoreBackend};
use taskpilot_core::task::TaskStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if config.store.backend == StoreBackend::Memory {
        println!("Store backend is 'memory'; there is no schema to create.");
        return Ok(());
    }

    tracing::info!(url = %config.store.database_url, "Running migrations");
    // Opening the store runs the migrations.
    let store = taskpilot_store::open(&config.store).await?;
    let count = store.count().await?;

    println!("Database ready: {}", config.store.database_url);
    println!("   Tasks: {count}");

    Ok(())
}
