//! `taskpilot serve`: start the HTTP / WebSocket server.

use taskpilot_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("TaskPilot Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Chat:      ws://{}:{}/ws/chat", config.gateway.host, config.gateway.port);
    println!("   Store:     {}", config.store.database_url);

    taskpilot_gateway::start(config).await?;

    Ok(())
}
