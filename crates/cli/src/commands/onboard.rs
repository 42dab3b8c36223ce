//! `taskpilot onboard`: first-time setup.

use std::path::Path;
use taskpilot_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();

    println!("TaskPilot First-Time Setup");
    println!("==========================\n");

    if write_default_config(&config_dir)? {
        println!("Created config.toml at: {}", config_dir.join("config.toml").display());
        println!("\nNext steps:");
        println!("   1. Set GEMINI_API_KEY or add api_key to the config file");
        println!("   2. Run: taskpilot init-db");
        println!("   3. Run: taskpilot chat\n");
    } else {
        println!("Config already exists at: {}", config_dir.join("config.toml").display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    }

    Ok(())
}

/// Write `config.toml` into `dir` unless one is already there.
///
/// Returns whether a file was written.
fn write_default_config(dir: &Path) -> std::io::Result<bool> {
    let config_path = dir.join("config.toml");
    if config_path.exists() {
        return Ok(false);
    }

    std::fs::create_dir_all(dir)?;
    std::fs::write(&config_path, AppConfig::default_toml())?;
    Ok(true)
}
