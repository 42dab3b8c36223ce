//! `taskpilot chat`: interactive or single-message chat mode.
//!
//! Every line is its own turn with a fresh conversation, the same as a
//! WebSocket frame.

use std::io::Write;
use taskpilot_agent::channel;
use taskpilot_config::AppConfig;
use taskpilot_gateway::AppState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early and give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GEMINI_API_KEY=...      (recommended)");
        eprintln!("    OPENAI_API_KEY=...      (with default_provider = \"openai\")");
        eprintln!("    TASKPILOT_API_KEY=...   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let state = AppState::from_config(&config).await?;
    let cancel = CancellationToken::new();

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = channel::reply(&state.agent, &msg, &cancel).await;
        eprint!("\r              \r");
        if let Some(reply) = reply {
            println!("{reply}");
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  TaskPilot, interactive mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Store:     {}", state.store.name());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        eprint!("  ...");
        let reply = tokio::select! {
            reply = channel::reply(&state.agent, line, &cancel) => reply,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                None
            }
        };
        eprint!("\r     \r");

        match reply {
            Some(reply) => {
                println!();
                for line in reply.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            None => break,
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
