//! Operator CLI for the webhook breaker.
//!
//! Reads the same TOML file the host application uses, so it talks to the
//! same store with the same key layout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use webhook_breaker::config::load_config;
use webhook_breaker::observability::logging::init_logging;
use webhook_breaker::{AppId, BreakerBoard, SystemClock};

#[derive(Parser)]
#[command(name = "breaker-admin")]
#[command(about = "Inspect and reset webhook circuit breakers", long_about = None)]
struct Cli {
    /// Path to the breaker configuration file.
    #[arg(short, long, default_value = "breaker.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Check,
    /// Show an app's breaker state as JSON
    Status {
        #[arg(long)]
        app: String,
    },
    /// Drop all breaker state recorded for an app
    Clear {
        #[arg(long)]
        app: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.observability.log_level);

    tracing::debug!(
        path = %cli.config.display(),
        store = ?config.store,
        event_types = config.breaker.event_types.len(),
        "Configuration loaded"
    );

    let board = BreakerBoard::from_config(&config, Arc::new(SystemClock))?;

    match cli.command {
        Commands::Check => {
            println!("{} is valid", cli.config.display());
        }
        Commands::Status { app } => {
            let status = board.status(&AppId::from(app));
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Clear { app } => {
            board.clear_state_for_app(&AppId::from(app));
            println!("Cleared breaker state");
        }
    }

    Ok(())
}
