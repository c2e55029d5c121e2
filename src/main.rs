//! Command-line front end for the check-in client.
//!
//! ```text
//! checkin --config checkin.toml status        # check in (or read the cache)
//! checkin --config checkin.toml payload       # show what would be sent
//! checkin --config checkin.toml clear-cache   # forget the cached response
//! checkin --config checkin.toml cache         # cache summary
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use checkin_client::cache::MemoryCache;
use checkin_client::config::{load_config, ClientConfig};
use checkin_client::observability::{logging, metrics};
use checkin_client::CheckInClient;

#[derive(Parser)]
#[command(name = "checkin")]
#[command(about = "Report installation metadata to the check-in endpoint", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check in and print the result
    Status,
    /// Print the payload that would be sent
    Payload,
    /// Delete the cached response
    ClearCache,
    /// Summarize the response cache
    Cache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::debug!(
        endpoint = %config.checkin.endpoint,
        timeout_secs = config.checkin.timeout_secs,
        persistence_path = ?config.cache.persistence_path,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let cache = MemoryCache::from_config(&config.cache)?;
    let client = CheckInClient::from_config_with_cache(&config, Arc::new(cache.clone()));

    match cli.command {
        Commands::Status => {
            let result = client.status().await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Payload => {
            println!("{}", serde_json::to_string_pretty(&client.payload())?);
        }
        Commands::ClearCache => {
            client.clear_cache().await?;
            println!("Cache cleared");
        }
        Commands::Cache => {
            println!("{}", serde_json::to_string_pretty(&cache.summary())?);
        }
    }

    Ok(())
}
