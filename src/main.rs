//! Covidash
//!
//! Command-line entry point:
//! - `serve`: load the data and run the dashboard
//! - `snapshot`: load the data and print the latest deaths leaderboard
//! - `config`: print a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covidash::api::{serve, AppState};
use covidash::config::{generate_default_config, Config, LoggingConfig};
use covidash::Dashboard;

#[derive(Parser)]
#[command(name = "covidash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "COVID-19 deaths in Europe: choropleth and per-country time series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/covidash/config.toml or ./covidash.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the data and serve the dashboard
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Development mode: debug-level logging
        #[arg(long)]
        debug: bool,
    },

    /// Print the latest deaths per country, largest first
    Snapshot {
        /// Number of countries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, debug } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.server.debug |= debug;

            init_tracing(&config.logging, config.server.debug);
            tracing::info!("Starting Covidash v{}", env!("CARGO_PKG_VERSION"));

            let dashboard = Dashboard::load(&config)
                .await
                .context("Failed to load dashboard data")?;

            serve(AppState::new(dashboard), &config.server).await?;
            tracing::info!("Covidash stopped");
        }

        Commands::Snapshot { limit } => {
            let config = load_config(cli.config.as_deref())?;
            init_tracing(&config.logging, false);

            let dashboard = Dashboard::load(&config)
                .await
                .context("Failed to load dashboard data")?;
            let snapshot = dashboard.snapshot();

            match snapshot.date {
                Some(date) => println!("Deaths on {}", date),
                None => println!("No data"),
            }
            println!("{:<4} {:<32} {:>10}", "#", "Country", "Deaths");
            for (rank, row) in snapshot.top(limit).iter().enumerate() {
                println!("{:<4} {:<32} {:>10}", rank + 1, row.country, row.value);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Wrote default config to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Explicit path (with env overrides) or the default search
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load_with_env(path)?),
        None => Ok(Config::load_default()),
    }
}

/// `RUST_LOG` wins; otherwise the configured level, raised to debug in debug mode
fn init_tracing(logging: &LoggingConfig, debug: bool) {
    let default_filter = if debug {
        "covidash=debug,tower_http=debug".to_string()
    } else {
        format!("covidash={},tower_http=info", logging.level)
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let json = logging.is_json();
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}
