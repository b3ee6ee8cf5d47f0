//! Main entry point for the planner CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::Planner;
use dotenv::dotenv;
use shared::{
    config::{ClientConfig, ConfigOverrides},
    models::AuthScheme,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Planner CLI
#[derive(Parser, Debug)]
#[command(name = "planner", version)]
#[command(about = "Plan trips from the terminal: itineraries, stays, transport and weather", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (optional)
    #[arg(
        long,
        short,
        global = true,
        help = "Path to the configuration file (config.yaml, config.json or config.toml). Defaults and PLANNER_* variables apply otherwise."
    )]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(
        long,
        global = true,
        help = "Backend base URL including the /api prefix (e.g., http://localhost:8080/api)"
    )]
    api_url: Option<String>,

    /// Authentication scheme, overriding the configuration
    #[arg(long, global = true, help = "Authentication scheme: basic or bearer")]
    auth_scheme: Option<AuthScheme>,

    /// Log level, overriding the configuration
    #[arg(
        long,
        global = true,
        help = "Log level or filter directive (e.g., debug). RUST_LOG still takes precedence"
    )]
    log_level: Option<String>,

    /// Session file location, overriding the configuration
    #[arg(
        long,
        global = true,
        help = "Where the signed-in session is stored (defaults to the user config directory)"
    )]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the planner CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in, sign up, sign out
    Session {
        #[command(subcommand)]
        command: commands::session::SessionCommand,
    },
    /// Manage your trips
    Trips {
        #[command(subcommand)]
        command: commands::trips::TripCommand,
    },
    /// Manage activities within a trip
    Activities {
        #[command(subcommand)]
        command: commands::itinerary::ActivityCommand,
    },
    /// Manage accommodations within a trip
    Accommodations {
        #[command(subcommand)]
        command: commands::itinerary::AccommodationCommand,
    },
    /// Manage transport legs within a trip
    Transport {
        #[command(subcommand)]
        command: commands::itinerary::TransportCommand,
    },
    /// Look up current weather or a forecast
    Weather {
        #[command(subcommand)]
        command: commands::weather::WeatherCommand,
    },
    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: commands::profile::ProfileCommand,
    },
    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml, json or toml). Defaults to yaml.
        #[arg(
            long,
            short,
            help = "Format of the configuration file to generate (yaml, json or toml). Defaults to yaml."
        )]
        format: Option<String>,
    },
    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(
            long,
            short,
            help = "The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)"
        )]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(*shell);
            return Ok(());
        }
        Commands::Config { format } => {
            return commands::config::generate_config(format.as_deref().unwrap_or("yaml"));
        }
        _ => {}
    }

    let overrides = ConfigOverrides {
        api_url: cli.api_url,
        auth_scheme: cli.auth_scheme,
        log_level: cli.log_level,
        session_path: cli.session_file,
    };
    let config = ClientConfig::load_config(cli.config.as_deref(), &overrides)
        .context("failed to load configuration")?;
    init_tracing(&config.log_level);

    let planner = Planner::from_config(&config).context("failed to set up the client")?;
    planner.hydrate();

    match cli.command {
        Commands::Session { command } => commands::session::run(&planner, command).await,
        Commands::Trips { command } => commands::trips::run(&planner, command).await,
        Commands::Activities { command } => commands::itinerary::activities(&planner, command).await,
        Commands::Accommodations { command } => {
            commands::itinerary::accommodations(&planner, command).await
        }
        Commands::Transport { command } => commands::itinerary::transport(&planner, command).await,
        Commands::Weather { command } => commands::weather::run(&planner, command).await,
        Commands::Profile { command } => commands::profile::run(&planner, command).await,
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}
