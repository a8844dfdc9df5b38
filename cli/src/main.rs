//! CBC Intake CLI
//!
//! Command-line host for the CBC / Thalassemia screening intake form.
//!
//! # Usage
//!
//! ```bash
//! cbc-intake rules
//! cbc-intake validate whatsapp 9876543210
//! cbc-intake fill
//! cbc-intake check -f patient.json --format json
//! cbc-intake submit -f patient.json --html-out result.html
//! cbc-intake indices --hb 10 --rbc 5.5 --mcv 66 --mch 20 --mchc 30.3 --rdw 14
//! ```

use cbc_intake::{CbcPanel, RequirementProfile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod output;
mod presenter;

/// Screening service used when nothing else is configured.
const DEFAULT_ENDPOINT: &str = "http://localhost:8000/submit";

#[derive(Parser)]
#[command(name = "cbc-intake")]
#[command(version)]
#[command(about = "CBC / Thalassemia screening intake form", long_about = None)]
struct Cli {
    /// Submission endpoint URL
    #[arg(long, env = "CBC_INTAKE_ENDPOINT")]
    endpoint: Option<String>,

    /// Which clinical fields are required
    #[arg(long, env = "CBC_INTAKE_PROFILE")]
    profile: Option<RequirementProfile>,

    /// Rule table (TOML) replacing the built-in form
    #[arg(long, env = "CBC_INTAKE_RULES")]
    rules: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format
    #[arg(long, short)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long)]
    config_profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the field rules
    Rules,
    /// Check one field value
    Validate { field: String, value: String },
    /// Check a whole form stored as JSON
    Check {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Fill in the form interactively
    Fill,
    /// Submit the form (the saved draft unless --file is given)
    Submit {
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Write a returned result page here instead of stdout
        #[arg(long)]
        html_out: Option<PathBuf>,
    },
    /// Manage the autosaved draft
    Draft {
        #[command(subcommand)]
        action: DraftCommands,
    },
    /// Compute CBC discriminant indices offline
    Indices {
        #[arg(long)]
        hb: f64,
        #[arg(long)]
        rbc: f64,
        #[arg(long)]
        mcv: f64,
        #[arg(long)]
        mch: f64,
        #[arg(long)]
        mchc: f64,
        /// RDW-CV
        #[arg(long)]
        rdw: f64,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Show the saved draft
    Show,
    /// Delete the saved draft
    Clear,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration value
    Set { key: String, value: String },
    /// Get configuration value
    Get { key: String },
    /// List all configuration
    List,
    /// Initialize configuration
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match config::Config::load(cli.config_profile.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring unreadable config: {}", e);
            config::Config::default()
        }
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .ok()
                .or_else(|| config.log_level.clone())
                .unwrap_or_else(|| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli
        .format
        .or_else(|| config.default_format.as_deref().and_then(|f| f.parse().ok()))
        .unwrap_or(output::OutputFormat::Table);

    let draft_dir = match config.draft_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = commands::Context {
        endpoint: cli
            .endpoint
            .or(config.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        profile: cli.profile.or(config.profile).unwrap_or_default(),
        rules_file: cli.rules.or(config.rules_file),
        timeout: cli.timeout.or(config.timeout_secs).map(Duration::from_secs),
        draft_dir,
    };
    tracing::debug!(endpoint = %ctx.endpoint, profile = %ctx.profile, "resolved settings");

    let result = match cli.command {
        Commands::Rules => commands::rules::handle(&ctx, format).await,
        Commands::Validate { field, value } => commands::validate::handle(field, value, &ctx, format).await,
        Commands::Check { file } => commands::check::handle(file, &ctx, format).await,
        Commands::Fill => commands::fill::handle(&ctx).await,
        Commands::Submit { file, html_out } => commands::submit::handle(file, html_out, &ctx).await,
        Commands::Draft { action } => commands::draft::handle(action, &ctx, format).await,
        Commands::Indices { hb, rbc, mcv, mch, mchc, rdw } => {
            commands::indices::handle(CbcPanel { hb, rbc, mcv, mch, mchc, rdw }, format).await
        }
        Commands::Config { action } => commands::config::handle(action, cli.config_profile.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
