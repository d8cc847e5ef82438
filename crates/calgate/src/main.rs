//! calgate - Google Calendar gateway service
//!
//! Main entry point for the calgate CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;

mod commands;

use calgate_config::Settings;
use commands::{config, start};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// calgate - Google Calendar gateway service
#[derive(Parser)]
#[command(name = "calgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start(start::StartArgs),

    /// Inspect the effective configuration
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let _guard = init_tracing(&settings, cli.verbose);

    let ctx = commands::Context {
        settings,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, ctx).await,
        Commands::Config(args) => config::run(args, &ctx),
    }
}

/// Console layer plus, when `LOG_DIR` is set, a daily-rotated JSON file.
///
/// `RUST_LOG` wins over `LOG_LEVEL`; `--verbose` forces debug for our crates.
fn init_tracing(settings: &Settings, verbose: bool) -> Option<WorkerGuard> {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let console_filter = if verbose {
        EnvFilter::new(format!(
            "calgate=debug,calgate_server=debug,calgate_oauth=debug,calgate_client=debug,calgate_session=debug,{}",
            settings.log_level
        ))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level))
    };

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "calgate.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(format!(
                    "calgate=trace,calgate_server=trace,calgate_oauth=trace,calgate_client=trace,{}",
                    settings.log_level
                )));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    guard
}
