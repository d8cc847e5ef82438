//! Start command - launches the calgate server.

use anyhow::Result;
use clap::Args;

use calgate_server::{Server, ServerConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override environment values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Address to bind to (overrides API_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides API_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Do not serve /docs and /openapi.json
    #[arg(long)]
    pub no_docs: bool,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: Context) -> Result<()> {
    let mut settings = ctx.settings;
    if let Some(host) = args.host {
        settings.api_host = host;
    }
    if let Some(port) = args.port {
        settings.api_port = port;
    }
    if args.no_docs {
        settings.show_docs = false;
    }

    let missing = settings.oauth_missing();
    if !missing.is_empty() {
        tracing::warn!(
            missing = %missing.join(", "),
            "OAuth is not configured; login endpoints will fail until these are set"
        );
    }

    let config = ServerConfig::from_settings(&settings);
    tracing::info!(
        version = %settings.version,
        addr = %config.bind_address,
        docs = config.show_docs,
        "Starting calgate"
    );
    if ctx.verbose {
        tracing::debug!("Effective configuration:\n{}", settings);
    }

    let server = Server::new(config)?;
    server.run_with_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
