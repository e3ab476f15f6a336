use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use spacetraveling::api::pages::warm_cache;
use spacetraveling::app::{router, AppState};
use spacetraveling::export::export_site;
use spacetraveling::settings::Settings;

/// Blog front-end for a Prismic repository.
#[derive(Debug, Parser)]
#[command(name = "spacetraveling", version, about)]
struct Cli {
    /// TOML settings file (defaults to ./spacetraveling.toml if present)
    #[arg(long, global = true, env = "SPACETRAVELING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override server.addr
        #[arg(long)]
        addr: Option<String>,
    },
    /// Render the whole site into a directory
    Export {
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spacetraveling=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => {
            if let Some(addr) = addr {
                settings.server.addr = addr;
            }
            serve(settings).await
        }
        Command::Export { out } => export(settings, out).await,
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server.addr.clone();
    let state = AppState::from_settings(settings)?;

    tracing::info!("Rendering known pages...");
    match warm_cache(&state).await {
        Ok(pages) => tracing::info!(pages, "Page cache warmed"),
        Err(e) => tracing::warn!("Startup render failed, pages will render on demand: {e}"),
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn export(settings: Settings, out: PathBuf) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings)?;
    let summary = export_site(state.content.as_ref(), &state.settings, &out)
        .await
        .context("Export failed")?;

    tracing::info!(
        pages = summary.pages,
        assets = summary.assets,
        "Exported site to {}",
        out.display()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
