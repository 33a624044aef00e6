use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sheetfmt_server::config::{Cli, Command, EventArgs, ServeArgs};
use sheetfmt_server::{handle_raw_event, http, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `event` output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Event(args) => event(args).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let blob = args.storage.blob_store().await;
    match &blob {
        Some(store) => tracing::info!(bucket = store.bucket(), "blob storage enabled"),
        None => tracing::info!("blob storage not configured"),
    }
    let state = AppState {
        staging: args.staging.staging(),
        blob,
    };

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    http::serve(listener, router(state, args.max_body_bytes))
        .await
        .context("server error")
}

async fn event(args: EventArgs) -> anyhow::Result<()> {
    let mut raw = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut raw)
        .await
        .context("failed to read event from stdin")?;

    let staging = args.staging.staging();
    let response = tokio::task::spawn_blocking(move || handle_raw_event(&raw, &staging)).await?;

    let mut out = serde_json::to_vec(&response)?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;
    Ok(())
}
