//! Qiita Webhook - GitHub Push Receiver
//!
//! # Usage
//!
//! ```bash
//! # Publish files under blog/articles, keeping the mapping file in the repository
//! GITHUB_WEBHOOK_SECRET_TOKEN=... GITHUB_PERSONAL_ACCESS_TOKEN=... \
//! QIITA_ACCESS_TOKEN=... GITHUB_REPOS=octo/blog INCLUDED_DIR=blog/articles \
//! qiita-webhook
//!
//! # Keep the mapping on local disk; outside production everything is private
//! qiita-webhook --mapping-store local --mapping-filepath data/mapping.txt \
//!     --environment staging
//! ```

use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use qiita_webhook::{AppState, build_app, config::Args};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let included_dirs = args.included_dirs();
    if included_dirs.is_empty() {
        warn!("INCLUDED_DIR is empty; no files will be published");
    }

    // Create shared state
    let state = Arc::new(AppState {
        sync: args.build_sync()?,
        secret: args.webhook_secret.clone(),
    });

    let app = build_app(&args.path, state);

    // Parse socket address
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    // Set up SIGTERM handler for graceful shutdown
    let mut sigterm = signal(SignalKind::terminate())?;

    let server = axum::serve(
        tokio::net::TcpListener::bind(&addr).await?,
        app.into_make_service(),
    );

    info!(
        %addr,
        path = %args.path,
        repo = %args.github_repo,
        mapping_store = ?args.mapping_store,
        environment = ?args.environment(),
        "listening for GitHub push webhooks"
    );

    tokio::select! {
        result = server => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
        }
    }

    Ok(())
}
