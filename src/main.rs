//! siteterm - command endpoint for the site's terminal palette
//!
//! Serves `POST /api/commands` plus the content index and search endpoints
//! over the markdown tree at `content_dir`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use siteterm::config::Config;
use siteterm::content::{ContentIndex, FsContent};
use siteterm::dispatch::Dispatcher;
use siteterm::paths;
use siteterm::server;
use siteterm::state::Site;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("siteterm=info".parse()?),
        )
        .init();

    paths::log_paths();
    let config = Config::from_env()?;

    info!("loading content from {}", config.content_dir.display());
    let content = Arc::new(
        FsContent::load(&config.content_dir)
            .with_context(|| format!("failed to load {}", config.content_dir.display()))?,
    );
    info!("{} content items indexed", content.all().len());

    let site = Site::new(content.clone(), content, config.profile.clone());
    let dispatcher = Arc::new(Dispatcher::new(site));

    info!(addr = %config.listen_addr, "starting siteterm");
    server::serve(config.listen_addr, dispatcher).await
}
