use std::sync::Arc;

use anyhow::Context;
use steward::config::Config;
use steward::server;
use steward::site::SiteRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load().context("failed to load configuration")?;
    let registry = Arc::new(SiteRegistry::from_config(&cfg));

    tokio::select! {
        res = server::listener::run(registry) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
