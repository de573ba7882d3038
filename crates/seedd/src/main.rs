//! seedd — seed server daemon.
//!
//! Usage: `seedd [config-path]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use seed_core::SeedConfig;
use seedd::SeedServer;

#[tokio::main]
async fn main() -> Result<()> {
    let explicit_path = std::env::args().nth(1).map(PathBuf::from);

    // Config comes first so its log level can seed the filter; problems
    // are reported once tracing is up.
    let (config, config_warnings) = match &explicit_path {
        Some(path) => {
            let config = SeedConfig::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            (config, Vec::new())
        }
        None => {
            let mut warnings = Vec::new();
            if let Err(e) = SeedConfig::write_default_if_missing() {
                warnings.push(format!("failed to write default config: {e}"));
            }
            let config = SeedConfig::load().unwrap_or_else(|e| {
                warnings.push(format!("failed to load config, using defaults: {e}"));
                SeedConfig::default()
            });
            (config, warnings)
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }
    tracing::info!(
        config = %explicit_path.unwrap_or_else(SeedConfig::file_path).display(),
        "seedd starting"
    );

    let server = SeedServer::bind(config).await?;

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    server.run(shutdown_tx).await
}
