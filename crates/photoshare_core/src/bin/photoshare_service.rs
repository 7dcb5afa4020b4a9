/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use photoshare_core::config::{default_config_path, ServiceConfig};
use photoshare_core::service;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse()?),
        )
        .init();

    let cfg_path = std::env::args()
        .nth(1)
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = ServiceConfig::load(&cfg_path)?;
    info!("config: {}", cfg_path.display());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
        let _ = shutdown_tx.send(true);
    });

    if let Err(e) = service::serve(cfg, shutdown_rx).await {
        error!("service failed: {e:#}");
        return Err(e);
    }
    Ok(())
}
