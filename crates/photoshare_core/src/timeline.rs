/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::album_fetch::fetch_scoped_albums;
use crate::config::TimelineConfig;
use crate::enrich::{enrich_album, EnrichContext};
use crate::rank::rank_by_activity;
use crate::relation_store::RelationStore;
use crate::repost_overlay::{fetch_overlay_only_albums, resolve_overlay, RepostOverlay};
use crate::scope::resolve_scope;
use crate::timeline_metrics::TimelineMetrics;
use crate::user_cache::UserRefCache;
use anyhow::{Context, Result};
use futures_util::future::try_join_all;
use photoshare_protocol::{Album, TimelineItemVm};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, warn};

/// Assembles the ranked album timeline for `viewer`.
///
/// With a viewer: scope (self, accepted friends, watched owners), chunked album
/// fetch and repost overlay in parallel, overlay-only albums appended,
/// deduplicated by album id, enriched in parallel and ranked by latest activity.
///
/// Without a viewer there is no scope: newest albums overall, no overlay and no
/// per-viewer flags.
pub async fn list_latest_albums_vm(
    store: &dyn RelationStore,
    viewer: Option<&str>,
    cfg: &TimelineConfig,
    metrics: &TimelineMetrics,
) -> Result<Vec<TimelineItemVm>> {
    let started = Instant::now();
    let viewer = viewer.map(str::trim).filter(|v| !v.is_empty());
    match build_timeline(store, viewer, cfg, metrics).await {
        Ok(items) => {
            metrics.run_ok(items.len(), started.elapsed().as_millis() as u64);
            Ok(items)
        }
        Err(e) => {
            warn!(viewer, "timeline build failed: {e:#}");
            metrics.run_failed(format!("{e:#}"));
            Err(e)
        }
    }
}

async fn build_timeline(
    store: &dyn RelationStore,
    viewer: Option<&str>,
    cfg: &TimelineConfig,
    metrics: &TimelineMetrics,
) -> Result<Vec<TimelineItemVm>> {
    let (albums, overlay) = match viewer {
        Some(v) => collect_scoped(store, v, cfg, metrics).await?,
        None => {
            let albums = store
                .latest_albums(cfg.album_limit())
                .await
                .context("fetch latest albums")?;
            (albums, RepostOverlay::new())
        }
    };

    let cache = UserRefCache::new(store, metrics);
    let ctx = EnrichContext {
        store,
        viewer,
        cache: &cache,
        metrics,
        preview_len: cfg.comments_preview(),
    };
    let mut items = try_join_all(
        albums
            .into_iter()
            .map(|album| {
                let entry = overlay.get(&album.id);
                enrich_album(&ctx, album, entry)
            }),
    )
    .await?;
    rank_by_activity(&mut items);
    debug!(viewer, items = items.len(), users = cache.len(), "timeline assembled");
    Ok(items)
}

async fn collect_scoped(
    store: &dyn RelationStore,
    viewer: &str,
    cfg: &TimelineConfig,
    metrics: &TimelineMetrics,
) -> Result<(Vec<Album>, RepostOverlay)> {
    let scope = resolve_scope(store, viewer, metrics).await;
    let chunk = cfg.in_filter_chunk();
    let (albums, overlay) = tokio::join!(
        fetch_scoped_albums(store, &scope, cfg.album_limit(), chunk),
        resolve_overlay(store, &scope, cfg.repost_overlay_limit(), chunk, metrics),
    );
    let mut albums = albums?;
    let extra = fetch_overlay_only_albums(store, &overlay, &albums, metrics).await;
    albums.extend(extra);
    Ok((dedup_albums(albums), overlay))
}

/// Drops later duplicates of an album id, keeping the first occurrence.
pub fn dedup_albums(albums: Vec<Album>) -> Vec<Album> {
    let mut seen = HashSet::new();
    albums
        .into_iter()
        .filter(|a| seen.insert(a.id.clone()))
        .collect()
}
