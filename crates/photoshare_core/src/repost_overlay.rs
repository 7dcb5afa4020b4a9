/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::chunked::fetch_chunked;
use crate::fallible::fetch_with_default;
use crate::relation_store::RelationStore;
use crate::timeline_metrics::{Degraded, TimelineMetrics};
use futures_util::future::join_all;
use photoshare_protocol::{Album, Repost};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Latest repost per album id among reposts authored by the scope.
pub type RepostOverlay = HashMap<String, Repost>;

/// Recent reposts by scope members reduced to one per album.
///
/// A failed fetch degrades to an empty overlay.
pub async fn resolve_overlay(
    store: &dyn RelationStore,
    scope: &[String],
    limit: u32,
    chunk_size: usize,
    metrics: &TimelineMetrics,
) -> RepostOverlay {
    let reposts = fetch_with_default(
        "scope reposts",
        Degraded::Overlay,
        metrics,
        Vec::new(),
        fetch_chunked(
            scope,
            chunk_size,
            limit as usize,
            |r: &Repost| r.created_at.as_millis(),
            |chunk| async move { store.reposts_by_users(&chunk, limit).await },
        ),
    )
    .await;
    let overlay = reduce_latest(reposts);
    debug!(albums = overlay.len(), "repost overlay resolved");
    overlay
}

/// Keeps the newest repost per album. Only a strictly newer repost replaces
/// the one already held, so on equal timestamps the first seen wins.
pub fn reduce_latest(reposts: impl IntoIterator<Item = Repost>) -> RepostOverlay {
    let mut out: RepostOverlay = HashMap::new();
    for r in reposts {
        let newer = out
            .get(&r.album_id)
            .map_or(true, |held| r.created_at > held.created_at);
        if newer {
            out.insert(r.album_id.clone(), r);
        }
    }
    out
}

/// Albums referenced only through the overlay, looked up one by one.
///
/// Albums that no longer exist or whose lookup fails are skipped. The result
/// is ordered newest repost first.
pub async fn fetch_overlay_only_albums(
    store: &dyn RelationStore,
    overlay: &RepostOverlay,
    known: &[Album],
    metrics: &TimelineMetrics,
) -> Vec<Album> {
    let known_ids: HashSet<&str> = known.iter().map(|a| a.id.as_str()).collect();
    let mut missing: Vec<&Repost> = overlay
        .values()
        .filter(|r| !known_ids.contains(r.album_id.as_str()))
        .collect();
    missing.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.album_id.cmp(&b.album_id))
    });

    let lookups = missing.iter().map(|r| {
        fetch_with_default(
            "overlay album",
            Degraded::Overlay,
            metrics,
            None,
            store.get_album(&r.album_id),
        )
    });
    let found: Vec<Album> = join_all(lookups).await.into_iter().flatten().collect();
    debug!(missing = missing.len(), found = found.len(), "overlay-only albums fetched");
    found
}
