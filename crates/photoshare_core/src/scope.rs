/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::fallible::fetch_with_default;
use crate::relation_store::RelationStore;
use crate::timeline_metrics::{Degraded, TimelineMetrics};
use photoshare_protocol::Friend;
use std::collections::HashSet;
use tracing::debug;

/// Owners whose albums may appear on `viewer`'s timeline: the viewer, accepted
/// friends (either edge direction) and watched owners.
///
/// Never fails. A failed friend or watch lookup only shrinks the scope. The
/// viewer is always the first entry and ids are unique.
pub async fn resolve_scope(
    store: &dyn RelationStore,
    viewer: &str,
    metrics: &TimelineMetrics,
) -> Vec<String> {
    let (edges, watched) = tokio::join!(
        fetch_with_default(
            "accepted friend edges",
            Degraded::Scope,
            metrics,
            Vec::new(),
            store.accepted_friend_edges(viewer),
        ),
        fetch_with_default(
            "watched owners",
            Degraded::Scope,
            metrics,
            Vec::new(),
            store.watched_owner_ids(viewer),
        ),
    );
    let scope = merge_scope(viewer, &edges, &watched);
    debug!(viewer, friends = edges.len(), watched = watched.len(), scope = scope.len(), "scope resolved");
    scope
}

pub fn merge_scope(viewer: &str, edges: &[Friend], watched: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(1 + edges.len() + watched.len());
    seen.insert(viewer);
    out.push(viewer.to_string());

    let friends = edges.iter().filter_map(|e| e.other_side(viewer));
    for id in friends.chain(watched.iter().map(String::as_str)) {
        if id.is_empty() {
            continue;
        }
        if seen.insert(id) {
            out.push(id.to_string());
        }
    }
    out
}
