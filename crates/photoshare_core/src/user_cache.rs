/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::relation_store::RelationStore;
use crate::timeline_metrics::TimelineMetrics;
use anyhow::Result;
use photoshare_protocol::UserRef;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// User reference memo scoped to one timeline build.
///
/// Albums that share an owner, commenter or reposter resolve the user once.
/// Concurrent misses for the same uid wait on the same lookup. A failed lookup
/// is not memoized, so the next caller retries it. The cache is dropped with
/// the build; nothing is shared across requests.
pub struct UserRefCache<'a> {
    store: &'a dyn RelationStore,
    metrics: &'a TimelineMetrics,
    entries: Mutex<HashMap<String, Arc<OnceCell<Option<UserRef>>>>>,
}

impl<'a> UserRefCache<'a> {
    pub fn new(store: &'a dyn RelationStore, metrics: &'a TimelineMetrics) -> Self {
        Self {
            store,
            metrics,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, uid: &str) -> Result<Option<UserRef>> {
        let cell = {
            let mut g = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            g.entry(uid.to_string()).or_default().clone()
        };
        let mut looked_up = false;
        let user = cell
            .get_or_try_init(|| {
                looked_up = true;
                self.metrics.user_cache_miss();
                self.store.get_user(uid)
            })
            .await?;
        if !looked_up {
            self.metrics.user_cache_hit();
        }
        Ok(user.clone())
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|c| c.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
