/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Which class of non-critical fetch was replaced by its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degraded {
    Scope,
    Overlay,
    Field,
}

#[derive(Default)]
pub struct TimelineMetrics {
    pub runs: AtomicU64,
    pub failed_runs: AtomicU64,
    pub albums_served: AtomicU64,
    pub last_run_ms: AtomicU64,
    pub last_duration_ms: AtomicU64,

    pub scope_degraded: AtomicU64,
    pub overlay_degraded: AtomicU64,
    pub field_degraded: AtomicU64,

    pub user_cache_hits: AtomicU64,
    pub user_cache_misses: AtomicU64,

    last_error: Mutex<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineMetricsSnapshot {
    pub runs: u64,
    pub failed_runs: u64,
    pub albums_served: u64,
    pub last_run_ms: u64,
    pub last_duration_ms: u64,
    pub scope_degraded: u64,
    pub overlay_degraded: u64,
    pub field_degraded: u64,
    pub user_cache_hits: u64,
    pub user_cache_misses: u64,
    pub last_error: Option<String>,
}

impl TimelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_ok(&self, albums: usize, duration_ms: u64) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.albums_served.fetch_add(albums as u64, Ordering::Relaxed);
        self.last_run_ms.store(now_ms(), Ordering::Relaxed);
        self.last_duration_ms.store(duration_ms, Ordering::Relaxed);
    }

    pub fn run_failed(&self, err: String) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.failed_runs.fetch_add(1, Ordering::Relaxed);
        self.last_run_ms.store(now_ms(), Ordering::Relaxed);
        let mut g = self.last_error.lock().unwrap_or_else(|e| e.into_inner());
        *g = Some(err);
    }

    pub fn degraded(&self, kind: Degraded) {
        let counter = match kind {
            Degraded::Scope => &self.scope_degraded,
            Degraded::Overlay => &self.overlay_degraded,
            Degraded::Field => &self.field_degraded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn user_cache_hit(&self) {
        self.user_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn user_cache_miss(&self) {
        self.user_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TimelineMetricsSnapshot {
        TimelineMetricsSnapshot {
            runs: self.runs.load(Ordering::Relaxed),
            failed_runs: self.failed_runs.load(Ordering::Relaxed),
            albums_served: self.albums_served.load(Ordering::Relaxed),
            last_run_ms: self.last_run_ms.load(Ordering::Relaxed),
            last_duration_ms: self.last_duration_ms.load(Ordering::Relaxed),
            scope_degraded: self.scope_degraded.load(Ordering::Relaxed),
            overlay_degraded: self.overlay_degraded.load(Ordering::Relaxed),
            field_degraded: self.field_degraded.load(Ordering::Relaxed),
            user_cache_hits: self.user_cache_hits.load(Ordering::Relaxed),
            user_cache_misses: self.user_cache_misses.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }
}
