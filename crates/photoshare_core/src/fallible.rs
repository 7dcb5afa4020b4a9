/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::timeline_metrics::{Degraded, TimelineMetrics};
use anyhow::Result;
use std::future::Future;
use tracing::warn;

/// Awaits a non-critical fetch, replacing a failure with `default`.
///
/// The error is logged with its full chain and counted under `kind`; it never
/// reaches the caller.
pub async fn fetch_with_default<T, Fut>(
    what: &str,
    kind: Degraded,
    metrics: &TimelineMetrics,
    default: T,
    fut: Fut,
) -> T
where
    Fut: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(v) => v,
        Err(e) => {
            warn!(what, ?kind, "fetch failed, using default: {e:#}");
            metrics.degraded(kind);
            default
        }
    }
}
