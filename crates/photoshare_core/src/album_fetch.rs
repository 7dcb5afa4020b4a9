/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::chunked::fetch_chunked;
use crate::relation_store::RelationStore;
use anyhow::{Context, Result};
use photoshare_protocol::{millis_or_epoch, Album};

/// Newest `limit` albums owned by anyone in `scope`.
///
/// An empty scope returns nothing; the unrestricted query belongs to the
/// anonymous path only. Errors propagate: there is no usable timeline without
/// the albums themselves.
pub async fn fetch_scoped_albums(
    store: &dyn RelationStore,
    scope: &[String],
    limit: u32,
    chunk_size: usize,
) -> Result<Vec<Album>> {
    fetch_chunked(
        scope,
        chunk_size,
        limit as usize,
        |a: &Album| millis_or_epoch(a.created_at),
        |chunk| async move { store.albums_by_owners(&chunk, limit).await },
    )
    .await
    .context("fetch albums for scope")
}
