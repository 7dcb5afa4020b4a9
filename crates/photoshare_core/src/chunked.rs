/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use futures_util::future::try_join_all;
use std::future::Future;

/// Runs one query per chunk of `ids` concurrently and merges the results.
///
/// The store only orders rows consistently inside a single "in" query, so the
/// concatenated chunks are re-sorted by `key` (descending, stable) and cut to
/// `limit`. An empty `ids` slice never reaches `fetch`.
pub async fn fetch_chunked<T, K, F, Fut>(
    ids: &[String],
    chunk_size: usize,
    limit: usize,
    key: K,
    fetch: F,
) -> Result<Vec<T>>
where
    K: Fn(&T) -> i64,
    F: Fn(Vec<String>) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    if ids.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }
    let chunk_size = chunk_size.max(1);
    let chunks = ids.chunks(chunk_size).map(|c| fetch(c.to_vec()));
    let mut merged: Vec<T> = try_join_all(chunks).await?.into_iter().flatten().collect();
    merged.sort_by_key(|item| std::cmp::Reverse(key(item)));
    merged.truncate(limit);
    Ok(merged)
}
