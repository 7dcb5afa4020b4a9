/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use async_trait::async_trait;
use photoshare_protocol::{Album, Comment, Friend, Image, Reaction, Repost, UserRef};

/// Maximum number of values a single "in" filter may carry.
pub const IN_FILTER_MAX: usize = 10;

/// Read side of the document store the timeline is assembled from.
///
/// Every "in" style query (`albums_by_owners`, `reposts_by_users`) accepts at
/// most [`IN_FILTER_MAX`] ids; callers chunk larger sets and merge the results
/// themselves because ordering is only consistent within a single call.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Albums whose owner is in `owner_ids`, newest first, at most `limit`.
    async fn albums_by_owners(&self, owner_ids: &[String], limit: u32) -> Result<Vec<Album>>;

    /// Newest albums with no owner restriction.
    async fn latest_albums(&self, limit: u32) -> Result<Vec<Album>>;

    async fn get_album(&self, album_id: &str) -> Result<Option<Album>>;

    async fn images_for_album(&self, album_id: &str) -> Result<Vec<Image>>;

    async fn comments_for_album(&self, album_id: &str) -> Result<Vec<Comment>>;

    async fn count_likes(&self, album_id: &str) -> Result<u64>;

    async fn has_liked(&self, album_id: &str, user_id: &str) -> Result<bool>;

    async fn reactions_for_album(&self, album_id: &str) -> Result<Vec<Reaction>>;

    async fn count_reposts(&self, album_id: &str) -> Result<u64>;

    async fn has_reposted(&self, album_id: &str, user_id: &str) -> Result<bool>;

    async fn get_repost(&self, album_id: &str, user_id: &str) -> Result<Option<Repost>>;

    /// Reposts authored by any of `user_ids`, newest first, at most `limit`.
    async fn reposts_by_users(&self, user_ids: &[String], limit: u32) -> Result<Vec<Repost>>;

    /// Accepted friend edges with `user_id` on either end.
    async fn accepted_friend_edges(&self, user_id: &str) -> Result<Vec<Friend>>;

    async fn watched_owner_ids(&self, watcher_id: &str) -> Result<Vec<String>>;

    async fn get_user(&self, uid: &str) -> Result<Option<UserRef>>;
}

pub(crate) fn check_in_filter(ids: &[String]) -> Result<()> {
    if ids.len() > IN_FILTER_MAX {
        anyhow::bail!(
            "in filter supports at most {IN_FILTER_MAX} values, got {}",
            ids.len()
        );
    }
    Ok(())
}
