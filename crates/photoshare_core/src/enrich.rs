/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::fallible::fetch_with_default;
use crate::relation_store::RelationStore;
use crate::timeline_metrics::{Degraded, TimelineMetrics};
use crate::user_cache::UserRefCache;
use anyhow::{Context, Result};
use futures_util::future::join_all;
use photoshare_protocol::{
    millis_or_epoch, Album, Comment, CommentPreview, Image, ImageAdded, Reaction, ReactionSummary,
    Repost, RepostedBy, Timestamp, TimelineItemVm, UserRef,
};
use std::collections::BTreeMap;

/// Shared, read-only inputs for enriching every album of one timeline build.
pub struct EnrichContext<'a> {
    pub store: &'a dyn RelationStore,
    pub viewer: Option<&'a str>,
    pub cache: &'a UserRefCache<'a>,
    pub metrics: &'a TimelineMetrics,
    pub preview_len: usize,
}

/// Builds the view model for one album.
///
/// Only the owner lookup is required; its failure propagates. Every other
/// fetch falls back to an empty, zero or false default.
pub async fn enrich_album(
    ctx: &EnrichContext<'_>,
    album: Album,
    overlay_entry: Option<&Repost>,
) -> Result<TimelineItemVm> {
    let store = ctx.store;
    let album_id = album.id.as_str();

    let images = fetch_with_default(
        "images",
        Degraded::Field,
        ctx.metrics,
        Vec::new(),
        store.images_for_album(album_id),
    );
    let comments = fetch_with_default(
        "comments",
        Degraded::Field,
        ctx.metrics,
        Vec::new(),
        store.comments_for_album(album_id),
    );
    let like_count = fetch_with_default("like count", Degraded::Field, ctx.metrics, 0, store.count_likes(album_id));
    let liked = fetch_with_default("liked flag", Degraded::Field, ctx.metrics, false, async {
        match ctx.viewer {
            Some(v) => store.has_liked(album_id, v).await,
            None => Ok(false),
        }
    });
    let reactions = fetch_with_default(
        "reactions",
        Degraded::Field,
        ctx.metrics,
        Vec::new(),
        store.reactions_for_album(album_id),
    );
    let reposted = fetch_with_default("reposted flag", Degraded::Field, ctx.metrics, false, async {
        match ctx.viewer {
            Some(v) => store.has_reposted(album_id, v).await,
            None => Ok(false),
        }
    });
    let repost_count = fetch_with_default(
        "repost count",
        Degraded::Field,
        ctx.metrics,
        0,
        store.count_reposts(album_id),
    );

    let (images, comments, like_count, liked, reactions, owner, repost_count, reposted) = tokio::join!(
        images,
        comments,
        like_count,
        liked,
        reactions,
        ctx.cache.get(&album.owner_id),
        repost_count,
        reposted,
    );
    let owner = owner.with_context(|| format!("owner {} of album {album_id}", album.owner_id))?;
    let comments = sort_comments(comments);

    let (comments_preview, image_added, reposted_by) = tokio::join!(
        preview_comments(ctx, &comments),
        image_added_badge(ctx, &images, &album.owner_id),
        reposted_by(ctx, album_id, overlay_entry, reposted),
    );

    Ok(TimelineItemVm {
        comment_count: comments.len() as u64,
        latest_comment: comments.last().cloned(),
        comments_preview,
        reactions: summarize_reactions(&reactions, ctx.viewer),
        like_count,
        liked,
        repost_count,
        reposted,
        owner,
        image_added,
        reposted_by,
        images,
        album,
    })
}

/// Oldest first; comments without a timestamp sort as epoch 0.
pub fn sort_comments(mut comments: Vec<Comment>) -> Vec<Comment> {
    comments.sort_by_key(|c| millis_or_epoch(c.created_at));
    comments
}

/// Last `n` of the ascending list, newest first.
pub fn preview_tail(sorted: &[Comment], n: usize) -> Vec<Comment> {
    sorted.iter().rev().take(n).cloned().collect()
}

async fn preview_comments(ctx: &EnrichContext<'_>, sorted: &[Comment]) -> Vec<CommentPreview> {
    let tail = preview_tail(sorted, ctx.preview_len);
    let users = join_all(tail.iter().map(|c| lookup_user(ctx, &c.user_id, "commenter"))).await;
    tail.into_iter()
        .zip(users)
        .map(|(comment, user)| CommentPreview { comment, user })
        .collect()
}

/// Uploader and time of the newest image that carries both, if that uploader
/// is not the album owner. On equal timestamps the first image wins.
pub fn foreign_upload(images: &[Image], owner_id: &str) -> Option<(String, Timestamp)> {
    let mut newest: Option<(&str, Timestamp)> = None;
    for img in images {
        let (Some(uploader), Some(ts)) = (img.uploader_id.as_deref(), img.created_at) else {
            continue;
        };
        if uploader.is_empty() {
            continue;
        }
        if newest.map_or(true, |(_, held)| ts > held) {
            newest = Some((uploader, ts));
        }
    }
    let (uploader, ts) = newest?;
    if uploader == owner_id {
        return None;
    }
    Some((uploader.to_string(), ts))
}

async fn image_added_badge(ctx: &EnrichContext<'_>, images: &[Image], owner_id: &str) -> Option<ImageAdded> {
    let (user_id, created_at) = foreign_upload(images, owner_id)?;
    let user = lookup_user(ctx, &user_id, "image uploader").await;
    Some(ImageAdded {
        user_id,
        user,
        created_at,
    })
}

/// Overlay entry first; otherwise the viewer's own repost, when the viewer has one.
async fn reposted_by(
    ctx: &EnrichContext<'_>,
    album_id: &str,
    overlay_entry: Option<&Repost>,
    viewer_reposted: bool,
) -> Option<RepostedBy> {
    let repost = match (overlay_entry, ctx.viewer) {
        (Some(r), _) => r.clone(),
        (None, Some(viewer)) if viewer_reposted => {
            fetch_with_default(
                "own repost",
                Degraded::Field,
                ctx.metrics,
                None,
                ctx.store.get_repost(album_id, viewer),
            )
            .await?
        }
        _ => return None,
    };
    let user = lookup_user(ctx, &repost.user_id, "reposter").await;
    Some(RepostedBy {
        user_id: repost.user_id,
        user,
        created_at: repost.created_at,
    })
}

async fn lookup_user(ctx: &EnrichContext<'_>, uid: &str, what: &str) -> Option<UserRef> {
    fetch_with_default(what, Degraded::Field, ctx.metrics, None, ctx.cache.get(uid)).await
}

/// One entry per emoji, most used first, then by emoji.
pub fn summarize_reactions(reactions: &[Reaction], viewer: Option<&str>) -> Vec<ReactionSummary> {
    let mut by_emoji: BTreeMap<&str, (u64, bool)> = BTreeMap::new();
    for r in reactions {
        let entry = by_emoji.entry(r.emoji.as_str()).or_default();
        entry.0 += 1;
        if viewer == Some(r.user_id.as_str()) {
            entry.1 = true;
        }
    }
    let mut out: Vec<ReactionSummary> = by_emoji
        .into_iter()
        .map(|(emoji, (count, mine))| ReactionSummary {
            emoji: emoji.to_string(),
            count,
            mine,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
