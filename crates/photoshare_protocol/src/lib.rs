/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::{Deserialize, Serialize};

mod timestamp;

pub use timestamp::{millis_or_epoch, normalize_millis, Timestamp, SECONDS_MAGNITUDE_MAX};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub album_id: String,
    #[serde(default)]
    pub uploader_id: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub album_id: String,
    pub user_id: String,
    pub body: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Existence is the signal; there is no stored counter.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub album_id: String,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub album_id: String,
    pub user_id: String,
    pub emoji: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Repost {
    pub album_id: String,
    pub user_id: String,
    #[serde(default)]
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
}

/// One stored edge per friendship, created by the requester.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: String,
    pub user_id: String,
    pub target_id: String,
    pub status: FriendStatus,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Friend {
    pub fn edge_id(user_id: &str, target_id: &str) -> String {
        format!("{user_id}_{target_id}")
    }

    /// The endpoint that is not `viewer`, if `viewer` is on this edge at all.
    pub fn other_side(&self, viewer: &str) -> Option<&str> {
        if self.user_id == viewer {
            Some(&self.target_id)
        } else if self.target_id == viewer {
            Some(&self.user_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Watch {
    pub watcher_id: String,
    pub owner_id: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// Display projection of a user, never persisted on its own.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub uid: String,
    pub handle: String,
    #[serde(rename = "iconURL", default)]
    pub icon_url: Option<String>,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: u64,
    pub mine: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentPreview {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: Option<UserRef>,
}

/// Badge for an album whose newest image was uploaded by someone other than the owner.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAdded {
    pub user_id: String,
    pub user: Option<UserRef>,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepostedBy {
    pub user_id: String,
    pub user: Option<UserRef>,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItemVm {
    pub album: Album,
    pub images: Vec<Image>,
    pub like_count: u64,
    pub liked: bool,
    pub repost_count: u64,
    pub reposted: bool,
    pub comment_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_comment: Option<Comment>,
    pub comments_preview: Vec<CommentPreview>,
    pub reactions: Vec<ReactionSummary>,
    pub owner: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_added: Option<ImageAdded>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reposted_by: Option<RepostedBy>,
}
