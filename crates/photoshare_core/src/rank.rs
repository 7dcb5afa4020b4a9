/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use photoshare_protocol::{millis_or_epoch, TimelineItemVm};
use std::cmp::Reverse;

/// Most recent activity: the attributed repost time, else album creation.
pub fn activity_key(item: &TimelineItemVm) -> i64 {
    match &item.reposted_by {
        Some(r) => r.created_at.as_millis(),
        None => millis_or_epoch(item.album.created_at),
    }
}

/// Stable sort, most recent activity first.
pub fn rank_by_activity(items: &mut [TimelineItemVm]) {
    items.sort_by_key(|item| Reverse(activity_key(item)));
}
