/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod album_fetch;
pub mod chunked;
pub mod config;
pub mod enrich;
pub mod fallible;
pub mod rank;
pub mod relation_store;
pub mod repost_overlay;
pub mod scope;
pub mod service;
pub mod social_db;
pub mod timeline;
pub mod timeline_metrics;
pub mod user_cache;

pub use relation_store::{RelationStore, IN_FILTER_MAX};
pub use social_db::SocialDb;
pub use timeline::list_latest_albums_vm;
