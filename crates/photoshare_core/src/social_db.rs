/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::relation_store::{check_in_filter, RelationStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use photoshare_protocol::{
    Album, Comment, Friend, FriendStatus, Image, Reaction, Repost, Timestamp, UserRef,
};
use rand::{rngs::OsRng, RngCore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Upload cap per (album, uploader) pair.
pub const MAX_IMAGES_PER_UPLOADER: u32 = 4;
pub const MAX_COMMENT_CHARS: usize = 200;

#[derive(Clone)]
pub struct SocialDb {
    path: PathBuf,
}

impl SocialDb {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&path).with_context(|| format!("open db: {}", path.display()))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS users (
              uid TEXT PRIMARY KEY,
              handle TEXT NOT NULL,
              icon_url TEXT NULL,
              display_name TEXT NULL,
              updated_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_users_handle ON users(handle);

            CREATE TABLE IF NOT EXISTS albums (
              id TEXT PRIMARY KEY,
              owner_id TEXT NOT NULL,
              title TEXT NULL,
              place_url TEXT NULL,
              created_at_ms INTEGER NOT NULL,
              updated_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_albums_owner_created ON albums(owner_id, created_at_ms DESC);
            CREATE INDEX IF NOT EXISTS idx_albums_created ON albums(created_at_ms DESC);

            CREATE TABLE IF NOT EXISTS images (
              id TEXT PRIMARY KEY,
              album_id TEXT NOT NULL,
              uploader_id TEXT NOT NULL,
              url TEXT NOT NULL,
              thumb_url TEXT NULL,
              created_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_images_album ON images(album_id, created_at_ms);

            CREATE TABLE IF NOT EXISTS comments (
              id TEXT PRIMARY KEY,
              album_id TEXT NOT NULL,
              user_id TEXT NOT NULL,
              body TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_comments_album ON comments(album_id, created_at_ms);

            CREATE TABLE IF NOT EXISTS likes (
              album_id TEXT NOT NULL,
              user_id TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              PRIMARY KEY(album_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS reactions (
              album_id TEXT NOT NULL,
              user_id TEXT NOT NULL,
              emoji TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              PRIMARY KEY(album_id, user_id, emoji)
            );

            CREATE TABLE IF NOT EXISTS reposts (
              album_id TEXT NOT NULL,
              user_id TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              PRIMARY KEY(album_id, user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_reposts_user_created ON reposts(user_id, created_at_ms DESC);

            -- One edge per friendship, id = requester_target.
            CREATE TABLE IF NOT EXISTS friends (
              id TEXT PRIMARY KEY,
              user_id TEXT NOT NULL,
              target_id TEXT NOT NULL,
              status INTEGER NOT NULL,
              created_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_friends_user ON friends(user_id, status);
            CREATE INDEX IF NOT EXISTS idx_friends_target ON friends(target_id, status);

            CREATE TABLE IF NOT EXISTS watches (
              watcher_id TEXT NOT NULL,
              owner_id TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              PRIMARY KEY(watcher_id, owner_id)
            );
            "#,
        )?;
        Ok(Self { path })
    }

    pub fn health_check(&self) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    pub fn new_id(&self) -> String {
        let mut b = [0u8; 16];
        OsRng.fill_bytes(&mut b);
        b.iter().map(|v| format!("{v:02x}")).collect()
    }

    pub fn upsert_user(&self, user: &UserRef) -> Result<()> {
        let uid = user.uid.trim();
        if uid.is_empty() {
            anyhow::bail!("user uid is empty");
        }
        let conn = Connection::open(&self.path)?;
        conn.execute(
            r#"
            INSERT INTO users(uid, handle, icon_url, display_name, updated_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(uid) DO UPDATE SET
              handle=excluded.handle,
              icon_url=excluded.icon_url,
              display_name=excluded.display_name,
              updated_at_ms=excluded.updated_at_ms
            "#,
            params![uid, user.handle, user.icon_url, user.display_name, now_ms()],
        )?;
        Ok(())
    }

    pub fn get_user(&self, uid: &str) -> Result<Option<UserRef>> {
        let conn = Connection::open(&self.path)?;
        let row = conn
            .query_row(
                "SELECT uid, handle, icon_url, display_name FROM users WHERE uid=?1",
                params![uid],
                user_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Case-insensitive handle prefix search, shortest handles first.
    pub fn search_users_by_handle_prefix(&self, prefix: &str, limit: u32) -> Result<Vec<UserRef>> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(vec![]);
        }
        let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT uid, handle, icon_url, display_name
            FROM users
            WHERE lower(handle) LIKE ?1 ESCAPE '\'
            ORDER BY length(handle) ASC, handle ASC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![format!("{escaped}%"), limit.clamp(1, 200)], user_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn create_album(&self, owner_id: &str, title: Option<&str>, place_url: Option<&str>) -> Result<Album> {
        self.create_album_at(owner_id, title, place_url, Timestamp::now())
    }

    pub fn create_album_at(
        &self,
        owner_id: &str,
        title: Option<&str>,
        place_url: Option<&str>,
        created_at: Timestamp,
    ) -> Result<Album> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            anyhow::bail!("album owner is empty");
        }
        let album = Album {
            id: self.new_id(),
            owner_id: owner_id.to_string(),
            title: non_empty(title),
            place_url: non_empty(place_url),
            created_at: Some(created_at),
            updated_at: Some(created_at),
        };
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "INSERT INTO albums(id, owner_id, title, place_url, created_at_ms, updated_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![album.id, album.owner_id, album.title, album.place_url, created_at.as_millis()],
        )?;
        Ok(album)
    }

    /// Title and place edits. Returns false when the album does not exist.
    pub fn update_album(&self, album_id: &str, title: Option<&str>, place_url: Option<&str>) -> Result<bool> {
        let conn = Connection::open(&self.path)?;
        let n = conn.execute(
            "UPDATE albums SET title=?2, place_url=?3, updated_at_ms=?4 WHERE id=?1",
            params![album_id, non_empty(title), non_empty(place_url), now_ms()],
        )?;
        Ok(n > 0)
    }

    pub fn delete_album(&self, album_id: &str) -> Result<()> {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM images WHERE album_id=?1", params![album_id])?;
        tx.execute("DELETE FROM comments WHERE album_id=?1", params![album_id])?;
        tx.execute("DELETE FROM likes WHERE album_id=?1", params![album_id])?;
        tx.execute("DELETE FROM reactions WHERE album_id=?1", params![album_id])?;
        tx.execute("DELETE FROM reposts WHERE album_id=?1", params![album_id])?;
        tx.execute("DELETE FROM albums WHERE id=?1", params![album_id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_album(&self, album_id: &str) -> Result<Option<Album>> {
        let conn = Connection::open(&self.path)?;
        let row = conn
            .query_row(
                "SELECT id, owner_id, title, place_url, created_at_ms, updated_at_ms FROM albums WHERE id=?1",
                params![album_id],
                album_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_albums_by_owners(&self, owner_ids: &[String], limit: u32) -> Result<Vec<Album>> {
        check_in_filter(owner_ids)?;
        if owner_ids.is_empty() {
            return Ok(vec![]);
        }
        let conn = Connection::open(&self.path)?;
        let placeholders = in_placeholders(owner_ids.len());
        let sql = format!(
            "SELECT id, owner_id, title, place_url, created_at_ms, updated_at_ms
             FROM albums
             WHERE owner_id IN ({placeholders})
             ORDER BY created_at_ms DESC
             LIMIT ?{}",
            owner_ids.len() + 1
        );
        let mut params_vec: Vec<rusqlite::types::Value> = owner_ids
            .iter()
            .map(|id| rusqlite::types::Value::from(id.clone()))
            .collect();
        params_vec.push(rusqlite::types::Value::from(limit as i64));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec), album_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_latest_albums(&self, limit: u32) -> Result<Vec<Album>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, owner_id, title, place_url, created_at_ms, updated_at_ms
            FROM albums
            ORDER BY created_at_ms DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], album_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn add_image(&self, album_id: &str, uploader_id: &str, url: &str, thumb_url: Option<&str>) -> Result<Image> {
        self.add_image_at(album_id, uploader_id, url, thumb_url, Timestamp::now())
    }

    pub fn add_image_at(
        &self,
        album_id: &str,
        uploader_id: &str,
        url: &str,
        thumb_url: Option<&str>,
        created_at: Timestamp,
    ) -> Result<Image> {
        let url = url.trim();
        if url.is_empty() {
            anyhow::bail!("image url is empty");
        }
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;
        let album_exists: bool = tx
            .query_row("SELECT 1 FROM albums WHERE id=?1", params![album_id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        if !album_exists {
            anyhow::bail!("album not found: {album_id}");
        }
        let existing: u32 = tx.query_row(
            "SELECT COUNT(*) FROM images WHERE album_id=?1 AND uploader_id=?2",
            params![album_id, uploader_id],
            |r| r.get(0),
        )?;
        if existing >= MAX_IMAGES_PER_UPLOADER {
            anyhow::bail!("image limit reached: {MAX_IMAGES_PER_UPLOADER} per uploader per album");
        }
        let image = Image {
            id: self.new_id(),
            album_id: album_id.to_string(),
            uploader_id: Some(uploader_id.to_string()),
            url: url.to_string(),
            thumb_url: non_empty(thumb_url),
            created_at: Some(created_at),
        };
        tx.execute(
            "INSERT INTO images(id, album_id, uploader_id, url, thumb_url, created_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![image.id, image.album_id, uploader_id, image.url, image.thumb_url, created_at.as_millis()],
        )?;
        tx.commit()?;
        Ok(image)
    }

    pub fn list_images(&self, album_id: &str) -> Result<Vec<Image>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, album_id, uploader_id, url, thumb_url, created_at_ms
            FROM images
            WHERE album_id=?1
            ORDER BY created_at_ms ASC
            "#,
        )?;
        let rows = stmt.query_map(params![album_id], |r| {
            Ok(Image {
                id: r.get(0)?,
                album_id: r.get(1)?,
                uploader_id: r.get(2)?,
                url: r.get(3)?,
                thumb_url: r.get(4)?,
                created_at: Some(Timestamp::from_millis(r.get(5)?)),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn add_comment(&self, album_id: &str, user_id: &str, body: &str) -> Result<Comment> {
        self.add_comment_at(album_id, user_id, body, Timestamp::now())
    }

    pub fn add_comment_at(&self, album_id: &str, user_id: &str, body: &str, created_at: Timestamp) -> Result<Comment> {
        let body = body.trim();
        if body.is_empty() {
            anyhow::bail!("comment body is empty");
        }
        let chars = body.chars().count();
        if chars > MAX_COMMENT_CHARS {
            anyhow::bail!("comment too long: {chars} > {MAX_COMMENT_CHARS} characters");
        }
        let comment = Comment {
            id: self.new_id(),
            album_id: album_id.to_string(),
            user_id: user_id.to_string(),
            body: body.to_string(),
            created_at: Some(created_at),
        };
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "INSERT INTO comments(id, album_id, user_id, body, created_at_ms) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![comment.id, comment.album_id, comment.user_id, comment.body, created_at.as_millis()],
        )?;
        Ok(comment)
    }

    pub fn delete_comment(&self, comment_id: &str) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute("DELETE FROM comments WHERE id=?1", params![comment_id])?;
        Ok(())
    }

    pub fn list_comments(&self, album_id: &str) -> Result<Vec<Comment>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, album_id, user_id, body, created_at_ms
            FROM comments
            WHERE album_id=?1
            ORDER BY created_at_ms ASC
            "#,
        )?;
        let rows = stmt.query_map(params![album_id], |r| {
            Ok(Comment {
                id: r.get(0)?,
                album_id: r.get(1)?,
                user_id: r.get(2)?,
                body: r.get(3)?,
                created_at: Some(Timestamp::from_millis(r.get(4)?)),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn like(&self, album_id: &str, user_id: &str) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "INSERT OR IGNORE INTO likes(album_id, user_id, created_at_ms) VALUES (?1, ?2, ?3)",
            params![album_id, user_id, now_ms()],
        )?;
        Ok(())
    }

    pub fn unlike(&self, album_id: &str, user_id: &str) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "DELETE FROM likes WHERE album_id=?1 AND user_id=?2",
            params![album_id, user_id],
        )?;
        Ok(())
    }

    pub fn count_likes(&self, album_id: &str) -> Result<u64> {
        let conn = Connection::open(&self.path)?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE album_id=?1",
            params![album_id],
            |r| r.get(0),
        )?;
        Ok(n.max(0) as u64)
    }

    pub fn has_liked(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let conn = Connection::open(&self.path)?;
        let row = conn
            .query_row(
                "SELECT 1 FROM likes WHERE album_id=?1 AND user_id=?2",
                params![album_id, user_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(row.is_some())
    }

    pub fn add_reaction(&self, album_id: &str, user_id: &str, emoji: &str) -> Result<()> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            anyhow::bail!("reaction emoji is empty");
        }
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "INSERT OR IGNORE INTO reactions(album_id, user_id, emoji, created_at_ms) VALUES (?1, ?2, ?3, ?4)",
            params![album_id, user_id, emoji, now_ms()],
        )?;
        Ok(())
    }

    pub fn remove_reaction(&self, album_id: &str, user_id: &str, emoji: &str) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "DELETE FROM reactions WHERE album_id=?1 AND user_id=?2 AND emoji=?3",
            params![album_id, user_id, emoji.trim()],
        )?;
        Ok(())
    }

    pub fn list_reactions(&self, album_id: &str) -> Result<Vec<Reaction>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT album_id, user_id, emoji, created_at_ms
            FROM reactions
            WHERE album_id=?1
            ORDER BY created_at_ms ASC
            "#,
        )?;
        let rows = stmt.query_map(params![album_id], |r| {
            Ok(Reaction {
                album_id: r.get(0)?,
                user_id: r.get(1)?,
                emoji: r.get(2)?,
                created_at: Some(Timestamp::from_millis(r.get(3)?)),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn repost(&self, album_id: &str, user_id: &str) -> Result<Repost> {
        self.repost_at(album_id, user_id, Timestamp::now())
    }

    /// Re-reposting an album refreshes the repost time.
    pub fn repost_at(&self, album_id: &str, user_id: &str, created_at: Timestamp) -> Result<Repost> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "INSERT OR REPLACE INTO reposts(album_id, user_id, created_at_ms) VALUES (?1, ?2, ?3)",
            params![album_id, user_id, created_at.as_millis()],
        )?;
        Ok(Repost {
            album_id: album_id.to_string(),
            user_id: user_id.to_string(),
            created_at,
        })
    }

    pub fn unrepost(&self, album_id: &str, user_id: &str) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "DELETE FROM reposts WHERE album_id=?1 AND user_id=?2",
            params![album_id, user_id],
        )?;
        Ok(())
    }

    pub fn count_reposts(&self, album_id: &str) -> Result<u64> {
        let conn = Connection::open(&self.path)?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM reposts WHERE album_id=?1",
            params![album_id],
            |r| r.get(0),
        )?;
        Ok(n.max(0) as u64)
    }

    pub fn get_repost(&self, album_id: &str, user_id: &str) -> Result<Option<Repost>> {
        let conn = Connection::open(&self.path)?;
        let row = conn
            .query_row(
                "SELECT album_id, user_id, created_at_ms FROM reposts WHERE album_id=?1 AND user_id=?2",
                params![album_id, user_id],
                repost_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_reposts_by_users(&self, user_ids: &[String], limit: u32) -> Result<Vec<Repost>> {
        check_in_filter(user_ids)?;
        if user_ids.is_empty() {
            return Ok(vec![]);
        }
        let conn = Connection::open(&self.path)?;
        let placeholders = in_placeholders(user_ids.len());
        let sql = format!(
            "SELECT album_id, user_id, created_at_ms
             FROM reposts
             WHERE user_id IN ({placeholders})
             ORDER BY created_at_ms DESC
             LIMIT ?{}",
            user_ids.len() + 1
        );
        let mut params_vec: Vec<rusqlite::types::Value> = user_ids
            .iter()
            .map(|id| rusqlite::types::Value::from(id.clone()))
            .collect();
        params_vec.push(rusqlite::types::Value::from(limit as i64));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec), repost_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Creates a pending edge `user_id -> target_id`. A pending request in the
    /// opposite direction is accepted instead of creating a second edge.
    pub fn send_friend_request(&self, user_id: &str, target_id: &str) -> Result<Friend> {
        if user_id == target_id {
            anyhow::bail!("cannot befriend yourself");
        }
        if let Some(reverse) = self.get_friend_edge(target_id, user_id)? {
            if reverse.status == FriendStatus::Pending {
                self.accept_friend_request(target_id, user_id)?;
            }
            return self
                .get_friend_edge(target_id, user_id)?
                .context("friend edge vanished");
        }
        let id = Friend::edge_id(user_id, target_id);
        let created_at = Timestamp::now();
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "INSERT OR IGNORE INTO friends(id, user_id, target_id, status, created_at_ms) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user_id, target_id, FriendRow::Pending as u32, created_at.as_millis()],
        )?;
        self.get_friend_edge(user_id, target_id)?
            .context("friend edge missing after insert")
    }

    /// Accepts the request `requester_id -> target_id`. Returns false if there was none.
    pub fn accept_friend_request(&self, requester_id: &str, target_id: &str) -> Result<bool> {
        let conn = Connection::open(&self.path)?;
        let n = conn.execute(
            "UPDATE friends SET status=?2 WHERE id=?1",
            params![Friend::edge_id(requester_id, target_id), FriendRow::Accepted as u32],
        )?;
        Ok(n > 0)
    }

    /// Removes the friendship regardless of which side created the edge.
    pub fn remove_friend(&self, user_id: &str, other_id: &str) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "DELETE FROM friends WHERE id=?1 OR id=?2",
            params![Friend::edge_id(user_id, other_id), Friend::edge_id(other_id, user_id)],
        )?;
        Ok(())
    }

    pub fn get_friend_edge(&self, user_id: &str, target_id: &str) -> Result<Option<Friend>> {
        let conn = Connection::open(&self.path)?;
        let row = conn
            .query_row(
                "SELECT id, user_id, target_id, status, created_at_ms FROM friends WHERE id=?1",
                params![Friend::edge_id(user_id, target_id)],
                friend_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn list_accepted_friend_edges(&self, user_id: &str) -> Result<Vec<Friend>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, target_id, status, created_at_ms
            FROM friends
            WHERE (user_id=?1 OR target_id=?1) AND status=?2
            ORDER BY created_at_ms ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id, FriendRow::Accepted as u32], friend_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn watch(&self, watcher_id: &str, owner_id: &str) -> Result<()> {
        if watcher_id == owner_id {
            anyhow::bail!("cannot watch yourself");
        }
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "INSERT OR IGNORE INTO watches(watcher_id, owner_id, created_at_ms) VALUES (?1, ?2, ?3)",
            params![watcher_id, owner_id, now_ms()],
        )?;
        Ok(())
    }

    pub fn unwatch(&self, watcher_id: &str, owner_id: &str) -> Result<()> {
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "DELETE FROM watches WHERE watcher_id=?1 AND owner_id=?2",
            params![watcher_id, owner_id],
        )?;
        Ok(())
    }

    pub fn list_watched_owner_ids(&self, watcher_id: &str) -> Result<Vec<String>> {
        let conn = Connection::open(&self.path)?;
        let mut stmt = conn.prepare(
            "SELECT owner_id FROM watches WHERE watcher_id=?1 ORDER BY created_at_ms ASC",
        )?;
        let rows = stmt.query_map(params![watcher_id], |r| r.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SocialDb) -> Result<T> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

#[async_trait]
impl RelationStore for SocialDb {
    async fn albums_by_owners(&self, owner_ids: &[String], limit: u32) -> Result<Vec<Album>> {
        let ids = owner_ids.to_vec();
        self.blocking(move |db| db.list_albums_by_owners(&ids, limit)).await
    }

    async fn latest_albums(&self, limit: u32) -> Result<Vec<Album>> {
        self.blocking(move |db| db.list_latest_albums(limit)).await
    }

    async fn get_album(&self, album_id: &str) -> Result<Option<Album>> {
        let album_id = album_id.to_string();
        self.blocking(move |db| db.get_album(&album_id)).await
    }

    async fn images_for_album(&self, album_id: &str) -> Result<Vec<Image>> {
        let album_id = album_id.to_string();
        self.blocking(move |db| db.list_images(&album_id)).await
    }

    async fn comments_for_album(&self, album_id: &str) -> Result<Vec<Comment>> {
        let album_id = album_id.to_string();
        self.blocking(move |db| db.list_comments(&album_id)).await
    }

    async fn count_likes(&self, album_id: &str) -> Result<u64> {
        let album_id = album_id.to_string();
        self.blocking(move |db| db.count_likes(&album_id)).await
    }

    async fn has_liked(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let (album_id, user_id) = (album_id.to_string(), user_id.to_string());
        self.blocking(move |db| db.has_liked(&album_id, &user_id)).await
    }

    async fn reactions_for_album(&self, album_id: &str) -> Result<Vec<Reaction>> {
        let album_id = album_id.to_string();
        self.blocking(move |db| db.list_reactions(&album_id)).await
    }

    async fn count_reposts(&self, album_id: &str) -> Result<u64> {
        let album_id = album_id.to_string();
        self.blocking(move |db| db.count_reposts(&album_id)).await
    }

    async fn has_reposted(&self, album_id: &str, user_id: &str) -> Result<bool> {
        let (album_id, user_id) = (album_id.to_string(), user_id.to_string());
        self.blocking(move |db| Ok(db.get_repost(&album_id, &user_id)?.is_some()))
            .await
    }

    async fn get_repost(&self, album_id: &str, user_id: &str) -> Result<Option<Repost>> {
        let (album_id, user_id) = (album_id.to_string(), user_id.to_string());
        self.blocking(move |db| db.get_repost(&album_id, &user_id)).await
    }

    async fn reposts_by_users(&self, user_ids: &[String], limit: u32) -> Result<Vec<Repost>> {
        let ids = user_ids.to_vec();
        self.blocking(move |db| db.list_reposts_by_users(&ids, limit)).await
    }

    async fn accepted_friend_edges(&self, user_id: &str) -> Result<Vec<Friend>> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.list_accepted_friend_edges(&user_id)).await
    }

    async fn watched_owner_ids(&self, watcher_id: &str) -> Result<Vec<String>> {
        let watcher_id = watcher_id.to_string();
        self.blocking(move |db| db.list_watched_owner_ids(&watcher_id)).await
    }

    async fn get_user(&self, uid: &str) -> Result<Option<UserRef>> {
        let uid = uid.to_string();
        self.blocking(move |db| db.get_user(&uid)).await
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy)]
enum FriendRow {
    Pending = 0,
    Accepted = 1,
}

fn album_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: r.get(0)?,
        owner_id: r.get(1)?,
        title: r.get(2)?,
        place_url: r.get(3)?,
        created_at: Some(Timestamp::from_millis(r.get(4)?)),
        updated_at: Some(Timestamp::from_millis(r.get(5)?)),
    })
}

fn repost_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Repost> {
    Ok(Repost {
        album_id: r.get(0)?,
        user_id: r.get(1)?,
        created_at: Timestamp::from_millis(r.get(2)?),
    })
}

fn friend_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<Friend> {
    let status: u32 = r.get(3)?;
    Ok(Friend {
        id: r.get(0)?,
        user_id: r.get(1)?,
        target_id: r.get(2)?,
        status: if status == FriendRow::Accepted as u32 {
            FriendStatus::Accepted
        } else {
            FriendStatus::Pending
        },
        created_at: Some(Timestamp::from_millis(r.get(4)?)),
    })
}

fn user_from_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<UserRef> {
    Ok(UserRef {
        uid: r.get(0)?,
        handle: r.get(1)?,
        icon_url: r.get(2)?,
        display_name: r.get(3)?,
    })
}

fn in_placeholders(n: usize) -> String {
    (0..n)
        .map(|idx| format!("?{}", idx + 1))
        .collect::<Vec<_>>()
        .join(",")
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
