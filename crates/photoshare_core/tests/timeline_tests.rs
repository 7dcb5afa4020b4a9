/*
 * SPDX-FileCopyrightText: 2026 Photoshare Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use async_trait::async_trait;
use photoshare_core::album_fetch::fetch_scoped_albums;
use photoshare_core::config::TimelineConfig;
use photoshare_core::timeline_metrics::TimelineMetrics;
use photoshare_core::{list_latest_albums_vm, RelationStore, SocialDb, IN_FILTER_MAX};
use photoshare_protocol::{
    Album, Comment, Friend, Image, Reaction, Repost, Timestamp, TimelineItemVm, UserRef,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Delegates to a real `SocialDb` and injects failures on demand.
struct FlakyStore {
    db: SocialDb,
    failing: Mutex<HashSet<&'static str>>,
    failing_repost_count: Mutex<HashSet<String>>,
    user_lookups: AtomicUsize,
    largest_in_filter: AtomicUsize,
}

impl FlakyStore {
    fn new(db: SocialDb) -> Self {
        Self {
            db,
            failing: Mutex::new(HashSet::new()),
            failing_repost_count: Mutex::new(HashSet::new()),
            user_lookups: AtomicUsize::new(0),
            largest_in_filter: AtomicUsize::new(0),
        }
    }

    fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    fn fail_repost_count_for(&self, album_id: &str) {
        self.failing_repost_count.lock().unwrap().insert(album_id.to_string());
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(op) {
            anyhow::bail!("injected failure: {op}");
        }
        Ok(())
    }

    fn saw_in_filter(&self, n: usize) {
        self.largest_in_filter.fetch_max(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl RelationStore for FlakyStore {
    async fn albums_by_owners(&self, owner_ids: &[String], limit: u32) -> Result<Vec<Album>> {
        self.check("albums_by_owners")?;
        self.saw_in_filter(owner_ids.len());
        self.db.albums_by_owners(owner_ids, limit).await
    }

    async fn latest_albums(&self, limit: u32) -> Result<Vec<Album>> {
        self.check("latest_albums")?;
        self.db.latest_albums(limit).await
    }

    async fn get_album(&self, album_id: &str) -> Result<Option<Album>> {
        self.check("get_album")?;
        RelationStore::get_album(&self.db, album_id).await
    }

    async fn images_for_album(&self, album_id: &str) -> Result<Vec<Image>> {
        self.check("images_for_album")?;
        self.db.images_for_album(album_id).await
    }

    async fn comments_for_album(&self, album_id: &str) -> Result<Vec<Comment>> {
        self.check("comments_for_album")?;
        self.db.comments_for_album(album_id).await
    }

    async fn count_likes(&self, album_id: &str) -> Result<u64> {
        self.check("count_likes")?;
        RelationStore::count_likes(&self.db, album_id).await
    }

    async fn has_liked(&self, album_id: &str, user_id: &str) -> Result<bool> {
        self.check("has_liked")?;
        RelationStore::has_liked(&self.db, album_id, user_id).await
    }

    async fn reactions_for_album(&self, album_id: &str) -> Result<Vec<Reaction>> {
        self.check("reactions_for_album")?;
        self.db.reactions_for_album(album_id).await
    }

    async fn count_reposts(&self, album_id: &str) -> Result<u64> {
        self.check("count_reposts")?;
        if self.failing_repost_count.lock().unwrap().contains(album_id) {
            anyhow::bail!("injected failure: count_reposts({album_id})");
        }
        RelationStore::count_reposts(&self.db, album_id).await
    }

    async fn has_reposted(&self, album_id: &str, user_id: &str) -> Result<bool> {
        self.check("has_reposted")?;
        self.db.has_reposted(album_id, user_id).await
    }

    async fn get_repost(&self, album_id: &str, user_id: &str) -> Result<Option<Repost>> {
        self.check("get_repost")?;
        RelationStore::get_repost(&self.db, album_id, user_id).await
    }

    async fn reposts_by_users(&self, user_ids: &[String], limit: u32) -> Result<Vec<Repost>> {
        self.check("reposts_by_users")?;
        self.saw_in_filter(user_ids.len());
        self.db.reposts_by_users(user_ids, limit).await
    }

    async fn accepted_friend_edges(&self, user_id: &str) -> Result<Vec<Friend>> {
        self.check("accepted_friend_edges")?;
        self.db.accepted_friend_edges(user_id).await
    }

    async fn watched_owner_ids(&self, watcher_id: &str) -> Result<Vec<String>> {
        self.check("watched_owner_ids")?;
        self.db.watched_owner_ids(watcher_id).await
    }

    async fn get_user(&self, uid: &str) -> Result<Option<UserRef>> {
        self.check("get_user")?;
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        RelationStore::get_user(&self.db, uid).await
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    db: SocialDb,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = SocialDb::open(dir.path().join("social.db")).unwrap();
        Self { _dir: dir, db }
    }

    fn user(&self, uid: &str) {
        self.db
            .upsert_user(&UserRef {
                uid: uid.to_string(),
                handle: uid.to_string(),
                icon_url: Some(format!("https://cdn.example/{uid}.png")),
                display_name: Some(uid.to_uppercase()),
            })
            .unwrap();
    }

    fn friends(&self, a: &str, b: &str) {
        self.db.send_friend_request(a, b).unwrap();
        assert!(self.db.accept_friend_request(a, b).unwrap());
    }

    fn album(&self, owner: &str, ms: i64) -> Album {
        self.db
            .create_album_at(owner, Some("album"), None, Timestamp::from_millis(ms))
            .unwrap()
    }

    fn store(&self) -> FlakyStore {
        FlakyStore::new(self.db.clone())
    }
}

async fn timeline(store: &FlakyStore, viewer: &str) -> Vec<TimelineItemVm> {
    let metrics = TimelineMetrics::new();
    list_latest_albums_vm(store, Some(viewer), &TimelineConfig::default(), &metrics)
        .await
        .unwrap()
}

fn album_ids(items: &[TimelineItemVm]) -> Vec<&str> {
    items.iter().map(|i| i.album.id.as_str()).collect()
}

fn find<'a>(items: &'a [TimelineItemVm], album: &Album) -> &'a TimelineItemVm {
    items
        .iter()
        .find(|i| i.album.id == album.id)
        .expect("album on timeline")
}

#[tokio::test]
async fn chunked_album_fetch_matches_global_order() {
    let fx = Fixture::new();
    let owners: Vec<String> = (0..23).map(|i| format!("owner{i:02}")).collect();
    for (i, owner) in owners.iter().enumerate() {
        // Interleave creation times across owners so every chunk contributes.
        for k in 0..3 {
            fx.album(owner, 1_700_000_000_000 + (k * 100 + i as i64) * 1000);
        }
    }
    let store = fx.store();

    let limit = 20;
    let chunked = fetch_scoped_albums(&store, &owners, limit, IN_FILTER_MAX).await.unwrap();
    let expected = fx.db.list_latest_albums(limit).unwrap();

    assert_eq!(chunked.len(), limit as usize);
    assert_eq!(
        chunked.iter().map(|a| &a.id).collect::<Vec<_>>(),
        expected.iter().map(|a| &a.id).collect::<Vec<_>>()
    );
    assert!(store.largest_in_filter.load(Ordering::SeqCst) <= IN_FILTER_MAX);
}

#[tokio::test]
async fn empty_scope_fetches_nothing() {
    let fx = Fixture::new();
    fx.album("someone", 1_000);
    let albums = fetch_scoped_albums(&fx.store(), &[], 10, IN_FILTER_MAX).await.unwrap();
    assert!(albums.is_empty());
}

#[tokio::test]
async fn scope_covers_self_friends_and_watched_only() {
    let fx = Fixture::new();
    for u in ["me", "bob", "carol", "dave", "eve"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    fx.friends("carol", "me");
    fx.db.watch("me", "dave").unwrap();
    fx.db.send_friend_request("eve", "me").unwrap();

    let mine = fx.album("me", 1_000);
    let bobs = fx.album("bob", 2_000);
    let carols = fx.album("carol", 3_000);
    let daves = fx.album("dave", 4_000);
    let eves = fx.album("eve", 5_000);

    let items = timeline(&fx.store(), "me").await;
    let ids: HashSet<&str> = album_ids(&items).into_iter().collect();
    for a in [&mine, &bobs, &carols, &daves] {
        assert!(ids.contains(a.id.as_str()), "missing {}", a.owner_id);
    }
    assert!(!ids.contains(eves.id.as_str()), "pending friend leaked into scope");
    assert_eq!(album_ids(&items), vec![daves.id.as_str(), carols.id.as_str(), bobs.id.as_str(), mine.id.as_str()]);
}

#[tokio::test]
async fn album_found_directly_and_via_repost_appears_once() {
    let fx = Fixture::new();
    for u in ["me", "bob", "carol"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    fx.friends("me", "carol");
    let bobs = fx.album("bob", 1_000);
    fx.db.repost_at(&bobs.id, "carol", Timestamp::from_millis(9_000)).unwrap();

    let items = timeline(&fx.store(), "me").await;
    assert_eq!(items.iter().filter(|i| i.album.id == bobs.id).count(), 1);
    let item = find(&items, &bobs);
    assert_eq!(item.repost_count, 1);
    let by = item.reposted_by.as_ref().unwrap();
    assert_eq!(by.user_id, "carol");
    assert_eq!(by.user.as_ref().unwrap().handle, "carol");
}

#[tokio::test]
async fn later_of_two_reposts_is_attributed() {
    let fx = Fixture::new();
    for u in ["me", "bob", "carol", "stranger"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    fx.friends("me", "carol");
    let outside = fx.album("stranger", 500);
    fx.db.repost_at(&outside.id, "bob", Timestamp::from_millis(2_000)).unwrap();
    fx.db.repost_at(&outside.id, "carol", Timestamp::from_millis(3_000)).unwrap();

    let items = timeline(&fx.store(), "me").await;
    // Out of scope, surfaced only through the overlay.
    assert_eq!(album_ids(&items), vec![outside.id.as_str()]);
    let by = items[0].reposted_by.as_ref().unwrap();
    assert_eq!(by.user_id, "carol");
    assert_eq!(by.created_at, Timestamp::from_millis(3_000));
    assert_eq!(items[0].repost_count, 2);
}

#[tokio::test]
async fn own_repost_surfaces_without_overlay() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    let bobs = fx.album("bob", 1_000);
    fx.db.repost_at(&bobs.id, "me", Timestamp::from_millis(7_000)).unwrap();

    let store = fx.store();
    store.fail("reposts_by_users");
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics)
        .await
        .unwrap();

    let item = find(&items, &bobs);
    assert!(item.reposted);
    let by = item.reposted_by.as_ref().unwrap();
    assert_eq!(by.user_id, "me");
    assert_eq!(by.created_at, Timestamp::from_millis(7_000));
    assert_eq!(metrics.snapshot().overlay_degraded, 1);
}

#[tokio::test]
async fn friends_newer_repost_beats_own_repost() {
    let fx = Fixture::new();
    for u in ["me", "bob", "stranger"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    let outside = fx.album("stranger", 100);
    fx.db.repost_at(&outside.id, "me", Timestamp::from_millis(4_000)).unwrap();
    fx.db.repost_at(&outside.id, "bob", Timestamp::from_millis(5_000)).unwrap();

    let items = timeline(&fx.store(), "me").await;
    let item = find(&items, &outside);
    assert!(item.reposted);
    let by = item.reposted_by.as_ref().unwrap();
    assert_eq!(by.user_id, "bob");
    assert_eq!(by.created_at, Timestamp::from_millis(5_000));
}

#[tokio::test]
async fn overlay_window_is_capped() {
    let fx = Fixture::new();
    for u in ["me", "bob", "stranger"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    let old = fx.album("stranger", 100);
    let a = fx.album("stranger", 200);
    let b = fx.album("stranger", 300);
    fx.db.repost_at(&old.id, "bob", Timestamp::from_millis(1_000)).unwrap();
    fx.db.repost_at(&a.id, "bob", Timestamp::from_millis(5_000)).unwrap();
    fx.db.repost_at(&b.id, "bob", Timestamp::from_millis(6_000)).unwrap();

    let cfg = TimelineConfig {
        repost_overlay_limit: Some(2),
        ..TimelineConfig::default()
    };
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&fx.store(), Some("me"), &cfg, &metrics).await.unwrap();
    assert_eq!(album_ids(&items), vec![b.id.as_str(), a.id.as_str()]);
}

#[tokio::test]
async fn comments_preview_is_three_newest_first() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    let mine = fx.album("me", 1_000);
    for i in 0..5 {
        let who = if i % 2 == 0 { "bob" } else { "me" };
        fx.db
            .add_comment_at(&mine.id, who, &format!("c{i}"), Timestamp::from_millis(2_000 + i))
            .unwrap();
    }

    let items = timeline(&fx.store(), "me").await;
    let item = find(&items, &mine);
    assert_eq!(item.comment_count, 5);
    assert_eq!(item.latest_comment.as_ref().unwrap().body, "c4");
    let bodies: Vec<&str> = item.comments_preview.iter().map(|p| p.comment.body.as_str()).collect();
    assert_eq!(bodies, vec!["c4", "c3", "c2"]);
    assert_eq!(item.comments_preview[0].user.as_ref().unwrap().uid, "bob");
    assert_eq!(item.comments_preview[1].user.as_ref().unwrap().uid, "me");
}

#[tokio::test]
async fn failing_repost_count_defaults_for_that_album_only() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    let mine = fx.album("me", 1_000);
    let bobs = fx.album("bob", 2_000);
    fx.db.repost_at(&mine.id, "bob", Timestamp::from_millis(3_000)).unwrap();
    fx.db.repost_at(&bobs.id, "me", Timestamp::from_millis(3_500)).unwrap();

    let store = fx.store();
    store.fail_repost_count_for(&mine.id);
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(find(&items, &mine).repost_count, 0);
    assert_eq!(find(&items, &bobs).repost_count, 1);
    assert_eq!(metrics.snapshot().field_degraded, 1);
}

#[tokio::test]
async fn newer_album_ranks_first_without_reposts() {
    let fx = Fixture::new();
    fx.user("me");
    let t1 = fx.album("me", 1_000);
    let t2 = fx.album("me", 2_000);
    let items = timeline(&fx.store(), "me").await;
    assert_eq!(album_ids(&items), vec![t2.id.as_str(), t1.id.as_str()]);
}

#[tokio::test]
async fn repost_time_lifts_older_album() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    let t1 = fx.album("me", 1_000);
    let t2 = fx.album("me", 2_000);
    fx.db.repost_at(&t1.id, "bob", Timestamp::from_millis(3_000)).unwrap();

    let items = timeline(&fx.store(), "me").await;
    assert_eq!(album_ids(&items), vec![t1.id.as_str(), t2.id.as_str()]);
}

#[tokio::test]
async fn image_added_badge_tracks_newest_uploader() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    let own_last = fx.album("me", 1_000);
    fx.db.add_image_at(&own_last.id, "bob", "https://img/1", None, Timestamp::from_millis(1_100)).unwrap();
    fx.db.add_image_at(&own_last.id, "me", "https://img/2", None, Timestamp::from_millis(1_200)).unwrap();

    let bob_last = fx.album("me", 2_000);
    fx.db.add_image_at(&bob_last.id, "me", "https://img/3", None, Timestamp::from_millis(2_100)).unwrap();
    fx.db.add_image_at(&bob_last.id, "bob", "https://img/4", Some("https://thumb/4"), Timestamp::from_millis(2_200)).unwrap();

    let items = timeline(&fx.store(), "me").await;
    assert!(find(&items, &own_last).image_added.is_none());
    let badge = find(&items, &bob_last).image_added.as_ref().unwrap();
    assert_eq!(badge.user_id, "bob");
    assert_eq!(badge.created_at, Timestamp::from_millis(2_200));
    assert_eq!(badge.user.as_ref().unwrap().display_name.as_deref(), Some("BOB"));
    assert_eq!(find(&items, &bob_last).images.len(), 2);
}

#[tokio::test]
async fn likes_and_reactions_reflect_viewer() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    let mine = fx.album("me", 1_000);
    fx.db.like(&mine.id, "me").unwrap();
    fx.db.like(&mine.id, "bob").unwrap();
    fx.db.like(&mine.id, "bob").unwrap();
    fx.db.add_reaction(&mine.id, "bob", "🎉").unwrap();
    fx.db.add_reaction(&mine.id, "me", "🎉").unwrap();
    fx.db.add_reaction(&mine.id, "bob", "👀").unwrap();

    let items = timeline(&fx.store(), "me").await;
    let item = find(&items, &mine);
    assert_eq!(item.like_count, 2);
    assert!(item.liked);
    assert_eq!(item.reactions.len(), 2);
    assert_eq!(item.reactions[0].emoji, "🎉");
    assert_eq!(item.reactions[0].count, 2);
    assert!(item.reactions[0].mine);
    assert!(!item.reactions[1].mine);
}

#[tokio::test]
async fn scope_failure_degrades_to_self() {
    let fx = Fixture::new();
    for u in ["me", "bob", "dave"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    fx.db.watch("me", "dave").unwrap();
    let mine = fx.album("me", 1_000);
    fx.album("bob", 2_000);
    let daves = fx.album("dave", 3_000);

    let store = fx.store();
    store.fail("accepted_friend_edges");
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics)
        .await
        .unwrap();
    assert_eq!(album_ids(&items), vec![daves.id.as_str(), mine.id.as_str()]);
    assert_eq!(metrics.snapshot().scope_degraded, 1);
}

#[tokio::test]
async fn album_fetch_failure_propagates() {
    let fx = Fixture::new();
    fx.user("me");
    fx.album("me", 1_000);
    let store = fx.store();
    store.fail("albums_by_owners");
    let metrics = TimelineMetrics::new();
    let res = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics).await;
    assert!(res.is_err());
    assert_eq!(metrics.snapshot().failed_runs, 1);
}

#[tokio::test]
async fn owner_lookup_failure_propagates() {
    let fx = Fixture::new();
    fx.user("me");
    fx.album("me", 1_000);
    let store = fx.store();
    store.fail("get_user");
    let metrics = TimelineMetrics::new();
    let res = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics).await;
    assert!(res.is_err());
}

#[tokio::test]
async fn user_refs_are_looked_up_once_per_build() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    fx.friends("me", "bob");
    for i in 0..4 {
        let a = fx.album("bob", 1_000 + i);
        fx.db.add_comment_at(&a.id, "me", "hi", Timestamp::from_millis(2_000 + i)).unwrap();
        fx.db.repost_at(&a.id, "bob", Timestamp::from_millis(3_000 + i)).unwrap();
    }

    let store = fx.store();
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics)
        .await
        .unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(store.user_lookups.load(Ordering::SeqCst), 2);
    let snap = metrics.snapshot();
    assert_eq!(snap.user_cache_misses, 2);
    assert_eq!(snap.user_cache_hits, 10);

    // A second build starts from an empty cache.
    timeline(&store, "me").await;
    assert_eq!(store.user_lookups.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn anonymous_viewer_gets_unscoped_latest() {
    let fx = Fixture::new();
    for u in ["a", "b"] {
        fx.user(u);
    }
    let a = fx.album("a", 1_000);
    let b = fx.album("b", 2_000);
    fx.db.like(&a.id, "b").unwrap();
    fx.db.repost_at(&a.id, "b", Timestamp::from_millis(5_000)).unwrap();

    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&fx.store(), None, &TimelineConfig::default(), &metrics)
        .await
        .unwrap();
    assert_eq!(album_ids(&items), vec![b.id.as_str(), a.id.as_str()]);
    let item = find(&items, &a);
    assert_eq!(item.like_count, 1);
    assert!(!item.liked);
    assert!(!item.reposted);
    assert!(item.reposted_by.is_none());
}

#[tokio::test]
async fn failing_images_degrade_to_empty() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    let first = fx.album("me", 1_000);
    let second = fx.album("me", 2_000);
    fx.db.add_image_at(&second.id, "bob", "https://img/1", None, Timestamp::from_millis(2_100)).unwrap();

    let store = fx.store();
    store.fail("images_for_album");
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics)
        .await
        .unwrap();

    assert_eq!(album_ids(&items), vec![second.id.as_str(), first.id.as_str()]);
    assert!(items.iter().all(|i| i.images.is_empty() && i.image_added.is_none()));
    let snap = metrics.snapshot();
    assert_eq!(snap.field_degraded, 2);
    assert_eq!(snap.failed_runs, 0);
}

#[tokio::test]
async fn failing_reposted_flag_defaults_to_false() {
    let fx = Fixture::new();
    fx.user("me");
    let mine = fx.album("me", 1_000);
    fx.db.repost_at(&mine.id, "me", Timestamp::from_millis(2_000)).unwrap();

    let store = fx.store();
    store.fail("has_reposted");
    store.fail("reposts_by_users");
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics)
        .await
        .unwrap();

    let item = find(&items, &mine);
    assert!(!item.reposted);
    assert!(item.reposted_by.is_none());
    assert_eq!(item.repost_count, 1);
    let snap = metrics.snapshot();
    assert_eq!(snap.field_degraded, 1);
    assert_eq!(snap.overlay_degraded, 1);
}

#[tokio::test]
async fn failing_comments_likes_and_reactions_keep_the_album() {
    let fx = Fixture::new();
    for u in ["me", "bob"] {
        fx.user(u);
    }
    let mine = fx.album("me", 1_000);
    fx.db.add_comment_at(&mine.id, "bob", "nice", Timestamp::from_millis(1_500)).unwrap();
    fx.db.like(&mine.id, "me").unwrap();
    fx.db.add_reaction(&mine.id, "bob", "🎉").unwrap();

    let store = fx.store();
    for op in ["comments_for_album", "count_likes", "has_liked", "reactions_for_album"] {
        store.fail(op);
    }
    let metrics = TimelineMetrics::new();
    let items = list_latest_albums_vm(&store, Some("me"), &TimelineConfig::default(), &metrics)
        .await
        .unwrap();

    let item = find(&items, &mine);
    assert_eq!(item.comment_count, 0);
    assert!(item.latest_comment.is_none());
    assert!(item.comments_preview.is_empty());
    assert_eq!(item.like_count, 0);
    assert!(!item.liked);
    assert!(item.reactions.is_empty());
    assert_eq!(item.owner.as_ref().unwrap().uid, "me");
    assert_eq!(metrics.snapshot().field_degraded, 4);
}
