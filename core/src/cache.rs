//! Client-side query cache keyed by route identity.
//!
//! A key is the route's path template, optionally followed by an id. Reads
//! are served only from fresh entries; `invalidate` marks every entry under a
//! key prefix stale so the next read refetches. Each invalidation also
//! advances a clock, so a fetch that started before it cannot store its
//! result as fresh.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::routes::api::posts;
use crate::types::Post;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Path(&'static str),
    Id(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    pub fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    /// Key of the post collection.
    pub fn list() -> Self {
        Self(vec![KeyPart::Path(posts::LIST.path)])
    }

    /// Key of a single post.
    pub fn detail(id: i64) -> Self {
        Self(vec![KeyPart::Path(posts::GET.path), KeyPart::Id(id)])
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match part {
                KeyPart::Path(path) => write!(f, "{path}")?,
                KeyPart::Id(id) => write!(f, "{id}")?,
            }
        }
        f.write_str("]")
    }
}

/// A cached read result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedData {
    Posts(Vec<Post>),
    /// `None` records a confirmed "not found".
    Post(Option<Post>),
}

#[derive(Debug)]
struct Entry {
    data: CachedData,
    fetched_at: Instant,
    stale: bool,
}

/// Point on the cache's invalidation clock, taken before a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    clock: u64,
    // Prefix -> clock value of its latest invalidation or removal.
    marks: HashMap<QueryKey, u64>,
}

impl Inner {
    fn tick(&mut self, prefix: &QueryKey) {
        self.clock += 1;
        self.marks.insert(prefix.clone(), self.clock);
    }

    fn touched_since(&self, key: &QueryKey, since: Generation) -> bool {
        self.marks
            .iter()
            .any(|(prefix, at)| *at > since.0 && key.starts_with(prefix))
    }
}

/// Shared key → result map. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    inner: Arc<RwLock<Inner>>,
    stale_after: Option<Duration>,
}

impl QueryCache {
    /// `stale_after` ages entries out on its own; `None` keeps them fresh
    /// until invalidated.
    pub fn new(stale_after: Option<Duration>) -> Self {
        Self {
            inner: Arc::default(),
            stale_after,
        }
    }

    /// The entry under `key`, if present and fresh.
    pub async fn get(&self, key: &QueryKey) -> Option<CachedData> {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .filter(|entry| !self.expired(entry))
            .map(|entry| entry.data.clone())
    }

    pub async fn insert(&self, key: QueryKey, data: CachedData) {
        let entry = Entry {
            data,
            fetched_at: Instant::now(),
            stale: false,
        };
        self.inner.write().await.entries.insert(key, entry);
    }

    /// Current clock value. Take it before fetching and hand it to
    /// [`QueryCache::insert_fetched`].
    pub async fn generation(&self) -> Generation {
        Generation(self.inner.read().await.clock)
    }

    /// Store a fetch result. If `key` was invalidated or removed after
    /// `since`, the result predates that change and is kept stale so the next
    /// read refetches. Returns whether the entry is fresh.
    pub async fn insert_fetched(&self, key: QueryKey, data: CachedData, since: Generation) -> bool {
        let mut inner = self.inner.write().await;
        let stale = inner.touched_since(&key, since);
        if stale {
            tracing::debug!(%key, "fetch overtaken by invalidation");
        }
        inner.entries.insert(
            key,
            Entry {
                data,
                fetched_at: Instant::now(),
                stale,
            },
        );
        !stale
    }

    /// Mark every entry whose key starts with `prefix` stale. Returns how many
    /// entries were affected.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        inner.tick(prefix);
        let mut count = 0;
        for (key, entry) in inner.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                count += 1;
            }
        }
        tracing::debug!(key = %prefix, count, "invalidated queries");
        count
    }

    /// Drop every entry whose key starts with `prefix`.
    pub async fn remove(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        inner.tick(prefix);
        let before = inner.entries.len();
        inner.entries.retain(|key, _| !key.starts_with(prefix));
        before - inner.entries.len()
    }

    /// True when there is no fresh entry under `key`.
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let inner = self.inner.read().await;
        inner.entries.get(key).map_or(true, |entry| self.expired(entry))
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.inner.read().await.entries.contains_key(key)
    }

    /// Drop all entries. Fetches already in flight land stale.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.tick(&QueryKey::new(Vec::new()));
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    fn expired(&self, entry: &Entry) -> bool {
        entry.stale
            || self
                .stale_after
                .is_some_and(|limit| entry.fetched_at.elapsed() >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_key_does_not_start_with_list_key() {
        assert!(!QueryKey::detail(1).starts_with(&QueryKey::list()));
        assert!(QueryKey::list().starts_with(&QueryKey::list()));
        assert!(QueryKey::detail(1).starts_with(&QueryKey::new(vec![KeyPart::Path("/posts/:id")])));
    }

    #[test]
    fn key_display() {
        assert_eq!(QueryKey::detail(4).to_string(), "[/posts/:id, 4]");
    }

    #[tokio::test]
    async fn fresh_entry_is_served() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::list(), CachedData::Posts(Vec::new())).await;
        assert_eq!(cache.get(&QueryKey::list()).await, Some(CachedData::Posts(Vec::new())));
        assert!(!cache.is_stale(&QueryKey::list()).await);
    }

    #[tokio::test]
    async fn invalidate_hides_entry_but_keeps_it() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::list(), CachedData::Posts(Vec::new())).await;
        cache.insert(QueryKey::detail(1), CachedData::Post(None)).await;

        assert_eq!(cache.invalidate(&QueryKey::list()).await, 1);
        assert_eq!(cache.get(&QueryKey::list()).await, None);
        assert!(cache.contains(&QueryKey::list()).await);
        assert_eq!(cache.get(&QueryKey::detail(1)).await, Some(CachedData::Post(None)));
    }

    #[tokio::test]
    async fn insert_after_invalidate_is_fresh_again() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::list(), CachedData::Posts(Vec::new())).await;
        cache.invalidate(&QueryKey::list()).await;
        cache.insert(QueryKey::list(), CachedData::Posts(Vec::new())).await;
        assert!(!cache.is_stale(&QueryKey::list()).await);
    }

    #[tokio::test]
    async fn remove_drops_matching_entries() {
        let cache = QueryCache::default();
        cache.insert(QueryKey::detail(1), CachedData::Post(None)).await;
        cache.insert(QueryKey::detail(2), CachedData::Post(None)).await;
        assert_eq!(cache.remove(&QueryKey::detail(1)).await, 1);
        assert!(!cache.contains(&QueryKey::detail(1)).await);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn zero_stale_after_expires_immediately() {
        let cache = QueryCache::new(Some(Duration::ZERO));
        cache.insert(QueryKey::list(), CachedData::Posts(Vec::new())).await;
        assert_eq!(cache.get(&QueryKey::list()).await, None);
    }

    #[tokio::test]
    async fn fetch_overtaken_by_invalidation_lands_stale() {
        let cache = QueryCache::default();
        let before = cache.generation().await;
        cache.invalidate(&QueryKey::list()).await;

        let fresh = cache
            .insert_fetched(QueryKey::list(), CachedData::Posts(Vec::new()), before)
            .await;
        assert!(!fresh);
        assert!(cache.contains(&QueryKey::list()).await);
        assert_eq!(cache.get(&QueryKey::list()).await, None);
    }

    #[tokio::test]
    async fn unrelated_invalidation_leaves_fetch_fresh() {
        let cache = QueryCache::default();
        let before = cache.generation().await;
        cache.remove(&QueryKey::detail(9)).await;

        assert!(
            cache
                .insert_fetched(QueryKey::list(), CachedData::Posts(Vec::new()), before)
                .await
        );
        assert!(
            !cache
                .insert_fetched(QueryKey::detail(9), CachedData::Post(None), before)
                .await
        );
        let after = cache.generation().await;
        assert!(
            cache
                .insert_fetched(QueryKey::detail(9), CachedData::Post(None), after)
                .await
        );
    }

    #[tokio::test]
    async fn clear_overtakes_every_fetch() {
        let cache = QueryCache::default();
        let before = cache.generation().await;
        cache.clear().await;
        assert!(
            !cache
                .insert_fetched(QueryKey::detail(1), CachedData::Post(None), before)
                .await
        );
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let cache = QueryCache::default();
        let other = cache.clone();
        other.insert(QueryKey::list(), CachedData::Posts(Vec::new())).await;
        assert!(cache.contains(&QueryKey::list()).await);
        cache.clear().await;
        assert_eq!(other.len().await, 0);
    }
}
