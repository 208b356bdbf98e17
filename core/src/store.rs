//! Async data-access layer over the post API.
//!
//! # Design
//! `PostStore` composes the stateless `PostClient` with a `Transport`, a
//! shared `QueryCache` and a `Notifier`. Reads go through the cache; every
//! mutation runs through its `MutationTracker` and, on success only,
//! invalidates the keys it declares before announcing itself. Failures are
//! announced and handed back to the caller with the cache untouched, so the
//! caller decides whether to keep an editing surface open.

use std::future::Future;

use tokio::sync::watch;

use crate::cache::{CachedData, QueryCache, QueryKey};
use crate::client::PostClient;
use crate::confirm::DeleteConfirmation;
use crate::error::ApiError;
use crate::mutation::{MutationKind, MutationState, MutationTracker};
use crate::notify::{Notification, Notifier};
use crate::transport::Transport;
use crate::types::{InsertPost, Post, UpdatePost};

/// Cache keys a successful mutation touches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invalidation {
    /// Marked stale; the next read refetches.
    pub stale: Vec<QueryKey>,
    /// Dropped outright.
    pub removed: Vec<QueryKey>,
}

impl Invalidation {
    /// `id` is the new post's; a "not found" cached for it earlier must go.
    pub fn for_create(id: i64) -> Self {
        Self {
            stale: vec![QueryKey::list(), QueryKey::detail(id)],
            removed: Vec::new(),
        }
    }

    pub fn for_update(id: i64) -> Self {
        Self {
            stale: vec![QueryKey::list(), QueryKey::detail(id)],
            removed: Vec::new(),
        }
    }

    pub fn for_delete(id: i64) -> Self {
        Self {
            stale: vec![QueryKey::list()],
            removed: vec![QueryKey::detail(id)],
        }
    }
}

pub struct PostStore<T, N> {
    client: PostClient,
    transport: T,
    notifier: N,
    cache: QueryCache,
    create: MutationTracker,
    update: MutationTracker,
    delete: MutationTracker,
}

impl<T: Transport, N: Notifier> PostStore<T, N> {
    pub fn new(client: PostClient, transport: T, notifier: N, cache: QueryCache) -> Self {
        Self {
            client,
            transport,
            notifier,
            cache,
            create: MutationTracker::new(MutationKind::Create),
            update: MutationTracker::new(MutationKind::Update),
            delete: MutationTracker::new(MutationKind::Delete),
        }
    }

    pub fn client(&self) -> &PostClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn mutation_state(&self, kind: MutationKind) -> watch::Receiver<MutationState> {
        self.tracker(kind).subscribe()
    }

    /// All posts, served from the cache while the list entry is fresh.
    pub async fn list(&self) -> Result<Vec<Post>, ApiError> {
        let key = QueryKey::list();
        if let Some(CachedData::Posts(posts)) = self.cache.get(&key).await {
            tracing::debug!(%key, "cache hit");
            return Ok(posts);
        }

        let since = self.cache.generation().await;
        let request = self.client.build_list_posts()?;
        let posts = self
            .client
            .parse_list_posts(self.transport.execute(request).await?)?;
        self.cache
            .insert_fetched(key, CachedData::Posts(posts.clone()), since)
            .await;
        Ok(posts)
    }

    /// One post by id. Without an id nothing is requested and the result is
    /// `None`; a 404 is also `None` and is cached as such.
    pub async fn get(&self, id: Option<i64>) -> Result<Option<Post>, ApiError> {
        let Some(id) = id else {
            return Ok(None);
        };

        let key = QueryKey::detail(id);
        if let Some(CachedData::Post(post)) = self.cache.get(&key).await {
            tracing::debug!(%key, "cache hit");
            return Ok(post);
        }

        let since = self.cache.generation().await;
        let request = self.client.build_get_post(id)?;
        let post = self
            .client
            .parse_get_post(self.transport.execute(request).await?)?;
        self.cache
            .insert_fetched(key, CachedData::Post(post.clone()), since)
            .await;
        Ok(post)
    }

    pub async fn create(&self, input: InsertPost) -> Result<Post, ApiError> {
        let invalidation = |post: &Post| Invalidation::for_create(post.id);
        self.mutate(MutationKind::Create, invalidation, async {
            let request = self.client.build_create_post(&input)?;
            self.client
                .parse_create_post(self.transport.execute(request).await?)
        })
        .await
    }

    pub async fn update(&self, id: i64, changes: UpdatePost) -> Result<Post, ApiError> {
        let invalidation = |_: &Post| Invalidation::for_update(id);
        self.mutate(MutationKind::Update, invalidation, async {
            let request = self.client.build_update_post(id, &changes)?;
            self.client
                .parse_update_post(self.transport.execute(request).await?)
        })
        .await
    }

    pub async fn delete(&self, confirmation: DeleteConfirmation) -> Result<(), ApiError> {
        let id = confirmation.id();
        let invalidation = |_: &()| Invalidation::for_delete(id);
        self.mutate(MutationKind::Delete, invalidation, async {
            let request = self.client.build_delete_post(id)?;
            self.client
                .parse_delete_post(self.transport.execute(request).await?)
        })
        .await
    }

    async fn mutate<R>(
        &self,
        kind: MutationKind,
        invalidation: impl FnOnce(&R) -> Invalidation,
        call: impl Future<Output = Result<R, ApiError>>,
    ) -> Result<R, ApiError> {
        let pending = self.tracker(kind).begin()?;

        match call.await {
            Ok(value) => {
                let invalidation = invalidation(&value);
                for key in &invalidation.stale {
                    self.cache.invalidate(key).await;
                }
                for key in &invalidation.removed {
                    self.cache.remove(key).await;
                }
                pending.succeed();
                tracing::info!(kind = kind.as_str(), "mutation succeeded");
                self.notifier.notify(kind.success_notice());
                Ok(value)
            }
            Err(error) => {
                pending.fail(&error);
                tracing::warn!(kind = kind.as_str(), %error, "mutation failed");
                self.notifier.notify(Notification::error(error.to_string()));
                Err(error)
            }
        }
    }

    fn tracker(&self, kind: MutationKind) -> &MutationTracker {
        match kind {
            MutationKind::Create => &self.create,
            MutationKind::Update => &self.update,
            MutationKind::Delete => &self.delete,
        }
    }
}
