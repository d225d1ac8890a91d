use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future;

use crate::config::Config;
use crate::download::ProfileDownloader;
use crate::events::{EventBus, ProfileEvent};
use crate::types::{CacheEntry, ProfileResult, ProfileSummary, UnviewableProfile, UserId};

use super::error::FetchError;
use super::store::{InMemoryStore, ProfileStore};

/// Fetches and caches per-user profile collections.
///
/// One load sequence per user: a list fetch resolving which profiles exist,
/// followed by a concurrent detail fetch per viewable entry. Concurrent
/// [`request_load`](Self::request_load) calls for the same user collapse into
/// a single sequence, and a settled slot is never refreshed. Every completed
/// sequence publishes exactly one event on the bus; consumers are expected to
/// [`read`](Self::read) for the authoritative value.
pub struct ProfileCache {
    store: Arc<dyn ProfileStore>,
    downloader: Arc<ProfileDownloader>,
    bus: Arc<dyn EventBus>,
}

impl Clone for ProfileCache {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            downloader: Arc::clone(&self.downloader),
            bus: Arc::clone(&self.bus),
        }
    }
}

impl fmt::Debug for ProfileCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileCache")
            .field("downloader", &self.downloader)
            .finish_non_exhaustive()
    }
}

impl ProfileCache {
    pub fn new(config: &Config, bus: Arc<dyn EventBus>) -> Self {
        Self::with_store(Arc::new(InMemoryStore::default()), config, bus)
    }

    /// Creates a cache on top of a custom store implementation.
    pub fn with_store(
        store: Arc<dyn ProfileStore>,
        config: &Config,
        bus: Arc<dyn EventBus>,
    ) -> Self {
        let downloader = Arc::new(ProfileDownloader::new(config));
        Self {
            store,
            downloader,
            bus,
        }
    }

    /// Ensures the given user's profiles are loaded or loading.
    ///
    /// Idempotent fire-and-forget trigger: if the user's slot is already
    /// pending or settled, this returns without any network activity.
    /// Otherwise the slot is marked pending and the load sequence runs on a
    /// spawned task. Failures never surface here; they are absorbed into the
    /// settled value.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_load(&self, user_id: UserId) {
        if !self.store.try_set_pending(&user_id) {
            return;
        }

        let this = self.clone();
        tokio::spawn(async move {
            this.load_profiles(user_id).await;
        });
    }

    /// The current state of the user's slot. Never triggers a fetch.
    pub fn read(&self, user_id: &UserId) -> CacheEntry {
        self.store.get(user_id)
    }

    /// Read-only dump of all slots, for diagnostics.
    pub fn snapshot(&self) -> BTreeMap<UserId, CacheEntry> {
        self.store.snapshot()
    }

    /// Runs one load sequence for a user whose slot is pending.
    ///
    /// Settles the slot exactly once and publishes exactly one event, on
    /// every path.
    async fn load_profiles(&self, user_id: UserId) {
        let mut summaries = match self.downloader.list_profiles(&user_id).await {
            Ok(summaries) => summaries,
            Err(err) => {
                if err != FetchError::NotFound {
                    tracing::warn!(
                        error = &err as &dyn std::error::Error,
                        user_id = %user_id,
                        "profile list fetch failed",
                    );
                }

                self.store.settle(&user_id, Vec::new().into());
                self.bus.dispatch(ProfileEvent::Failed { user_id });
                return;
            }
        };

        // The current profile first, server order otherwise. The sort is
        // stable, non-current entries must not be compared among each other.
        summaries.sort_by_key(|summary| !summary.current);

        let jobs = summaries
            .into_iter()
            .map(|summary| self.resolve_entry(&user_id, summary));
        let results = future::join_all(jobs).await;

        self.store.settle(&user_id, results.into());
        self.bus.dispatch(ProfileEvent::Loaded { user_id });
    }

    /// Produces the settled result for a single list entry.
    async fn resolve_entry(&self, user_id: &UserId, summary: ProfileSummary) -> ProfileResult {
        if !summary.viewable.unwrap_or(false) {
            return ProfileResult::Unviewable(UnviewableProfile::from_summary(
                user_id.clone(),
                &summary,
            ));
        }

        match self.downloader.fetch_detail(&summary.id).await {
            Ok(detail) => ProfileResult::Full(Box::new(detail)),
            Err(FetchError::NotFound | FetchError::Invalid) => {
                ProfileResult::Failed { id: summary.id }
            }
            Err(err) => {
                tracing::warn!(
                    error = &err as &dyn std::error::Error,
                    user_id = %user_id,
                    profile_id = %summary.id,
                    "profile detail fetch failed",
                );
                ProfileResult::Failed { id: summary.id }
            }
        }
    }
}
