//! Result cache entries and subscription handles
//!
//! One [`CacheEntry`] exists per subscription key. It is a pure state
//! container: every write goes through the engine, which uses the
//! generation counter to reject completions that were superseded by a newer
//! fetch before they landed.

use crate::fetcher::{FetcherId, ResultFetcher};
use crate::value::ResultValue;
use gridsync_model::SubscriptionKey;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Observable state of one cached result
#[derive(Debug, Clone)]
pub struct ResultState {
    /// Last committed value, or the caller-supplied default before the
    /// first commit
    pub value: Option<ResultValue>,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// Message of the last failed fetch; cleared when a new fetch starts
    pub error: Option<String>,
}

impl ResultState {
    fn idle(default: Option<ResultValue>) -> Self {
        Self {
            value: default,
            loading: false,
            error: None,
        }
    }
}

/// Engine-owned bookkeeping for one subscription
pub(crate) struct CacheEntry {
    key: SubscriptionKey,
    state: watch::Sender<ResultState>,
    /// Fetch generation: bumped at issue time, compared at completion time
    generation: AtomicU64,
    /// Highest ingress sequence already evaluated for this entry
    last_seq: AtomicU64,
    fetcher: RwLock<Arc<dyn ResultFetcher>>,
    /// Update tags this subscription treats as relevant
    invalidation: RwLock<Vec<String>>,
}

impl CacheEntry {
    pub(crate) fn new(
        key: SubscriptionKey,
        fetcher: Arc<dyn ResultFetcher>,
        invalidation: Vec<String>,
        default: Option<ResultValue>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(ResultState::idle(default));
        Arc::new(Self {
            key,
            state,
            generation: AtomicU64::new(0),
            last_seq: AtomicU64::new(0),
            fetcher: RwLock::new(fetcher),
            invalidation: RwLock::new(invalidation),
        })
    }

    pub(crate) fn key(&self) -> SubscriptionKey {
        self.key
    }

    pub(crate) fn subscribe_state(&self) -> watch::Receiver<ResultState> {
        self.state.subscribe()
    }

    pub(crate) fn fetcher(&self) -> Arc<dyn ResultFetcher> {
        self.fetcher.read().clone()
    }

    pub(crate) fn fetcher_id(&self) -> FetcherId {
        self.fetcher.read().id()
    }

    pub(crate) fn set_fetcher(&self, fetcher: Arc<dyn ResultFetcher>) {
        *self.fetcher.write() = fetcher;
    }

    pub(crate) fn matches_tag(&self, tag: &str) -> bool {
        self.invalidation.read().iter().any(|t| t == tag)
    }

    /// Whether this ingress sequence was already evaluated
    pub(crate) fn already_seen(&self, seq: u64) -> bool {
        self.last_seq.load(Ordering::SeqCst) >= seq
    }

    pub(crate) fn mark_seen(&self, seq: u64) {
        self.last_seq.fetch_max(seq, Ordering::SeqCst);
    }

    /// Start a new fetch: bump the generation, raise loading, clear the
    /// previous error. Returns the generation token to present at commit.
    pub(crate) fn begin_fetch(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        generation
    }

    /// Commit a resolved value if `generation` is still current
    ///
    /// Returns false when the completion was superseded; the value is
    /// dropped without any observable effect.
    pub(crate) fn commit_value(&self, generation: u64, value: ResultValue) -> bool {
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            s.value = Some(value);
            s.loading = false;
            s.error = None;
            true
        })
    }

    /// Commit a failed fetch if `generation` is still current
    ///
    /// The value slot keeps its previous or default content.
    pub(crate) fn commit_error(&self, generation: u64, message: String) -> bool {
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            s.error = Some(message);
            s.loading = false;
            true
        })
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .field("last_seq", &self.last_seq.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Presentation-side view of one subscription
///
/// Cheap to clone; reading never blocks. `refresh` is the manual escape
/// hatch that bypasses notification matching entirely.
#[derive(Debug, Clone)]
pub struct ResultHandle {
    key: SubscriptionKey,
    state: watch::Receiver<ResultState>,
    engine: crate::engine::SyncEngine,
}

impl ResultHandle {
    pub(crate) fn new(
        key: SubscriptionKey,
        state: watch::Receiver<ResultState>,
        engine: crate::engine::SyncEngine,
    ) -> Self {
        Self { key, state, engine }
    }

    /// The subscription this handle observes
    #[inline]
    #[must_use]
    pub fn key(&self) -> SubscriptionKey {
        self.key
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn state(&self) -> ResultState {
        self.state.borrow().clone()
    }

    /// Last committed value (or the default), if any
    #[must_use]
    pub fn value(&self) -> Option<ResultValue> {
        self.state.borrow().value.clone()
    }

    /// Last committed value downcast to `T`
    #[must_use]
    pub fn value_as<T: Clone + 'static>(&self) -> Option<T> {
        self.state.borrow().value.as_ref().and_then(ResultValue::downcast)
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Message of the last failed fetch
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Force a re-fetch, bypassing notification matching
    ///
    /// # Errors
    /// [`crate::EngineError::UnknownSubscription`] when the subscription was
    /// already removed.
    pub fn refresh(&self) -> Result<(), crate::error::EngineError> {
        self.engine.force_refresh(&self.key)
    }

    /// Wait for the next state change
    ///
    /// Returns false once the subscription is gone and no further change
    /// can arrive.
    pub async fn changed(&mut self) -> bool {
        self.state.changed().await.is_ok()
    }

    /// Wait until no fetch is in flight, then return the state
    pub async fn settled(&mut self) -> ResultState {
        loop {
            {
                let current = self.state.borrow_and_update();
                if !current.loading {
                    return current.clone();
                }
            }
            if self.state.changed().await.is_err() {
                return self.state.borrow().clone();
            }
        }
    }
}
