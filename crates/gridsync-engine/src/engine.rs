//! The synchronization engine
//!
//! Central coordinator: owns the tree store and the keyed map of result
//! cache entries, ingests push notifications, and decides per entry whether
//! a re-fetch is due. All cache and tree writes go through here (single
//! writer); presentation code only holds read handles.

use crate::entry::{CacheEntry, ResultHandle};
use crate::error::{EngineError, FetchError};
use crate::fetcher::{ResultFetcher, TreeFetcher};
use crate::value::ResultValue;
use dashmap::DashMap;
use gridsync_model::{
    BuildStatus, EngineConfig, NodeUuid, ResultKind, RootNetworkUuid, StudyUuid, SubscriptionKey,
    BUILD_COMPLETED_TAG, BUILD_FAILED_TAG,
};
use gridsync_notify::{Notification, RawEnvelope};
use gridsync_tree::{TreeError, TreeStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

struct EngineInner {
    study: StudyUuid,
    config: EngineConfig,
    tree: Arc<TreeStore>,
    tree_fetcher: Arc<dyn TreeFetcher>,
    entries: DashMap<SubscriptionKey, Arc<CacheEntry>>,
    /// Ingress sequence: every accepted notification gets the next number
    ingress_seq: AtomicU64,
}

impl std::fmt::Debug for EngineInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineInner")
            .field("study", &self.study)
            .field("config", &self.config)
            .field("subscriptions", &self.entries.len())
            .finish_non_exhaustive()
    }
}

/// Node-scoped result synchronization engine for one study
#[derive(Debug, Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl SyncEngine {
    /// Create an engine for one study
    ///
    /// The tree starts empty; call [`SyncEngine::init`] to load it.
    #[must_use]
    pub fn new(study: StudyUuid, config: EngineConfig, tree_fetcher: Arc<dyn TreeFetcher>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                study,
                config,
                tree: Arc::new(TreeStore::new()),
                tree_fetcher,
                entries: DashMap::new(),
                ingress_seq: AtomicU64::new(0),
            }),
        }
    }

    /// The study this engine synchronizes
    #[inline]
    #[must_use]
    pub fn study(&self) -> StudyUuid {
        self.inner.study
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// The tree store (read access for consumers)
    #[inline]
    #[must_use]
    pub fn tree(&self) -> Arc<TreeStore> {
        self.inner.tree.clone()
    }

    /// Number of live subscriptions
    #[inline]
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.entries.len()
    }

    /// Load the initial tree
    ///
    /// # Errors
    /// [`EngineError::Fetch`] when the tree fetch fails, or
    /// [`EngineError::Tree`] when the fetched description is inconsistent.
    pub async fn init(&self) -> Result<(), EngineError> {
        let tree = self.inner.tree_fetcher.fetch_tree(self.inner.study).await?;
        self.inner.tree.replace_tree(tree)?;
        tracing::info!(study = %self.inner.study, "engine initialized");
        Ok(())
    }

    /// Subscribe to one result
    ///
    /// Creates the cache entry for `(study, node, root_network, kind)` if
    /// absent and issues the initial fetch. Re-subscribing an existing key
    /// with a fetcher of a different identity swaps the fetcher in and
    /// re-fetches; with the same identity it just hands out another view of
    /// the live entry.
    pub fn subscribe(
        &self,
        node: NodeUuid,
        root_network: RootNetworkUuid,
        kind: ResultKind,
        fetcher: Arc<dyn ResultFetcher>,
        default: Option<ResultValue>,
    ) -> ResultHandle {
        self.subscribe_with_tags(
            node,
            root_network,
            kind,
            fetcher,
            kind.invalidation_tags(),
            default,
        )
    }

    /// Subscribe with an explicit invalidation set
    pub fn subscribe_with_tags(
        &self,
        node: NodeUuid,
        root_network: RootNetworkUuid,
        kind: ResultKind,
        fetcher: Arc<dyn ResultFetcher>,
        invalidation: Vec<String>,
        default: Option<ResultValue>,
    ) -> ResultHandle {
        let key = SubscriptionKey::new(self.inner.study, node, root_network, kind);

        let (entry, needs_fetch) = match self.inner.entries.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(occupied) => {
                let entry = occupied.get().clone();
                if entry.fetcher_id() != fetcher.id() {
                    tracing::debug!(key = %key, fetcher = %fetcher.id(), "fetcher swapped");
                    entry.set_fetcher(fetcher);
                    (entry, true)
                } else {
                    (entry, false)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let entry = CacheEntry::new(key, fetcher, invalidation, default);
                vacant.insert(entry.clone());
                tracing::debug!(key = %key, "subscription created");
                (entry, true)
            }
        };

        if needs_fetch {
            self.spawn_fetch(&entry);
        }
        ResultHandle::new(key, entry.subscribe_state(), self.clone())
    }

    /// Drop a subscription and its cache entry
    ///
    /// Any fetch still in flight for it completes without observable
    /// effect.
    pub fn unsubscribe(&self, key: &SubscriptionKey) -> bool {
        let removed = self.inner.entries.remove(key).is_some();
        if removed {
            tracing::debug!(key = %key, "subscription removed");
        }
        removed
    }

    /// Re-fetch one subscription now, bypassing notification matching
    ///
    /// # Errors
    /// [`EngineError::UnknownSubscription`] when the key has no live entry.
    pub fn force_refresh(&self, key: &SubscriptionKey) -> Result<(), EngineError> {
        let entry = self
            .inner
            .entries
            .get(key)
            .map(|e| e.value().clone())
            .ok_or(EngineError::UnknownSubscription(*key))?;
        self.spawn_fetch(&entry);
        Ok(())
    }

    /// Ingest one push notification
    ///
    /// Malformed or unrecognized envelopes and envelopes for other studies
    /// are logged and dropped; nothing here is fatal.
    pub async fn handle_notification(&self, raw: &RawEnvelope) {
        let notification = match Notification::from_raw(raw) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "envelope not relevant, dropped");
                return;
            }
        };
        if notification.study() != self.inner.study {
            tracing::debug!(study = %notification.study(), "envelope for another study, dropped");
            return;
        }

        let seq = self.inner.ingress_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.process(seq, notification).await;
    }

    /// Apply one sequenced notification
    pub(crate) async fn process(&self, seq: u64, notification: Notification) {
        match notification {
            Notification::NodeCreated {
                parent_id, node_id, ..
            } => self.on_node_created(parent_id, node_id).await,
            Notification::NodesUpdated { node_ids, .. } => {
                self.on_nodes_updated(&node_ids).await;
            }
            Notification::NodesDeleted { node_ids, .. } => {
                self.inner.tree.apply_nodes_removed(&node_ids);
            }
            Notification::BuildStatusChanged {
                node_id,
                root_network,
                status,
                ..
            } => {
                if let Err(e) = self
                    .inner
                    .tree
                    .apply_build_status(node_id, root_network, status)
                {
                    tracing::warn!(node = %node_id, error = %e, "build status target missing");
                }
                // A finished build also invalidates that node's results
                let tag = if status == BuildStatus::Built {
                    BUILD_COMPLETED_TAG
                } else {
                    BUILD_FAILED_TAG
                };
                self.invalidate(seq, tag, &[node_id], Some(root_network));
            }
            Notification::ResultInvalidated {
                tag,
                node_ids,
                root_network,
                ..
            } => self.invalidate(seq, &tag, &node_ids, root_network),
        }
    }

    /// Decide, entry by entry, whether an invalidation forces a re-fetch
    ///
    /// Order of suppression checks: root-network mismatch, sequence already
    /// evaluated, tag outside the entry's invalidation set, named nodes not
    /// covering the entry. An invalidation naming no node is broadcast.
    fn invalidate(
        &self,
        seq: u64,
        tag: &str,
        nodes: &[NodeUuid],
        root_network: Option<RootNetworkUuid>,
    ) {
        let mut refreshed = 0usize;
        for item in self.inner.entries.iter() {
            let entry = item.value();
            let key = entry.key();

            if let Some(rn) = root_network {
                if rn != key.root_network {
                    continue;
                }
            }
            if entry.already_seen(seq) {
                continue;
            }
            if !entry.matches_tag(tag) {
                continue;
            }
            if !nodes.is_empty() && !nodes.contains(&key.node) {
                continue;
            }

            entry.mark_seen(seq);
            self.spawn_fetch(entry);
            refreshed += 1;
        }
        tracing::debug!(seq, tag, refreshed, "invalidation processed");
    }

    async fn on_node_created(&self, parent_id: NodeUuid, node_id: NodeUuid) {
        let info = match self
            .inner
            .tree_fetcher
            .fetch_node(self.inner.study, node_id)
            .await
        {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(node = %node_id, error = %e, "created node fetch failed");
                return;
            }
        };

        match self.inner.tree.apply_node_created(info, parent_id) {
            Ok(()) => {}
            Err(TreeError::DuplicateNode(_)) => {
                // At-least-once channel: the insert already happened
                tracing::debug!(node = %node_id, "node already present, insert skipped");
            }
            Err(TreeError::ParentNotFound(parent)) => {
                tracing::warn!(parent = %parent, node = %node_id, "insert parent unknown");
                if self.inner.config.resync_on_unknown_parent {
                    self.resync_tree().await;
                }
            }
            Err(e) => {
                tracing::warn!(node = %node_id, error = %e, "node insert failed");
            }
        }
    }

    async fn on_nodes_updated(&self, node_ids: &[NodeUuid]) {
        let mut infos = Vec::with_capacity(node_ids.len());
        for &node_id in node_ids {
            match self
                .inner
                .tree_fetcher
                .fetch_node(self.inner.study, node_id)
                .await
            {
                Ok(info) => infos.push(info),
                Err(e) => {
                    tracing::warn!(node = %node_id, error = %e, "updated node fetch failed");
                }
            }
        }
        self.inner.tree.apply_nodes_updated(infos);
    }

    /// Full-tree recovery when incremental patching lost its anchor
    async fn resync_tree(&self) {
        match self.inner.tree_fetcher.fetch_tree(self.inner.study).await {
            Ok(tree) => {
                if let Err(e) = self.inner.tree.replace_tree(tree) {
                    tracing::error!(error = %e, "tree resync produced inconsistent tree");
                } else {
                    tracing::info!(study = %self.inner.study, "tree resynced");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "tree resync fetch failed");
            }
        }
    }

    /// Issue a fetch for one entry and commit its outcome unless superseded
    fn spawn_fetch(&self, entry: &Arc<CacheEntry>) {
        let generation = entry.begin_fetch();
        let key = entry.key();
        let fetcher = entry.fetcher();
        let timeout = self.inner.config.fetch_timeout;
        let entry = entry.clone();
        let inner: Weak<EngineInner> = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            let fetch = fetcher.fetch(key.study, key.node, key.root_network);
            let outcome = match timeout {
                Some(bound) => match tokio::time::timeout(bound, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        secs: bound.as_secs(),
                    }),
                },
                None => fetch.await,
            };

            // A completion only counts while its entry is still the live
            // one for this key
            let registered = inner.upgrade().is_some_and(|inner| {
                inner
                    .entries
                    .get(&key)
                    .is_some_and(|live| Arc::ptr_eq(live.value(), &entry))
            });
            if !registered {
                tracing::debug!(key = %key, "completion for removed subscription discarded");
                return;
            }

            match outcome {
                Ok(value) => {
                    if !entry.commit_value(generation, value) {
                        tracing::debug!(key = %key, generation, "stale fetch discarded");
                    }
                }
                Err(e) => {
                    if entry.commit_error(generation, e.to_string()) {
                        tracing::error!(key = %key, error = %e, "fetch failed");
                    } else {
                        tracing::debug!(key = %key, generation, "stale fetch error discarded");
                    }
                }
            }
        });
    }
}
