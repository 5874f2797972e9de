//! Subscription lifecycle
//!
//! Defaults, fetch failures, timeouts, explicit refresh and unsubscription,
//! exercised through the public engine surface.

use gridsync_engine::{EngineError, ResultValue, SyncEngine};
use gridsync_model::{EngineConfig, NodeUuid, ResultKind, RootNetworkUuid, StudyUuid};
use gridsync_test_utils::{
    init_tracing, simple_tree, CountingFetcher, Echo, FailingFetcher, GatedFetcher,
    StaticTreeFetcher,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

async fn engine_with_node(config: EngineConfig) -> (SyncEngine, StudyUuid, NodeUuid) {
    init_tracing();
    let study = StudyUuid::new();
    let node = NodeUuid::new();
    let rest = StaticTreeFetcher::new(simple_tree(NodeUuid::new(), &[node]));
    let engine = SyncEngine::new(study, config, rest);
    engine.init().await.unwrap();
    (engine, study, node)
}

#[tokio::test]
async fn test_default_value_shown_until_first_commit() {
    let (engine, _study, node) = engine_with_node(EngineConfig::new()).await;
    let rn = RootNetworkUuid::new();

    let fetcher = GatedFetcher::new("lf");
    let mut handle = engine.subscribe(
        node,
        rn,
        ResultKind::LoadFlow,
        fetcher.clone(),
        Some(ResultValue::new(42usize)),
    );

    // The fetch is gated open-ended; the default stands in meanwhile
    fetcher.wait_started(1).await;
    assert!(handle.is_loading());
    assert_eq!(handle.value_as::<usize>(), Some(42));

    fetcher.release_one();
    let state = handle.settled().await;
    assert_eq!(
        state.value.and_then(|v| v.downcast::<Echo>()).map(|e| e.node),
        Some(node)
    );
}

#[tokio::test]
async fn test_failed_fetch_surfaces_error_and_keeps_value() {
    let (engine, _study, node) = engine_with_node(EngineConfig::new()).await;
    let rn = RootNetworkUuid::new();

    let fetcher = CountingFetcher::new("lf-v1");
    let mut handle = engine.subscribe(node, rn, ResultKind::LoadFlow, fetcher, None);
    handle.settled().await;
    assert_eq!(handle.value_as::<usize>(), Some(1));

    // Swapping in a fetcher with a new identity re-fetches; its failure
    // lands in the error slot without clobbering the last good value
    let failing = FailingFetcher::new("lf-v2", "server unreachable");
    let mut handle = engine.subscribe(node, rn, ResultKind::LoadFlow, failing, None);
    let state = handle.settled().await;

    assert_eq!(state.error.as_deref(), Some("transport error: server unreachable"));
    assert_eq!(handle.value_as::<usize>(), Some(1));
}

#[tokio::test]
async fn test_fetch_timeout_is_reported() {
    let (engine, _study, node) = engine_with_node(
        EngineConfig::new().with_fetch_timeout(Duration::from_millis(20)),
    )
    .await;
    let rn = RootNetworkUuid::new();

    // Never released, so the timeout fires
    let fetcher = GatedFetcher::new("lf");
    let mut handle = engine.subscribe(node, rn, ResultKind::LoadFlow, fetcher, None);
    let state = handle.settled().await;

    assert!(state.value.is_none());
    assert!(state.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_unsubscribe_drops_entry() {
    let (engine, _study, node) = engine_with_node(EngineConfig::new()).await;
    let rn = RootNetworkUuid::new();

    let fetcher = CountingFetcher::new("lf");
    let mut handle = engine.subscribe(node, rn, ResultKind::LoadFlow, fetcher, None);
    handle.settled().await;
    assert_eq!(engine.subscription_count(), 1);

    assert!(engine.unsubscribe(&handle.key()));
    assert!(!engine.unsubscribe(&handle.key()));
    assert_eq!(engine.subscription_count(), 0);

    // The handle outlives the entry but can no longer drive it
    assert!(matches!(
        handle.refresh(),
        Err(EngineError::UnknownSubscription(_))
    ));
    assert!(!handle.changed().await);
}

#[tokio::test]
async fn test_tree_reachable_through_engine() {
    let (engine, _study, node) = engine_with_node(EngineConfig::new()).await;

    let tree = engine.tree();
    assert_eq!(tree.node_count(), 2);
    assert!(tree.contains(node));
    assert_eq!(tree.parent_of(node), tree.root_id());
    tree.validate().unwrap();
}
