//! Integration Tests for cache behaviour
//!
//! Drives the public API with a paused clock: expiry, eviction, prune,
//! change-driven invalidation and the background tasks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use query_cache::cache::keys::{global_key, list_key, workspace_key};
use query_cache::{
    spawn_change_listener, CacheProfile, CacheRegistry, DataChange, InvalidationDispatcher,
    KeyPattern, MaintenanceScheduler, QueryCache,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::advance;
use tokio_test::{assert_err, assert_ok};

// == Helper Functions ==

fn cache(ttl_secs: u64, max_entries: usize) -> QueryCache {
    QueryCache::new("test", CacheProfile::new(Duration::from_secs(ttl_secs), max_entries)).unwrap()
}

fn registry() -> Arc<CacheRegistry> {
    let profile = CacheProfile::new(Duration::from_secs(60), 100);
    Arc::new(CacheRegistry::new(profile, profile, profile).unwrap())
}

// == Get-or-compute ==

#[tokio::test(start_paused = true)]
async fn test_entry_recomputed_after_ttl() {
    let cache = cache(60, 10);
    let counter = AtomicUsize::new(0);
    let calls = &counter;

    let load = || async move {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        Ok::<Value, String>(json!(n))
    };

    assert_eq!(assert_ok!(cache.get("k", load, None).await), json!(0));
    advance(Duration::from_secs(59)).await;
    assert_eq!(assert_ok!(cache.get("k", load, None).await), json!(0));
    advance(Duration::from_secs(1)).await;
    assert_eq!(assert_ok!(cache.get("k", load, None).await), json!(1));

    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_compute_leaves_no_entry() {
    let cache = cache(60, 10);

    let err = assert_err!(
        cache
            .get("k", || async { Err::<Value, _>("database offline") }, None)
            .await
    );
    assert_eq!(err, "database offline");
    assert!(cache.is_empty().await);

    let value = assert_ok!(
        cache
            .get("k", || async { Ok::<_, &str>(json!("ok")) }, None)
            .await
    );
    assert_eq!(value, json!("ok"));
}

#[tokio::test]
async fn test_capacity_evicts_oldest_insertion() {
    let cache = cache(60, 2);
    cache.set("a", json!(1), None).await;
    cache.set("b", json!(2), None).await;
    // Reads do not protect "a" from eviction.
    assert!(cache.peek("a").await.is_some());
    cache.set("c", json!(3), None).await;

    assert!(cache.peek("a").await.is_none());
    assert!(cache.peek("b").await.is_some());
    assert!(cache.peek("c").await.is_some());
    assert_eq!(cache.stats().await.evictions, 1);
}

// == Prune ==

#[tokio::test(start_paused = true)]
async fn test_prune_uses_each_entry_ttl() {
    let cache = cache(60, 10);
    cache.set("short", json!(1), Some(Duration::from_secs(5))).await;
    cache.set("default", json!(2), None).await;
    cache.set("long", json!(3), Some(Duration::from_secs(600))).await;

    advance(Duration::from_secs(61)).await;

    assert_eq!(cache.prune().await, 2);
    assert_eq!(cache.len().await, 1);
    assert!(cache.peek("long").await.is_some());
}

// == Invalidation ==

#[tokio::test]
async fn test_change_clears_list_and_workspace_entries() {
    let registry = registry();
    let dispatcher = InvalidationDispatcher::new(Arc::clone(&registry));
    let query = registry.query();

    query.set(workspace_key("ws1", "tasks"), json!([]), None).await;
    query.set(workspace_key("ws2", "tasks"), json!([]), None).await;
    query.set(global_key("tasks"), json!([]), None).await;
    query
        .set(list_key("tasks", &json!({"page": 1})).unwrap(), json!([]), None)
        .await;
    query.set(global_key("tasks_archive"), json!([]), None).await;

    dispatcher.on_data_changed("tasks", Some("ws1"), None).await;

    assert!(query.peek(&workspace_key("ws2", "tasks")).await.is_some());
    assert!(query.peek(&global_key("tasks_archive")).await.is_some());
    assert_eq!(query.len().await, 2);
}

#[tokio::test]
async fn test_invalid_regex_rejected() {
    assert_err!(KeyPattern::regex("workspace:(unclosed"));
    let pattern = assert_ok!(KeyPattern::regex(r"^user:\w+:tasks$"));
    assert!(pattern.matches("user:u1:tasks"));
    assert!(!pattern.matches("user:u1:tasks:archived"));
}

// == Background Tasks ==

#[tokio::test]
async fn test_change_listener_dispatches_until_closed() {
    let registry = registry();
    registry
        .query()
        .set(workspace_key("ws1", "budgets"), json!([]), None)
        .await;

    let (tx, rx) = mpsc::channel(8);
    let handle = spawn_change_listener(InvalidationDispatcher::new(Arc::clone(&registry)), rx);

    tx.send(DataChange::new("budgets").in_workspace("ws1"))
        .await
        .unwrap();
    drop(tx);

    assert_ok!(handle.await);
    assert!(registry.query().is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_prunes_on_interval() {
    let registry = registry();
    registry
        .reference()
        .set("global:currencies", json!(["EUR"]), Some(Duration::from_secs(5)))
        .await;

    let mut scheduler =
        MaintenanceScheduler::new(Arc::clone(&registry), Duration::from_secs(10), false);
    scheduler.start();
    assert!(scheduler.is_running());

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(registry.reference().is_empty().await);

    scheduler.stop().await;
    assert!(!scheduler.is_running());
}
