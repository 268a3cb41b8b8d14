//! Tests for the per-node instance cache

use crate::support::{Counter, CounterType};
use rsm_application::{CachedInstance, EntityType, InstanceCaches, NodeCache};
use rsm_domain::error::Error;
use rsm_domain::{CompositeKey, NodeId};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn counter(entity_type: &Arc<CounterType>, id: &str) -> CachedInstance {
    let key = CompositeKey::new("counter", [id]);
    let props = entity_type.props_for(&key).unwrap();
    CachedInstance {
        instance: entity_type.construct(props, json!({ "count": 0 })).unwrap(),
        key,
        entity_type: Arc::clone(entity_type) as Arc<dyn EntityType>,
    }
}

#[tokio::test]
async fn test_concurrent_lookups_materialize_once() {
    let cache = Arc::new(NodeCache::default());
    let entity_type = Arc::new(CounterType::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let lookups = (0..8).map(|_| {
        let cache = Arc::clone(&cache);
        let entity_type = Arc::clone(&entity_type);
        let calls = Arc::clone(&calls);
        tokio::spawn(async move {
            cache
                .get_or_materialize("counter:a", move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(counter(&entity_type, "a"))
                    }
                })
                .await
        })
    });
    let instances: Vec<_> = futures::future::join_all(lookups)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(entity_type.constructed.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_failed_materialization_is_retried() {
    let cache = NodeCache::default();
    let entity_type = Arc::new(CounterType::default());

    let err = cache
        .get_or_materialize("counter:a", || async { Err(Error::internal("offline")) })
        .await
        .err()
        .unwrap();
    assert_eq!(err, Error::internal("offline"));
    assert!(!cache.is_pending("counter:a"));
    assert!(cache.get("counter:a").is_none());

    let instance = cache
        .get_or_materialize("counter:a", {
            let entity_type = Arc::clone(&entity_type);
            move || async move { Ok(counter(&entity_type, "a")) }
        })
        .await
        .unwrap();
    let live = cache.get("counter:a").unwrap();
    assert!(Arc::ptr_eq(&instance, &live));
}

#[tokio::test]
async fn test_release_runs_teardown() {
    let cache = NodeCache::default();
    let entity_type = Arc::new(CounterType::default());
    let cached = counter(&entity_type, "a");
    cache
        .get_or_materialize("counter:a", move || async move { Ok(cached) })
        .await
        .unwrap();

    let released = cache.release("counter:a").unwrap();
    assert_eq!(released.key.encode(), "counter:a");
    assert_eq!(entity_type.torn_down.load(Ordering::SeqCst), 1);
    assert!(cache.is_empty());
    assert!(cache.release("counter:a").is_none());
}

#[tokio::test]
async fn test_release_node_drops_every_instance() {
    let caches = InstanceCaches::new();
    let entity_type = Arc::new(CounterType::default());
    let node = NodeId::new(4);

    for id in ["a", "b"] {
        let cached = counter(&entity_type, id);
        caches
            .node(node)
            .get_or_materialize(&cached.key.encode(), move || async move { Ok(cached) })
            .await
            .unwrap();
    }
    assert_eq!(caches.owners(), vec![node]);

    let released = caches.release_node(node);
    assert_eq!(released.len(), 2);
    assert_eq!(entity_type.torn_down.load(Ordering::SeqCst), 2);
    assert!(caches.existing(node).is_none());
}

#[tokio::test]
async fn test_caches_are_per_node() {
    let caches = InstanceCaches::new();
    let entity_type = Arc::new(CounterType::default());

    let mut instances = Vec::new();
    for node in [NodeId::new(1), NodeId::new(2)] {
        let cached = counter(&entity_type, "a");
        let instance = caches
            .node(node)
            .get_or_materialize("counter:a", move || async move { Ok(cached) })
            .await
            .unwrap();
        instances.push(instance);
    }
    assert!(!Arc::ptr_eq(&instances[0], &instances[1]));
    let first = Arc::clone(&instances[0]).downcast_arc::<Counter>().ok().unwrap();
    assert_eq!(first.id, "a");
}
