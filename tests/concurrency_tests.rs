//! Concurrency tests for lock-wrapped stacks
//!
//! The lock layer's contract is total ordering of operations against
//! one stack instance. These tests drive a deliberately non-thread-safe
//! backend from many tasks and assert no operations interleaved.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use strata::{open, Builder, Options, Registry, Result, Store};

/// Non-thread-safe counter backend: every `set` is internally a
/// read-modify-write with a yield in the racy window, the way a naive
/// file or memory-mapped backend would behave. Without external
/// serialization, concurrent sets lose updates.
#[derive(Default)]
struct RacyCounterAdapter {
    count: AtomicI64,
    active_ops: AtomicUsize,
    max_observed_ops: AtomicUsize,
}

impl RacyCounterAdapter {
    fn enter(&self) {
        let ops = self.active_ops.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_observed_ops.fetch_max(ops, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active_ops.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for RacyCounterAdapter {
    async fn get(&self, _key: &[u8]) -> Result<Option<Bytes>> {
        self.enter();
        let value = self.count.load(Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.leave();
        Ok(Some(Bytes::from(value.to_string().into_bytes())))
    }

    async fn set(&self, _key: &[u8], _value: Bytes, _ttl: Option<Duration>) -> Result<()> {
        self.enter();
        // The racy window: read, yield, write back
        let current = self.count.load(Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.count.store(current + 1, Ordering::SeqCst);
        self.leave();
        Ok(())
    }

    async fn delete(&self, _key: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.count.store(0, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, _key: &[u8]) -> Result<bool> {
        Ok(true)
    }
}

struct SharedCounter(Arc<RacyCounterAdapter>);

#[async_trait]
impl Store for SharedCounter {
    async fn get(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.0.get(key).await
    }
    async fn set(&self, key: &[u8], value: Bytes, ttl: Option<Duration>) -> Result<()> {
        self.0.set(key, value, ttl).await
    }
    async fn delete(&self, key: &[u8]) -> Result<()> {
        self.0.delete(key).await
    }
    async fn clear(&self) -> Result<()> {
        self.0.clear().await
    }
    async fn exists(&self, key: &[u8]) -> Result<bool> {
        self.0.exists(key).await
    }
}

fn lock_wrapped_counter() -> (Arc<RacyCounterAdapter>, Arc<strata::Stack>) {
    let backend = Arc::new(RacyCounterAdapter::default());
    let mut registry = Registry::with_defaults();
    let shared = backend.clone();
    registry.register_adapter("racy-counter", false, move |_options| {
        Ok(Box::new(SharedCounter(shared.clone())))
    });

    let stack = Builder::with_registry(Arc::new(registry))
        .layer("lock", Options::new())
        .adapter("racy-counter", Options::new())
        .build()
        .unwrap();
    (backend, Arc::new(stack))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifty_concurrent_increments_all_land() {
    let (backend, stack) = lock_wrapped_counter();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let stack = stack.clone();
        handles.push(tokio::spawn(async move {
            stack.set(b"counter", Bytes::from_static(b"+1"), None).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Every read-modify-write executed in isolation: no op overlapped
    // another, and the total matches sequential execution of all 50.
    assert_eq!(backend.max_observed_ops.load(Ordering::SeqCst), 1);
    assert_eq!(backend.count.load(Ordering::SeqCst), 50);
    assert_eq!(
        stack.get(b"counter").await.unwrap(),
        Some(Bytes::from_static(b"50"))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_operations_never_overlap_under_lock() {
    let (backend, stack) = lock_wrapped_counter();

    let mut handles = Vec::new();
    for i in 0..30u8 {
        let stack = stack.clone();
        handles.push(tokio::spawn(async move {
            match i % 3 {
                0 => {
                    stack.set(b"k", Bytes::from_static(b"+1"), None).await.unwrap();
                }
                1 => {
                    stack.get(b"k").await.unwrap();
                }
                _ => {
                    stack.exists(b"k").await.unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(backend.max_observed_ops.load(Ordering::SeqCst), 1);
    assert_eq!(backend.count.load(Ordering::SeqCst), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_threadsafe_stack_with_distinct_keys() {
    let stack = Arc::new(
        open("memory", {
            let mut options = Options::new();
            options.insert("threadsafe".to_string(), serde_json::json!(true));
            options
        })
        .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..32u32 {
        let stack = stack.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("key-{i}").into_bytes();
            let value = Bytes::from(i.to_string().into_bytes());
            stack.set(&key, value.clone(), None).await.unwrap();
            assert_eq!(stack.get(&key).await.unwrap(), Some(value));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for i in 0..32u32 {
        let key = format!("key-{i}").into_bytes();
        assert!(stack.exists(&key).await.unwrap());
    }
}
