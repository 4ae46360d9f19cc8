use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;

use crate::{DataFetchError, ReferenceCache, ReferenceSource};

#[derive(Default)]
struct CountingSource {
    fetches: AtomicUsize,
    failing: AtomicBool,
}

#[async_trait]
impl ReferenceSource for CountingSource {
    async fn fetch_csv(&self) -> Result<String, DataFetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataFetchError::Unreachable("offline".to_string()));
        }
        Ok("Database,Nomor PO,Item\nA,1,x\n".to_string())
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

#[tokio::test]
async fn second_get_reuses_cached_index() {
    let source = Arc::new(CountingSource::default());
    let cache = ReferenceCache::new(source.clone());
    assert!(!cache.is_loaded().await);

    let first = cache.get().await.expect("first");
    let second = cache.get().await.expect("second");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    assert!(cache.is_loaded().await);
}

#[tokio::test]
async fn invalidate_forces_reload() {
    let source = Arc::new(CountingSource::default());
    let cache = ReferenceCache::new(source.clone());

    cache.get().await.expect("first");
    cache.invalidate().await;
    assert!(!cache.is_loaded().await);
    cache.get().await.expect("reload");
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_load_is_not_cached() {
    let source = Arc::new(CountingSource::default());
    source.failing.store(true, Ordering::SeqCst);
    let cache = ReferenceCache::new(source.clone());

    let err = cache.get().await.expect_err("offline");
    assert!(matches!(err, DataFetchError::Unreachable(_)));
    assert!(!cache.is_loaded().await);

    source.failing.store(false, Ordering::SeqCst);
    let index = cache.get().await.expect("recovered");
    assert!(index.contains_item("A", "1", "x"));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_first_callers_share_one_fetch() {
    let source = Arc::new(CountingSource::default());
    let cache = Arc::new(ReferenceCache::new(source.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get().await.map(|index| index.pair_count()) })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.expect("join").expect("get"), 1);
    }
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}
