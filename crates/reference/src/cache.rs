use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info};

use crate::{error::DataFetchError, index::ReferenceIndex, load, source::ReferenceSource};

/// Process-wide memo of the reference index.
///
/// Constructed once at startup and shared by handle; nothing is fetched until
/// the first [`ReferenceCache::get`]. A failed load leaves the cache empty so
/// the next caller retries.
pub struct ReferenceCache {
    source: Arc<dyn ReferenceSource>,
    cached: Mutex<Option<Arc<ReferenceIndex>>>,
}

impl ReferenceCache {
    pub fn new(source: Arc<dyn ReferenceSource>) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Result<Arc<ReferenceIndex>, DataFetchError> {
        // Held across the load so concurrent first callers share one fetch.
        let mut guard = self.cached.lock().await;
        if let Some(index) = guard.as_ref() {
            return Ok(Arc::clone(index));
        }

        let index = load(self.source.as_ref()).await.map_err(|err| {
            error!(source = %self.source.describe(), error = %err, "reference load failed");
            err
        })?;
        info!(
            source = %self.source.describe(),
            databases = index.entries().len(),
            purchase_orders = index.pair_count(),
            "reference index loaded"
        );
        let index = Arc::new(index);
        *guard = Some(Arc::clone(&index));
        Ok(index)
    }

    pub async fn invalidate(&self) {
        let mut guard = self.cached.lock().await;
        if guard.take().is_some() {
            info!(source = %self.source.describe(), "reference index invalidated");
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.cached.lock().await.is_some()
    }
}
