use std::{fmt, sync::Arc, time::Duration};

use moka::future::Cache;
use serde_json::Value;
use tracing::debug;

/// Default time a cached view result stays fresh.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

const DEFAULT_CAPACITY: u64 = 10_000;

/// Hierarchical cache key, e.g. `gauge-earned / <pool> / <position>`.
///
/// Invalidation matches by prefix, so `gauge-earned / <pool>` drops every
/// position of that pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(name: &str) -> Self {
        Self(vec![name.to_owned()])
    }

    pub fn with(mut self, part: impl fmt::Display) -> Self {
        self.0.push(part.to_string());
        self
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Raw view results keyed by [`QueryKey`].
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<QueryKey, Arc<Vec<Value>>>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME, DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    pub fn new(stale_time: Duration, max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(stale_time)
                .max_capacity(max_capacity)
                .build(),
        }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<Arc<Vec<Value>>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: QueryKey, value: Arc<Vec<Value>>) {
        self.inner.insert(key, value).await;
    }

    /// Drop every entry whose key starts with `prefix`. Returns how many were
    /// dropped.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let stale: Vec<Arc<QueryKey>> = self
            .inner
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();
        for key in &stale {
            self.inner.invalidate(key.as_ref()).await;
        }
        debug!(%prefix, dropped = stale.len(), "invalidated cached queries");
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earned(pool: &str, position: u64) -> QueryKey {
        QueryKey::new("gauge-earned").with(pool).with(position)
    }

    #[tokio::test]
    async fn invalidation_matches_whole_segments() {
        let cache = QueryCache::default();
        let value = Arc::new(vec![Value::from("1")]);
        cache.insert(earned("0x1", 1), value.clone()).await;
        cache.insert(earned("0x1", 2), value.clone()).await;
        cache.insert(earned("0x12", 1), value.clone()).await;
        cache.insert(QueryKey::new("gauge-left").with("0x1"), value).await;

        let dropped = cache
            .invalidate_prefix(&QueryKey::new("gauge-earned").with("0x1"))
            .await;

        assert_eq!(dropped, 2);
        assert!(cache.get(&earned("0x1", 1)).await.is_none());
        assert!(cache.get(&earned("0x12", 1)).await.is_some());
        assert!(cache
            .get(&QueryKey::new("gauge-left").with("0x1"))
            .await
            .is_some());
    }

    #[test]
    fn keys_display_their_path() {
        assert_eq!(earned("0x1", 3).to_string(), "gauge-earned/0x1/3");
    }
}
