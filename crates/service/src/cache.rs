//! Read-through cache for slow-changing collaborator data (weekly templates,
//! service specs). Owned by the calling layer; the engine never sees it.

use std::{collections::HashMap, future::Future, hash::Hash};

use tokio::sync::RwLock;

#[derive(Debug)]
pub struct ReadThroughCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
    enabled: bool,
}

impl<K, V> ReadThroughCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            enabled,
        }
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches what it
    /// finds. Absent values and errors are never cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &K, fetch: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        if self.enabled {
            if let Some(value) = self.entries.read().await.get(key) {
                return Ok(Some(value.clone()));
            }
        }

        let fetched = fetch().await?;
        if self.enabled {
            if let Some(value) = &fetched {
                self.entries.write().await.insert(key.clone(), value.clone());
            }
        }
        Ok(fetched)
    }

    pub async fn invalidate(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
