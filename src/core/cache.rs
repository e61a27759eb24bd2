use crate::{error::BoardResult, storage::KeyValueStore};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{future::Future, sync::Arc, time::Duration};
use strum::{AsRefStr, Display};
use tracing::{info, warn};

/// Where a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Cache,
    Fresh,
}

/// Cache-aside over a key-value store. Without a store every call computes fresh.
#[derive(Clone)]
pub struct CacheLayer {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl CacheLayer {
    pub fn new(store: Option<Arc<dyn KeyValueStore>>) -> Self {
        CacheLayer { store }
    }

    pub fn disabled() -> Self {
        CacheLayer { store: None }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Return the cached payload under `key`, or compute it with `refresh` and
    /// store it for `ttl`. A failed refresh leaves the store untouched.
    pub async fn get_or_refresh<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        refresh: F,
    ) -> BoardResult<(T, Source)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = BoardResult<T>>,
    {
        let Some(store) = &self.store else {
            return Ok((refresh().await?, Source::Fresh));
        };

        match store.get(key).await {
            Ok(Some(cached)) => match serde_json::from_slice::<T>(&cached) {
                Ok(payload) => {
                    info!("Cache hit for '{key}'");
                    return Ok((payload, Source::Cache));
                }
                Err(e) => warn!("Discarding undecodable cache entry '{key}'. {e}"),
            },
            Ok(None) => info!("Cache miss for '{key}'"),
            Err(e) => warn!("Could not read cache entry '{key}', refreshing. {e}"),
        }

        let payload = refresh().await?;

        match serde_json::to_vec(&payload) {
            Ok(encoded) => {
                if let Err(e) = store.set(key, Bytes::from(encoded), ttl).await {
                    warn!("Could not store cache entry '{key}'. {e}");
                }
            }
            Err(e) => warn!("Could not encode cache entry '{key}'. {e}"),
        }

        Ok((payload, Source::Fresh))
    }
}
