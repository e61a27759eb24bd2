use crate::{config::CacheSettings, error::BoardResult};
use bytes::Bytes;
use futures::future::BoxFuture;
use std::{sync::Arc, time::Duration};

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Key-value store with per-entry expiry. The store alone decides when an entry
/// has expired.
pub trait KeyValueStore: Send + Sync {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, BoardResult<Option<Bytes>>>;
    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Bytes,
        expire_after: Duration,
    ) -> BoxFuture<'a, BoardResult<()>>;
}

/// Build the store described by the settings. `None` means caching is disabled.
pub fn from_settings(settings: &CacheSettings) -> BoardResult<Option<Arc<dyn KeyValueStore>>> {
    let store: Option<Arc<dyn KeyValueStore>> = match settings {
        CacheSettings::Disabled => None,
        CacheSettings::Memory => Some(Arc::new(MemoryStore::new())),
        CacheSettings::Rest { url, token } => Some(Arc::new(RestStore::new(url, token)?)),
    };
    Ok(store)
}

