use crate::{error::BoardResult, storage::KeyValueStore};
use bytes::Bytes;
use futures::future::BoxFuture;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::time::Instant;

// A `None` deadline never passes.
type SharedEntries = Arc<Mutex<HashMap<String, (Bytes, Option<Instant>)>>>;

/// In-process store. Entries past their deadline read as absent. A TTL too large
/// to be represented as a deadline keeps the entry until it is replaced.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: SharedEntries,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, BoardResult<Option<Bytes>>> {
        Box::pin(async move {
            let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = data
                .get(key)
                .map(|(value, deadline)| (value.clone(), *deadline));
            match entry {
                Some((value, deadline)) if deadline.map_or(true, |d| Instant::now() < d) => {
                    Ok(Some(value))
                }
                Some(_) => {
                    data.remove(key);
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: Bytes,
        expire_after: Duration,
    ) -> BoxFuture<'a, BoardResult<()>> {
        Box::pin(async move {
            let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
            let deadline = Instant::now().checked_add(expire_after);
            data.insert(key.to_string(), (value, deadline));
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_their_ttl() {
        let store = MemoryStore::new();
        store
            .set("board", Bytes::from_static(b"[]"), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(
            store.get("board").await.unwrap(),
            Some(Bytes::from_static(b"[]"))
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("board").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_replaces_the_whole_entry() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(60);
        store.set("board", Bytes::from_static(b"old"), ttl).await.unwrap();
        store.set("board", Bytes::from_static(b"new"), ttl).await.unwrap();
        assert_eq!(
            store.get("board").await.unwrap(),
            Some(Bytes::from_static(b"new"))
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_ttl_keeps_the_entry() {
        let store = MemoryStore::new();
        store
            .set("board", Bytes::from_static(b"[]"), Duration::MAX)
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(365 * 24 * 3600)).await;
        assert_eq!(
            store.get("board").await.unwrap(),
            Some(Bytes::from_static(b"[]"))
        );
    }
}
