//! In-Memory Document Store
//!
//! Holds the roster in memory. Useful for testing; saves can be made to fail
//! to exercise the engine's persistence error path.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::AccountRecord;
use crate::ports::{AccountDocumentStore, StoreError};

/// In-memory roster document
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    records: Arc<RwLock<Vec<AccountRecord>>>,
    save_count: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `records`
    pub fn with_records(records: Vec<AccountRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    /// Make every following save fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Current stored document
    pub async fn stored(&self) -> Vec<AccountRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl AccountDocumentStore for InMemoryDocumentStore {
    async fn load(&self) -> Result<Vec<AccountRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn save(&self, records: &[AccountRecord]) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::io("memory", "save rejected"));
        }
        *self.records.write().await = records.to_vec();
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_replaces_document() {
        let store = InMemoryDocumentStore::with_records(vec![AccountRecord::new("a").unwrap()]);
        store
            .save(&[AccountRecord::new("b").unwrap(), AccountRecord::new("c").unwrap()])
            .await
            .unwrap();

        let names: Vec<_> = store
            .load()
            .await
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "c"]);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn failing_saves_leave_document_untouched() {
        let store = InMemoryDocumentStore::with_records(vec![AccountRecord::new("a").unwrap()]);
        store.set_fail_saves(true);

        assert!(store.save(&[]).await.is_err());
        assert_eq!(store.stored().await.len(), 1);
        assert_eq!(store.save_count(), 0);
    }
}
