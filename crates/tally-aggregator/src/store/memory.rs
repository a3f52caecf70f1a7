//! In-process `CounterStore` backed by `DashMap`.
//!
//! Each merge runs while holding the document's shard entry, so concurrent
//! merges on the same key serialize inside the store and increments commute.
//! Callers never see an intermediate value.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use tally_core::error::{Result, TallyError};

use super::{CounterStore, MergeWrite, StoredDocument};

#[derive(Default)]
pub struct MemoryStore {
    docs: DashMap<String, StoredDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn merge_increment(&self, write: MergeWrite) -> Result<()> {
        let MergeWrite {
            key,
            increments,
            touch,
        } = write;

        if key.is_empty() {
            return Err(TallyError::StoreWrite("empty document key".into()));
        }

        let mut doc = self.docs.entry(key).or_insert_with(StoredDocument::default);

        // Compute every new value first so an overflow leaves the document as it was.
        let mut next = Vec::with_capacity(increments.len());
        for (field, amount) in increments {
            let cur = doc.numbers.get(&field).copied().unwrap_or(0);
            let val = cur.checked_add(amount).ok_or_else(|| {
                TallyError::StoreWrite(format!("counter overflow on {field}"))
            })?;
            next.push((field, val));
        }

        doc.numbers.extend(next);
        if let Some(field) = touch {
            doc.timestamps.insert(field, Utc::now());
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredDocument>> {
        Ok(self.docs.get(key).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::BTreeMap;

    use super::*;

    fn write(key: &str, field: &str, amount: i64) -> MergeWrite {
        MergeWrite {
            key: key.into(),
            increments: BTreeMap::from([(field.to_string(), amount)]),
            touch: Some("lastUpdated".into()),
        }
    }

    #[tokio::test]
    async fn merge_leaves_other_fields_alone() {
        let store = MemoryStore::new();
        store.merge_increment(write("metrics/global", "a", 5)).await.unwrap();
        store.merge_increment(write("metrics/global", "b", -2)).await.unwrap();

        let doc = store.get("metrics/global").await.unwrap().unwrap();
        assert_eq!(doc.numbers.get("a"), Some(&5));
        assert_eq!(doc.numbers.get("b"), Some(&-2));
        assert!(doc.timestamps.contains_key("lastUpdated"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn overflow_is_a_store_error_and_changes_nothing() {
        let store = MemoryStore::new();
        store.merge_increment(write("k", "a", i64::MAX)).await.unwrap();
        let before = store.get("k").await.unwrap().unwrap();

        let mut w = write("k", "a", 1);
        w.increments.insert("b".into(), 1);
        let err = store.merge_increment(w).await.unwrap_err();
        assert!(err.is_retriable());

        let after = store.get("k").await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn missing_document_reads_none() {
        let store = MemoryStore::new();
        assert!(store.get("metrics/global").await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
