//! Counter store seam.
//!
//! The aggregator only ever issues merge-upserts with numeric increment
//! field-operations. Stores must apply each `MergeWrite` atomically with
//! respect to concurrent writers: create the document if absent, add every
//! increment, stamp `touch` with the store's clock, and leave other fields
//! untouched.

pub mod memory;
pub mod redis;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tally_core::counters::{CountersDocument, Delta, LAST_UPDATED_FIELD};
use tally_core::error::Result;

use crate::config::{StoreBackend, StoreSection};

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// One create-or-merge write against a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeWrite {
    /// Document key (e.g. `metrics/global`).
    pub key: String,
    /// Field name -> signed amount to add.
    pub increments: BTreeMap<String, i64>,
    /// Field to set to the store's "now".
    pub touch: Option<String>,
}

impl MergeWrite {
    /// Single-counter increment that also stamps `lastUpdated`.
    pub fn for_delta(key: &str, delta: Delta) -> Self {
        Self {
            key: key.to_string(),
            increments: BTreeMap::from([(delta.field.as_str().to_string(), delta.amount)]),
            touch: Some(LAST_UPDATED_FIELD.to_string()),
        }
    }
}

/// Stored document: numeric fields and server timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredDocument {
    pub numbers: BTreeMap<String, i64>,
    pub timestamps: BTreeMap<String, DateTime<Utc>>,
}

impl StoredDocument {
    pub fn counters(&self) -> CountersDocument {
        CountersDocument::from_fields(&self.numbers, &self.timestamps)
    }
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Apply a merge-upsert. Failures map to `TallyError::StoreWrite`.
    async fn merge_increment(&self, write: MergeWrite) -> Result<()>;

    /// Read a document. Used by read-side endpoints only; the write path
    /// never reads.
    async fn get(&self, key: &str) -> Result<Option<StoredDocument>>;
}

/// Open the store selected by `store.backend`.
pub async fn connect(cfg: &StoreSection) -> Result<Arc<dyn CounterStore>> {
    match cfg.backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-process memory store; counters are lost on restart and not shared between instances");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let timeout = Duration::from_millis(cfg.connect_timeout_ms);
            let store = RedisStore::connect(&cfg.url, &cfg.key_prefix, timeout).await?;
            Ok(Arc::new(store))
        }
    }
}
