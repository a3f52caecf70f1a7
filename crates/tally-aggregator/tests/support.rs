//! Store doubles and helpers shared by aggregator tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use tally_aggregator::app_state::AppState;
use tally_aggregator::config;
use tally_aggregator::store::{CounterStore, MemoryStore, MergeWrite, StoredDocument};
use tally_core::error::{Result, TallyError};
use tally_core::protocol::Envelope;

/// Wraps `MemoryStore`, recording every write and counting reads.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<MergeWrite>>,
    reads: AtomicUsize,
}

impl RecordingStore {
    pub fn writes(&self) -> Vec<MergeWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CounterStore for RecordingStore {
    async fn merge_increment(&self, write: MergeWrite) -> Result<()> {
        self.writes.lock().unwrap().push(write.clone());
        self.inner.merge_increment(write).await
    }

    async fn get(&self, key: &str) -> Result<Option<StoredDocument>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }
}

/// Store whose writes always fail, as a network or permission error would.
#[derive(Default)]
pub struct FailingStore {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl CounterStore for FailingStore {
    async fn merge_increment(&self, _write: MergeWrite) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TallyError::StoreWrite("permission denied".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<StoredDocument>> {
        Ok(None)
    }
}

pub const MINIMAL_CONFIG: &str = "version: 1\n";

pub fn state_with(store: Arc<dyn CounterStore>) -> AppState {
    let cfg = config::load_from_str(MINIMAL_CONFIG).unwrap();
    AppState::with_store(cfg, store).unwrap()
}

pub fn envelope(v: Value) -> Envelope {
    Envelope::from_slice(v.to_string().as_bytes()).unwrap()
}

pub fn user_created(uid: &str) -> Value {
    serde_json::json!({ "v": 1, "type": "user.created", "data": { "uid": uid } })
}

pub fn user_deleted(uid: &str) -> Value {
    serde_json::json!({ "v": 1, "type": "user.deleted", "data": { "uid": uid } })
}

pub fn record_written(parent: &str, record: &str, before: bool, after: bool) -> Value {
    serde_json::json!({
        "v": 1,
        "type": "record.written",
        "data": {
            "path": format!("users/{parent}/receipts/{record}"),
            "existedBefore": before,
            "existedAfter": after
        }
    })
}

/// Every ordering of `items`.
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}
