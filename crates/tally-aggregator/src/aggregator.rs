//! Metrics aggregator: applies counter deltas to the shared counters document.
//!
//! Every call is a single merge-upsert carrying an increment field-operation.
//! Nothing here reads the current value before writing, so concurrent
//! invocations (in this process or others sharing the store) cannot lose
//! updates. No retries: failures go straight back to the delivery layer.

use std::sync::Arc;
use std::time::Instant;

use tally_core::counters::{CounterField, CountersDocument, Delta};
use tally_core::error::{Result, TallyError};

use crate::obs::AggregatorMetrics;
use crate::store::{CounterStore, MergeWrite};

#[derive(Clone)]
pub struct MetricsAggregator {
    store: Arc<dyn CounterStore>,
    document: String,
    metrics: Arc<AggregatorMetrics>,
}

impl MetricsAggregator {
    pub fn new(
        store: Arc<dyn CounterStore>,
        document: impl Into<String>,
        metrics: Arc<AggregatorMetrics>,
    ) -> Self {
        Self {
            store,
            document: document.into(),
            metrics,
        }
    }

    /// Key of the counters document this aggregator writes to.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Atomically add `delta` to `field` and stamp `lastUpdated`.
    /// Creates the document on first use.
    pub async fn apply_delta(&self, field: CounterField, delta: i64) -> Result<()> {
        self.apply(Delta::new(field, delta)).await
    }

    /// `apply_delta` addressed by counter name.
    pub async fn apply_named(&self, counter: &str, delta: i64) -> Result<()> {
        let field: CounterField = counter.parse()?;
        self.apply_delta(field, delta).await
    }

    pub async fn apply(&self, delta: Delta) -> Result<()> {
        let write = MergeWrite::for_delta(&self.document, delta);
        let started = Instant::now();
        let res = self.store.merge_increment(write).await;
        self.metrics
            .store_write_duration
            .observe(&[("field", delta.field.as_str())], started.elapsed());

        match res {
            Ok(()) => {
                self.metrics.store_writes.inc(&[("result", "ok")]);
                tracing::debug!(document = %self.document, field = %delta.field, amount = delta.amount, "counter merged");
                Ok(())
            }
            Err(e) => {
                self.metrics.store_writes.inc(&[("result", "error")]);
                tracing::warn!(document = %self.document, field = %delta.field, amount = delta.amount, error = %e, "counter merge failed");
                Err(match e {
                    TallyError::StoreWrite(_) => e,
                    other => TallyError::StoreWrite(other.to_string()),
                })
            }
        }
    }

    /// Current counters. An absent document reads as all zeros.
    pub async fn snapshot(&self) -> Result<CountersDocument> {
        let doc = self.store.get(&self.document).await?;
        Ok(doc.map(|d| d.counters()).unwrap_or_default())
    }
}
