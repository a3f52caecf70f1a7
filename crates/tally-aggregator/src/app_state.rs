//! Shared application state for the tally aggregator.
//!
//! Wires the counter store, aggregator, dispatcher, and metrics, and
//! registers the handlers enabled by `triggers`. Startup errors are returned,
//! never panicked on.

use std::sync::Arc;

use tally_core::counters::{CounterField, CountersDocument};
use tally_core::error::Result;

use crate::aggregator::MetricsAggregator;
use crate::config::AggregatorConfig;
use crate::dispatch::Dispatcher;
use crate::handlers::{RecordWriteHandler, UserHandler};
use crate::obs::AggregatorMetrics;
use crate::store::{CounterStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AggregatorConfig,
    aggregator: MetricsAggregator,
    dispatcher: Dispatcher,
    metrics: Arc<AggregatorMetrics>,
}

impl AppState {
    /// Build state backed by the in-process `MemoryStore`.
    pub fn new(cfg: AggregatorConfig) -> Result<Self> {
        Self::with_store(cfg, Arc::new(MemoryStore::new()))
    }

    /// Build state on top of an arbitrary store.
    pub fn with_store(cfg: AggregatorConfig, store: Arc<dyn CounterStore>) -> Result<Self> {
        cfg.validate()?;

        let metrics = Arc::new(AggregatorMetrics::default());
        let aggregator = MetricsAggregator::new(store, cfg.counters.document.clone(), Arc::clone(&metrics));
        let dispatcher = Dispatcher::new();

        if cfg.triggers.users {
            dispatcher.register(Arc::new(UserHandler::created(aggregator.clone())));
            dispatcher.register(Arc::new(UserHandler::deleted(aggregator.clone())));
        }
        if cfg.triggers.records {
            let template = cfg.records.template()?;
            dispatcher.register(Arc::new(RecordWriteHandler::new(template, aggregator.clone())));
        }

        tracing::info!(
            document = %cfg.counters.document,
            records = %cfg.records.path,
            handlers = ?dispatcher.registered_types(),
            "aggregator state ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                aggregator,
                dispatcher,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &AggregatorConfig {
        &self.inner.cfg
    }

    pub fn aggregator(&self) -> &MetricsAggregator {
        &self.inner.aggregator
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn metrics(&self) -> &AggregatorMetrics {
        &self.inner.metrics
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    /// Current counter values for `/metrics`.
    pub async fn counter_values(&self) -> Vec<(&'static str, i64)> {
        let doc = match self.inner.aggregator.snapshot().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(error = %e, "counters snapshot failed");
                CountersDocument::default()
            }
        };
        CounterField::ALL
            .into_iter()
            .map(|f| (f.as_str(), doc.get(f)))
            .collect()
    }
}
