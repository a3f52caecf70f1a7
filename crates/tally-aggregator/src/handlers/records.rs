use async_trait::async_trait;

use tally_core::delta::{delta_for, RecordChange};
use tally_core::error::{Result, TallyError};
use tally_core::path::PathTemplate;
use tally_core::protocol::{decode_payload, Envelope, Event, RecordWrittenPayload, RECORD_WRITTEN};

use crate::aggregator::MetricsAggregator;
use crate::dispatch::{EventHandler, Outcome};

/// Counts child records (creations and deletions) into `totalReceipts`.
pub struct RecordWriteHandler {
    template: PathTemplate,
    aggregator: MetricsAggregator,
}

impl RecordWriteHandler {
    pub fn new(template: PathTemplate, aggregator: MetricsAggregator) -> Self {
        Self {
            template,
            aggregator,
        }
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }
}

#[async_trait]
impl EventHandler for RecordWriteHandler {
    fn event_type(&self) -> &'static str {
        RECORD_WRITTEN
    }

    async fn handle(&self, env: Envelope) -> Result<Outcome> {
        let event = decode_payload::<RecordWrittenPayload>(&env)
            .and_then(|p| p.into_event(&self.template))
            .map_err(|e| {
                tracing::warn!(event_type = RECORD_WRITTEN, delivery = ?env.id, error = %e, "rejecting record event");
                e
            })?;

        let Event::RecordWritten(w) = &event else {
            return Err(TallyError::Internal("record handler decoded a non-record event".into()));
        };
        let change = RecordChange::classify(w.existed_before, w.existed_after);

        let Some(delta) = delta_for(&event) else {
            tracing::debug!(parent_id = %w.parent_id, record_id = %w.record_id, ?change, "record write leaves counters unchanged");
            return Ok(Outcome::Skipped);
        };

        match change {
            RecordChange::Created => tracing::info!(parent_id = %w.parent_id, record_id = %w.record_id, "record created; incrementing totalReceipts"),
            _ => tracing::info!(parent_id = %w.parent_id, record_id = %w.record_id, "record deleted; decrementing totalReceipts"),
        }

        self.aggregator.apply(delta).await?;
        Ok(Outcome::Applied(delta))
    }
}
