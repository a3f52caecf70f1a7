use async_trait::async_trait;

use tally_core::delta::delta_for;
use tally_core::error::{Result, TallyError};
use tally_core::protocol::{decode_payload, Envelope, Event, UserPayload, USER_CREATED, USER_DELETED};

use crate::aggregator::MetricsAggregator;
use crate::dispatch::{EventHandler, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserEvent {
    Created,
    Deleted,
}

/// Counts identity-provider accounts into `totalUsers`.
pub struct UserHandler {
    kind: UserEvent,
    aggregator: MetricsAggregator,
}

impl UserHandler {
    pub fn created(aggregator: MetricsAggregator) -> Self {
        Self {
            kind: UserEvent::Created,
            aggregator,
        }
    }

    pub fn deleted(aggregator: MetricsAggregator) -> Self {
        Self {
            kind: UserEvent::Deleted,
            aggregator,
        }
    }

    fn decode(&self, env: &Envelope) -> Result<Event> {
        let user_id = decode_payload::<UserPayload>(env)?.uid;
        let event = match self.kind {
            UserEvent::Created => Event::UserCreated { user_id },
            UserEvent::Deleted => Event::UserDeleted { user_id },
        };
        event.validate()?;
        Ok(event)
    }
}

#[async_trait]
impl EventHandler for UserHandler {
    fn event_type(&self) -> &'static str {
        match self.kind {
            UserEvent::Created => USER_CREATED,
            UserEvent::Deleted => USER_DELETED,
        }
    }

    async fn handle(&self, env: Envelope) -> Result<Outcome> {
        let event = self.decode(&env).map_err(|e| {
            tracing::warn!(event_type = self.event_type(), delivery = ?env.id, error = %e, "rejecting user event");
            e
        })?;

        let (Event::UserCreated { user_id } | Event::UserDeleted { user_id }) = &event else {
            return Err(TallyError::Internal("user handler decoded a non-user event".into()));
        };
        let Some(delta) = delta_for(&event) else {
            return Ok(Outcome::Skipped);
        };

        match self.kind {
            UserEvent::Created => tracing::info!(%user_id, "user created; incrementing totalUsers"),
            UserEvent::Deleted => tracing::info!(%user_id, "user deleted; decrementing totalUsers"),
        }

        self.aggregator.apply(delta).await?;
        Ok(Outcome::Applied(delta))
    }
}
