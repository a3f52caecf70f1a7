//! Pure mapping from events to counter deltas.
//!
//! Every event yields zero or one delta. Applying it is the store's job and
//! must be an increment field-operation, never a read followed by a write.

use crate::counters::{CounterField, Delta};
use crate::protocol::Event;

/// How a child record changed across one write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    Created,
    Deleted,
    Updated,
    /// Neither side existed (e.g. deleting an already-missing record).
    Absent,
}

impl RecordChange {
    pub fn classify(existed_before: bool, existed_after: bool) -> Self {
        match (existed_before, existed_after) {
            (false, true) => RecordChange::Created,
            (true, false) => RecordChange::Deleted,
            (true, true) => RecordChange::Updated,
            (false, false) => RecordChange::Absent,
        }
    }
}

/// Delta to apply for `event`, or `None` when the counters are unaffected.
pub fn delta_for(event: &Event) -> Option<Delta> {
    match event {
        Event::UserCreated { .. } => Some(Delta::increment(CounterField::TotalUsers)),
        Event::UserDeleted { .. } => Some(Delta::decrement(CounterField::TotalUsers)),
        Event::RecordWritten(w) => match RecordChange::classify(w.existed_before, w.existed_after) {
            RecordChange::Created => Some(Delta::increment(CounterField::TotalReceipts)),
            RecordChange::Deleted => Some(Delta::decrement(CounterField::TotalReceipts)),
            RecordChange::Updated | RecordChange::Absent => None,
        },
    }
}
