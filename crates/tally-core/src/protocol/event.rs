//! Typed events and their payloads.

use serde::Deserialize;

use crate::error::{Result, TallyError};
use crate::path::PathTemplate;

use super::{RECORD_WRITTEN, USER_CREATED, USER_DELETED};

/// Payload of `user.created` / `user.deleted`.
///
/// Identity providers send the full user record; only the id is read.
#[derive(Debug, Deserialize)]
pub struct UserPayload {
    #[serde(alias = "userId")]
    pub uid: String,
}

/// Payload of `record.written`.
///
/// Either the explicit ids or the written document's `path` identify the
/// record. Explicit ids take precedence.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordWrittenPayload {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    pub existed_before: bool,
    pub existed_after: bool,
}

impl RecordWrittenPayload {
    /// Resolve identifiers and build the typed event.
    pub fn into_event(self, template: &PathTemplate) -> Result<Event> {
        let (parent_id, record_id) = match (self.parent_id, self.record_id, self.path) {
            (Some(p), Some(r), _) => (p, r),
            (_, _, Some(path)) => {
                let (p, r) = template.locate(&path)?;
                (p.to_string(), r.to_string())
            }
            _ => {
                return Err(TallyError::MalformedEvent(
                    "record.written requires parentId and recordId, or path".into(),
                ))
            }
        };

        let event = Event::RecordWritten(RecordWrite {
            parent_id,
            record_id,
            existed_before: self.existed_before,
            existed_after: self.existed_after,
        });
        event.validate()?;
        Ok(event)
    }
}

/// Child-record write as observed by the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordWrite {
    pub parent_id: String,
    pub record_id: String,
    pub existed_before: bool,
    pub existed_after: bool,
}

/// One inbound event. Carries no ownership of the counters document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UserCreated { user_id: String },
    UserDeleted { user_id: String },
    RecordWritten(RecordWrite),
}

impl Event {
    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::UserCreated { .. } => USER_CREATED,
            Event::UserDeleted { .. } => USER_DELETED,
            Event::RecordWritten(_) => RECORD_WRITTEN,
        }
    }

    /// Reject events whose identifying fields are blank.
    pub fn validate(&self) -> Result<()> {
        match self {
            Event::UserCreated { user_id } | Event::UserDeleted { user_id } => {
                require(self.kind(), "uid", user_id)
            }
            Event::RecordWritten(w) => {
                require(RECORD_WRITTEN, "parentId", &w.parent_id)?;
                require(RECORD_WRITTEN, "recordId", &w.record_id)
            }
        }
    }
}

fn require(kind: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TallyError::MalformedEvent(format!(
            "{kind} requires a non-empty {field}"
        )));
    }
    Ok(())
}
