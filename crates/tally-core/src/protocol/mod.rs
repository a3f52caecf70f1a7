//! Inbound event protocol.
//!
//! Deliveries arrive as JSON envelopes whose `data` is kept raw until the
//! handler that owns the event type decodes it into a typed payload. Decoding
//! never panics: bad input is reported as `BadRequest` (undecodable envelope)
//! or `MalformedEvent` (payload missing identifying fields).

pub mod envelope;
pub mod event;

pub use envelope::{decode_payload, Envelope, ENVELOPE_VERSION};
pub use event::{Event, RecordWrite, RecordWrittenPayload, UserPayload};

/// Event type: a user account was created by the identity provider.
pub const USER_CREATED: &str = "user.created";
/// Event type: a user account was deleted by the identity provider.
pub const USER_DELETED: &str = "user.deleted";
/// Event type: a child record was created, updated, or deleted.
pub const RECORD_WRITTEN: &str = "record.written";
