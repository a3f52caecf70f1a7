//! Shared error type across tally crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Body is not a decodable envelope.
    BadRequest,
    /// No handler registered for the event type.
    UnknownEvent,
    /// Unsupported envelope or config version.
    UnsupportedVersion,
    /// Event is missing identifying fields.
    MalformedEvent,
    /// Merge-upsert against the counters document failed.
    StoreWriteFailed,
    /// Internal error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnknownEvent => "UNKNOWN_EVENT",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::MalformedEvent => "MALFORMED_EVENT",
            ClientCode::StoreWriteFailed => "STORE_WRITE_FAILED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Unified error type used by core and aggregator.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unknown event type: {0}")]
    UnknownEvent(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("malformed event: {0}")]
    MalformedEvent(String),
    #[error("store write failed: {0}")]
    StoreWrite(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TallyError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TallyError::BadRequest(_) => ClientCode::BadRequest,
            TallyError::UnknownEvent(_) => ClientCode::UnknownEvent,
            TallyError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            TallyError::MalformedEvent(_) => ClientCode::MalformedEvent,
            TallyError::StoreWrite(_) => ClientCode::StoreWriteFailed,
            TallyError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Whether redelivering the same event may succeed.
    ///
    /// Only store failures qualify; every other error is a property of the
    /// event itself and fails the same way on every attempt.
    pub fn is_retriable(&self) -> bool {
        matches!(self, TallyError::StoreWrite(_))
    }
}
