//! Event envelope (JSON).
//!
//! The core stores `data` as `RawValue` to enable lazy parsing by handlers.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::{Result, TallyError};

/// Only supported envelope version.
pub const ENVELOPE_VERSION: u8 = 1;

/// Delivery envelope for one event.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Protocol version.
    pub v: u8,
    /// Event type (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub event_type: String,
    /// Delivery id assigned by the event source. Informational only:
    /// redeliveries are not deduplicated.
    #[serde(default)]
    pub id: Option<String>,
    /// Event payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl Envelope {
    /// Parse an envelope and check its version.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let env: Envelope = serde_json::from_slice(bytes)
            .map_err(|e| TallyError::BadRequest(format!("invalid envelope json: {e}")))?;
        if env.v != ENVELOPE_VERSION {
            return Err(TallyError::UnsupportedVersion);
        }
        Ok(env)
    }
}

/// Decode the envelope's `data` into the payload type owned by its handler.
pub fn decode_payload<T: DeserializeOwned>(env: &Envelope) -> Result<T> {
    let raw = env.data.as_ref().ok_or_else(|| {
        TallyError::MalformedEvent(format!("{} requires data", env.event_type))
    })?;
    serde_json::from_str(raw.get()).map_err(|e| {
        TallyError::MalformedEvent(format!("{} invalid data: {e}", env.event_type))
    })
}
