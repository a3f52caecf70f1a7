//! Transport layer (HTTP ingestion).
//!
//! Exposes the event ingestion and counters read handlers, and the codec that
//! decodes a delivery once before it reaches the dispatcher.

pub mod codec;
pub mod http;
