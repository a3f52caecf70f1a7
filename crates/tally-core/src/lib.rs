//! tally core: transport-agnostic event primitives, counter model, and errors.
//!
//! This crate defines the inbound event contract, the counters document model,
//! and the pure mapping from events to counter deltas. It carries no transport
//! or runtime dependencies so the mapping can be exercised without a store.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed events surface as `TallyError::MalformedEvent` so a bad delivery
//! never takes the process down or touches the counters document.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod counters;
pub mod delta;
pub mod error;
pub mod path;
pub mod protocol;

/// Shared result type.
pub use error::{Result, TallyError};
