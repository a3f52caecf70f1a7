//! tally aggregator library entry.
//!
//! This crate wires the counter store, aggregator, dispatcher, handlers, and
//! HTTP transport into the counters service. It is consumed by the binary
//! (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod aggregator;
pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
pub mod transport;
