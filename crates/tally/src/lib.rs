//! Top-level facade crate for tally.
//!
//! Re-exports core types and the aggregator library so users can depend on a single crate.

pub mod core {
    pub use tally_core::*;
}

pub mod aggregator {
    pub use tally_aggregator::*;
}
