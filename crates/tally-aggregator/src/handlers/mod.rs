//! Built-in event handlers.
//!
//! Each handler decodes its payload, validates identifiers, maps the event
//! with `delta_for`, and applies at most one delta.

pub mod records;
pub mod users;

pub use records::RecordWriteHandler;
pub use users::UserHandler;
