//! Domain types shared by the chatstream crates: event tags, schema versions,
//! the wire envelope, typed payload records and the common error type.

pub mod error;
pub mod event;

pub use error::{ChatstreamError, Result};
pub use event::{EventEnvelope, EventType, SchemaVersion};
