pub mod envelope;
pub mod event_type;
pub mod thought;
pub mod version;

pub use envelope::EventEnvelope;
pub use event_type::EventType;
pub use thought::{ThoughtLevel, ThoughtV1_0, ThoughtV1_1, ThoughtV2_0};
pub use version::{DEFAULT_SCHEMA_VERSION, SchemaVersion};
