pub mod ingestion;
pub mod sse;
pub mod sync;
pub mod telemetry;

pub use ingestion::EventIngestionService;
pub use sync::{SyncHub, SyncMessage, TabSync};
