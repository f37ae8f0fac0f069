//! Versioned wire wrapper around one backend-emitted event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::event_type::EventType;
use super::version::SchemaVersion;

/// The envelope every event arrives in over SSE/WebSocket.
///
/// `event_type` is kept as the raw wire string so that events the client does
/// not know about can still be carried through untouched. Use [`kind`] to get
/// the typed tag.
///
/// [`kind`]: EventEnvelope::kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Schema version of `payload`. Defaults to `"1.0"` when absent.
    #[serde(default)]
    pub schema_version: SchemaVersion,
    pub event_id: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    /// Producer of the event (e.g. `"agent"`, `"system"`).
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl EventEnvelope {
    /// Creates an envelope at the default schema version with a fresh id and
    /// the current time.
    pub fn new(event_type: EventType, source: impl Into<String>, payload: Value) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            event_id: Uuid::new_v4().to_string(),
            event_type: event_type.to_string(),
            timestamp: Utc::now(),
            source: source.into(),
            correlation_id: None,
            causation_id: None,
            payload,
            metadata: None,
        }
    }

    pub fn with_schema_version(mut self, version: impl Into<SchemaVersion>) -> Self {
        self.schema_version = version.into();
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.causation_id = Some(id.into());
        self
    }

    /// Returns the typed event tag, or `None` for event types this client
    /// does not know.
    pub fn kind(&self) -> Option<EventType> {
        self.event_type.parse().ok()
    }
}
