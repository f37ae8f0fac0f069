//! Ingestion of backend events into current-schema envelopes.

use crate::sse::parse_sse_frame;
use crate::sync::{SyncMessage, TabSync};
use chatstream_core::error::Result;
use chatstream_core::event::EventEnvelope;
use chatstream_infrastructure::{EventMigrator, MigrationSettings, build_event_migrator};
use serde_json::Value;
use std::sync::Arc;

/// Parses raw backend events, migrates their payloads to the current schema,
/// and optionally relays them to other tabs.
pub struct EventIngestionService {
    migrator: EventMigrator,
    relay: Option<Arc<TabSync>>,
}

impl EventIngestionService {
    pub fn new(migrator: EventMigrator) -> Self {
        Self {
            migrator,
            relay: None,
        }
    }

    /// Builds the service with the built-in migrations and `settings`.
    pub fn from_settings(settings: &MigrationSettings) -> Result<Self> {
        Ok(Self::new(build_event_migrator(settings)?))
    }

    /// Relays every ingested envelope to the other tabs through `relay`.
    pub fn with_relay(mut self, relay: Arc<TabSync>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn migrator(&self) -> &EventMigrator {
        &self.migrator
    }

    /// Ingests an envelope that has already been decoded to JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `raw` is not an envelope.
    pub fn ingest_value(&self, raw: Value) -> Result<EventEnvelope> {
        let envelope: EventEnvelope = serde_json::from_value(raw)?;
        Ok(self.accept(envelope))
    }

    /// Ingests one envelope encoded as JSON text.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `raw` is not a JSON envelope.
    pub fn ingest_json(&self, raw: &str) -> Result<EventEnvelope> {
        let envelope: EventEnvelope = serde_json::from_str(raw)?;
        Ok(self.accept(envelope))
    }

    /// Ingests one SSE frame. Frames without data (keep-alives) yield `None`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the frame data is not a JSON envelope.
    pub fn ingest_sse_frame(&self, frame: &str) -> Result<Option<EventEnvelope>> {
        let Some(frame) = parse_sse_frame(frame) else {
            return Ok(None);
        };

        tracing::trace!(
            "SSE frame event={:?} id={:?} ({} bytes)",
            frame.event,
            frame.id,
            frame.data.len()
        );

        self.ingest_json(&frame.data).map(Some)
    }

    fn accept(&self, envelope: EventEnvelope) -> EventEnvelope {
        let from_version = envelope.schema_version.clone();
        let envelope = self.migrator.migrate_envelope(envelope);

        if envelope.schema_version != from_version {
            tracing::debug!(
                "Event {} ({}) migrated {} -> {}",
                envelope.event_id,
                envelope.event_type,
                from_version,
                envelope.schema_version
            );
        }

        if let Some(relay) = &self.relay {
            let message = SyncMessage::AgentEvent {
                envelope: envelope.clone(),
            };
            if let Err(e) = relay.post(message) {
                tracing::warn!("Failed to relay event {}: {}", envelope.event_id, e);
            }
        }

        envelope
    }
}
