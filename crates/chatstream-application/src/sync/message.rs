use chatstream_core::event::EventEnvelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A state change one tab announces to the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncMessage {
    /// An agent event that has already been migrated to the current schema.
    AgentEvent { envelope: EventEnvelope },
    ConversationSwitched { conversation_id: String },
    ConversationUpdated { conversation_id: String },
    ConversationDeleted { conversation_id: String },
}

/// A [`SyncMessage`] stamped with the tab that sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    pub origin: Uuid,
    pub sent_at: DateTime<Utc>,
    pub message: SyncMessage,
}

impl SyncEnvelope {
    pub fn new(origin: Uuid, message: SyncMessage) -> Self {
        Self {
            origin,
            sent_at: Utc::now(),
            message,
        }
    }
}
