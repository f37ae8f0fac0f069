//! Thought event migrations.
//!
//! - 1.0 -> 1.1 introduces `level` (defaults to `work`)
//! - 1.1 -> 2.0 introduces `thinking_chain` (defaults to empty) and stamps
//!   `metadata.migrated_from`
//!
//! Neither step fails on fields from earlier versions; values of an
//! unexpected shape are carried through unchanged.

use super::traits::{Migration, TypedMigration};
use anyhow::Result;
use chatstream_core::event::SchemaVersion;
use chatstream_core::event::thought::{
    THOUGHT_V1_0_VERSION, THOUGHT_V1_1_VERSION, THOUGHT_V2_0_VERSION, ThoughtLevel, ThoughtV1_0,
    ThoughtV1_1, ThoughtV2_0,
};
use serde_json::{Map, Value};

/// Migration from ThoughtV1_0 to ThoughtV1_1.
///
/// A `level` that older producers already sent as an extra field is kept
/// as-is, known or not. The default applies only when it is absent.
#[derive(Debug)]
pub struct ThoughtV1_0ToV1_1Migration;

impl Migration for ThoughtV1_0ToV1_1Migration {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(THOUGHT_V1_0_VERSION)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(THOUGHT_V1_1_VERSION)
    }

    fn description(&self) -> &str {
        "Add 'level' (default: work)"
    }
}

impl TypedMigration<ThoughtV1_0, ThoughtV1_1> for ThoughtV1_0ToV1_1Migration {
    fn migrate(&self, v1_0: ThoughtV1_0) -> Result<ThoughtV1_1> {
        let mut extra = v1_0.extra;

        let level = extra
            .remove("level")
            .map(ThoughtLevel::from)
            .unwrap_or_default();

        Ok(ThoughtV1_1 {
            content: v1_0.content,
            level,
            extra,
        })
    }
}

/// Migration from ThoughtV1_1 to ThoughtV2_0.
#[derive(Debug)]
pub struct ThoughtV1_1ToV2_0Migration;

impl Migration for ThoughtV1_1ToV2_0Migration {
    fn from_version(&self) -> SchemaVersion {
        SchemaVersion::new(THOUGHT_V1_1_VERSION)
    }

    fn to_version(&self) -> SchemaVersion {
        SchemaVersion::new(THOUGHT_V2_0_VERSION)
    }

    fn description(&self) -> &str {
        "Add 'thinking_chain', record 'metadata.migrated_from'"
    }
}

impl TypedMigration<ThoughtV1_1, ThoughtV2_0> for ThoughtV1_1ToV2_0Migration {
    fn migrate(&self, v1_1: ThoughtV1_1) -> Result<ThoughtV2_0> {
        let mut extra = v1_1.extra;

        let thinking_chain = match extra.remove("thinking_chain") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                tracing::debug!("Replacing non-array thinking_chain {}", other);
                Vec::new()
            }
            None => Vec::new(),
        };

        let mut metadata = match extra.remove("metadata") {
            Some(Value::Object(map)) => map,
            Some(other) => {
                tracing::debug!("Replacing non-object thought metadata {}", other);
                Map::new()
            }
            None => Map::new(),
        };
        metadata.insert(
            "migrated_from".to_string(),
            Value::String(THOUGHT_V1_1_VERSION.to_string()),
        );

        Ok(ThoughtV2_0 {
            content: v1_1.content,
            level: v1_1.level,
            thinking_chain,
            metadata,
            extra,
        })
    }
}
