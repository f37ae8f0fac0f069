//! Thought payload records, one per schema version.
//!
//! Each version keeps unknown fields in `extra` so that a chain of migrations
//! never drops data it does not understand. Fields are loosely typed: a value
//! of an unexpected shape is carried through as-is rather than rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const THOUGHT_V1_0_VERSION: &str = "1.0";
pub const THOUGHT_V1_1_VERSION: &str = "1.1";
pub const THOUGHT_V2_0_VERSION: &str = "2.0";

/// Which part of the agent loop produced a thought.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtLevel {
    /// Task-level planning.
    Task,
    /// Reasoning while working on a single step.
    #[default]
    Work,
    /// A level this client does not know, kept verbatim.
    #[serde(untagged)]
    Other(Value),
}

impl From<Value> for ThoughtLevel {
    fn from(raw: Value) -> Self {
        match raw.as_str() {
            Some("task") => Self::Task,
            Some("work") => Self::Work,
            _ => Self::Other(raw),
        }
    }
}

/// Distinguishes an explicit `null` from a missing field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Thought payload, schema 1.0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThoughtV1_0 {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Thought payload, schema 1.1.
///
/// Introduces `level`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThoughtV1_1 {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Value>,
    #[serde(default)]
    pub level: ThoughtLevel,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Thought payload, schema 2.0.
///
/// Introduces `thinking_chain` and a `metadata` object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ThoughtV2_0 {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Value>,
    #[serde(default)]
    pub level: ThoughtLevel,
    #[serde(default)]
    pub thinking_chain: Vec<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
