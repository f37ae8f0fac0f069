use serde::{Deserialize, Serialize};
use std::fmt;

/// Version assumed when an envelope does not carry one.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// An opaque schema version label such as `"1.0"` or `"2.0"`.
///
/// Versions are graph nodes: only equality is meaningful, there is no ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(String);

impl SchemaVersion {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_VERSION)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaVersion {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for SchemaVersion {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl AsRef<str> for SchemaVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SchemaVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SchemaVersion {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
