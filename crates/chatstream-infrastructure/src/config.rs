//! Settings for event migration, stored as TOML.
//!
//! ```toml
//! fault_policy = "partial_result"   # or "original"
//! log_filter = "chatstream=debug"
//!
//! [current_versions]
//! thought = "2.0"
//! work_plan = "1.1"
//! ```

use crate::migration::{FaultPolicy, MigrationRegistry};
use crate::paths::ChatstreamPaths;
use chatstream_core::error::{ChatstreamError, Result};
use chatstream_core::event::EventType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Migration settings loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
    /// What a failed migration step hands back to the caller.
    pub fault_policy: FaultPolicy,
    /// Overrides for the version each event type is migrated to, keyed by
    /// the wire name of the event type.
    pub current_versions: BTreeMap<String, String>,
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: Option<String>,
}

impl MigrationSettings {
    /// Loads settings from `path`.
    ///
    /// A missing or empty file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// names an unknown event type.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No migration settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;

        tracing::info!("Loaded migration settings from {:?}", path);
        Ok(settings)
    }

    /// Loads settings from the default per-user location.
    pub fn load_default() -> Result<Self> {
        let path = ChatstreamPaths::config_file()?;
        Self::load(&path)
    }

    /// Checks that every key in `current_versions` is a known event type.
    pub fn validate(&self) -> Result<()> {
        for name in self.current_versions.keys() {
            name.parse::<EventType>()
                .map_err(|_| ChatstreamError::config(format!(
                    "Unknown event type '{}' in current_versions",
                    name
                )))?;
        }
        Ok(())
    }

    /// Installs the current version overrides into `registry`.
    pub fn apply_to(&self, registry: &mut MigrationRegistry) -> Result<()> {
        for (name, version) in &self.current_versions {
            let event_type: EventType = name
                .parse()
                .map_err(|_| ChatstreamError::UnknownEventType(name.clone()))?;
            registry.set_current_version(event_type, version.as_str());
        }
        Ok(())
    }
}
