//! UI-facing migration entry points.
//!
//! Everything here takes raw wire strings and never fails: unknown event
//! types, missing paths and failing transforms all degrade to "use the best
//! payload available" so that a bad event can never take down the consumer.

use super::applicator::{FaultPolicy, MigrationOutcome};
use super::registry::MigrationRegistry;
use crate::config::MigrationSettings;
use chatstream_core::event::{EventEnvelope, EventType, SchemaVersion};
use serde_json::Value;
use std::sync::Arc;

/// Applies registered migrations to incoming event data.
///
/// Cheap to clone; the registry is shared read-only.
#[derive(Debug, Clone)]
pub struct EventMigrator {
    registry: Arc<MigrationRegistry>,
    fault_policy: FaultPolicy,
}

impl EventMigrator {
    pub fn new(registry: Arc<MigrationRegistry>) -> Self {
        Self {
            registry,
            fault_policy: FaultPolicy::default(),
        }
    }

    /// Creates a migrator using the fault policy from `settings`.
    ///
    /// Current-version overrides must already be applied to the registry.
    pub fn with_settings(registry: Arc<MigrationRegistry>, settings: &MigrationSettings) -> Self {
        Self {
            registry,
            fault_policy: settings.fault_policy,
        }
    }

    pub fn with_fault_policy(mut self, fault_policy: FaultPolicy) -> Self {
        self.fault_policy = fault_policy;
        self
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    pub fn fault_policy(&self) -> FaultPolicy {
        self.fault_policy
    }

    /// Migrates `data` of `event_type` from `from` to `to` (or the event
    /// type's current version when `to` is `None`).
    ///
    /// Returns `data` unchanged when the versions are equal, the event type
    /// is unknown, or no path exists.
    pub fn migrate_event_data(
        &self,
        event_type: &str,
        data: Value,
        from: &str,
        to: Option<&str>,
    ) -> Value {
        if to == Some(from) {
            return data;
        }

        let Ok(kind) = event_type.parse::<EventType>() else {
            tracing::debug!(
                "No migrations for unknown event type '{}', using payload as-is",
                event_type
            );
            return data;
        };

        let from = SchemaVersion::new(from);
        let to = to.map(SchemaVersion::new);
        self.migrate(kind, data, &from, to.as_ref()).into_payload()
    }

    /// Typed variant of [`migrate_event_data`](Self::migrate_event_data)
    /// that reports what happened.
    pub fn migrate(
        &self,
        event_type: EventType,
        data: Value,
        from: &SchemaVersion,
        to: Option<&SchemaVersion>,
    ) -> MigrationOutcome {
        let target = to
            .cloned()
            .unwrap_or_else(|| self.registry.current_version(event_type));
        self.registry
            .apply(event_type, data, from, &target, self.fault_policy)
    }

    /// Returns true if data of `event_type` at `from` can be brought to `to`
    /// (or the current version).
    ///
    /// Equal versions are always migratable; unknown event types otherwise
    /// are not.
    pub fn can_migrate(&self, event_type: &str, from: &str, to: Option<&str>) -> bool {
        if to == Some(from) {
            return true;
        }

        let Ok(kind) = event_type.parse::<EventType>() else {
            return false;
        };

        let target = to
            .map(SchemaVersion::new)
            .unwrap_or_else(|| self.registry.current_version(kind));
        self.registry
            .resolve(kind, &SchemaVersion::new(from), &target)
            .is_some()
    }

    /// Returns the event types that have registered migrations.
    pub fn migratable_event_types(&self) -> Vec<EventType> {
        self.registry.migratable_event_types()
    }

    /// Brings an envelope's payload to the current version of its event type.
    ///
    /// `schema_version` is updated to the version the returned payload is
    /// actually at, so a partially migrated payload is never mislabelled.
    pub fn migrate_envelope(&self, mut envelope: EventEnvelope) -> EventEnvelope {
        let Some(kind) = envelope.kind() else {
            return envelope;
        };

        let target = self.registry.current_version(kind);
        if envelope.schema_version == target {
            return envelope;
        }

        let payload = std::mem::take(&mut envelope.payload);
        match self.migrate(kind, payload, &envelope.schema_version, Some(&target)) {
            MigrationOutcome::Unchanged(payload) | MigrationOutcome::NoPath(payload) => {
                envelope.payload = payload;
            }
            MigrationOutcome::Migrated { payload, .. } => {
                envelope.payload = payload;
                envelope.schema_version = target;
            }
            MigrationOutcome::Failed {
                payload, reached, ..
            } => {
                envelope.payload = payload;
                envelope.schema_version = reached;
            }
        }

        envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::build_migration_registry;
    use serde_json::json;

    fn migrator() -> EventMigrator {
        EventMigrator::new(Arc::new(build_migration_registry()))
    }

    #[test]
    fn test_identity_law_for_any_event_type() {
        let migrator = migrator();
        let payload = json!({"anything": [1, 2, 3]});

        for event_type in ["thought", "act", "nonexistent_type"] {
            for version in ["1.0", "2.0", "weird"] {
                let out = migrator.migrate_event_data(event_type, payload.clone(), version, Some(version));
                assert_eq!(out, payload);
            }
        }
    }

    #[test]
    fn test_thought_1_0_to_2_0_scenario() {
        let migrator = migrator();
        let out = migrator.migrate_event_data("thought", json!({"content": "hi"}), "1.0", Some("2.0"));

        assert_eq!(
            out,
            json!({
                "content": "hi",
                "level": "work",
                "thinking_chain": [],
                "metadata": {"migrated_from": "1.1"}
            })
        );
    }

    #[test]
    fn test_default_target_is_current_version() {
        let migrator = migrator();
        let out = migrator.migrate_event_data("thought", json!({"content": "hi"}), "1.0", None);

        assert_eq!(out["level"], "work");
        assert_eq!(out["metadata"]["migrated_from"], "1.1");
    }

    #[test]
    fn test_unknown_event_type() {
        let migrator = migrator();
        let payload = json!({"content": "hi"});

        assert!(!migrator.can_migrate("nonexistent_type", "1.0", Some("2.0")));
        assert_eq!(
            migrator.migrate_event_data("nonexistent_type", payload.clone(), "1.0", Some("2.0")),
            payload
        );
    }

    #[test]
    fn test_can_migrate() {
        let migrator = migrator();

        assert!(migrator.can_migrate("thought", "1.0", Some("2.0")));
        assert!(migrator.can_migrate("thought", "1.1", None));
        assert!(migrator.can_migrate("act", "1.0", Some("1.0")));
        assert!(!migrator.can_migrate("thought", "2.0", Some("1.0")));
        assert!(!migrator.can_migrate("act", "1.0", Some("2.0")));
    }

    #[test]
    fn test_no_path_returns_original() {
        let migrator = migrator();
        let payload = json!({"content": "hi"});

        let out = migrator.migrate_event_data("thought", payload.clone(), "0.5", Some("2.0"));
        assert_eq!(out, payload);
    }

    #[test]
    fn test_builtin_thought_steps_tolerate_loose_payloads() {
        let migrator = migrator();

        let out = migrator.migrate_event_data("thought", json!({"content": null}), "1.0", Some("2.0"));
        assert_eq!(
            out,
            json!({
                "content": null,
                "level": "work",
                "thinking_chain": [],
                "metadata": {"migrated_from": "1.1"}
            })
        );

        let out = migrator.migrate_event_data("thought", json!({}), "1.0", Some("2.0"));
        assert_eq!(
            out,
            json!({
                "level": "work",
                "thinking_chain": [],
                "metadata": {"migrated_from": "1.1"}
            })
        );

        let out = migrator.migrate_event_data(
            "thought",
            json!({"content": "x", "level": "plan"}),
            "1.0",
            Some("1.1"),
        );
        assert_eq!(out, json!({"content": "x", "level": "plan"}));

        let out = migrator.migrate_event_data(
            "thought",
            json!({"content": 42, "level": "plan", "thinking_chain": "oops"}),
            "1.1",
            Some("2.0"),
        );
        assert_eq!(
            out,
            json!({
                "content": 42,
                "level": "plan",
                "thinking_chain": [],
                "metadata": {"migrated_from": "1.1"}
            })
        );
    }

    #[test]
    fn test_failing_step_follows_fault_policy() {
        let mut registry = build_migration_registry();
        registry.register(EventType::Act, "1.0", "1.1", |mut v: Value| {
            v["args"] = json!({});
            Ok(v)
        });
        registry.register(EventType::Act, "1.1", "2.0", |_| anyhow::bail!("boom"));
        let registry = Arc::new(registry);
        let payload = json!({"tool": "ls"});

        let partial = EventMigrator::new(registry.clone());
        let out = partial.migrate_event_data("act", payload.clone(), "1.0", Some("2.0"));
        assert_eq!(out, json!({"tool": "ls", "args": {}}));

        let original = EventMigrator::new(registry).with_fault_policy(FaultPolicy::Original);
        let out = original.migrate_event_data("act", payload.clone(), "1.0", Some("2.0"));
        assert_eq!(out, payload);
    }

    #[test]
    fn test_migrate_envelope_restamps_version() {
        let migrator = migrator();
        let envelope = EventEnvelope::new(EventType::Thought, "agent", json!({"content": "hi"}));

        let migrated = migrator.migrate_envelope(envelope);
        assert_eq!(migrated.schema_version, "2.0");
        assert_eq!(migrated.payload["thinking_chain"], json!([]));
    }

    #[test]
    fn test_migrate_envelope_partial_failure_stamps_reached_version() {
        let mut registry = build_migration_registry();
        registry.register(EventType::Act, "1.0", "1.1", |mut v: Value| {
            v["args"] = json!({});
            Ok(v)
        });
        registry.register(EventType::Act, "1.1", "2.0", |_| anyhow::bail!("boom"));
        registry.set_current_version(EventType::Act, "2.0");

        let migrator = EventMigrator::new(Arc::new(registry));
        let envelope = EventEnvelope::new(EventType::Act, "agent", json!({"tool": "ls"}));

        let migrated = migrator.migrate_envelope(envelope);
        assert_eq!(migrated.schema_version, "1.1");
        assert_eq!(migrated.payload, json!({"tool": "ls", "args": {}}));
    }

    #[test]
    fn test_migrate_envelope_passes_unknown_types_through() {
        let migrator = migrator();
        let mut envelope = EventEnvelope::new(EventType::Thought, "agent", json!({"x": 1}));
        envelope.event_type = "future_event".to_string();

        let out = migrator.migrate_envelope(envelope.clone());
        assert_eq!(out, envelope);
    }

    #[test]
    fn test_migratable_event_types() {
        assert_eq!(migrator().migratable_event_types(), vec![EventType::Thought]);
    }
}
