//! Application of resolved migration paths to concrete payloads.

use super::registry::MigrationRegistry;
use super::resolver::MigrationPath;
use super::traits::MigrationChain;
use chatstream_core::error::{ChatstreamError, Result};
use chatstream_core::event::{EventType, SchemaVersion};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What to hand back when a transform fails part-way through a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// The payload as of the last successfully applied step.
    #[default]
    PartialResult,
    /// The untouched input payload.
    Original,
}

/// Result of applying migrations to one payload.
///
/// Every variant carries a payload, so callers that only want "the best
/// available data" can use [`into_payload`](Self::into_payload).
#[derive(Debug, Clone)]
pub enum MigrationOutcome {
    /// Source and target versions were equal; nothing was applied.
    Unchanged(Value),
    /// Every step of the path was applied.
    Migrated { payload: Value, steps: usize },
    /// No path exists; the input is returned as-is.
    NoPath(Value),
    /// A step failed. `payload` is chosen by the [`FaultPolicy`] and is at
    /// schema version `reached`.
    Failed {
        payload: Value,
        reached: SchemaVersion,
        applied: usize,
        error: ChatstreamError,
    },
}

impl MigrationOutcome {
    pub fn payload(&self) -> &Value {
        match self {
            Self::Unchanged(payload)
            | Self::NoPath(payload)
            | Self::Migrated { payload, .. }
            | Self::Failed { payload, .. } => payload,
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            Self::Unchanged(payload)
            | Self::NoPath(payload)
            | Self::Migrated { payload, .. }
            | Self::Failed { payload, .. } => payload,
        }
    }

    pub fn is_migrated(&self) -> bool {
        matches!(self, Self::Migrated { .. })
    }

    pub fn is_no_path(&self) -> bool {
        matches!(self, Self::NoPath(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl MigrationPath {
    /// Folds the path's transforms over `payload`, left to right.
    ///
    /// Intermediate shapes are not validated here; each transform is
    /// responsible for its own input.
    pub fn apply(
        &self,
        event_type: EventType,
        payload: Value,
        policy: FaultPolicy,
    ) -> MigrationOutcome {
        if self.is_identity() {
            return MigrationOutcome::Unchanged(payload);
        }

        let original = match policy {
            FaultPolicy::Original => Some(payload.clone()),
            FaultPolicy::PartialResult => None,
        };

        let total = self.len();
        let mut current = payload;
        let mut reached = self.from_version().clone();

        for (i, edge) in self.steps().iter().enumerate() {
            tracing::debug!(
                "{} migration step {}/{}: {} -> {} ({})",
                event_type,
                i + 1,
                total,
                edge.from,
                edge.to,
                edge.description()
            );

            match edge.transform.transform(current.clone()) {
                Ok(next) => {
                    current = next;
                    reached = edge.to.clone();
                }
                Err(err) => {
                    tracing::warn!(
                        "Migration of {} ({} -> {}) failed at step {} ({} -> {}): {:#}",
                        event_type,
                        self.from_version(),
                        self.to_version(),
                        i + 1,
                        edge.from,
                        edge.to,
                        err
                    );

                    let error = ChatstreamError::TransformFailed {
                        event_type: event_type.to_string(),
                        from: edge.from.to_string(),
                        to: edge.to.to_string(),
                        step: i + 1,
                        message: format!("{:#}", err),
                    };

                    return match original {
                        Some(original) => MigrationOutcome::Failed {
                            payload: original,
                            reached: self.from_version().clone(),
                            applied: i,
                            error,
                        },
                        None => MigrationOutcome::Failed {
                            payload: current,
                            reached,
                            applied: i,
                            error,
                        },
                    };
                }
            }
        }

        tracing::debug!(
            "Migrated {} payload {} -> {} ({} steps)",
            event_type,
            self.from_version(),
            self.to_version(),
            total
        );

        MigrationOutcome::Migrated {
            payload: current,
            steps: total,
        }
    }
}

impl MigrationRegistry {
    /// Resolves and applies the migrations for one payload. Never fails:
    /// a missing path is logged and the input is returned unchanged.
    pub fn apply(
        &self,
        event_type: EventType,
        payload: Value,
        from: &SchemaVersion,
        to: &SchemaVersion,
        policy: FaultPolicy,
    ) -> MigrationOutcome {
        match self.resolve(event_type, from, to) {
            Some(path) => path.apply(event_type, payload, policy),
            None => {
                tracing::warn!(
                    "No migration path for {} from {} to {}, using payload as-is",
                    event_type,
                    from,
                    to
                );
                MigrationOutcome::NoPath(payload)
            }
        }
    }
}

impl MigrationChain for MigrationRegistry {
    fn migrate(
        &self,
        event_type: EventType,
        data: Value,
        from: &SchemaVersion,
        to: &SchemaVersion,
    ) -> Result<Value> {
        let path = self.resolve(event_type, from, to).ok_or_else(|| {
            ChatstreamError::no_migration_path(event_type.to_string(), from.as_str(), to.as_str())
        })?;

        match path.apply(event_type, data, FaultPolicy::Original) {
            MigrationOutcome::Failed { error, .. } => Err(error),
            outcome => Ok(outcome.into_payload()),
        }
    }

    fn available_path(
        &self,
        event_type: EventType,
        from: &SchemaVersion,
        to: &SchemaVersion,
    ) -> Option<Vec<SchemaVersion>> {
        self.resolve(event_type, from, to)
            .map(|path| path.versions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result as AnyResult, bail};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn v(label: &str) -> SchemaVersion {
        SchemaVersion::new(label)
    }

    fn tag(name: &'static str) -> impl Fn(Value) -> AnyResult<Value> + Send + Sync + 'static {
        move |mut value: Value| -> AnyResult<Value> {
            let mut trail = value
                .get("trail")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            trail.push(json!(name));
            value["trail"] = Value::Array(trail);
            Ok(value)
        }
    }

    fn failing(_: Value) -> AnyResult<Value> {
        bail!("unexpected payload shape")
    }

    #[test]
    fn test_identity_returns_same_payload() {
        let mut registry = MigrationRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        registry.register(EventType::Thought, "1.0", "1.0", move |v| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(v)
        });

        let payload = json!({"content": "hi", "nested": {"a": 1}});
        let outcome = registry.apply(
            EventType::Thought,
            payload.clone(),
            &v("1.0"),
            &v("1.0"),
            FaultPolicy::default(),
        );

        assert!(matches!(outcome, MigrationOutcome::Unchanged(_)));
        assert_eq!(outcome.into_payload(), payload);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_applies_steps_left_to_right() {
        let mut registry = MigrationRegistry::new();
        registry.register(EventType::Act, "1.0", "1.1", tag("first"));
        registry.register(EventType::Act, "1.1", "1.2", tag("second"));
        registry.register(EventType::Act, "1.2", "2.0", tag("third"));

        let outcome = registry.apply(
            EventType::Act,
            json!({}),
            &v("1.0"),
            &v("2.0"),
            FaultPolicy::default(),
        );

        assert!(outcome.is_migrated());
        assert_eq!(
            outcome.payload()["trail"],
            json!(["first", "second", "third"])
        );
    }

    #[test]
    fn test_no_path_returns_input() {
        let mut registry = MigrationRegistry::new();
        registry.register(EventType::Act, "1.0", "1.1", tag("first"));

        let payload = json!({"tool": "grep"});
        let outcome = registry.apply(
            EventType::Act,
            payload.clone(),
            &v("1.0"),
            &v("9.0"),
            FaultPolicy::default(),
        );

        assert!(outcome.is_no_path());
        assert_eq!(outcome.into_payload(), payload);
    }

    #[test]
    fn test_fault_partial_result_keeps_completed_steps() {
        let mut registry = MigrationRegistry::new();
        registry.register(EventType::Act, "1.0", "1.1", tag("first"));
        registry.register(EventType::Act, "1.1", "1.2", failing);
        registry.register(EventType::Act, "1.2", "2.0", tag("third"));

        let outcome = registry.apply(
            EventType::Act,
            json!({}),
            &v("1.0"),
            &v("2.0"),
            FaultPolicy::PartialResult,
        );

        match outcome {
            MigrationOutcome::Failed {
                payload,
                reached,
                applied,
                error,
            } => {
                assert_eq!(payload, json!({"trail": ["first"]}));
                assert_eq!(reached, "1.1");
                assert_eq!(applied, 1);
                assert!(error.is_transform_failed());
                assert!(error.to_string().contains("unexpected payload shape"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_fault_original_policy_returns_input() {
        let mut registry = MigrationRegistry::new();
        registry.register(EventType::Act, "1.0", "1.1", tag("first"));
        registry.register(EventType::Act, "1.1", "2.0", failing);

        let payload = json!({"tool": "ls"});
        let outcome = registry.apply(
            EventType::Act,
            payload.clone(),
            &v("1.0"),
            &v("2.0"),
            FaultPolicy::Original,
        );

        match outcome {
            MigrationOutcome::Failed {
                payload: returned,
                reached,
                applied,
                ..
            } => {
                assert_eq!(returned, payload);
                assert_eq!(reached, "1.0");
                assert_eq!(applied, 1);
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_migrate_reports_errors() {
        let mut registry = MigrationRegistry::new();
        registry.register(EventType::Act, "1.0", "1.1", failing);
        registry.register(EventType::Act, "2.0", "2.1", tag("ok"));

        let err = registry
            .migrate(EventType::Act, json!({}), &v("1.0"), &v("1.1"))
            .unwrap_err();
        assert!(err.is_transform_failed());

        let err = registry
            .migrate(EventType::Act, json!({}), &v("1.0"), &v("3.0"))
            .unwrap_err();
        assert!(err.is_no_migration_path());

        let migrated = registry
            .migrate(EventType::Act, json!({}), &v("2.0"), &v("2.1"))
            .unwrap();
        assert_eq!(migrated, json!({"trail": ["ok"]}));
    }

    #[test]
    fn test_available_path_lists_versions() {
        let mut registry = MigrationRegistry::new();
        registry.register(EventType::Thought, "1.0", "1.1", tag("a"));
        registry.register(EventType::Thought, "1.1", "2.0", tag("b"));

        let path = registry
            .available_path(EventType::Thought, &v("1.0"), &v("2.0"))
            .unwrap();
        assert_eq!(path, vec![v("1.0"), v("1.1"), v("2.0")]);
        assert!(registry
            .available_path(EventType::Thought, &v("2.0"), &v("1.0"))
            .is_none());
    }
}
