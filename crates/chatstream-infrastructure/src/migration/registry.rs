//! Migration registry holding, per event type, the known version edges.
//!
//! Unlike a linear chain, the edges for one event type may form any directed
//! graph: branches, shortcuts, duplicates and cycles are all accepted. Path
//! selection is left to the resolver.

use super::traits::{FnTransform, PayloadTransform, TypedMigration, TypedTransform};
use anyhow::Result;
use chatstream_core::event::{EventType, SchemaVersion};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One directed `from -> to` edge with the transform that realises it.
#[derive(Clone)]
pub struct MigrationEdge {
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    pub transform: Arc<dyn PayloadTransform>,
}

impl MigrationEdge {
    /// Creates an edge from a closure over loose JSON records.
    pub fn new<F>(from: impl Into<SchemaVersion>, to: impl Into<SchemaVersion>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            from: from.into(),
            to: to.into(),
            transform: Arc::new(FnTransform::new(func)),
        }
    }

    /// Creates an edge from a typed migration; versions come from the
    /// migration itself.
    pub fn typed<M, From, To>(migration: M) -> Self
    where
        M: TypedMigration<From, To> + 'static,
        From: DeserializeOwned + 'static,
        To: Serialize + 'static,
    {
        Self {
            from: migration.from_version(),
            to: migration.to_version(),
            transform: Arc::new(TypedTransform::new(migration)),
        }
    }

    pub fn description(&self) -> &str {
        self.transform.description()
    }
}

impl fmt::Debug for MigrationEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationEdge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("description", &self.description())
            .finish()
    }
}

/// Registry of migration edges and current versions, keyed by event type.
///
/// Built once at startup and then shared read-only, typically behind an
/// `Arc`. Edges are kept in registration order, which is also the order the
/// resolver explores them in.
///
/// # Example
///
/// ```ignore
/// let mut registry = MigrationRegistry::new();
/// registry.register(EventType::Thought, "1.0", "1.1", |v| Ok(v));
/// registry.set_current_version(EventType::Thought, "1.1");
/// let registry = Arc::new(registry);
/// ```
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    edges: HashMap<EventType, Vec<MigrationEdge>>,
    current_versions: HashMap<EventType, SchemaVersion>,
}

impl MigrationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one edge for `event_type`.
    ///
    /// No cycle or duplicate validation is performed.
    pub fn register<F>(
        &mut self,
        event_type: EventType,
        from: impl Into<SchemaVersion>,
        to: impl Into<SchemaVersion>,
        transform: F,
    ) where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.push_edge(event_type, MigrationEdge::new(from, to, transform));
    }

    /// Appends an edge built from a typed migration.
    pub fn register_migration<M, From, To>(&mut self, event_type: EventType, migration: M)
    where
        M: TypedMigration<From, To> + 'static,
        From: DeserializeOwned + 'static,
        To: Serialize + 'static,
    {
        self.push_edge(event_type, MigrationEdge::typed(migration));
    }

    /// Appends several edges at once, in order.
    ///
    /// Equivalent to calling [`register`](Self::register) for each edge.
    pub fn register_batch(&mut self, event_type: EventType, edges: Vec<MigrationEdge>) {
        for edge in edges {
            self.push_edge(event_type, edge);
        }
    }

    fn push_edge(&mut self, event_type: EventType, edge: MigrationEdge) {
        tracing::debug!(
            "Registered {} migration {} -> {} ({})",
            event_type,
            edge.from,
            edge.to,
            edge.description()
        );
        self.edges.entry(event_type).or_default().push(edge);
    }

    /// Returns the edges registered for `event_type`, in registration order.
    pub fn edges_for_type(&self, event_type: EventType) -> &[MigrationEdge] {
        self.edges
            .get(&event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sets the version payloads of `event_type` are migrated to by default.
    pub fn set_current_version(&mut self, event_type: EventType, version: impl Into<SchemaVersion>) {
        self.current_versions.insert(event_type, version.into());
    }

    /// Returns the current version for `event_type`, falling back to the
    /// default schema version.
    pub fn current_version(&self, event_type: EventType) -> SchemaVersion {
        self.current_versions
            .get(&event_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the event types that have at least one registered edge, in
    /// declaration order.
    pub fn migratable_event_types(&self) -> Vec<EventType> {
        EventType::all()
            .into_iter()
            .filter(|event_type| !self.edges_for_type(*event_type).is_empty())
            .collect()
    }

    /// Returns true if no edges are registered for any event type.
    pub fn is_empty(&self) -> bool {
        self.edges.values().all(Vec::is_empty)
    }

    /// Returns the total number of registered edges.
    pub fn len(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
