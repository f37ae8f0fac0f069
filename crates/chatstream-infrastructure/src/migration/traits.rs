//! Core traits for the migration framework.
//!
//! Migrations are authored either as typed `From -> To` functions
//! ([`TypedMigration`]) or as plain closures over loose JSON records. Both are
//! erased to [`PayloadTransform`] at the graph boundary so the registry can
//! chain steps between arbitrary payload shapes.

use anyhow::{Context, Result};
use chatstream_core::error::Result as ChatstreamResult;
use chatstream_core::event::{EventType, SchemaVersion};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

/// Base trait for all migrations.
///
/// Provides version information and metadata about a migration step.
pub trait Migration: Send + Sync {
    /// Returns the source version this migration starts from.
    fn from_version(&self) -> SchemaVersion;

    /// Returns the target version this migration produces.
    fn to_version(&self) -> SchemaVersion;

    /// Returns a human-readable description of this migration.
    ///
    /// Used for logging and debugging purposes.
    fn description(&self) -> &str;
}

/// Typed migration that transforms a payload from one version to another.
///
/// The `From` and `To` type parameters are the concrete payload records for
/// the two schema versions.
pub trait TypedMigration<From, To>: Migration + std::fmt::Debug {
    /// Executes the migration.
    ///
    /// Implementations should be pure and should supply defaults for fields
    /// introduced at this version step.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be transformed.
    fn migrate(&self, from: From) -> Result<To>;
}

/// A type-erased migration step over loosely-typed JSON records.
pub trait PayloadTransform: Send + Sync {
    /// Transforms one payload. Must be pure: the same input always yields the
    /// same output.
    fn transform(&self, payload: Value) -> Result<Value>;

    fn description(&self) -> &str {
        "custom transform"
    }
}

/// Adapts a closure to [`PayloadTransform`].
pub struct FnTransform<F> {
    func: F,
}

impl<F> FnTransform<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> PayloadTransform for FnTransform<F>
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn transform(&self, payload: Value) -> Result<Value> {
        (self.func)(payload)
    }
}

/// Adapts a [`TypedMigration`] to [`PayloadTransform`].
///
/// The incoming record is deserialized into `From`, migrated, and `To` is
/// serialized back into a record for the next step.
pub struct TypedTransform<M, From, To> {
    migration: M,
    _types: PhantomData<fn(From) -> To>,
}

impl<M, From, To> TypedTransform<M, From, To>
where
    M: TypedMigration<From, To>,
{
    pub fn new(migration: M) -> Self {
        Self {
            migration,
            _types: PhantomData,
        }
    }
}

impl<M, From, To> PayloadTransform for TypedTransform<M, From, To>
where
    M: TypedMigration<From, To>,
    From: DeserializeOwned,
    To: Serialize,
{
    fn transform(&self, payload: Value) -> Result<Value> {
        let input: From = serde_json::from_value(payload).with_context(|| {
            format!(
                "Payload does not match the {} schema",
                self.migration.from_version()
            )
        })?;

        let output = self.migration.migrate(input)?;

        serde_json::to_value(output).with_context(|| {
            format!(
                "Failed to serialize {} payload",
                self.migration.to_version()
            )
        })
    }

    fn description(&self) -> &str {
        self.migration.description()
    }
}

/// Strict migration entry point that reports every non-success as an error.
///
/// The lenient, never-failing variant lives on `EventMigrator`.
pub trait MigrationChain {
    /// Migrates `data` of `event_type` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No migration path exists between the two versions
    /// - Any migration step fails
    fn migrate(
        &self,
        event_type: EventType,
        data: Value,
        from: &SchemaVersion,
        to: &SchemaVersion,
    ) -> ChatstreamResult<Value>;

    /// Returns the version sequence the migration would walk, starting with
    /// `from`, or `None` if no path exists.
    fn available_path(
        &self,
        event_type: EventType,
        from: &SchemaVersion,
        to: &SchemaVersion,
    ) -> Option<Vec<SchemaVersion>>;
}
