//! Event schema migration framework.
//!
//! Backend events carry a `schema_version` per payload. The UI code is
//! written against one current version per event type, so every incoming
//! payload is brought forward through a chain of registered migrations.
//!
//! - Each event type has its own set of migration edges
//! - The edges may form any directed graph; the fewest-hops path is used
//! - Missing paths and failing steps degrade to the best payload available
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     EventMigrator                         │
//! │  (wire strings in, payload out, never fails)              │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            V
//! ┌──────────────────────────────────────────────────────────┐
//! │                   MigrationRegistry                       │
//! │  thought:  1.0 ──> 1.1 ──> 2.0                            │
//! │  act:      (none)                                         │
//! │  ...                                                      │
//! └──────────────────────────────────────────────────────────┘
//!          │ resolve (BFS)              │ apply (fold)
//!          V                            V
//!    MigrationPath  ───────────>  MigrationOutcome
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use chatstream_infrastructure::migration;
//!
//! let settings = MigrationSettings::load_default()?;
//! let migrator = migration::build_event_migrator(&settings)?;
//!
//! let payload = migrator.migrate_event_data("thought", raw_payload, "1.0", None);
//! ```
//!
//! # Adding a migration
//!
//! 1. Add the new payload record to `chatstream_core::event`
//! 2. Implement `Migration` and `TypedMigration<Old, New>` for a migration struct
//! 3. Register it in `build_migration_registry()` and bump the current version

mod applicator;
mod migrator;
mod registry;
mod resolver;
mod thought;
mod traits;

// Public API
pub use applicator::{FaultPolicy, MigrationOutcome};
pub use migrator::EventMigrator;
pub use registry::{MigrationEdge, MigrationRegistry};
pub use resolver::MigrationPath;
pub use traits::{FnTransform, Migration, MigrationChain, PayloadTransform, TypedMigration, TypedTransform};

// Re-export specific migrations for advanced use cases
pub use thought::{ThoughtV1_0ToV1_1Migration, ThoughtV1_1ToV2_0Migration};

use crate::config::MigrationSettings;
use chatstream_core::error::Result;
use chatstream_core::event::EventType;
use chatstream_core::event::thought::{THOUGHT_V2_0_VERSION, ThoughtV1_0, ThoughtV1_1, ThoughtV2_0};
use std::sync::Arc;

/// Builds a registry containing every built-in migration and the current
/// version of each migrated event type.
///
/// Callers may register further edges before sharing the registry.
pub fn build_migration_registry() -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();

    // ========================================================================
    // Thought Migrations
    // ========================================================================
    registry.register_migration::<_, ThoughtV1_0, ThoughtV1_1>(
        EventType::Thought,
        ThoughtV1_0ToV1_1Migration,
    );
    registry.register_migration::<_, ThoughtV1_1, ThoughtV2_0>(
        EventType::Thought,
        ThoughtV1_1ToV2_0Migration,
    );
    registry.set_current_version(EventType::Thought, THOUGHT_V2_0_VERSION);

    registry
}

/// Builds the built-in registry, applies `settings`, and wraps the result in
/// an [`EventMigrator`].
///
/// # Errors
///
/// Returns an error if `settings` names an unknown event type.
pub fn build_event_migrator(settings: &MigrationSettings) -> Result<EventMigrator> {
    let mut registry = build_migration_registry();
    settings.apply_to(&mut registry)?;

    tracing::debug!(
        "Migration registry ready: {} edge(s) across {:?}",
        registry.len(),
        registry.migratable_event_types()
    );

    Ok(EventMigrator::with_settings(Arc::new(registry), settings))
}
