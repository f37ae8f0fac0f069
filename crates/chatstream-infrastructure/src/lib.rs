pub mod config;
pub mod migration;
pub mod paths;

pub use crate::config::MigrationSettings;
pub use crate::migration::{
    EventMigrator, FaultPolicy, MigrationOutcome, MigrationRegistry, build_event_migrator,
    build_migration_registry,
};
pub use crate::paths::ChatstreamPaths;
