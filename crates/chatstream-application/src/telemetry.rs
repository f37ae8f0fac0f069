//! Tracing subscriber setup.

use chatstream_infrastructure::MigrationSettings;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the settings provide one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns `false` if a
/// global subscriber was already installed (e.g. by a test harness or an
/// earlier call), which is not treated as an error.
pub fn init_tracing(default_filter: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or(DEFAULT_LOG_FILTER)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Installs the subscriber using the filter from `settings`.
pub fn init_tracing_from_settings(settings: &MigrationSettings) -> bool {
    init_tracing(settings.log_filter.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_not_an_error() {
        let _ = init_tracing(Some("debug"));
        assert!(!init_tracing(None));
    }
}
