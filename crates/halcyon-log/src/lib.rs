//! Structured logging setup for halcyon clients.
//!
//! Thin wrapper over the `tracing` ecosystem: console output with
//! module targets and an uptime timer, filterable via `RUST_LOG` or the
//! settings file's `log_level` field. The library itself only emits
//! `tracing` events; embedding applications that install their own
//! subscriber can skip this crate entirely.

use halcyon_config::Settings;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info";

/// Initializes the global tracing subscriber.
///
/// Filter precedence: `RUST_LOG` environment variable, then the
/// settings file's `log_level`, then `info`. Calling this twice
/// panics (the global subscriber can only be set once), so embedders
/// should call it from one place at startup.
pub fn init_logging(settings: Option<&Settings>) {
    let filter_str = settings
        .map(|s| s.log_level.as_str())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

/// The default filter, useful for tests and embedders composing their
/// own subscriber.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_env_filter();
        assert!(format!("{filter}").contains("info"));
    }

    #[test]
    fn test_subsystem_filter_parses() {
        let filter = EnvFilter::new("info,halcyon_world=debug");
        let rendered = format!("{filter}");
        assert!(rendered.contains("halcyon_world=debug"));
        assert!(rendered.contains("info"));
    }

    #[test]
    fn test_settings_level_is_used() {
        let mut settings = Settings::default();
        settings.log_level = "warn,halcyon_codec=trace".to_owned();
        // Only validate the filter string parses; installing the global
        // subscriber is a once-per-process side effect.
        let filter = EnvFilter::new(&settings.log_level);
        assert!(format!("{filter}").contains("halcyon_codec=trace"));
    }
}
