// ============================================
// File: crates/bless-node/src/logging.rs
// ============================================
//! # Logging Setup
//!
//! ## Creation Reason
//! The binary needs logs before the configuration is read, and the
//! configured `logging.level` afterwards. The filter therefore sits behind
//! a reload layer and is swapped once the config is known.
//!
//! ## Main Functionality
//! - `init`: installs the global subscriber, returns a [`LogHandle`]
//! - `LogHandle::set_level`: applies `logging.level`
//! - `RUST_LOG`, when set, wins over any configured level
//!
//! ## Last Modified
//! v0.1.0 - Initial logging setup

use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use crate::error::{NodeError, Result};

/// Handle to the installed level filter.
#[derive(Clone)]
pub struct LogHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Applies `level` unless `RUST_LOG` overrides it.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if the subscriber is gone.
    pub fn set_level(&self, level: &str) -> Result<()> {
        let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        self.set_filter(filter_for(level, env.as_deref()))
    }

    fn set_filter(&self, filter: EnvFilter) -> Result<()> {
        self.inner
            .reload(filter)
            .map_err(|e| NodeError::config_invalid("logging.level", e.to_string()))
    }
}

impl std::fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogHandle").finish_non_exhaustive()
    }
}

/// Filter for `level`, or for the `RUST_LOG` directives when present.
fn filter_for(level: &str, env: Option<&str>) -> EnvFilter {
    env.filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

fn reload_filter(level: &str, env: Option<&str>) -> (reload::Layer<EnvFilter, Registry>, LogHandle) {
    let (layer, inner) = reload::Layer::new(filter_for(level, env));
    (layer, LogHandle { inner })
}

/// Installs the global subscriber at `level`.
///
/// Returns `None` if a subscriber was already installed.
pub fn init(level: &str) -> Option<LogHandle> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (filter, handle) = reload_filter(level, env.as_deref());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .ok()
        .map(|()| handle)
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_configured_level_takes_effect() {
        let (layer, handle) = reload_filter("info", None);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::DEBUG));

            handle.set_filter(filter_for("trace", None)).unwrap();
            assert!(tracing::enabled!(Level::TRACE));

            handle.set_filter(filter_for("warn", None)).unwrap();
            assert!(!tracing::enabled!(Level::INFO));
            assert!(tracing::enabled!(Level::WARN));
        });
    }

    #[test]
    fn test_env_directives_win() {
        let (layer, handle) = reload_filter("info", None);
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            handle.set_filter(filter_for("error", Some("debug"))).unwrap();
            assert!(tracing::enabled!(Level::DEBUG));
        });
    }

    #[test]
    fn test_blank_env_ignored() {
        let (layer, _handle) = reload_filter("warn", Some("  "));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::WARN));
            assert!(!tracing::enabled!(Level::INFO));
        });
    }
}
