//! Tracing setup.
//!
//! The subscriber starts at `info` before configuration is read, then
//! switches to `logging.level` once it is loaded. `RUST_LOG`, when set, wins
//! over both and is never replaced.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

/// Level used until the configuration is loaded.
pub const BOOT_LEVEL: &str = "info";

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Builds the filter for `level`, or the `RUST_LOG` filter when that is set
/// and parses.
fn filter_for(level: &str) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(BOOT_LEVEL))
}

/// Installs the global subscriber with a reloadable filter.
///
/// Calling it again is a no-op.
pub fn init_tracing() {
    let (filter, handle) = reload::Layer::new(filter_for(BOOT_LEVEL));
    if FILTER_HANDLE.set(handle).is_err() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Switches the filter to the configured level.
///
/// Returns `false` when the subscriber was not installed through
/// [`init_tracing`] or `RUST_LOG` is in charge.
pub fn apply_logging(cfg: &LoggingConfig) -> bool {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return false;
    }
    let Some(handle) = FILTER_HANDLE.get() else {
        return false;
    };
    match handle.reload(filter_for(&cfg.level)) {
        Ok(()) => {
            tracing::debug!(level = %cfg.level, "Log level applied");
            true
        }
        Err(e) => {
            eprintln!("Failed to apply log level {}: {e}", cfg.level);
            false
        }
    }
}
