//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; binaries and demos call
//! [`init`] once to print them. `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install a formatting subscriber with the [`DEFAULT_FILTER`].
///
/// Returns `false` if a global subscriber was already installed.
#[must_use]
pub fn init() -> bool {
    init_with_filter(DEFAULT_FILTER)
}

/// Install a formatting subscriber, falling back to `default_filter` when
/// `RUST_LOG` is unset or invalid.
///
/// Returns `false` if a global subscriber was already installed.
#[must_use]
pub fn init_with_filter(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
