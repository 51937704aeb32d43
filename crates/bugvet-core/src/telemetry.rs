//! Tracing initialisation for bugvet binaries.
//!
//! Call [`init_tracing`] once at startup. The `RUST_LOG` environment
//! variable takes precedence over the supplied default level; when it
//! is unset the default applies. Repeated calls are harmless; only
//! the first installs the global subscriber.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// * `level` — default verbosity when `RUST_LOG` is not set.
/// * `json` — emit newline-delimited JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(level: Level, json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).compact())
            .try_init()
            .ok();
    }
}
