//! Process-wide log setup.

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `env_filter` (for example `"info"` or
/// `"hr_core=debug"`). `RUST_LOG` wins when it is set.
///
/// Calling this twice is harmless; the second call keeps the subscriber already installed.
pub fn setup(env_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    if tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init().is_err() {
        warn!("a global tracing subscriber is already installed; keeping it");
    }
}
