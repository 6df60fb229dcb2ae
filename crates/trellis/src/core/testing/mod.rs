//! Test helpers: recording collaborators, grid scenes and tracing setup.

/// Grid test helpers.
pub mod grid;
/// Recording and map-backed collaborators.
pub mod recorder;

use tracing_subscriber::{EnvFilter, fmt};

/// Route `tracing` output through the test writer. Safe to call from every
/// test; only the first call installs a subscriber. The filter is read from
/// `RUST_LOG` and defaults to warnings.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init()
        .ok();
}
