//! Tracing subscriber initialization for tests.
//!
//! Library crates only emit `tracing` events. Test binaries install the
//! capturing subscriber from each test; only the first call in a process
//! installs it.
//!
//! # Usage
//!
//! ```
//! use lodestone_core::telemetry;
//!
//! telemetry::init_test_subscriber();
//! tracing::debug!("captured by the test harness");
//! ```
//!
//! The filter follows `RUST_LOG` and falls back to `info`. Set
//! `RUST_LOG=lodestone_db=debug` to see every option as it is applied.

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initialize a subscriber that writes through the libtest capture.
///
/// Returns `false` when another subscriber was already installed, which is the
/// normal case for every test after the first one in a binary.
pub fn init_test_subscriber() -> bool {
    fmt::Subscriber::builder()
        .with_env_filter(env_filter())
        .with_test_writer()
        .with_target(true)
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
