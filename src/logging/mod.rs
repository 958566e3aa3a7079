//! Logging infrastructure for structured console output.

mod logger;
mod types;

pub use logger::Logger;
pub use types::{Log, TaskEntry, TaskStatus};

use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Console level defaults to `info` (`debug` when `verbose` is set) and can
/// be overridden with the `DEVSETUP_LOG` environment variable.
pub fn init_subscriber(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("DEVSETUP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
