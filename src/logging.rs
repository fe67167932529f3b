//! stderr logging for the binary.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count; `None` defers to `RUST_LOG`.
pub fn directive_for(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Install the global subscriber. `-v` flags beat `RUST_LOG`, which beats
/// the default of `warn`. Stdout stays reserved for the report.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = match directive_for(verbosity) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("Failed to install log subscriber: {err}"))
}
