use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Install the global `tracing` subscriber.
///
/// `default_directive` (e.g. `"tweaks_core=info"`) is added on top of
/// `RUST_LOG`. Fails instead of panicking when a subscriber is already set,
/// since the host may reload the plugin.
pub fn init(default_directive: &str) -> Result<()> {
    let directive = default_directive
        .parse()
        .map_err(|e| Error::Logging(format!("invalid directive '{}': {}", default_directive, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
