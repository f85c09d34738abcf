//! Telemetry initialization for docsink services.

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// Log filtering is controlled through the `RUST_LOG` environment variable
/// and defaults to `info` when unset.
pub fn init_tracing() -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
