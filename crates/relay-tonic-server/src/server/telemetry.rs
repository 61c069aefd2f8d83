//! Log setup for the server binary.
//!
//! Events are rendered by `tracing-subscriber`'s fmt layer and filtered by
//! the `RUST_LOG` environment variable, defaulting to `info` when unset or
//! unparsable.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the process-wide tracing subscriber.
///
/// Call once at startup, before any spans or events are emitted.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
