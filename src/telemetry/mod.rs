//! Tracing setup for the server binary.

use tracing_subscriber::{fmt, prelude::*, util::TryInitError, EnvFilter};

/// Used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "info,secret_draw=info,tower_http=info,axum=info";

/// Install the global subscriber with an env filter.
///
/// `RUST_LOG` overrides [`DEFAULT_DIRECTIVES`], e.g.
/// `RUST_LOG=secret_draw=debug` also shows ignored start requests and junk frames.
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init()
}
