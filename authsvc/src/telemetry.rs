//! Tracing subscriber setup.
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=authsvc=debug,tower_http=debug`) and defaults
//! to `info`. Authentication rejections are logged at `info` with their internal reason, while
//! the HTTP response stays generic.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber: an env filter in front of a console fmt layer.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
