//! Tracing setup for embedders and tests
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. `init_logging` is the stock setup.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install an env-filtered stderr subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Fails if a global
/// subscriber is already installed.
pub fn init_logging(default_filter: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
