//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise [`DEFAULT_FILTER`] applies. Set
//! `QUOTESYNC_LOG_JSON=1` for one JSON object per event.

use std::env;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,quotesync=debug";
pub const LOG_JSON_ENV: &str = "QUOTESYNC_LOG_JSON";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    let registry = tracing_subscriber::registry().with(filter);

    if json_requested(env::var(LOG_JSON_ENV).ok().as_deref()) {
        registry.with(fmt::layer().json().with_target(true).flatten_event(true)).try_init()?;
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()?;
    }

    tracing::debug!(default_filter = DEFAULT_FILTER, "logging initialised");
    Ok(())
}

fn json_requested(value: Option<&str>) -> bool {
    value.is_some_and(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}
