//! Tracing subscriber setup

use anyhow::{Context, Result};
use std::io;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Noisy dependencies are capped regardless of the configured level
const DEPENDENCY_DIRECTIVES: [&str; 3] = ["hyper=warn", "reqwest=warn", "rustls=warn"];

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level; `verbose` raises the configured level to debug.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = build_filter(config, verbose, std::env::var("RUST_LOG").ok())?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(io::stderr),
            )
            .try_init(),
        _ => registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    Ok(())
}

fn build_filter(config: &LoggingConfig, verbose: bool, rust_log: Option<String>) -> Result<EnvFilter> {
    let base = match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ if verbose => "debug".to_string(),
        _ => config.level.clone(),
    };

    let mut filter =
        EnvFilter::try_new(&base).with_context(|| format!("Invalid log filter '{base}'"))?;
    for directive in DEPENDENCY_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }

    Ok(filter)
}
