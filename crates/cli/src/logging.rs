//! Tracing subscriber setup.
//!
//! Logs are written to stderr; `RUST_LOG` overrides the default level.

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("build log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = if json { builder.json().try_init() } else { builder.try_init() };
    result.map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))
}
