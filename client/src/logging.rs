//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so the grid and prompts on stdout stay readable, and
//! so `--output -` can stream CSV without interleaved log lines.
//!
//! - `warn`: stale responses, failed fetches
//! - `info`: submissions, export destinations
//! - `debug`: placements, fetch tickets
//!
//! `RUST_LOG` overrides the verbosity flag when set.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map the `-v` count to a level: warn, info, debug, then trace.
#[must_use]
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "wordgrid={lvl},wordgrid_core={lvl},reqwest=warn",
            lvl = level.as_str().to_lowercase()
        ))
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(verbosity: u8) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = build_filter(level_from_verbosity(verbosity));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
}
