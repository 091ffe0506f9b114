//! Tracing setup for the `genbind` binary.
//!
//! Nothing is installed unless `GENBIND_LOG` (or, failing that, `RUST_LOG`)
//! holds a filter. `GENBIND_LOG_FORMAT` picks the layer:
//!
//! | Value | Output |
//! |-------|--------|
//! | `text` (default) | flat `tracing-subscriber` lines |
//! | `tree` | nested spans via `tracing-tree`, handy for following one collection |
//! | `json` | one JSON object per event |
//!
//! ```bash
//! GENBIND_LOG=genbind_solver=trace GENBIND_LOG_FORMAT=tree \
//!     genbind infer --catalog lib.json --callable Max "int[]"
//! ```
//!
//! Every layer writes to stderr; stdout carries only the report.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};
use tracing_tree::HierarchicalLayer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown or missing values fall back to text.
    fn from_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("tree") => Self::Tree,
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

fn filter_from_env() -> Option<EnvFilter> {
    match std::env::var("GENBIND_LOG") {
        Ok(directives) => Some(EnvFilter::builder().parse_lossy(directives)),
        Err(_) => std::env::var("RUST_LOG")
            .is_ok()
            .then(EnvFilter::from_default_env),
    }
}

/// Install the global subscriber described by the environment, if any.
pub fn init_tracing() {
    let Some(filter) = filter_from_env() else {
        return;
    };
    let format = LogFormat::from_value(std::env::var("GENBIND_LOG_FORMAT").ok().as_deref());
    let registry = Registry::default().with(filter);
    match format {
        LogFormat::Tree => registry
            .with(
                HierarchicalLayer::new(2)
                    .with_indent_lines(true)
                    .with_targets(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tests;
