//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the default filter. HTTP client internals are kept at
//! `warn` so per-call connection chatter does not drown the pipeline logs.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

/// Library targets capped at `warn` unless `RUST_LOG` says otherwise.
const NOISY_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "h2", "rustls", "sqlx"];

fn build_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = String::from(DEFAULT_LEVEL);
    for target in NOISY_TARGETS {
        directives.push_str(&format!(",{}=warn", target));
    }
    EnvFilter::new(directives)
}

/// Installs the global subscriber. `json` selects structured output.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing(json: bool) {
    let subscriber = tracing_subscriber::registry().with(build_filter());

    if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(json, "Tracing initialized");
}
