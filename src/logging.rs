//! Structured logging setup.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to the
//! whole process. Development gets human-readable lines, production gets one
//! JSON object per event for the log shipper.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Later calls are ignored.
pub fn init(level: &str, production: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if production {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
