//! Logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `tracing` subscriber printing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise the `tabletalk*` crates and the
/// named binary log at `default_level`.
///
/// ```no_run
/// tabletalk::setup_logger("tabletalk_server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_level: &str) {
    let fallback = [
        "tabletalk",
        "tabletalk_transport",
        "tabletalk_protocol",
        "tabletalk_room",
        binary_name,
    ]
    .iter()
    .map(|target| format!("{target}={default_level}"))
    .collect::<Vec<_>>()
    .join(",");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
