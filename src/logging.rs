//! Diagnostics for hook chains via `tracing`.
//!
//! The library only emits events: step starts at `trace`, branch choices and
//! aborted chains at `debug`. Binaries opt in with [`init`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr subscriber. Reads `RUST_LOG`, defaults to `warn`.
///
/// ```bash
/// RUST_LOG=conditional_hooks=debug hookrun '{"method":"find"}'
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
