//! Logging setup shared by dialog hosts.
//!
//! Hosts call [`install`] once at startup; library code only emits
//! `tracing` events and never installs a subscriber itself.

use anyhow::Result;

mod config;
mod tracing_init;

pub use config::TelemetryConfig;
pub use tracing_init::{init_telemetry, with_turn_fields};

/// Installs the subscriber configured from `LOG_FORMAT`, `RUST_LOG` and friends.
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(
        service_name,
        env!("CARGO_PKG_VERSION"),
    ))
}
