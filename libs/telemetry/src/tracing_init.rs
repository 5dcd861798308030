use std::sync::OnceLock;

use anyhow::Result;
use tracing::Span;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::TelemetryConfig;

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber once; later calls are no-ops.
pub fn init_telemetry(cfg: TelemetryConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let fmt_layer = if cfg.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.default_filter.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();

    tracing::debug!(
        service = %cfg.service_name,
        version = %cfg.service_version,
        env = %cfg.environment,
        "telemetry initialised"
    );

    INIT.set(()).ok();
    Ok(())
}

/// Records the conversation coordinates of a turn on `span`.
pub fn with_turn_fields(
    span: &Span,
    channel_id: &str,
    conversation_id: Option<&str>,
    activity_id: Option<&str>,
) {
    span.record("channel_id", tracing::field::display(channel_id));
    if let Some(conversation_id) = conversation_id {
        span.record("conversation_id", tracing::field::display(conversation_id));
    }
    if let Some(activity_id) = activity_id {
        span.record("activity_id", tracing::field::display(activity_id));
    }
}
