//! Tracing setup for host binaries

use chat_router_config::ObservabilityConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::AgentError;

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the configured level. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), AgentError> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("chat_router={}", config.log_level).into());

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    subscriber
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AgentError::Initialization(format!("Tracing: {}", e)))
}
