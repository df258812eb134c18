// Generative advisor abstraction layer

pub mod groq;
pub mod provider;

pub use provider::*;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::AdvisorConfig;

static ADVISOR: OnceCell<Option<Arc<dyn Advisor>>> = OnceCell::new();

/// Process-wide advisor handle: constructed on first use, `None` when no API
/// key is configured, and immutable for the life of the process.
pub fn global_advisor(config: &AdvisorConfig) -> Option<Arc<dyn Advisor>> {
    ADVISOR
        .get_or_init(|| {
            if config.groq_api_key.is_empty() {
                info!("No Groq API key configured, generative tiers disabled");
                return None;
            }
            info!(model = %config.model, "Initializing Groq advisor client");
            Some(Arc::new(groq::GroqAdvisor::new(config)) as Arc<dyn Advisor>)
        })
        .clone()
}

/// Whether the process-wide advisor handle was constructed with a client.
/// The handle is initialized at startup, before the server accepts traffic.
pub fn advisor_configured() -> bool {
    ADVISOR.get().map(Option::is_some).unwrap_or(false)
}
