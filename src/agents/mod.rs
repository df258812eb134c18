//! Evidence agents
//!
//! Four specialists collect the evidence the verdict is built from:
//! literature, clinical trials, patents, and market intelligence. Each one
//! implements [`TieredResolver`] and degrades through the same fallback
//! chain, so a request always gets a complete answer even with every
//! upstream dependency down.

pub mod clinical;
pub mod market;
pub mod patent;
pub mod records;
pub mod research;
pub mod tiered;

pub use clinical::{ClinicalAgent, ClinicalMetrics, ClinicalPayload};
pub use market::{MarketAgent, MarketMetrics, MarketPayload};
pub use patent::{PatentAgent, PatentMetrics, PatentPayload};
pub use research::{ResearchAgent, ResearchMetrics, ResearchPayload};
pub use tiered::{AgentQuery, TierOutcome, TieredResolver};
