//! Tier-sequencing contract shared by the four evidence agents.
//!
//! Every agent resolves evidence through the same strict priority order:
//!
//! 1. curated showcase data,
//! 2. the live registry API,
//! 3. domain hard rules (patent only),
//! 4. generative inference,
//! 5. a deterministic synthetic payload that never fails.
//!
//! Tiers return an explicit [`TierOutcome`] instead of signaling "no data"
//! through errors, so the descent is a visible decision at each step. The
//! pass reason travels down the chain and ends up in the synthetic payload's
//! note.

use async_trait::async_trait;
use tracing::{debug, info, warn};

/// The inputs an agent resolves against.
#[derive(Debug, Clone, Default)]
pub struct AgentQuery {
    pub molecule: Option<String>,
    pub disease: Option<String>,
}

impl AgentQuery {
    pub fn new(molecule: Option<&str>, disease: Option<&str>) -> Self {
        Self {
            molecule: molecule.map(str::to_string),
            disease: disease.map(str::to_string),
        }
    }

    pub fn molecule(&self) -> Option<&str> {
        self.molecule.as_deref()
    }

    pub fn disease(&self) -> Option<&str> {
        self.disease.as_deref()
    }
}

/// Result of a single fallback tier: either a complete payload or a pass
/// with the reason the tier produced nothing.
pub enum TierOutcome<P> {
    Resolved(P),
    Pass(String),
}

impl<P> TierOutcome<P> {
    pub fn pass(reason: impl Into<String>) -> Self {
        TierOutcome::Pass(reason.into())
    }
}

#[async_trait]
pub trait TieredResolver: Send + Sync {
    type Payload: Send;

    fn agent_name(&self) -> &'static str;

    /// Tier 1: curated showcase data (merged with live registry data where
    /// the agent has any).
    async fn curated(&self, query: &AgentQuery) -> TierOutcome<Self::Payload>;

    /// Tier 2: the agent's live registry API.
    async fn live(&self, query: &AgentQuery) -> TierOutcome<Self::Payload>;

    /// Domain hard rules consulted ahead of generative inference. Most
    /// agents have none.
    fn shortcut(&self, query: &AgentQuery) -> Option<Self::Payload> {
        let _ = query;
        None
    }

    /// Tier 3: generative inference.
    async fn inferred(&self, query: &AgentQuery) -> TierOutcome<Self::Payload>;

    /// Tier 4: deterministic synthetic payload. Must never fail.
    async fn synthetic(&self, query: &AgentQuery, reason: &str) -> Self::Payload;

    /// Walk the tiers in priority order; first resolved tier wins.
    async fn resolve(&self, query: &AgentQuery) -> Self::Payload {
        let agent = self.agent_name();

        let reason = match self.curated(query).await {
            TierOutcome::Resolved(payload) => {
                info!(agent, tier = "curated", "Resolved from showcase data");
                return payload;
            }
            TierOutcome::Pass(reason) => reason,
        };
        debug!(agent, tier = "curated", reason, "Tier passed");

        let reason = match self.live(query).await {
            TierOutcome::Resolved(payload) => {
                info!(agent, tier = "live", "Resolved from registry API");
                return payload;
            }
            TierOutcome::Pass(reason) => reason,
        };
        debug!(agent, tier = "live", reason, "Tier passed");

        if let Some(payload) = self.shortcut(query) {
            info!(agent, tier = "shortcut", "Resolved from domain hard rule");
            return payload;
        }

        let reason = match self.inferred(query).await {
            TierOutcome::Resolved(payload) => {
                info!(agent, tier = "inferred", "Resolved from generative advisor");
                return payload;
            }
            TierOutcome::Pass(reason) => reason,
        };

        warn!(agent, reason, "All tiers passed, emitting synthetic payload");
        self.synthetic(query, &reason).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedAgent {
        curated: Option<&'static str>,
        live: Option<&'static str>,
        shortcut: Option<&'static str>,
        inferred: Option<&'static str>,
    }

    #[async_trait]
    impl TieredResolver for ScriptedAgent {
        type Payload = String;

        fn agent_name(&self) -> &'static str {
            "scripted"
        }

        async fn curated(&self, _query: &AgentQuery) -> TierOutcome<String> {
            match self.curated {
                Some(value) => TierOutcome::Resolved(value.to_string()),
                None => TierOutcome::pass("no curated case"),
            }
        }

        async fn live(&self, _query: &AgentQuery) -> TierOutcome<String> {
            match self.live {
                Some(value) => TierOutcome::Resolved(value.to_string()),
                None => TierOutcome::pass("registry empty"),
            }
        }

        fn shortcut(&self, _query: &AgentQuery) -> Option<String> {
            self.shortcut.map(str::to_string)
        }

        async fn inferred(&self, _query: &AgentQuery) -> TierOutcome<String> {
            match self.inferred {
                Some(value) => TierOutcome::Resolved(value.to_string()),
                None => TierOutcome::pass("advisor unavailable"),
            }
        }

        async fn synthetic(&self, _query: &AgentQuery, reason: &str) -> String {
            format!("synthetic: {reason}")
        }
    }

    #[tokio::test]
    async fn test_first_resolved_tier_wins() {
        let agent = ScriptedAgent {
            curated: Some("curated"),
            live: Some("live"),
            shortcut: Some("shortcut"),
            inferred: Some("inferred"),
        };
        assert_eq!(agent.resolve(&AgentQuery::default()).await, "curated");
    }

    #[tokio::test]
    async fn test_descends_past_empty_tiers() {
        let agent = ScriptedAgent {
            curated: None,
            live: None,
            shortcut: None,
            inferred: Some("inferred"),
        };
        assert_eq!(agent.resolve(&AgentQuery::default()).await, "inferred");
    }

    #[tokio::test]
    async fn test_shortcut_beats_inference() {
        let agent = ScriptedAgent {
            curated: None,
            live: None,
            shortcut: Some("hard rule"),
            inferred: Some("inferred"),
        };
        assert_eq!(agent.resolve(&AgentQuery::default()).await, "hard rule");
    }

    #[tokio::test]
    async fn test_synthetic_carries_last_pass_reason() {
        let agent = ScriptedAgent {
            curated: None,
            live: None,
            shortcut: None,
            inferred: None,
        };
        assert_eq!(
            agent.resolve(&AgentQuery::default()).await,
            "synthetic: advisor unavailable"
        );
    }
}
