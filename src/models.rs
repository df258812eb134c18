// Shared domain models: canonical evidence records, request/response
// envelope, and application state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::ShowcaseCatalog;
use crate::llm::Advisor;
use crate::sources::{LiteratureSource, PatentRegistrySource, TrialsRegistrySource};

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub advisor: Option<Arc<dyn Advisor>>,
    pub showcase: Arc<ShowcaseCatalog>,
    pub literature: Arc<dyn LiteratureSource>,
    pub trials: Arc<dyn TrialsRegistrySource>,
    pub patents: Arc<dyn PatentRegistrySource>,
}

impl AppState {
    /// Wire up production collaborators from the loaded configuration.
    pub fn from_config(config: Config) -> Self {
        use crate::sources::{ClinicalTrialsClient, PatentsViewClient, PubmedClient};

        let advisor = crate::llm::global_advisor(&config.advisor);
        let literature = Arc::new(PubmedClient::new(&config.sources));
        let trials = Arc::new(ClinicalTrialsClient::new(&config.sources));
        let patents = Arc::new(PatentsViewClient::new(&config.sources));

        Self {
            advisor,
            showcase: crate::data::catalog(),
            literature,
            trials,
            patents,
            config,
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical evidence records
// ---------------------------------------------------------------------------

/// A single literature finding tied to a disease. Identity key for
/// deduplication is the title (literature has no registry identifier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub disease: String,
    pub title: String,
    pub journal: String,
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A clinical trial registry entry. Identity key is the NCT id when present,
/// otherwise the trial name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nct_id: Option<String>,
    pub trial_name: String,
    pub phase: String,
    pub status: String,
    pub disease: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    pub evidence_note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A patent filing. Identity key is the publication number when present,
/// otherwise the title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatentRecord {
    pub number: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub assignee: Option<String>,
    pub url: Option<String>,
    pub focus: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpConflict {
    pub issue: String,
    pub competitor: String,
    pub url: String,
}

/// Patent counts come back either as an exact number or as a qualitative
/// label ("Multiple active families", "Class-dependent").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PatentCount {
    Exact(u32),
    Estimate(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSignal {
    pub disease: String,
    pub adoption_trend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegativeSignal {
    pub issue: String,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionTrend {
    pub region: String,
    pub cagr: f64,
    pub notes: String,
    pub series: Vec<SeriesPoint>,
}

// ---------------------------------------------------------------------------
// Request / response envelope
// ---------------------------------------------------------------------------

/// Inbound analysis request. Unknown fields are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepurposeRequest {
    #[serde(default)]
    pub molecule: Option<String>,
    #[serde(default)]
    pub disease: Option<String>,
    #[serde(default)]
    pub trend_mode: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestEcho {
    pub molecule: String,
    pub disease: Option<String>,
    pub trend_mode: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryMetadata {
    pub case_type: String,
    pub input: RequestEcho,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentOutputs {
    pub research: crate::agents::ResearchPayload,
    pub clinical_trials: crate::agents::ClinicalPayload,
    pub patents: crate::agents::PatentPayload,
    pub market: crate::agents::MarketPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportInfo {
    pub pdf_available: bool,
    pub pdf_url: Option<String>,
}

impl Default for ExportInfo {
    fn default() -> Self {
        Self {
            pdf_available: false,
            pdf_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RepurposeResponse {
    pub query_metadata: QueryMetadata,
    pub agents: AgentOutputs,
    pub scoring_engine: crate::scoring::ScoreReport,
    pub final_verdict: crate::verdict::Verdict,
    pub export: ExportInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub advisor: String,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::config::{AdvisorConfig, ServerConfig, SourcesConfig};
    use crate::data::ShowcaseCatalog;
    use crate::sources::StubSources;

    pub(crate) fn test_config() -> Config {
        Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
            },
            advisor: AdvisorConfig {
                groq_api_key: String::new(),
                model: "llama-3.1-70b-versatile".to_string(),
                temperature: 0.0,
                timeout_secs: 1,
            },
            sources: SourcesConfig {
                pubmed_search_url: "http://127.0.0.1:9/esearch".to_string(),
                pubmed_fetch_url: "http://127.0.0.1:9/efetch".to_string(),
                pubmed_timeout_secs: 1,
                clinicaltrials_url: "http://127.0.0.1:9/study_fields".to_string(),
                clinicaltrials_timeout_secs: 1,
                patentsview_url: "http://127.0.0.1:9/patents/query".to_string(),
                patentsview_timeout_secs: 1,
            },
        }
    }

    /// State wired to fixed stub sources and no advisor.
    pub(crate) fn stub_state(sources: StubSources) -> AppState {
        let sources = Arc::new(sources);
        AppState {
            config: test_config(),
            advisor: None,
            showcase: Arc::new(ShowcaseCatalog::builtin()),
            literature: sources.clone(),
            trials: sources.clone(),
            patents: sources,
        }
    }
}
