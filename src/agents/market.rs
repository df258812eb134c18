//! Market Intelligence Agent
//!
//! Estimates commercial feasibility for the leading candidate disease.
//! There is no live market data feed; after curated trends the chain goes
//! straight to generative inference, and the closing heuristic keys off a
//! short list of blockbuster indications where competition saturates the
//! opportunity.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::tiered::{AgentQuery, TierOutcome, TieredResolver};
use crate::data::ShowcaseCatalog;
use crate::llm::Advisor;
use crate::models::{AppState, MarketSignal, NegativeSignal, RegionTrend, SeriesPoint};
use crate::utils::{extract_json_block, summarize_with_advisor};

/// Indications where an entrant faces saturated competition.
const BLOCKBUSTER_DISEASES: &[&str] = &[
    "type 2 diabetes",
    "obesity",
    "hypertension",
    "cardiovascular disease",
];

const CROWDED_FEASIBILITY: f64 = 0.4;
const OPEN_FEASIBILITY: f64 = 0.8;

#[derive(Debug, Clone, Serialize)]
pub struct MarketMetrics {
    pub commercial_feasibility: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions_tracked: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketPayload {
    pub summary: String,
    pub markets: Vec<MarketSignal>,
    pub negative_signals: Vec<NegativeSignal>,
    pub metrics: MarketMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub region_trends: Vec<RegionTrend>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub yearly_totals: Vec<SeriesPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_story: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MarketInference {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    markets: Vec<InferredSignal>,
    #[serde(default)]
    negative_signals: Vec<InferredNegative>,
    #[serde(default)]
    commercial_feasibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct InferredSignal {
    #[serde(default)]
    disease: String,
    #[serde(default)]
    adoption_trend: String,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InferredNegative {
    #[serde(default)]
    issue: String,
    #[serde(default)]
    impact: String,
}

pub struct MarketAgent {
    showcase: Arc<ShowcaseCatalog>,
    advisor: Option<Arc<dyn Advisor>>,
}

impl MarketAgent {
    pub fn new(showcase: Arc<ShowcaseCatalog>, advisor: Option<Arc<dyn Advisor>>) -> Self {
        Self { showcase, advisor }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.showcase.clone(), state.advisor.clone())
    }

    pub async fn run(&self, molecule: Option<&str>, disease: Option<&str>) -> MarketPayload {
        self.resolve(&AgentQuery::new(molecule, disease)).await
    }

    pub fn is_blockbuster(disease: &str) -> bool {
        let lowered = disease.trim().to_lowercase();
        BLOCKBUSTER_DISEASES.contains(&lowered.as_str())
    }

    /// Map a compound annual growth rate onto a coarse adoption label.
    pub fn adoption_from_cagr(cagr: f64) -> &'static str {
        if cagr >= 0.06 {
            "High"
        } else if cagr >= 0.03 {
            "Moderate"
        } else {
            "Low"
        }
    }

    fn clamp_feasibility(value: f64) -> f64 {
        value.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl TieredResolver for MarketAgent {
    type Payload = MarketPayload;

    fn agent_name(&self) -> &'static str {
        "market"
    }

    async fn curated(&self, query: &AgentQuery) -> TierOutcome<MarketPayload> {
        let Some(molecule) = query.molecule() else {
            return TierOutcome::pass("no molecule provided");
        };
        let Some(case) = self.showcase.resolve(molecule) else {
            return TierOutcome::pass("no showcase case for molecule");
        };
        let Some(trends) = case.market_trends.as_ref() else {
            return TierOutcome::pass("showcase case has no market trends");
        };
        if trends.region_series.is_empty() {
            return TierOutcome::pass("showcase market trends are empty");
        }

        let disease = query.disease().unwrap_or("Unknown");
        let markets: Vec<MarketSignal> = trends
            .region_series
            .iter()
            .map(|trend| MarketSignal {
                disease: disease.to_string(),
                adoption_trend: Self::adoption_from_cagr(trend.cagr).to_string(),
                note: Some(format!("{}: {}", trend.region, trend.notes)),
            })
            .collect();

        let facts: Vec<String> = trends
            .region_series
            .iter()
            .map(|t| format!("{} CAGR {:.1}%: {}", t.region, t.cagr * 100.0, t.notes))
            .collect();
        let fallback = if case.success_story.is_empty() {
            format!("Curated market outlook for {molecule}.")
        } else {
            case.success_story.clone()
        };
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} market outlook"),
            &facts,
            &fallback,
        )
        .await;

        TierOutcome::Resolved(MarketPayload {
            summary,
            markets,
            negative_signals: trends
                .negative_signals
                .iter()
                .map(|issue| NegativeSignal {
                    issue: issue.clone(),
                    impact: "Flagged in curated market sources".to_string(),
                })
                .collect(),
            metrics: MarketMetrics {
                commercial_feasibility: Self::clamp_feasibility(trends.feasibility),
                regions_tracked: Some(trends.region_series.len()),
            },
            region_trends: trends.region_series.clone(),
            yearly_totals: trends.global_series.clone(),
            currency_unit: Some(trends.unit.clone()),
            note: None,
            success_story: Some(case.success_story.clone()),
            sources: trends.sources.clone(),
        })
    }

    async fn live(&self, _query: &AgentQuery) -> TierOutcome<MarketPayload> {
        TierOutcome::pass("no live market data feed configured")
    }

    async fn inferred(&self, query: &AgentQuery) -> TierOutcome<MarketPayload> {
        let Some(advisor) = self.advisor.as_ref() else {
            return TierOutcome::pass("LLM not available");
        };
        let molecule = query.molecule().unwrap_or("Candidate molecule");
        let disease = query.disease().unwrap_or("Unknown");

        let prompt = format!(
            "You are a pharmaceutical commercial strategist.\n\n\
             Assess the commercial opportunity for repurposing:\n\
             Molecule: {molecule}\n\
             Lead indication: {disease}\n\n\
             Rules:\n\
             - Consider competition, pricing pressure, and adoption dynamics\n\
             - commercial_feasibility is a number between 0 and 1\n\
             - Be conservative and realistic\n\n\
             Return STRICT JSON ONLY in this schema:\n\n\
             {{\n\
               \"summary\": \"...\",\n\
               \"markets\": [{{\"disease\": \"...\", \"adoption_trend\": \"Low|Moderate|High\", \"note\": null}}],\n\
               \"negative_signals\": [{{\"issue\": \"...\", \"impact\": \"...\"}}],\n\
               \"commercial_feasibility\": 0.6\n\
             }}"
        );

        let raw = match advisor.complete(&prompt).await {
            Ok(raw) => raw,
            Err(_) => return TierOutcome::pass("LLM call failure"),
        };
        let Some(block) = extract_json_block(&raw) else {
            return TierOutcome::pass("LLM parsing failure");
        };
        let Ok(parsed) = serde_json::from_str::<MarketInference>(block) else {
            return TierOutcome::pass("LLM parsing failure");
        };
        if parsed.markets.is_empty() {
            return TierOutcome::pass("LLM returned insufficient detail");
        }

        let markets: Vec<MarketSignal> = parsed
            .markets
            .into_iter()
            .map(|signal| MarketSignal {
                disease: if signal.disease.is_empty() {
                    disease.to_string()
                } else {
                    signal.disease
                },
                adoption_trend: if signal.adoption_trend.is_empty() {
                    "Moderate".to_string()
                } else {
                    signal.adoption_trend
                },
                note: signal.note,
            })
            .collect();

        let feasibility = Self::clamp_feasibility(parsed.commercial_feasibility.unwrap_or(0.5));
        let summary = if parsed.summary.trim().is_empty() {
            format!("Advisor-inferred market outlook for {molecule}.")
        } else {
            parsed.summary.trim().to_string()
        };

        TierOutcome::Resolved(MarketPayload {
            summary,
            markets,
            negative_signals: parsed
                .negative_signals
                .into_iter()
                .map(|n| NegativeSignal {
                    issue: n.issue,
                    impact: n.impact,
                })
                .collect(),
            metrics: MarketMetrics {
                commercial_feasibility: feasibility,
                regions_tracked: None,
            },
            region_trends: Vec::new(),
            yearly_totals: Vec::new(),
            currency_unit: None,
            note: None,
            success_story: None,
            sources: Vec::new(),
        })
    }

    async fn synthetic(&self, query: &AgentQuery, reason: &str) -> MarketPayload {
        let disease = query.disease().unwrap_or("Unknown").to_string();
        let crowded = Self::is_blockbuster(&disease);
        let feasibility = if crowded {
            CROWDED_FEASIBILITY
        } else {
            OPEN_FEASIBILITY
        };

        let negative_signals = if crowded {
            vec![NegativeSignal {
                issue: "Crowded competitive field".to_string(),
                impact: "Price pressure and costly differentiation".to_string(),
            }]
        } else {
            Vec::new()
        };

        MarketPayload {
            summary: format!(
                "Commercial outlook synthesized locally because {reason}. {disease} rates \
                 {} on the entry-feasibility scale.",
                if crowded {
                    "as a crowded field with limited upside"
                } else {
                    "as an open field with room for a differentiated entrant"
                }
            ),
            markets: vec![MarketSignal {
                disease,
                adoption_trend: "Moderate".to_string(),
                note: None,
            }],
            negative_signals,
            metrics: MarketMetrics {
                commercial_feasibility: feasibility,
                regions_tracked: None,
            },
            region_trends: Vec::new(),
            yearly_totals: Vec::new(),
            currency_unit: None,
            note: Some(format!("Synthetic fallback data used because {reason}")),
            success_story: None,
            sources: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StubAdvisor;

    fn agent_with(advisor: Option<Arc<dyn Advisor>>) -> MarketAgent {
        MarketAgent::new(Arc::new(ShowcaseCatalog::builtin()), advisor)
    }

    #[test]
    fn test_adoption_label_thresholds() {
        assert_eq!(MarketAgent::adoption_from_cagr(0.08), "High");
        assert_eq!(MarketAgent::adoption_from_cagr(0.06), "High");
        assert_eq!(MarketAgent::adoption_from_cagr(0.04), "Moderate");
        assert_eq!(MarketAgent::adoption_from_cagr(0.01), "Low");
    }

    #[tokio::test]
    async fn test_showcase_molecule_resolves_curated_trends() {
        let agent = agent_with(None);
        let payload = agent
            .run(Some("aspirin"), Some("Cardiovascular Disease"))
            .await;
        assert!(!payload.region_trends.is_empty());
        assert!(payload.currency_unit.is_some());
        assert_eq!(
            payload.metrics.regions_tracked,
            Some(payload.region_trends.len())
        );
        assert!(payload.note.is_none());
    }

    #[tokio::test]
    async fn test_blockbuster_disease_scores_crowded() {
        let agent = agent_with(None);
        let payload = agent.run(Some("molecule-x"), Some("Obesity")).await;
        assert_eq!(payload.metrics.commercial_feasibility, CROWDED_FEASIBILITY);
        assert_eq!(payload.negative_signals.len(), 1);
        assert!(payload.note.is_some());
    }

    #[tokio::test]
    async fn test_open_field_disease_scores_feasible() {
        let agent = agent_with(None);
        let payload = agent.run(Some("molecule-x"), Some("NAFLD")).await;
        assert_eq!(payload.metrics.commercial_feasibility, OPEN_FEASIBILITY);
        assert!(payload.negative_signals.is_empty());
    }

    #[tokio::test]
    async fn test_generative_tier_clamps_feasibility() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying(
            r#"{"summary": "Strong niche",
                "markets": [{"disease": "NAFLD", "adoption_trend": "High"}],
                "negative_signals": [],
                "commercial_feasibility": 1.7}"#,
        ));
        let agent = agent_with(Some(advisor));
        let payload = agent.run(Some("molecule-x"), Some("NAFLD")).await;
        assert_eq!(payload.metrics.commercial_feasibility, 1.0);
        assert!(payload.note.is_none());
    }
}
