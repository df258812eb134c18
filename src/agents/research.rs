//! Research Agent
//!
//! Gathers literature evidence linking a molecule to candidate diseases.
//! Disease labels are lifted from titles/abstracts with fixed substring
//! hints; abstracts are scanned for negative-outcome phrasing to split
//! positive from negative evidence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::agents::records::dedupe_records;
use crate::agents::tiered::{AgentQuery, TierOutcome, TieredResolver};
use crate::data::ShowcaseCatalog;
use crate::llm::Advisor;
use crate::models::{AppState, EvidenceRecord};
use crate::sources::LiteratureSource;
use crate::utils::{extract_json_block, summarize_with_advisor};

const MAX_POSITIVE: usize = 5;
const MAX_NEGATIVE: usize = 3;

/// Substring hints resolving free text to a disease label. First match wins.
const DISEASE_HINTS: &[(&str, &str)] = &[
    ("obesity", "Obesity"),
    ("diabetes", "Type 2 Diabetes"),
    ("fatty liver", "NAFLD"),
    ("alzheimer", "Alzheimer's Disease"),
    ("cardio", "Cardiovascular Disease"),
];

static NEGATIVE_OUTCOME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"no significant|failed|did not improve").expect("negative outcome regex")
});

#[derive(Debug, Clone, Serialize)]
pub struct ResearchMetrics {
    pub total_papers: usize,
    pub positive_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchPayload {
    pub summary: String,
    pub positive_evidence: Vec<EvidenceRecord>,
    pub negative_evidence: Vec<EvidenceRecord>,
    pub retracted_or_low_quality: Vec<EvidenceRecord>,
    pub metrics: ResearchMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_story: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Advisor JSON shape for the generative tier.
#[derive(Debug, Deserialize)]
struct ResearchInference {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    positive_evidence: Vec<InferredEvidence>,
    #[serde(default)]
    negative_evidence: Vec<InferredEvidence>,
}

#[derive(Debug, Deserialize)]
struct InferredEvidence {
    #[serde(default)]
    disease: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    journal: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    evidence_type: Option<String>,
}

impl InferredEvidence {
    fn into_record(self, negative: bool) -> EvidenceRecord {
        EvidenceRecord {
            disease: if self.disease.is_empty() {
                "Unknown".to_string()
            } else {
                self.disease
            },
            title: self.title,
            journal: if self.journal.is_empty() {
                "Advisor knowledge".to_string()
            } else {
                self.journal
            },
            year: self.year,
            url: self.url,
            evidence_type: if negative { None } else { self.evidence_type },
            reason: negative.then(|| "Reported negative or null outcome".to_string()),
        }
    }
}

pub struct ResearchAgent {
    showcase: Arc<ShowcaseCatalog>,
    advisor: Option<Arc<dyn Advisor>>,
    literature: Arc<dyn LiteratureSource>,
}

impl ResearchAgent {
    pub fn new(
        showcase: Arc<ShowcaseCatalog>,
        advisor: Option<Arc<dyn Advisor>>,
        literature: Arc<dyn LiteratureSource>,
    ) -> Self {
        Self {
            showcase,
            advisor,
            literature,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.showcase.clone(),
            state.advisor.clone(),
            state.literature.clone(),
        )
    }

    pub async fn run(&self, molecule: Option<&str>, disease: Option<&str>) -> ResearchPayload {
        let query = AgentQuery::new(molecule, disease);
        if query.molecule().map(str::trim).filter(|m| !m.is_empty()).is_none() {
            return Self::empty_payload();
        }
        self.resolve(&query).await
    }

    /// Resolve a disease label via the fixed substring hints.
    pub fn extract_disease(text: &str) -> Option<&'static str> {
        let lowered = text.to_lowercase();
        DISEASE_HINTS
            .iter()
            .find(|(needle, _)| lowered.contains(needle))
            .map(|(_, label)| *label)
    }

    fn empty_payload() -> ResearchPayload {
        ResearchPayload {
            summary: "No molecule provided".to_string(),
            positive_evidence: Vec::new(),
            negative_evidence: Vec::new(),
            retracted_or_low_quality: Vec::new(),
            metrics: ResearchMetrics {
                total_papers: 0,
                positive_ratio: 0.0,
            },
            success_story: None,
            sources: Vec::new(),
            note: None,
        }
    }

    fn positive_ratio(positive: usize, total: usize) -> f64 {
        let ratio = positive as f64 / total.max(1) as f64;
        (ratio * 100.0).round() / 100.0
    }

    fn evidence_facts(records: &[EvidenceRecord]) -> Vec<String> {
        records
            .iter()
            .map(|item| {
                let year = item
                    .year
                    .map(|y| y.to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                format!("{}: {} ({year})", item.disease, item.title)
            })
            .collect()
    }
}

#[async_trait]
impl TieredResolver for ResearchAgent {
    type Payload = ResearchPayload;

    fn agent_name(&self) -> &'static str {
        "research"
    }

    async fn curated(&self, query: &AgentQuery) -> TierOutcome<ResearchPayload> {
        let Some(molecule) = query.molecule() else {
            return TierOutcome::pass("no molecule provided");
        };
        let Some(case) = self.showcase.resolve(molecule) else {
            return TierOutcome::pass("no showcase case for molecule");
        };

        // Cases without curated literature derive evidence from their
        // landmark trials instead.
        let mut evidence = case.curated_evidence.clone();
        if evidence.is_empty() {
            evidence = case
                .curated_trials
                .iter()
                .map(|trial| EvidenceRecord {
                    disease: trial.disease.clone(),
                    title: trial.trial_name.clone(),
                    journal: trial
                        .region
                        .clone()
                        .unwrap_or_else(|| "ClinicalTrials.gov".to_string()),
                    year: trial.year,
                    url: trial.url.clone(),
                    evidence_type: Some("Landmark clinical evidence".to_string()),
                    reason: None,
                })
                .collect();
        }

        let evidence = dedupe_records(evidence);
        if evidence.is_empty() {
            return TierOutcome::pass("showcase case has no usable evidence");
        }

        let facts = Self::evidence_facts(&evidence[..evidence.len().min(MAX_POSITIVE)]);
        let fallback = if case.success_story.is_empty() {
            format!("Curated evidence for {molecule}.")
        } else {
            case.success_story.clone()
        };
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} repurposing literature"),
            &facts,
            &fallback,
        )
        .await;

        let total = evidence.len();
        TierOutcome::Resolved(ResearchPayload {
            summary,
            positive_evidence: evidence,
            negative_evidence: Vec::new(),
            retracted_or_low_quality: Vec::new(),
            metrics: ResearchMetrics {
                total_papers: total,
                positive_ratio: 1.0,
            },
            success_story: Some(case.success_story.clone()),
            sources: case.sources.clone(),
            note: None,
        })
    }

    async fn live(&self, query: &AgentQuery) -> TierOutcome<ResearchPayload> {
        let Some(molecule) = query.molecule() else {
            return TierOutcome::pass("no molecule provided");
        };

        let articles = self.literature.fetch_articles(molecule).await;
        if articles.is_empty() {
            return TierOutcome::pass("No PubMed matches detected");
        }

        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for article in &articles {
            let combined = format!("{} {}", article.title, article.abstract_text);
            let Some(disease) = Self::extract_disease(&combined) else {
                continue;
            };

            let mut record = EvidenceRecord {
                disease: disease.to_string(),
                title: article.title.clone(),
                journal: article.journal.clone(),
                year: article.year,
                url: Some(format!("https://pubmed.ncbi.nlm.nih.gov/{}", article.pmid)),
                evidence_type: None,
                reason: None,
            };

            if NEGATIVE_OUTCOME_RE.is_match(&article.abstract_text.to_lowercase()) {
                record.reason = Some("No statistically significant improvement".to_string());
                negative.push(record);
            } else {
                record.evidence_type = Some("Experimental / Observational study".to_string());
                positive.push(record);
            }

            if positive.len() >= MAX_POSITIVE && negative.len() >= MAX_NEGATIVE {
                break;
            }
        }

        let positive = dedupe_records(positive);
        let negative = dedupe_records(negative);
        if positive.is_empty() && negative.is_empty() {
            return TierOutcome::pass("Filtered literature returned no actionable evidence");
        }

        let total = positive.len() + negative.len();
        let ratio = Self::positive_ratio(positive.len(), total);
        let positive: Vec<_> = positive.into_iter().take(MAX_POSITIVE).collect();
        let negative: Vec<_> = negative.into_iter().take(MAX_NEGATIVE).collect();

        let facts = if positive.is_empty() {
            Self::evidence_facts(&negative)
        } else {
            Self::evidence_facts(&positive)
        };
        let fallback = format!("Literature evidence linked to {molecule}.");
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} research evidence"),
            &facts,
            &fallback,
        )
        .await;

        TierOutcome::Resolved(ResearchPayload {
            summary,
            positive_evidence: positive,
            negative_evidence: negative,
            retracted_or_low_quality: Vec::new(),
            metrics: ResearchMetrics {
                total_papers: total,
                positive_ratio: ratio,
            },
            success_story: None,
            sources: Vec::new(),
            note: None,
        })
    }

    async fn inferred(&self, query: &AgentQuery) -> TierOutcome<ResearchPayload> {
        let Some(advisor) = self.advisor.as_ref() else {
            return TierOutcome::pass("LLM not available");
        };
        let molecule = query.molecule().unwrap_or("Candidate molecule");

        let prompt = format!(
            "You are a pharmaceutical research analyst.\n\n\
             Survey the published literature evidence for repurposing:\n\
             Molecule: {molecule}\n\
             Disease context: {}\n\n\
             Rules:\n\
             - Cite only studies you are confident exist\n\
             - Split findings into positive and negative outcomes\n\
             - Be conservative and realistic\n\n\
             Return STRICT JSON ONLY in this schema:\n\n\
             {{\n\
               \"summary\": \"...\",\n\
               \"positive_evidence\": [\n\
                 {{\"disease\": \"...\", \"title\": \"...\", \"journal\": \"...\", \"year\": 2020, \"url\": null, \"evidence_type\": \"...\"}}\n\
               ],\n\
               \"negative_evidence\": []\n\
             }}",
            query.disease().unwrap_or("any"),
        );

        let raw = match advisor.complete(&prompt).await {
            Ok(raw) => raw,
            Err(_) => return TierOutcome::pass("LLM call failure"),
        };
        let Some(block) = extract_json_block(&raw) else {
            return TierOutcome::pass("LLM parsing failure");
        };
        let Ok(parsed) = serde_json::from_str::<ResearchInference>(block) else {
            return TierOutcome::pass("LLM parsing failure");
        };

        let positive = dedupe_records(
            parsed
                .positive_evidence
                .into_iter()
                .map(|e| e.into_record(false))
                .collect(),
        );
        let negative = dedupe_records(
            parsed
                .negative_evidence
                .into_iter()
                .map(|e| e.into_record(true))
                .collect(),
        );
        if positive.is_empty() && negative.is_empty() {
            return TierOutcome::pass("LLM returned insufficient detail");
        }

        // Never trust the model's arithmetic; recompute the ratio locally.
        let total = positive.len() + negative.len();
        let ratio = Self::positive_ratio(positive.len(), total);

        let fallback = if parsed.summary.trim().is_empty() {
            format!("Advisor-inferred literature evidence for {molecule}.")
        } else {
            parsed.summary.trim().to_string()
        };
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} research evidence"),
            &Self::evidence_facts(&positive),
            &fallback,
        )
        .await;

        TierOutcome::Resolved(ResearchPayload {
            summary,
            positive_evidence: positive,
            negative_evidence: negative,
            retracted_or_low_quality: Vec::new(),
            metrics: ResearchMetrics {
                total_papers: total,
                positive_ratio: ratio,
            },
            success_story: None,
            sources: Vec::new(),
            note: None,
        })
    }

    async fn synthetic(&self, query: &AgentQuery, reason: &str) -> ResearchPayload {
        let molecule = query.molecule().unwrap_or("Candidate molecule");
        let positive = vec![EvidenceRecord {
            disease: "Inflammation".to_string(),
            title: format!("{molecule} modulates key cytokines in translational models"),
            journal: "Internal dossier".to_string(),
            year: Some(Utc::now().year() - 1),
            url: None,
            evidence_type: Some("Heuristic evidence".to_string()),
            reason: None,
        }];

        ResearchPayload {
            summary: format!(
                "Rapid literature sweep synthesized locally because {reason}. {molecule} retains \
                 actionable mechanistic rationale for secondary indications."
            ),
            metrics: ResearchMetrics {
                total_papers: positive.len(),
                positive_ratio: 1.0,
            },
            positive_evidence: positive,
            negative_evidence: Vec::new(),
            retracted_or_low_quality: Vec::new(),
            success_story: None,
            sources: Vec::new(),
            note: Some(format!("Synthetic fallback data used because {reason}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StubAdvisor;
    use crate::sources::{PubmedArticle, StubSources};

    fn agent_with(
        advisor: Option<Arc<dyn Advisor>>,
        articles: Vec<PubmedArticle>,
    ) -> ResearchAgent {
        ResearchAgent::new(
            Arc::new(ShowcaseCatalog::builtin()),
            advisor,
            Arc::new(StubSources {
                articles,
                ..Default::default()
            }),
        )
    }

    fn article(pmid: &str, title: &str, abstract_text: &str) -> PubmedArticle {
        PubmedArticle {
            pmid: pmid.to_string(),
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            journal: "Journal".to_string(),
            year: Some(2020),
        }
    }

    #[test]
    fn test_extract_disease_hints() {
        assert_eq!(
            ResearchAgent::extract_disease("Effects on OBESITY in adults"),
            Some("Obesity")
        );
        assert_eq!(
            ResearchAgent::extract_disease("diabetes management"),
            Some("Type 2 Diabetes")
        );
        assert_eq!(
            ResearchAgent::extract_disease("cardioprotective effects"),
            Some("Cardiovascular Disease")
        );
        assert_eq!(ResearchAgent::extract_disease("unrelated topic"), None);
    }

    #[tokio::test]
    async fn test_showcase_molecule_resolves_curated_payload() {
        let agent = agent_with(None, Vec::new());
        let payload = agent.run(Some("aspirin"), None).await;
        assert!(!payload.positive_evidence.is_empty());
        assert!(payload.negative_evidence.is_empty());
        assert_eq!(payload.metrics.positive_ratio, 1.0);
        assert!(payload.success_story.is_some());
    }

    #[tokio::test]
    async fn test_live_tier_classifies_negative_outcomes() {
        let agent = agent_with(
            None,
            vec![
                article("1", "Molecule X in obesity", "Marked weight reduction observed."),
                article(
                    "2",
                    "Molecule X in diabetes",
                    "The treatment did not improve glycemic endpoints.",
                ),
                article("3", "Unrelated botany paper", "Chlorophyll content measurement."),
            ],
        );
        let payload = agent.run(Some("molecule-x"), None).await;
        assert_eq!(payload.positive_evidence.len(), 1);
        assert_eq!(payload.negative_evidence.len(), 1);
        assert_eq!(payload.metrics.total_papers, 2);
        assert_eq!(payload.metrics.positive_ratio, 0.5);
        assert_eq!(payload.positive_evidence[0].disease, "Obesity");
        assert_eq!(
            payload.negative_evidence[0].reason.as_deref(),
            Some("No statistically significant improvement")
        );
    }

    #[tokio::test]
    async fn test_unresolvable_articles_fall_through_to_synthetic() {
        let agent = agent_with(
            None,
            vec![article("1", "Unrelated botany paper", "Nothing medical here.")],
        );
        let payload = agent.run(Some("molecule-x"), None).await;
        assert!(payload.note.is_some());
        assert_eq!(payload.metrics.total_papers, 1);
        assert_eq!(payload.metrics.positive_ratio, 1.0);
    }

    #[tokio::test]
    async fn test_generative_tier_parses_advisor_json() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying(
            r#"Here you go:
            {"summary": "Looks promising", "positive_evidence": [
                {"disease": "NAFLD", "title": "Pilot study", "journal": "Hepatology", "year": 2021}
            ], "negative_evidence": []}"#,
        ));
        let agent = agent_with(Some(advisor), Vec::new());
        let payload = agent.run(Some("molecule-x"), None).await;
        assert_eq!(payload.positive_evidence.len(), 1);
        assert_eq!(payload.positive_evidence[0].disease, "NAFLD");
        assert_eq!(payload.metrics.positive_ratio, 1.0);
        assert!(payload.note.is_none());
    }

    #[tokio::test]
    async fn test_advisor_garbage_falls_through_to_synthetic() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying("not json at all"));
        let agent = agent_with(Some(advisor), Vec::new());
        let payload = agent.run(Some("molecule-x"), None).await;
        assert!(payload.note.is_some());
    }

    #[tokio::test]
    async fn test_missing_molecule_yields_empty_payload() {
        let agent = agent_with(None, Vec::new());
        let payload = agent.run(None, None).await;
        assert_eq!(payload.summary, "No molecule provided");
        assert_eq!(payload.metrics.total_papers, 0);
    }
}
