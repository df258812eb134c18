//! Clinical Trials Agent
//!
//! Collects interventional studies for a molecule, normalizes registry rows
//! into [`TrialRecord`]s and segments them by outcome status.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::records::{dedupe_records, extract_year, parse_enrollment, segment_trials};
use crate::agents::tiered::{AgentQuery, TierOutcome, TieredResolver};
use crate::data::ShowcaseCatalog;
use crate::llm::Advisor;
use crate::models::{AppState, TrialRecord};
use crate::sources::{first_value, RawTrial, TrialsRegistrySource};
use crate::utils::{extract_json_block, summarize_with_advisor};

#[derive(Debug, Clone, Serialize)]
pub struct ClinicalMetrics {
    pub total_trials: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinicalPayload {
    pub summary: String,
    pub successful_trials: Vec<TrialRecord>,
    pub failed_trials: Vec<TrialRecord>,
    pub inconclusive_trials: Vec<TrialRecord>,
    pub metrics: ClinicalMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub registry_entries: Vec<TrialRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_story: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClinicalInference {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    successful_trials: Vec<InferredTrial>,
    #[serde(default)]
    failed_trials: Vec<InferredTrial>,
    #[serde(default)]
    inconclusive_trials: Vec<InferredTrial>,
}

#[derive(Debug, Deserialize)]
struct InferredTrial {
    #[serde(default)]
    nct_id: Option<String>,
    #[serde(default)]
    trial_name: String,
    #[serde(default)]
    phase: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    disease: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    enrollment: Option<u32>,
    #[serde(default)]
    sponsor: Option<String>,
    #[serde(default)]
    evidence_note: String,
}

impl InferredTrial {
    fn into_record(self, fallback_disease: &str) -> TrialRecord {
        TrialRecord {
            url: self
                .nct_id
                .as_deref()
                .map(|id| format!("https://clinicaltrials.gov/study/{id}")),
            nct_id: self.nct_id,
            trial_name: self.trial_name,
            phase: if self.phase.is_empty() {
                "N/A".to_string()
            } else {
                self.phase
            },
            status: if self.status.is_empty() {
                "Unknown".to_string()
            } else {
                self.status
            },
            disease: if self.disease.is_empty() {
                fallback_disease.to_string()
            } else {
                self.disease
            },
            region: None,
            year: self.year,
            enrollment: self.enrollment,
            sponsor: self.sponsor,
            evidence_note: if self.evidence_note.is_empty() {
                "Advisor-inferred trial".to_string()
            } else {
                self.evidence_note
            },
        }
    }
}

pub struct ClinicalAgent {
    showcase: Arc<ShowcaseCatalog>,
    advisor: Option<Arc<dyn Advisor>>,
    trials: Arc<dyn TrialsRegistrySource>,
}

impl ClinicalAgent {
    pub fn new(
        showcase: Arc<ShowcaseCatalog>,
        advisor: Option<Arc<dyn Advisor>>,
        trials: Arc<dyn TrialsRegistrySource>,
    ) -> Self {
        Self {
            showcase,
            advisor,
            trials,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.showcase.clone(),
            state.advisor.clone(),
            state.trials.clone(),
        )
    }

    pub async fn run(&self, molecule: Option<&str>, disease: Option<&str>) -> ClinicalPayload {
        let query = AgentQuery::new(molecule, disease);
        if query.molecule().map(str::trim).filter(|m| !m.is_empty()).is_none() {
            return Self::empty_payload();
        }
        self.resolve(&query).await
    }

    fn empty_payload() -> ClinicalPayload {
        ClinicalPayload {
            summary: "No molecule provided".to_string(),
            successful_trials: Vec::new(),
            failed_trials: Vec::new(),
            inconclusive_trials: Vec::new(),
            metrics: ClinicalMetrics {
                total_trials: 0,
                success_rate: 0.0,
            },
            registry_entries: Vec::new(),
            note: None,
            success_story: None,
            sources: Vec::new(),
        }
    }

    /// Normalize a raw registry row into a trial record. The brief title
    /// wins over the official one, and the evidence note is capped so a
    /// sprawling registry abstract does not dominate the payload.
    fn normalize(raw: &RawTrial, molecule: &str, fallback_disease: &str) -> TrialRecord {
        let nct_id = first_value(&raw.nct_id).map(str::to_string);
        let trial_name = first_value(&raw.brief_title)
            .or_else(|| first_value(&raw.official_title))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Clinical trial for {molecule}"));
        let summary = first_value(&raw.brief_summary).unwrap_or("No summary provided");
        TrialRecord {
            url: nct_id
                .as_deref()
                .map(|id| format!("https://clinicaltrials.gov/study/{id}")),
            nct_id,
            trial_name,
            phase: first_value(&raw.phase).unwrap_or("N/A").to_string(),
            status: first_value(&raw.overall_status)
                .unwrap_or("Unknown")
                .to_string(),
            disease: first_value(&raw.condition)
                .unwrap_or(fallback_disease)
                .to_string(),
            region: Some(
                first_value(&raw.location_country)
                    .unwrap_or("Global")
                    .to_string(),
            ),
            year: extract_year(first_value(&raw.start_date)),
            enrollment: parse_enrollment(first_value(&raw.enrollment_count)),
            sponsor: first_value(&raw.lead_sponsor).map(str::to_string),
            evidence_note: summary.chars().take(220).collect(),
        }
    }

    fn success_rate(successful: usize, total: usize) -> f64 {
        let rate = successful as f64 / total.max(1) as f64;
        (rate * 100.0).round() / 100.0
    }

    fn trial_facts(trials: &[TrialRecord]) -> Vec<String> {
        trials
            .iter()
            .take(5)
            .map(|t| format!("{} ({}, {})", t.trial_name, t.phase, t.status))
            .collect()
    }

    async fn assemble(
        &self,
        molecule: &str,
        trials: Vec<TrialRecord>,
        registry_entries: Vec<TrialRecord>,
        success_story: Option<String>,
        sources: Vec<String>,
        fallback_summary: String,
    ) -> ClinicalPayload {
        let (successful, failed, inconclusive) = segment_trials(&trials);
        let total = trials.len();
        let rate = Self::success_rate(successful.len(), total);

        let facts = if successful.is_empty() {
            Self::trial_facts(&trials)
        } else {
            Self::trial_facts(&successful)
        };
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} clinical development"),
            &facts,
            &fallback_summary,
        )
        .await;

        ClinicalPayload {
            summary,
            successful_trials: successful,
            failed_trials: failed,
            inconclusive_trials: inconclusive,
            metrics: ClinicalMetrics {
                total_trials: total,
                success_rate: rate,
            },
            registry_entries,
            note: None,
            success_story,
            sources,
        }
    }
}

#[async_trait]
impl TieredResolver for ClinicalAgent {
    type Payload = ClinicalPayload;

    fn agent_name(&self) -> &'static str {
        "clinical_trials"
    }

    async fn curated(&self, query: &AgentQuery) -> TierOutcome<ClinicalPayload> {
        let Some(molecule) = query.molecule() else {
            return TierOutcome::pass("no molecule provided");
        };
        let Some(case) = self.showcase.resolve(molecule) else {
            return TierOutcome::pass("no showcase case for molecule");
        };
        if case.curated_trials.is_empty() {
            return TierOutcome::pass("showcase case has no curated trials");
        }

        // Curated records lead; fresh registry rows enrich them when the
        // upstream call succeeds.
        let fallback_disease = query.disease().unwrap_or("Unknown");
        let registry_entries: Vec<TrialRecord> = self
            .trials
            .fetch_trials(molecule, query.disease())
            .await
            .iter()
            .map(|raw| Self::normalize(raw, molecule, fallback_disease))
            .collect();

        let mut merged = case.curated_trials.clone();
        merged.extend(registry_entries.iter().cloned());
        let merged = dedupe_records(merged);

        let fallback_summary = if case.success_story.is_empty() {
            format!("Clinical evidence for {molecule}.")
        } else {
            case.success_story.clone()
        };
        let payload = self
            .assemble(
                molecule,
                merged,
                registry_entries,
                Some(case.success_story.clone()),
                case.sources.clone(),
                fallback_summary,
            )
            .await;
        TierOutcome::Resolved(payload)
    }

    async fn live(&self, query: &AgentQuery) -> TierOutcome<ClinicalPayload> {
        let Some(molecule) = query.molecule() else {
            return TierOutcome::pass("no molecule provided");
        };

        let fallback_disease = query.disease().unwrap_or("Unknown");
        let raw = self.trials.fetch_trials(molecule, query.disease()).await;
        if raw.is_empty() {
            return TierOutcome::pass("ClinicalTrials.gov returned no studies");
        }

        let normalized = dedupe_records(
            raw.iter()
                .map(|row| Self::normalize(row, molecule, fallback_disease))
                .collect(),
        );
        if normalized.is_empty() {
            return TierOutcome::pass("registry rows lacked identity fields");
        }

        let fallback_summary = format!("Registry evidence for {molecule}.");
        let payload = self
            .assemble(
                molecule,
                normalized.clone(),
                normalized,
                None,
                Vec::new(),
                fallback_summary,
            )
            .await;
        TierOutcome::Resolved(payload)
    }

    async fn inferred(&self, query: &AgentQuery) -> TierOutcome<ClinicalPayload> {
        let Some(advisor) = self.advisor.as_ref() else {
            return TierOutcome::pass("LLM not available");
        };
        let molecule = query.molecule().unwrap_or("Candidate molecule");
        let fallback_disease = query.disease().unwrap_or("Unknown");

        let prompt = format!(
            "You are a clinical development analyst.\n\n\
             Recall the registered trials for:\n\
             Molecule: {molecule}\n\
             Disease context: {fallback_disease}\n\n\
             Rules:\n\
             - Cite only trials you are confident exist\n\
             - Group by outcome: successful, failed, inconclusive\n\
             - Be conservative and realistic\n\n\
             Return STRICT JSON ONLY in this schema:\n\n\
             {{\n\
               \"summary\": \"...\",\n\
               \"successful_trials\": [\n\
                 {{\"nct_id\": null, \"trial_name\": \"...\", \"phase\": \"Phase II\", \"status\": \"Completed\", \"disease\": \"...\", \"year\": 2020, \"enrollment\": 100, \"sponsor\": null, \"evidence_note\": \"...\"}}\n\
               ],\n\
               \"failed_trials\": [],\n\
               \"inconclusive_trials\": []\n\
             }}"
        );

        let raw = match advisor.complete(&prompt).await {
            Ok(raw) => raw,
            Err(_) => return TierOutcome::pass("LLM call failure"),
        };
        let Some(block) = extract_json_block(&raw) else {
            return TierOutcome::pass("LLM parsing failure");
        };
        let Ok(parsed) = serde_json::from_str::<ClinicalInference>(block) else {
            return TierOutcome::pass("LLM parsing failure");
        };

        let successful = dedupe_records(
            parsed
                .successful_trials
                .into_iter()
                .map(|t| t.into_record(fallback_disease))
                .collect(),
        );
        let failed = dedupe_records(
            parsed
                .failed_trials
                .into_iter()
                .map(|t| t.into_record(fallback_disease))
                .collect(),
        );
        let inconclusive = dedupe_records(
            parsed
                .inconclusive_trials
                .into_iter()
                .map(|t| t.into_record(fallback_disease))
                .collect(),
        );
        if successful.is_empty() && failed.is_empty() && inconclusive.is_empty() {
            return TierOutcome::pass("LLM returned insufficient detail");
        }

        // Recompute counts rather than trusting model arithmetic.
        let total = successful.len() + failed.len() + inconclusive.len();
        let rate = Self::success_rate(successful.len(), total);

        let fallback_summary = if parsed.summary.trim().is_empty() {
            format!("Advisor-recalled trials for {molecule}.")
        } else {
            parsed.summary.trim().to_string()
        };
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} clinical development"),
            &Self::trial_facts(&successful),
            &fallback_summary,
        )
        .await;

        TierOutcome::Resolved(ClinicalPayload {
            summary,
            successful_trials: successful,
            failed_trials: failed,
            inconclusive_trials: inconclusive,
            metrics: ClinicalMetrics {
                total_trials: total,
                success_rate: rate,
            },
            registry_entries: Vec::new(),
            note: None,
            success_story: None,
            sources: Vec::new(),
        })
    }

    async fn synthetic(&self, query: &AgentQuery, reason: &str) -> ClinicalPayload {
        let molecule = query.molecule().unwrap_or("Candidate molecule");
        let disease = query.disease().unwrap_or("Target indication").to_string();

        let trial = |name: String, phase: &str, status: &str| TrialRecord {
            nct_id: None,
            trial_name: name,
            phase: phase.to_string(),
            status: status.to_string(),
            disease: disease.clone(),
            region: None,
            year: None,
            enrollment: None,
            sponsor: None,
            evidence_note: "Synthetic registry record".to_string(),
            url: None,
        };

        let successful = vec![
            trial(
                format!("{molecule} Phase II efficacy study"),
                "Phase II",
                "Completed",
            ),
            trial(
                format!("{molecule} adaptive design program"),
                "Phase III",
                "Ongoing",
            ),
        ];
        let failed = vec![trial(
            format!("{molecule} dose-ranging safety cohort"),
            "Phase I",
            "Terminated",
        )];
        let inconclusive = vec![trial(
            format!("{molecule} biomarker substudy"),
            "Phase I",
            "Completed",
        )];

        let total = successful.len() + failed.len() + inconclusive.len();
        let rate = Self::success_rate(successful.len(), total);
        ClinicalPayload {
            summary: format!(
                "Clinical landscape synthesized locally because {reason}. {molecule} shows a \
                 mixed but tractable trial history."
            ),
            successful_trials: successful,
            failed_trials: failed,
            inconclusive_trials: inconclusive,
            metrics: ClinicalMetrics {
                total_trials: total,
                success_rate: rate,
            },
            registry_entries: Vec::new(),
            note: Some(format!("Synthetic fallback data used because {reason}")),
            success_story: None,
            sources: Vec::new(),
        }
    }
}
