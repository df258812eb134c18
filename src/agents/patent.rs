//! Patent / IP Agent
//!
//! Maps the intellectual-property landscape around a molecule. On top of
//! the usual fallback tiers it carries hard rules for molecules whose IP
//! position is public knowledge: long-generic compounds and recently
//! branded blockbusters never need a registry round trip to classify.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::records::dedupe_records;
use crate::agents::tiered::{AgentQuery, TierOutcome, TieredResolver};
use crate::data::ShowcaseCatalog;
use crate::llm::Advisor;
use crate::models::{AppState, IpConflict, PatentCount, PatentRecord};
use crate::sources::{PatentRegistrySource, RawPatent};
use crate::utils::{extract_json_block, summarize_with_advisor};

const MAX_PATENTS: usize = 10;

/// Molecules whose composition-of-matter protection expired long ago.
const GENERIC_MOLECULES: &[&str] = &[
    "aspirin",
    "acetylsalicylic acid",
    "paracetamol",
    "ibuprofen",
    "metformin",
    "colchicine",
    "ors",
];

/// Molecules under active originator enforcement.
const BRANDED_MOLECULES: &[&str] = &["semaglutide", "tirzepatide"];

#[derive(Debug, Clone, Serialize)]
pub struct PatentMetrics {
    pub patent_count: PatentCount,
    pub ip_risk_level: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatentPayload {
    pub summary: String,
    pub active_patents: Vec<String>,
    pub expired_patents: Vec<String>,
    pub ip_conflicts: Vec<IpConflict>,
    pub metrics: PatentMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detailed_entries: Vec<PatentRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spotlight_patents: Vec<PatentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_story: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl PatentPayload {
    fn bare(summary: String) -> Self {
        Self {
            summary,
            active_patents: Vec::new(),
            expired_patents: Vec::new(),
            ip_conflicts: Vec::new(),
            metrics: PatentMetrics {
                patent_count: PatentCount::Exact(0),
                ip_risk_level: "Low".to_string(),
            },
            detailed_entries: Vec::new(),
            spotlight_patents: Vec::new(),
            note: None,
            success_story: None,
            sources: Vec::new(),
        }
    }

    /// Payload truth from the active list: you hold many live families, the
    /// field is risky to enter.
    fn risk_from_active(active: usize) -> String {
        match active {
            0 => "Low".to_string(),
            1..=4 => "Moderate".to_string(),
            _ => "High".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatentInference {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    active_patents: Vec<String>,
    #[serde(default)]
    expired_patents: Vec<String>,
    #[serde(default)]
    ip_conflicts: Vec<InferredConflict>,
    #[serde(default)]
    ip_risk_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InferredConflict {
    #[serde(default)]
    issue: String,
    #[serde(default)]
    competitor: String,
    #[serde(default)]
    url: String,
}

pub struct PatentAgent {
    showcase: Arc<ShowcaseCatalog>,
    advisor: Option<Arc<dyn Advisor>>,
    patents: Arc<dyn PatentRegistrySource>,
}

impl PatentAgent {
    pub fn new(
        showcase: Arc<ShowcaseCatalog>,
        advisor: Option<Arc<dyn Advisor>>,
        patents: Arc<dyn PatentRegistrySource>,
    ) -> Self {
        Self {
            showcase,
            advisor,
            patents,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.showcase.clone(),
            state.advisor.clone(),
            state.patents.clone(),
        )
    }

    pub async fn run(&self, molecule: Option<&str>, disease: Option<&str>) -> PatentPayload {
        self.resolve(&AgentQuery::new(molecule, disease)).await
    }

    fn describe(record: &PatentRecord) -> String {
        let title = record.title.as_deref().unwrap_or("Untitled filing");
        match (&record.number, &record.date) {
            (Some(number), Some(date)) => format!("{title} ({number}, {date})"),
            (Some(number), None) => format!("{title} ({number})"),
            (None, Some(date)) => format!("{title} ({date})"),
            (None, None) => title.to_string(),
        }
    }

    fn normalize(raw: &RawPatent) -> PatentRecord {
        PatentRecord {
            number: raw.number.clone(),
            title: raw.title.clone(),
            date: raw.date.clone(),
            assignee: raw.assignee.clone(),
            url: raw.url.clone(),
            focus: None,
        }
    }

    /// A filing older than the standard 20-year term is treated as expired.
    fn is_expired(record: &PatentRecord) -> bool {
        let cutoff = Utc::now().year() - 20;
        record
            .date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse::<i32>().ok())
            .map(|year| year <= cutoff)
            .unwrap_or(false)
    }

    fn class_level_payload(disease: Option<&str>) -> PatentPayload {
        let scope = disease.unwrap_or("the therapeutic class");
        let mut payload = PatentPayload::bare(format!(
            "No specific molecule supplied; the IP position depends on which asset is chosen \
             within {scope}. Expect a mix of expired originator families and active \
             formulation or method-of-use claims."
        ));
        payload.metrics.patent_count = PatentCount::Estimate("Class-dependent".to_string());
        payload.metrics.ip_risk_level = "Moderate".to_string();
        payload
    }

    // Generic saturation is an IP hazard in its own right: no exclusivity
    // to build on, so only method-of-use or combination claims can protect
    // a repurposed use.
    fn generic_payload(molecule: &str) -> PatentPayload {
        let mut payload = PatentPayload::bare(format!(
            "{molecule} is a fully generic molecule; core composition patents are expired. \
             Repurposing requires method-of-use or combination IP."
        ));
        payload.expired_patents = vec![format!(
            "{molecule} core composition patents expired decades ago"
        )];
        payload.ip_conflicts = vec![IpConflict {
            issue: "Generic saturation".to_string(),
            competitor: "Multiple manufacturers".to_string(),
            url: "https://patents.google.com".to_string(),
        }];
        payload.metrics.patent_count = PatentCount::Estimate("Expired / generic".to_string());
        payload.metrics.ip_risk_level = "High".to_string();
        payload
    }

    fn branded_payload(molecule: &str) -> PatentPayload {
        let mut payload = PatentPayload::bare(format!(
            "{molecule} remains under originator protection with layered composition, \
             formulation, and method-of-use families running well into the 2030s."
        ));
        payload.active_patents = vec![format!(
            "{molecule} composition and formulation families active into the 2030s"
        )];
        payload.ip_conflicts = vec![IpConflict {
            issue: "Originator enforcement likely for any secondary indication".to_string(),
            competitor: "Originator and licensed partners".to_string(),
            url: String::new(),
        }];
        payload.metrics.patent_count =
            PatentCount::Estimate("Multiple active families".to_string());
        payload.metrics.ip_risk_level = "High".to_string();
        payload
    }
}

#[async_trait]
impl TieredResolver for PatentAgent {
    type Payload = PatentPayload;

    fn agent_name(&self) -> &'static str {
        "patents"
    }

    async fn curated(&self, query: &AgentQuery) -> TierOutcome<PatentPayload> {
        let Some(molecule) = query.molecule() else {
            return TierOutcome::pass("no molecule provided");
        };
        let Some(case) = self.showcase.resolve(molecule) else {
            return TierOutcome::pass("no showcase case for molecule");
        };
        if case.curated_patents.is_empty() && case.expired_notes.is_empty() {
            return TierOutcome::pass("showcase case has no curated patents");
        }

        let spotlight = dedupe_records(case.curated_patents.clone());
        let active: Vec<String> = spotlight.iter().map(Self::describe).collect();
        let expired = case.expired_notes.clone();

        // Fresh registry rows enrich the curated spotlight.
        let detailed = {
            let fetched: Vec<PatentRecord> = self
                .patents
                .fetch_patents(molecule, MAX_PATENTS)
                .await
                .iter()
                .map(Self::normalize)
                .collect();
            let mut merged = spotlight.clone();
            merged.extend(fetched);
            dedupe_records(merged)
        };

        let facts: Vec<String> = active.iter().take(5).cloned().collect();
        let fallback = if case.success_story.is_empty() {
            format!("Curated IP landscape for {molecule}.")
        } else {
            case.success_story.clone()
        };
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} patent landscape"),
            &facts,
            &fallback,
        )
        .await;

        TierOutcome::Resolved(PatentPayload {
            summary,
            metrics: PatentMetrics {
                patent_count: PatentCount::Exact(active.len() as u32),
                ip_risk_level: case.ip_risk_level.clone(),
            },
            active_patents: active,
            expired_patents: expired,
            ip_conflicts: case.ip_conflicts.clone(),
            detailed_entries: detailed,
            spotlight_patents: spotlight,
            note: None,
            success_story: Some(case.success_story.clone()),
            sources: case.sources.clone(),
        })
    }

    async fn live(&self, query: &AgentQuery) -> TierOutcome<PatentPayload> {
        let Some(molecule) = query.molecule() else {
            return TierOutcome::pass("no molecule provided");
        };

        let raw = self.patents.fetch_patents(molecule, MAX_PATENTS).await;
        if raw.is_empty() {
            return TierOutcome::pass("PatentsView returned no filings");
        }

        let records = dedupe_records(raw.iter().map(Self::normalize).collect());
        if records.is_empty() {
            return TierOutcome::pass("registry rows lacked identity fields");
        }

        let mut active = Vec::new();
        let mut expired = Vec::new();
        for record in &records {
            if Self::is_expired(record) {
                expired.push(Self::describe(record));
            } else {
                active.push(Self::describe(record));
            }
        }

        let facts: Vec<String> = active.iter().chain(expired.iter()).take(5).cloned().collect();
        let fallback = format!("Registry patent filings for {molecule}.");
        let summary = summarize_with_advisor(
            self.advisor.as_ref(),
            &format!("{molecule} patent landscape"),
            &facts,
            &fallback,
        )
        .await;

        TierOutcome::Resolved(PatentPayload {
            summary,
            metrics: PatentMetrics {
                patent_count: PatentCount::Exact(records.len() as u32),
                ip_risk_level: PatentPayload::risk_from_active(active.len()),
            },
            active_patents: active,
            expired_patents: expired,
            ip_conflicts: Vec::new(),
            detailed_entries: records,
            spotlight_patents: Vec::new(),
            note: None,
            success_story: None,
            sources: Vec::new(),
        })
    }

    fn shortcut(&self, query: &AgentQuery) -> Option<PatentPayload> {
        let Some(molecule) = query.molecule() else {
            return Some(Self::class_level_payload(query.disease()));
        };
        let lowered = molecule.trim().to_lowercase();
        if GENERIC_MOLECULES.contains(&lowered.as_str()) {
            return Some(Self::generic_payload(molecule));
        }
        if BRANDED_MOLECULES.contains(&lowered.as_str()) {
            return Some(Self::branded_payload(molecule));
        }
        None
    }

    async fn inferred(&self, query: &AgentQuery) -> TierOutcome<PatentPayload> {
        let Some(advisor) = self.advisor.as_ref() else {
            return TierOutcome::pass("LLM not available");
        };
        let molecule = query.molecule().unwrap_or("Candidate molecule");

        let prompt = format!(
            "You are a pharmaceutical IP analyst.\n\n\
             Assess the patent landscape for:\n\
             Molecule: {molecule}\n\
             Disease context: {}\n\n\
             Rules:\n\
             - Name only patent families you are confident exist\n\
             - Distinguish active from expired protection\n\
             - Be conservative and realistic\n\n\
             Return STRICT JSON ONLY in this schema:\n\n\
             {{\n\
               \"summary\": \"...\",\n\
               \"active_patents\": [\"...\"],\n\
               \"expired_patents\": [\"...\"],\n\
               \"ip_conflicts\": [{{\"issue\": \"...\", \"competitor\": \"...\", \"url\": \"\"}}],\n\
               \"ip_risk_level\": \"Low|Moderate|High\"\n\
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
        let Ok(parsed) = serde_json::from_str::<PatentInference>(block) else {
            return TierOutcome::pass("LLM parsing failure");
        };
        if parsed.active_patents.is_empty() && parsed.expired_patents.is_empty() {
            return TierOutcome::pass("LLM returned insufficient detail");
        }

        let count = (parsed.active_patents.len() + parsed.expired_patents.len()) as u32;
        let risk = parsed
            .ip_risk_level
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| PatentPayload::risk_from_active(parsed.active_patents.len()));
        let summary = if parsed.summary.trim().is_empty() {
            format!("Advisor-inferred IP position for {molecule}.")
        } else {
            parsed.summary.trim().to_string()
        };

        TierOutcome::Resolved(PatentPayload {
            summary,
            active_patents: parsed.active_patents,
            expired_patents: parsed.expired_patents,
            ip_conflicts: parsed
                .ip_conflicts
                .into_iter()
                .map(|c| IpConflict {
                    issue: c.issue,
                    competitor: c.competitor,
                    url: c.url,
                })
                .collect(),
            metrics: PatentMetrics {
                patent_count: PatentCount::Exact(count),
                ip_risk_level: risk,
            },
            detailed_entries: Vec::new(),
            spotlight_patents: Vec::new(),
            note: None,
            success_story: None,
            sources: Vec::new(),
        })
    }

    async fn synthetic(&self, query: &AgentQuery, reason: &str) -> PatentPayload {
        let molecule = query.molecule().unwrap_or("Candidate molecule");
        let target = query.disease().unwrap_or("priority indications");

        // Deterministic pseudo-count keyed off the molecule name.
        let families = molecule.len().clamp(2, 8) as u32;

        PatentPayload {
            summary: format!(
                "IP snapshot synthesized locally because {reason}. {molecule} carries a \
                 moderate, navigable patent position."
            ),
            active_patents: vec![
                format!("{molecule} sustained-release patent (2019)"),
                format!("{molecule} combo-therapy claims for {target} (2021)"),
            ],
            expired_patents: vec![format!("{molecule} original composition patent (2003)")],
            ip_conflicts: vec![IpConflict {
                issue: "Crowded method-of-use landscape".to_string(),
                competitor: "Multiple generics manufacturers".to_string(),
                url: String::new(),
            }],
            metrics: PatentMetrics {
                patent_count: PatentCount::Exact(families),
                ip_risk_level: "Moderate".to_string(),
            },
            detailed_entries: Vec::new(),
            spotlight_patents: Vec::new(),
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
    use crate::sources::StubSources;

    fn agent_with(advisor: Option<Arc<dyn Advisor>>, patents: Vec<RawPatent>) -> PatentAgent {
        PatentAgent::new(
            Arc::new(ShowcaseCatalog::builtin()),
            advisor,
            Arc::new(StubSources {
                patents,
                ..Default::default()
            }),
        )
    }

    fn raw_patent(number: &str, title: &str, date: &str) -> RawPatent {
        RawPatent {
            number: Some(number.to_string()),
            title: Some(title.to_string()),
            date: Some(date.to_string()),
            assignee: Some("Acme Pharma".to_string()),
            url: None,
        }
    }

    #[tokio::test]
    async fn test_generic_molecule_hits_hard_rule_when_registry_is_dry() {
        let agent = agent_with(None, Vec::new());
        let payload = agent.run(Some("Metformin"), None).await;
        assert_eq!(
            payload.metrics.patent_count,
            PatentCount::Estimate("Expired / generic".to_string())
        );
        assert_eq!(payload.metrics.ip_risk_level, "High");
        assert_eq!(payload.ip_conflicts[0].issue, "Generic saturation");
        assert!(payload.active_patents.is_empty());
        assert!(!payload.expired_patents.is_empty());
    }

    #[tokio::test]
    async fn test_branded_molecule_reads_high_risk() {
        let agent = agent_with(None, Vec::new());
        let payload = agent.run(Some("semaglutide"), None).await;
        assert_eq!(payload.metrics.ip_risk_level, "High");
        assert_eq!(payload.ip_conflicts.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_molecule_yields_class_level_payload() {
        let agent = agent_with(None, Vec::new());
        let payload = agent.run(None, Some("obesity")).await;
        assert_eq!(
            payload.metrics.patent_count,
            PatentCount::Estimate("Class-dependent".to_string())
        );
        assert!(payload.summary.contains("obesity"));
    }

    #[tokio::test]
    async fn test_live_tier_splits_active_and_expired_by_term() {
        let agent = agent_with(
            None,
            vec![
                raw_patent("US111", "Formulation claims", "2021-05-01"),
                raw_patent("US222", "Original composition", "1998-02-11"),
            ],
        );
        let payload = agent.run(Some("molecule-x"), None).await;
        assert_eq!(payload.active_patents.len(), 1);
        assert_eq!(payload.expired_patents.len(), 1);
        assert_eq!(payload.metrics.patent_count, PatentCount::Exact(2));
        assert_eq!(payload.metrics.ip_risk_level, "Moderate");
    }

    #[tokio::test]
    async fn test_showcase_case_keeps_curated_risk_level() {
        let agent = agent_with(None, Vec::new());
        let payload = agent.run(Some("thalidomide"), None).await;
        assert!(!payload.spotlight_patents.is_empty());
        assert!(payload.success_story.is_some());
    }

    #[tokio::test]
    async fn test_synthetic_fallback_for_unknown_molecule() {
        let agent = agent_with(None, Vec::new());
        let payload = agent.run(Some("zz-novel-compound"), None).await;
        assert!(payload.note.is_some());
        assert_eq!(payload.active_patents.len(), 2);
        assert_eq!(payload.expired_patents.len(), 1);
    }
}
