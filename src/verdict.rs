//! Verdict composition
//!
//! Turns the composite score and the ordered candidate disease list into
//! the final decision envelope. The baseline is purely threshold-driven;
//! curated showcase narratives and, failing that, an advisor judgment may
//! overlay individual fields on top of it. Curated always wins over
//! generated, and a broken advisor reply leaves the baseline untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::ShowcaseCatalog;
use crate::llm::Advisor;
use crate::scoring::ScoreReport;
use crate::utils::extract_json_block;

const GO_THRESHOLD: f64 = 60.0;
const CONSIDER_THRESHOLD: f64 = 50.0;
const HIGH_CONFIDENCE_THRESHOLD: f64 = 80.0;
const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 60.0;
const MAX_SECONDARY: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "CONSIDER")]
    Consider,
    #[serde(rename = "NO-GO")]
    NoGo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub decision: Decision,
    pub confidence: Confidence,
    pub executive_summary: String,
    pub primary_opportunity: String,
    pub secondary_opportunities: Vec<String>,
    /// Legacy field kept for older clients; mirrors the first entry of
    /// `secondary_opportunities`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_opportunity: Option<String>,
    pub why_it_works: Vec<String>,
    pub risk_summary: Vec<String>,
    pub recommended_next_steps: Vec<String>,
}

/// Partial verdict fields that may overwrite the baseline. Used both by
/// curated showcase narratives and by parsed advisor judgments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerdictOverlay {
    #[serde(default)]
    pub decision: Option<Decision>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub primary_opportunity: Option<String>,
    #[serde(default)]
    pub secondary_opportunities: Option<Vec<String>>,
    #[serde(default)]
    pub why_it_works: Option<Vec<String>>,
    #[serde(default)]
    pub risk_summary: Option<Vec<String>>,
    #[serde(default)]
    pub recommended_next_steps: Option<Vec<String>>,
}

impl Verdict {
    fn apply(&mut self, overlay: &VerdictOverlay) {
        if let Some(decision) = overlay.decision {
            self.decision = decision;
        }
        if let Some(confidence) = overlay.confidence {
            self.confidence = confidence;
        }
        if let Some(summary) = &overlay.summary {
            self.executive_summary = summary.clone();
        }
        if let Some(primary) = &overlay.primary_opportunity {
            self.primary_opportunity = primary.clone();
        }
        if let Some(secondary) = &overlay.secondary_opportunities {
            self.secondary_opportunities = secondary.iter().take(MAX_SECONDARY).cloned().collect();
        }
        if let Some(rationale) = &overlay.why_it_works {
            self.why_it_works = rationale.clone();
        }
        if let Some(risks) = &overlay.risk_summary {
            self.risk_summary = risks.clone();
        }
        if let Some(steps) = &overlay.recommended_next_steps {
            self.recommended_next_steps = steps.clone();
        }
    }

    /// Older clients read a singular `secondary_opportunity`; keep it in
    /// lockstep with the list.
    fn reconcile_legacy_fields(&mut self) {
        self.secondary_opportunity = self.secondary_opportunities.first().cloned();
    }
}

pub fn decision_for(score: f64) -> Decision {
    if score >= GO_THRESHOLD {
        Decision::Go
    } else if score >= CONSIDER_THRESHOLD {
        Decision::Consider
    } else {
        Decision::NoGo
    }
}

pub fn confidence_for(score: f64) -> Confidence {
    if score >= HIGH_CONFIDENCE_THRESHOLD {
        Confidence::High
    } else if score >= MEDIUM_CONFIDENCE_THRESHOLD {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn baseline(scoring: &ScoreReport, diseases: &[String]) -> Verdict {
    let score = scoring.final_score();
    let primary = diseases
        .first()
        .cloned()
        .unwrap_or_else(|| "Further indication discovery required".to_string());
    let secondary: Vec<String> = diseases
        .iter()
        .skip(1)
        .take(MAX_SECONDARY)
        .cloned()
        .collect();

    Verdict {
        decision: decision_for(score),
        confidence: confidence_for(score),
        executive_summary: format!(
            "Composite repurposeability score of {score:.0}/100. {}",
            scoring.explanation
        ),
        primary_opportunity: primary,
        secondary_opportunities: secondary,
        secondary_opportunity: None,
        why_it_works: Vec::new(),
        risk_summary: Vec::new(),
        recommended_next_steps: Vec::new(),
    }
}

async fn advisor_overlay(
    advisor: &Arc<dyn Advisor>,
    molecule: &str,
    score: f64,
    diseases: &[String],
) -> Option<VerdictOverlay> {
    let prompt = format!(
        "You are the final reviewer on a drug repurposing committee.\n\n\
         Molecule: {molecule}\n\
         Composite score: {score:.0}/100\n\
         Candidate indications: {}\n\n\
         Return STRICT JSON ONLY in this schema:\n\n\
         {{\n\
           \"decision\": \"GO|CONSIDER|NO-GO\",\n\
           \"confidence\": \"High|Medium|Low\",\n\
           \"summary\": \"...\",\n\
           \"primary_opportunity\": \"...\",\n\
           \"secondary_opportunities\": [\"...\"],\n\
           \"why_it_works\": [\"...\"],\n\
           \"risk_summary\": [\"...\"],\n\
           \"recommended_next_steps\": [\"...\"]\n\
         }}",
        if diseases.is_empty() {
            "none identified".to_string()
        } else {
            diseases.join(", ")
        },
    );

    let raw = advisor.complete(&prompt).await.ok()?;
    let block = extract_json_block(&raw)?;
    serde_json::from_str(block).ok()
}

/// Compose the final verdict from the score and the ordered disease list.
///
/// Showcase narrative beats advisor judgment beats the pure threshold
/// baseline; any advisor failure silently keeps the baseline.
pub async fn generate_final_verdict(
    scoring: &ScoreReport,
    diseases: &[String],
    molecule: Option<&str>,
    showcase: &ShowcaseCatalog,
    advisor: Option<&Arc<dyn Advisor>>,
) -> Verdict {
    let mut verdict = baseline(scoring, diseases);

    let curated = molecule
        .and_then(|name| showcase.resolve(name))
        .and_then(|case| case.repurposing_story.clone());
    if let Some(overlay) = curated {
        verdict.apply(&overlay);
    } else if let Some(advisor) = advisor {
        let molecule = molecule.unwrap_or("the candidate molecule");
        if let Some(overlay) =
            advisor_overlay(advisor, molecule, scoring.final_score(), diseases).await
        {
            verdict.apply(&overlay);
        }
    }

    verdict.reconcile_legacy_fields();
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StubAdvisor;
    use crate::scoring::{ScoreBreakdown, ScoreReport};

    fn report(score: f64) -> ScoreReport {
        ScoreReport {
            score_breakdown: ScoreBreakdown {
                science: 0.0,
                clinical: 0.0,
                patent: 55.0,
                regulatory: 75.0,
                market: 0.0,
                negative_penalty: 0.0,
            },
            final_repurposeability_score: score,
            explanation: "test".to_string(),
        }
    }

    fn diseases(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_decision_thresholds() {
        assert_eq!(decision_for(60.0), Decision::Go);
        assert_eq!(decision_for(59.0), Decision::Consider);
        assert_eq!(decision_for(50.0), Decision::Consider);
        assert_eq!(decision_for(49.0), Decision::NoGo);
    }

    #[test]
    fn test_confidence_thresholds() {
        assert_eq!(confidence_for(80.0), Confidence::High);
        assert_eq!(confidence_for(79.0), Confidence::Medium);
        assert_eq!(confidence_for(60.0), Confidence::Medium);
        assert_eq!(confidence_for(59.0), Confidence::Low);
    }

    #[tokio::test]
    async fn test_baseline_orders_opportunities() {
        let catalog = ShowcaseCatalog::new(Vec::new());
        let verdict = generate_final_verdict(
            &report(65.0),
            &diseases(&["NAFLD", "Obesity", "Hypertension", "Gout"]),
            Some("molecule-x"),
            &catalog,
            None,
        )
        .await;
        assert_eq!(verdict.decision, Decision::Go);
        assert_eq!(verdict.primary_opportunity, "NAFLD");
        assert_eq!(
            verdict.secondary_opportunities,
            vec!["Obesity".to_string(), "Hypertension".to_string()]
        );
        assert_eq!(verdict.secondary_opportunity.as_deref(), Some("Obesity"));
        assert!(verdict.why_it_works.is_empty());
    }

    #[tokio::test]
    async fn test_no_diseases_yields_placeholder_and_omits_legacy_field() {
        let catalog = ShowcaseCatalog::new(Vec::new());
        let verdict =
            generate_final_verdict(&report(40.0), &[], Some("molecule-x"), &catalog, None).await;
        assert_eq!(verdict.decision, Decision::NoGo);
        assert_eq!(
            verdict.primary_opportunity,
            "Further indication discovery required"
        );
        assert!(verdict.secondary_opportunity.is_none());
    }

    #[tokio::test]
    async fn test_advisor_overlay_overwrites_baseline_fields() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying(
            r#"{"decision": "GO", "confidence": "High",
                "summary": "Strong candidate",
                "why_it_works": ["Known mechanism"],
                "risk_summary": ["Generic competition"],
                "recommended_next_steps": ["Phase II trial"]}"#,
        ));
        let catalog = ShowcaseCatalog::new(Vec::new());
        let verdict = generate_final_verdict(
            &report(55.0),
            &diseases(&["NAFLD"]),
            Some("molecule-x"),
            &catalog,
            Some(&advisor),
        )
        .await;
        assert_eq!(verdict.decision, Decision::Go);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(verdict.executive_summary, "Strong candidate");
        assert_eq!(verdict.primary_opportunity, "NAFLD");
        assert_eq!(verdict.why_it_works, vec!["Known mechanism".to_string()]);
    }

    #[tokio::test]
    async fn test_broken_advisor_reply_keeps_baseline() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying("no json here"));
        let catalog = ShowcaseCatalog::new(Vec::new());
        let verdict = generate_final_verdict(
            &report(55.0),
            &diseases(&["NAFLD"]),
            Some("molecule-x"),
            &catalog,
            Some(&advisor),
        )
        .await;
        assert_eq!(verdict.decision, Decision::Consider);
        assert!(verdict.executive_summary.contains("55"));
    }

    #[tokio::test]
    async fn test_curated_narrative_beats_advisor() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying(
            r#"{"decision": "NO-GO", "confidence": "Low"}"#,
        ));
        let catalog = ShowcaseCatalog::builtin();
        let verdict = generate_final_verdict(
            &report(55.0),
            &diseases(&["Cardiovascular Disease"]),
            Some("aspirin"),
            &catalog,
            Some(&advisor),
        )
        .await;
        assert_eq!(verdict.decision, Decision::Go);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(
            verdict.primary_opportunity,
            "Cardiovascular Disease".to_string()
        );
        assert!(!verdict.recommended_next_steps.is_empty());
        assert_eq!(
            verdict.secondary_opportunity.as_deref(),
            Some("Preeclampsia prevention")
        );
    }
}
