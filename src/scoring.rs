//! Deterministic scoring engine
//!
//! Pure arithmetic over the four agent payloads. No I/O and no failure
//! path: an empty collection scores zero rather than erroring, so the
//! engine composes with whatever the fallback chains produced upstream.
//!
//! The five positive dimensions are weighted to sum to 1.0; the negative
//! penalty is subtracted after weighting, in the same percentage-point
//! units as the final score.

use serde::Serialize;

use crate::agents::{ClinicalPayload, MarketPayload, PatentPayload, ResearchPayload};

const WEIGHT_SCIENCE: f64 = 0.25;
const WEIGHT_CLINICAL: f64 = 0.30;
const WEIGHT_MARKET: f64 = 0.25;
const WEIGHT_PATENT: f64 = 0.10;
const WEIGHT_REGULATORY: f64 = 0.10;

const POINTS_PER_PAPER: f64 = 5.0;
const POINTS_PER_TRIAL: f64 = 12.0;
const PENALTY_PER_NEGATIVE: f64 = 5.0;

const PATENT_ACTIVE_SCORE: f64 = 75.0;
const PATENT_INACTIVE_SCORE: f64 = 55.0;

// Regulatory evaluation is stubbed at a fixed midline value.
const REGULATORY_SCORE: f64 = 75.0;

/// Per-dimension scores, each in [0, 100]. `negative_penalty` is carried
/// as a non-positive deduction.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreBreakdown {
    pub science: f64,
    pub clinical: f64,
    pub patent: f64,
    pub regulatory: f64,
    pub market: f64,
    pub negative_penalty: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub score_breakdown: ScoreBreakdown,
    pub final_repurposeability_score: f64,
    pub explanation: String,
}

impl ScoreReport {
    pub fn final_score(&self) -> f64 {
        self.final_repurposeability_score
    }
}

/// Combine the four agent payloads into a weighted composite score.
pub fn compute_score(
    research: &ResearchPayload,
    clinical: &ClinicalPayload,
    patent: &PatentPayload,
    market: &MarketPayload,
) -> ScoreReport {
    let science = (POINTS_PER_PAPER * research.positive_evidence.len() as f64).min(100.0);
    let clinical_score = (POINTS_PER_TRIAL * clinical.successful_trials.len() as f64).min(100.0);
    let market_score = (market.metrics.commercial_feasibility * 100.0)
        .round()
        .clamp(0.0, 100.0);
    let patent_score = if patent.active_patents.is_empty() {
        PATENT_INACTIVE_SCORE
    } else {
        PATENT_ACTIVE_SCORE
    };
    let penalty = -(PENALTY_PER_NEGATIVE * research.negative_evidence.len() as f64);

    let weighted = WEIGHT_SCIENCE * science
        + WEIGHT_CLINICAL * clinical_score
        + WEIGHT_MARKET * market_score
        + WEIGHT_PATENT * patent_score
        + WEIGHT_REGULATORY * REGULATORY_SCORE;
    let final_score = (weighted + penalty).round().clamp(0.0, 100.0);

    let explanation = format!(
        "Weighted composite of science {science:.0}, clinical {clinical_score:.0}, market \
         {market_score:.0}, patent {patent_score:.0}, regulatory {REGULATORY_SCORE:.0}, \
         less {:.0} penalty points for negative evidence.",
        -penalty
    );

    ScoreReport {
        score_breakdown: ScoreBreakdown {
            science,
            clinical: clinical_score,
            patent: patent_score,
            regulatory: REGULATORY_SCORE,
            market: market_score,
            negative_penalty: penalty,
        },
        final_repurposeability_score: final_score,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{ClinicalMetrics, MarketMetrics, PatentMetrics, ResearchMetrics};
    use crate::models::{EvidenceRecord, PatentCount, TrialRecord};

    fn evidence(title: &str) -> EvidenceRecord {
        EvidenceRecord {
            disease: "Obesity".to_string(),
            title: title.to_string(),
            journal: "Journal".to_string(),
            year: Some(2020),
            url: None,
            evidence_type: None,
            reason: None,
        }
    }

    fn trial(name: &str) -> TrialRecord {
        TrialRecord {
            nct_id: None,
            trial_name: name.to_string(),
            phase: "Phase II".to_string(),
            status: "Completed".to_string(),
            disease: "Obesity".to_string(),
            region: None,
            year: None,
            enrollment: None,
            sponsor: None,
            evidence_note: String::new(),
            url: None,
        }
    }

    fn research(positive: usize, negative: usize) -> ResearchPayload {
        ResearchPayload {
            summary: String::new(),
            positive_evidence: (0..positive).map(|i| evidence(&format!("p{i}"))).collect(),
            negative_evidence: (0..negative).map(|i| evidence(&format!("n{i}"))).collect(),
            retracted_or_low_quality: Vec::new(),
            metrics: ResearchMetrics {
                total_papers: positive + negative,
                positive_ratio: 1.0,
            },
            success_story: None,
            sources: Vec::new(),
            note: None,
        }
    }

    fn clinical(successful: usize) -> ClinicalPayload {
        ClinicalPayload {
            summary: String::new(),
            successful_trials: (0..successful).map(|i| trial(&format!("t{i}"))).collect(),
            failed_trials: Vec::new(),
            inconclusive_trials: Vec::new(),
            metrics: ClinicalMetrics {
                total_trials: successful,
                success_rate: 1.0,
            },
            registry_entries: Vec::new(),
            note: None,
            success_story: None,
            sources: Vec::new(),
        }
    }

    fn patent(active: usize) -> PatentPayload {
        PatentPayload {
            summary: String::new(),
            active_patents: (0..active).map(|i| format!("patent {i}")).collect(),
            expired_patents: Vec::new(),
            ip_conflicts: Vec::new(),
            metrics: PatentMetrics {
                patent_count: PatentCount::Exact(active as u32),
                ip_risk_level: "Low".to_string(),
            },
            detailed_entries: Vec::new(),
            spotlight_patents: Vec::new(),
            note: None,
            success_story: None,
            sources: Vec::new(),
        }
    }

    fn market(feasibility: f64) -> MarketPayload {
        MarketPayload {
            summary: String::new(),
            markets: Vec::new(),
            negative_signals: Vec::new(),
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
        }
    }

    #[test]
    fn test_known_inputs_produce_expected_breakdown() {
        // science 5*4=20, clinical 12*3=36, market 80, patent 75, reg 75.
        let report = compute_score(&research(4, 0), &clinical(3), &patent(2), &market(0.8));
        assert_eq!(report.score_breakdown.science, 20.0);
        assert_eq!(report.score_breakdown.clinical, 36.0);
        assert_eq!(report.score_breakdown.market, 80.0);
        assert_eq!(report.score_breakdown.patent, 75.0);
        assert_eq!(report.score_breakdown.regulatory, 75.0);
        assert_eq!(report.score_breakdown.negative_penalty, 0.0);
        // 0.25*20 + 0.30*36 + 0.25*80 + 0.10*75 + 0.10*75 = 50.8 -> 51
        assert_eq!(report.final_repurposeability_score, 51.0);
    }

    #[test]
    fn test_dimension_caps_hold() {
        let report = compute_score(&research(40, 0), &clinical(20), &patent(0), &market(1.0));
        assert_eq!(report.score_breakdown.science, 100.0);
        assert_eq!(report.score_breakdown.clinical, 100.0);
        assert_eq!(report.score_breakdown.patent, 55.0);
        assert_eq!(report.final_repurposeability_score, 93.0);
    }

    #[test]
    fn test_penalty_is_subtracted_after_weighting() {
        let base = compute_score(&research(4, 0), &clinical(3), &patent(2), &market(0.8));
        let penalized = compute_score(&research(4, 2), &clinical(3), &patent(2), &market(0.8));
        assert_eq!(penalized.score_breakdown.negative_penalty, -10.0);
        assert_eq!(
            penalized.final_repurposeability_score,
            base.final_repurposeability_score - 10.0
        );
    }

    #[test]
    fn test_final_score_clamps_at_zero() {
        let report = compute_score(&research(0, 30), &clinical(0), &patent(0), &market(0.0));
        assert_eq!(report.final_repurposeability_score, 0.0);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let a = compute_score(&research(2, 1), &clinical(1), &patent(1), &market(0.4));
        let b = compute_score(&research(2, 1), &clinical(1), &patent(1), &market(0.4));
        assert_eq!(a.score_breakdown, b.score_breakdown);
        assert_eq!(
            a.final_repurposeability_score,
            b.final_repurposeability_score
        );
    }
}
