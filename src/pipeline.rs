//! Pipeline orchestrator
//!
//! Six sequential stages, no branching and no retries:
//! research, clinical, patents, market, scoring, final verdict. Each stage
//! appends its output to the accumulating outcome and never touches what
//! earlier stages produced. Market's disease input comes from Research's
//! first discovered disease, so even a molecule-only request gets a
//! disease-anchored commercial read.

use tracing::info;

use crate::agents::{ClinicalAgent, MarketAgent, PatentAgent, ResearchAgent, ResearchPayload};
use crate::models::{AgentOutputs, AppState, RepurposeRequest};
use crate::scoring::{compute_score, ScoreReport};
use crate::types::{AppError, AppResult};
use crate::verdict::{generate_final_verdict, Verdict};

pub const MSG_MISSING_INPUT: &str =
    "Provide a molecule (and optionally a disease) to analyze.";
pub const MSG_DISEASE_ONLY: &str = "Disease-only workflows are not supported yet.";
pub const MSG_TREND_MODE: &str = "Trend and intelligence mode is not available yet.";

/// Request shape as seen by the pre-flight classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseType {
    MoleculeOnly,
    DiseaseOnly,
    MoleculeAndDisease,
    Trends,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::MoleculeOnly => "CASE_1_MOLECULE_ONLY",
            CaseType::DiseaseOnly => "CASE_2_DISEASE_ONLY",
            CaseType::MoleculeAndDisease => "CASE_3_BOTH",
            CaseType::Trends => "CASE_4_TRENDS",
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Classify the raw request. Requests carrying neither a molecule nor a
/// disease are rejected before classification.
pub fn classify(request: &RepurposeRequest) -> AppResult<CaseType> {
    let molecule = non_empty(request.molecule.as_deref());
    let disease = non_empty(request.disease.as_deref());

    if molecule.is_none() && disease.is_none() {
        return Err(AppError::InvalidRequest(MSG_MISSING_INPUT.to_string()));
    }
    if request.trend_mode {
        return Ok(CaseType::Trends);
    }
    Ok(match (molecule, disease) {
        (Some(_), None) => CaseType::MoleculeOnly,
        (None, Some(_)) => CaseType::DiseaseOnly,
        (Some(_), Some(_)) => CaseType::MoleculeAndDisease,
        (None, None) => unreachable!("rejected above"),
    })
}

/// Ordered unique disease names from the research stage's positive
/// evidence. Order of first appearance is preserved.
pub fn extract_diseases(research: &ResearchPayload) -> Vec<String> {
    let mut seen = Vec::new();
    for record in &research.positive_evidence {
        if !seen.contains(&record.disease) {
            seen.push(record.disease.clone());
        }
    }
    seen
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub case_type: CaseType,
    pub agents: AgentOutputs,
    pub scoring: ScoreReport,
    pub verdict: Verdict,
}

/// Run the full evaluation pipeline for a supported request.
pub async fn run_pipeline(
    state: &AppState,
    request: &RepurposeRequest,
) -> AppResult<PipelineOutcome> {
    let case_type = classify(request)?;
    match case_type {
        CaseType::DiseaseOnly => {
            return Err(AppError::UnsupportedCase(MSG_DISEASE_ONLY.to_string()));
        }
        CaseType::Trends => {
            return Err(AppError::UnsupportedCase(MSG_TREND_MODE.to_string()));
        }
        CaseType::MoleculeOnly | CaseType::MoleculeAndDisease => {}
    }

    let molecule = non_empty(request.molecule.as_deref());
    let disease = non_empty(request.disease.as_deref());
    info!(
        case_type = case_type.as_str(),
        molecule, disease, "Starting evaluation pipeline"
    );

    let research = ResearchAgent::from_state(state).run(molecule, disease).await;
    info!(
        papers = research.metrics.total_papers,
        "Research stage complete"
    );

    let clinical = ClinicalAgent::from_state(state).run(molecule, disease).await;
    info!(
        trials = clinical.metrics.total_trials,
        "Clinical stage complete"
    );

    let patents = PatentAgent::from_state(state).run(molecule, disease).await;
    info!(
        active = patents.active_patents.len(),
        "Patent stage complete"
    );

    let diseases = extract_diseases(&research);
    let market_disease = diseases
        .first()
        .map(String::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let market = MarketAgent::from_state(state)
        .run(molecule, Some(&market_disease))
        .await;
    info!(
        feasibility = market.metrics.commercial_feasibility,
        "Market stage complete"
    );

    let scoring = compute_score(&research, &clinical, &patents, &market);
    info!(
        score = scoring.final_repurposeability_score,
        "Scoring stage complete"
    );

    let verdict = generate_final_verdict(
        &scoring,
        &diseases,
        molecule,
        &state.showcase,
        state.advisor.as_ref(),
    )
    .await;
    info!(decision = ?verdict.decision, "Verdict stage complete");

    Ok(PipelineOutcome {
        case_type,
        agents: AgentOutputs {
            research,
            clinical_trials: clinical,
            patents,
            market,
        },
        scoring,
        verdict,
    })
}
