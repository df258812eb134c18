use axum::extract::{Query, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    AppState, ExportInfo, QueryMetadata, RepurposeRequest, RepurposeResponse, RequestEcho,
};
use crate::pipeline::run_pipeline;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/repurpose", post(evaluate).get(evaluate_query))
        .with_state(state)
}

/// Query-string variant of the request. `drug` is an accepted alias for
/// `molecule`, kept for older clients.
#[derive(Debug, Deserialize)]
struct RepurposeParams {
    #[serde(default)]
    molecule: Option<String>,
    #[serde(default)]
    drug: Option<String>,
    #[serde(default)]
    disease: Option<String>,
    #[serde(default)]
    trend_mode: bool,
}

impl From<RepurposeParams> for RepurposeRequest {
    fn from(params: RepurposeParams) -> Self {
        RepurposeRequest {
            molecule: params.molecule.or(params.drug),
            disease: params.disease,
            trend_mode: params.trend_mode,
        }
    }
}

async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<RepurposeRequest>,
) -> AppResult<Json<RepurposeResponse>> {
    run_and_wrap(&state, request).await.map(Json)
}

async fn evaluate_query(
    State(state): State<AppState>,
    Query(params): Query<RepurposeParams>,
) -> AppResult<Json<RepurposeResponse>> {
    run_and_wrap(&state, params.into()).await.map(Json)
}

async fn run_and_wrap(
    state: &AppState,
    request: RepurposeRequest,
) -> AppResult<RepurposeResponse> {
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        molecule = request.molecule.as_deref(),
        disease = request.disease.as_deref(),
        trend_mode = request.trend_mode,
        "Repurposing request received"
    );

    let outcome = run_pipeline(state, &request).await?;
    info!(
        %request_id,
        case_type = outcome.case_type.as_str(),
        score = outcome.scoring.final_repurposeability_score,
        "Repurposing request complete"
    );

    Ok(RepurposeResponse {
        query_metadata: QueryMetadata {
            case_type: outcome.case_type.as_str().to_string(),
            input: RequestEcho {
                molecule: request
                    .molecule
                    .as_deref()
                    .unwrap_or_default()
                    .trim()
                    .to_string(),
                disease: request
                    .disease
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                trend_mode: request.trend_mode,
            },
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        agents: outcome.agents,
        scoring_engine: outcome.scoring,
        final_verdict: outcome.verdict,
        export: ExportInfo::default(),
    })
}
