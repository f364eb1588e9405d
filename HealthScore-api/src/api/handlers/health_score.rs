use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use health_score_domain::entities::BiomarkerInput;
use health_score_domain::services::{HealthScoreServiceTrait, PreprocessingOptions, WinsorizeLimits};

use crate::api::handlers::error::ErrorResponse;
use crate::api::routes::AppState;
use crate::entities::health_score::{
    to_public_score, BatchHealthScoreRequest, BatchHealthScoreResponse, BatchItem, BiomarkerPanel,
    HealthScoreResponse,
};

/// Service type for dependency injection
pub type HealthScoreServiceHandle = Arc<dyn HealthScoreServiceTrait>;

/// Compute the Health Score of one biomarker panel
#[utoipa::path(
    post,
    path = "/api/v1/health-score",
    request_body = BiomarkerPanel,
    responses(
        (status = 200, description = "Health Score computed", body = HealthScoreResponse),
        (status = 400, description = "Missing, negative or non-numeric biomarker, or unrecognized sex", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "health_score"
)]
#[instrument(skip(state, payload))]
pub async fn score_panel(
    State(state): State<AppState>,
    payload: Result<Json<BiomarkerPanel>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(panel) = payload?;
    let input = BiomarkerInput::from(panel);

    let result = state.service.score(&input)?;
    info!(
        overall_score = result.overall_score,
        risk_tier = %result.risk_tier,
        "Health Score computed"
    );

    Ok((StatusCode::OK, Json(to_public_score(&result))))
}

/// Score many biomarker panels, optionally cleaning the batch first
#[utoipa::path(
    post,
    path = "/api/v1/health-score/batch",
    request_body = BatchHealthScoreRequest,
    responses(
        (status = 200, description = "Batch processed; each record carries its own result or error", body = BatchHealthScoreResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Batch exceeds the configured maximum size", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "health_score"
)]
#[instrument(skip(state, payload))]
pub async fn score_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchHealthScoreRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload?;
    request.validate()?;
    check_batch_size(request.records.len(), state.max_batch_size)?;

    let total_records = request.records.len();
    info!("Scoring batch of {} records", total_records);

    let options = PreprocessingOptions {
        impute_missing: request.impute_missing,
        winsorize: request.winsorize.map(|w| WinsorizeLimits {
            lower: w.lower,
            upper: w.upper,
        }),
    };
    let inputs: Vec<BiomarkerInput> = request.records.into_iter().map(BiomarkerInput::from).collect();

    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.score_batch(inputs, &options))
        .await
        .map_err(|e| {
            error!("Batch scoring task failed: {}", e);
            ErrorResponse::internal_error()
        })??;

    let results = outcome
        .results
        .iter()
        .enumerate()
        .map(|(index, record)| BatchItem::new(index, record))
        .collect();

    let response = BatchHealthScoreResponse {
        batch_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        profile_version: outcome.profile_version.clone(),
        total_records,
        scored_records: outcome.scored_count(),
        failed_records: outcome.failed_count(),
        imputed_values: outcome.preprocessing.imputed_values,
        winsorized_values: outcome.preprocessing.winsorized_values,
        results,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Reject batches larger than the configured maximum
pub(crate) fn check_batch_size(len: usize, max: usize) -> Result<(), ErrorResponse> {
    if len > max {
        return Err(ErrorResponse::too_large(&format!(
            "Batch of {} records exceeds the maximum of {}",
            len, max
        )));
    }
    Ok(())
}
