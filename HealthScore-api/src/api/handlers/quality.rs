use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, instrument};
use validator::Validate;

use health_score_domain::entities::BiomarkerInput;

use crate::api::handlers::error::ErrorResponse;
use crate::api::handlers::health_score::check_batch_size;
use crate::api::routes::AppState;
use crate::entities::quality::{DataQualityRequest, DataQualityResponse};

/// Assess the data quality of a batch of biomarker panels
#[utoipa::path(
    post,
    path = "/api/v1/data-quality",
    request_body = DataQualityRequest,
    responses(
        (status = 200, description = "Quality report generated", body = DataQualityResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 413, description = "Batch exceeds the configured maximum size", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "data_quality"
)]
#[instrument(skip(state, payload))]
pub async fn assess_data_quality(
    State(state): State<AppState>,
    payload: Result<Json<DataQualityRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload?;
    request.validate()?;
    check_batch_size(request.records.len(), state.max_batch_size)?;

    let inputs: Vec<BiomarkerInput> = request.records.into_iter().map(BiomarkerInput::from).collect();

    let service = state.service.clone();
    let report = tokio::task::spawn_blocking(move || service.assess_quality(&inputs))
        .await
        .map_err(|e| {
            error!("Data quality task failed: {}", e);
            ErrorResponse::internal_error()
        })?;

    info!(
        "Assessed data quality for {} records ({} eligible for analytics)",
        report.total_records, report.eligible_records
    );

    Ok((StatusCode::OK, Json(DataQualityResponse::from(report))))
}
