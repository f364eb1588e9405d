use std::str::FromStr;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, instrument};

use health_score_domain::models::Sex;

use crate::api::handlers::error::ErrorResponse;
use crate::api::routes::AppState;
use crate::entities::reference::{
    to_public_ranges, ReferenceRangeQuery, ReferenceRangesResponse, ScoringProfileResponse,
};

/// List the reference ranges used for scoring
#[utoipa::path(
    get,
    path = "/api/v1/reference-ranges",
    params(
        ReferenceRangeQuery
    ),
    responses(
        (status = 200, description = "Reference ranges", body = ReferenceRangesResponse),
        (status = 400, description = "Unrecognized sex", body = ErrorResponse),
    ),
    tag = "reference"
)]
#[instrument(skip(state))]
pub async fn get_reference_ranges(
    State(state): State<AppState>,
    Query(params): Query<ReferenceRangeQuery>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let sex = match params.sex.as_deref() {
        Some(value) => Some(Sex::from_str(value).map_err(|_| {
            ErrorResponse::bad_request(&format!("'{}' is not a recognized sex (expected male or female)", value))
        })?),
        None => None,
    };
    debug!("Listing reference ranges for {:?}", sex);

    Ok((StatusCode::OK, Json(to_public_ranges(state.service.reference_table(), sex))))
}

/// Show the active scoring profile
#[utoipa::path(
    get,
    path = "/api/v1/scoring-profile",
    responses(
        (status = 200, description = "Active scoring profile", body = ScoringProfileResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "reference"
)]
#[instrument(skip(state))]
pub async fn get_scoring_profile(State(state): State<AppState>) -> Result<impl IntoResponse, ErrorResponse> {
    let profile = state.service.active_profile()?;
    Ok((StatusCode::OK, Json(ScoringProfileResponse::from(profile.as_ref()))))
}
