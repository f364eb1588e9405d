use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Scoring endpoints
        crate::api::handlers::health_score::score_panel,
        crate::api::handlers::health_score::score_batch,

        // Data quality endpoints
        crate::api::handlers::quality::assess_data_quality,

        // Reference endpoints
        crate::api::handlers::reference::get_reference_ranges,
        crate::api::handlers::reference::get_scoring_profile
    ),
    components(
        schemas(
            // Scoring entities
            crate::entities::health_score::BiomarkerPanel,
            crate::entities::health_score::BiomarkerFinding,
            crate::entities::health_score::HealthScoreResponse,
            crate::entities::health_score::WinsorizeRequest,
            crate::entities::health_score::BatchHealthScoreRequest,
            crate::entities::health_score::BatchHealthScoreResponse,
            crate::entities::health_score::BatchItem,
            crate::entities::health_score::RecordError,

            // Data quality entities
            crate::entities::quality::DataQualityRequest,
            crate::entities::quality::DataQualityResponse,
            crate::entities::quality::RecordQualityResponse,
            crate::entities::quality::BiomarkerQualityResponse,

            // Reference entities
            crate::entities::reference::ReferenceRangeQuery,
            crate::entities::reference::ReferenceRangeEntry,
            crate::entities::reference::ReferenceRangesResponse,
            crate::entities::reference::ScoringProfileResponse,
            crate::entities::reference::ConditionWeightsResponse,
            crate::entities::reference::BiomarkerWeightResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,

            // Errors
            crate::api::handlers::error::ErrorResponse
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "health_score", description = "Composite Health Score endpoints"),
        (name = "data_quality", description = "Data quality assessment endpoints"),
        (name = "reference", description = "Reference ranges and scoring profile")
    ),
    info(
        title = "Health Score API",
        version = "0.1.0",
        description = "Composite 0-100 Health Score, risk tier and condition sub-scores from a biomarker panel",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Health Score API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags should be defined");
        assert!(tags.iter().any(|tag| tag.name == "health_score"));
        assert!(tags.iter().any(|tag| tag.name == "data_quality"));

        for path in [
            "/health",
            "/api/v1/health-score",
            "/api/v1/health-score/batch",
            "/api/v1/data-quality",
            "/api/v1/reference-ranges",
            "/api/v1/scoring-profile",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_schemas_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components should be defined");
        for schema in ["BiomarkerPanel", "HealthScoreResponse", "DataQualityResponse", "ErrorResponse"] {
            assert!(components.schemas.contains_key(schema), "missing schema {}", schema);
        }
    }
}
