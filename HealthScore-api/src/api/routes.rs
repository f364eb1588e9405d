use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use health_score_domain::repository::ProfileRepository;
use health_score_domain::services::HealthScoreService;

use crate::api::handlers::{health, health_score::HealthScoreServiceHandle, quality, reference};
use crate::api::handlers::health_score::{score_batch, score_panel};
use crate::config::AppConfig;
use crate::openapi::configure_swagger_routes;

/// Shared state handed to every API handler
#[derive(Clone)]
pub struct AppState {
    /// Scoring service
    pub service: HealthScoreServiceHandle,
    /// Largest batch accepted by batch endpoints
    pub max_batch_size: usize,
}

/// Create the application router around an existing profile repository
pub fn create_app(config: AppConfig, repository: ProfileRepository) -> Router {
    debug!("Creating application router");

    let config = Arc::new(config);

    // Both services share one repository
    let health_service = health::create_health_service(repository.clone());
    let state = AppState {
        service: Arc::new(HealthScoreService::new(repository)),
        max_batch_size: config.max_batch_size,
    };

    let api_routes = Router::new()
        .route("/health-score", post(score_panel))
        .route("/health-score/batch", post(score_batch))
        .route("/data-quality", post(quality::assess_data_quality))
        .route("/reference-ranges", get(reference::get_reference_ranges))
        .route("/scoring-profile", get(reference::get_scoring_profile));

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service))
        .layer(Extension(config));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .with_state(state);

    debug!("API routes nested");

    let app = add_swagger_ui(app)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
