pub mod handlers;
pub mod routes;

use axum::Router;

use health_score_domain::repository::{ProfileRepository, RepositoryError};

use crate::config::AppConfig;

/// Create the application router
///
/// When `scoring_profile_path` is set, that profile is loaded and made
/// active; otherwise the built-in profile is used.
pub fn create_application(config: AppConfig) -> Result<Router, RepositoryError> {
    let repository = match &config.scoring_profile_path {
        Some(path) => ProfileRepository::with_profile_file(path)?,
        None => ProfileRepository::new(),
    };
    Ok(routes::create_app(config, repository))
}
