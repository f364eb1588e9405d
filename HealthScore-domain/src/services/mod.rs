pub mod deviation;
pub mod health_score;
pub mod preprocessing;
pub mod quality;
mod stats;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use health_score::{
    create_default_health_score_service, BatchRecordOutcome, BatchScoreOutcome, HealthScoreCalculator, HealthScoreService,
    HealthScoreServiceError, HealthScoreServiceTrait,
};
pub use preprocessing::{PreprocessingOptions, PreprocessingSummary, WinsorizeLimits};
