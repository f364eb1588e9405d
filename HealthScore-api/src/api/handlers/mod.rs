pub mod error;
pub mod health;
pub mod health_score;
pub mod quality;
pub mod reference;

// Re-export handlers for easier imports
pub use error::ErrorResponse;
pub use health::health_check;
pub use health_score::{score_batch, score_panel};
pub use quality::assess_data_quality;
pub use reference::{get_reference_ranges, get_scoring_profile};
