// Domain entities and value objects
pub mod biomarker_record;
pub mod health_score;
pub mod quality;

// Re-export common types for easier imports
pub use biomarker_record::{
    normalize_condition_label, BiomarkerInput, BiomarkerRecord, InvalidInputError, InvalidInputReason,
};
pub use health_score::{BiomarkerAssessment, HealthScoreResult, RiskTier};
pub use quality::{BiomarkerQuality, QualityReport, RecordQuality};
