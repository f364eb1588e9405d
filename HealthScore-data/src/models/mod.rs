// Data storage models
pub mod biomarker;
pub mod reference_range;
pub mod scoring_profile;

pub use biomarker::{Biomarker, Sex};
pub use reference_range::{RangeStatus, ReferenceRange};
pub use scoring_profile::{
    BiomarkerWeight, Condition, ConditionWeights, ScoringProfile, TierThresholds,
    DEFAULT_PROFILE_VERSION,
};
