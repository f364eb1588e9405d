use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use health_score_data::models::{Biomarker, Condition, RangeStatus, ReferenceRange};

/// Risk tier derived from the overall score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskTier {
    /// Score at or above the low-risk threshold
    Low,

    /// Score between the two thresholds
    Moderate,

    /// Score below the moderate-risk threshold
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => f.write_str("Low"),
            RiskTier::Moderate => f.write_str("Moderate"),
            RiskTier::High => f.write_str("High"),
        }
    }
}

/// How one biomarker compared with its reference range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BiomarkerAssessment {
    pub biomarker: Biomarker,

    /// Measured value
    pub value: f64,

    /// Range applied for the record's sex
    pub range: ReferenceRange,

    pub status: RangeStatus,

    /// Clipped, normalised distance outside the range in [0, 1]
    pub deviation: f64,
}

impl BiomarkerAssessment {
    pub fn is_abnormal(&self) -> bool {
        self.status != RangeStatus::Normal
    }
}

/// Composite Health Score for one record
///
/// Scores run from 0 to 100 and higher means healthier, for the overall
/// score and for every sub-score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthScoreResult {
    /// Overall score, two decimals
    pub overall_score: f64,

    pub risk_tier: RiskTier,

    /// Per-condition sub-scores, two decimals
    pub sub_scores: BTreeMap<Condition, f64>,

    /// One entry per biomarker in panel order
    pub biomarkers: Vec<BiomarkerAssessment>,

    /// Version of the scoring profile that produced this result
    pub profile_version: String,
}

impl HealthScoreResult {
    pub fn assessment(&self, biomarker: Biomarker) -> Option<&BiomarkerAssessment> {
        self.biomarkers.iter().find(|a| a.biomarker == biomarker)
    }

    /// Whether a biomarker fell outside its reference range
    pub fn is_flagged(&self, biomarker: Biomarker) -> bool {
        self.assessment(biomarker)
            .map(BiomarkerAssessment::is_abnormal)
            .unwrap_or(false)
    }

    /// Biomarkers outside their reference range
    pub fn flagged(&self) -> Vec<Biomarker> {
        self.biomarkers
            .iter()
            .filter(|a| a.is_abnormal())
            .map(|a| a.biomarker)
            .collect()
    }

    pub fn sub_score(&self, condition: Condition) -> Option<f64> {
        self.sub_scores.get(&condition).copied()
    }
}
