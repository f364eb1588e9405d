use serde::{Deserialize, Serialize};

use health_score_data::models::Biomarker;

/// Points deducted per missing biomarker
pub const MISSING_PENALTY: u32 = 5;

/// Points deducted per physiologically implausible value
pub const IMPLAUSIBLE_PENALTY: u32 = 10;

/// Points deducted per IQR outlier
pub const OUTLIER_PENALTY: u32 = 3;

/// Minimum quality score for a record to feed analytics
pub const ANALYTICS_MIN_QUALITY: u32 = 80;

/// Data quality of one record within a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordQuality {
    /// Position of the record in the submitted batch
    pub index: usize,

    pub missing: usize,

    /// Values outside the plausibility limits
    pub implausible: usize,

    /// Values outside the batch IQR fences
    pub outliers: usize,

    /// 100 minus penalties, floored at 0
    pub quality_score: u32,

    pub analytics_eligible: bool,

    /// Normalised condition label; not part of the score
    pub condition: Option<String>,
}

impl RecordQuality {
    pub fn new(index: usize, missing: usize, implausible: usize, outliers: usize) -> Self {
        let penalty = missing as u64 * MISSING_PENALTY as u64
            + implausible as u64 * IMPLAUSIBLE_PENALTY as u64
            + outliers as u64 * OUTLIER_PENALTY as u64;
        let quality_score = 100u64.saturating_sub(penalty) as u32;

        Self {
            index,
            missing,
            implausible,
            outliers,
            quality_score,
            analytics_eligible: quality_score >= ANALYTICS_MIN_QUALITY,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Option<String>) -> Self {
        self.condition = condition;
        self
    }
}

/// Column-level statistics for one biomarker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomarkerQuality {
    pub biomarker: Biomarker,

    /// Share of records without a value, in percent with two decimals
    pub missing_percentage: f64,

    /// Records outside the plausibility limits
    pub implausible_count: usize,

    /// Records outside the IQR fences
    pub outlier_count: usize,

    /// Lower IQR fence (Q1 - 1.5 IQR); absent when no values are present
    pub lower_fence: Option<f64>,

    /// Upper IQR fence (Q3 + 1.5 IQR); absent when no values are present
    pub upper_fence: Option<f64>,
}

/// Data quality assessment of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityReport {
    pub total_records: usize,

    /// Records meeting the analytics threshold
    pub eligible_records: usize,

    pub records: Vec<RecordQuality>,

    /// Share of records without a condition label, in percent with two decimals
    pub condition_missing_percentage: f64,

    /// One entry per biomarker in panel order
    pub biomarkers: Vec<BiomarkerQuality>,
}
