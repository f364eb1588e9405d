use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use health_score_domain::entities::{
    BiomarkerAssessment, BiomarkerInput, HealthScoreResult, InvalidInputError,
};
use health_score_domain::services::BatchRecordOutcome;

/// One panel of biomarker results as submitted by a client
///
/// Every field is optional on the wire so that a missing value is reported
/// as a validation error naming the field rather than a JSON parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BiomarkerPanel {
    /// Fasting plasma glucose (mg/dL)
    #[schema(example = 88.0)]
    pub glucose: Option<f64>,

    /// Glycated haemoglobin (%)
    #[schema(example = 5.1)]
    pub hba1c: Option<f64>,

    /// Systolic blood pressure (mmHg)
    #[schema(example = 112.0)]
    pub systolic_bp: Option<f64>,

    /// Diastolic blood pressure (mmHg)
    #[schema(example = 72.0)]
    pub diastolic_bp: Option<f64>,

    /// LDL cholesterol (mg/dL)
    #[schema(example = 85.0)]
    pub ldl: Option<f64>,

    /// HDL cholesterol (mg/dL)
    #[schema(example = 58.0)]
    pub hdl: Option<f64>,

    /// Triglycerides (mg/dL)
    #[schema(example = 110.0)]
    pub triglycerides: Option<f64>,

    /// Haemoglobin (g/dL)
    #[schema(example = 13.8)]
    pub haemoglobin: Option<f64>,

    /// Mean corpuscular volume (fL)
    #[schema(example = 90.0)]
    pub mcv: Option<f64>,

    /// Biological sex: "male" or "female"
    #[schema(example = "female")]
    pub sex: Option<String>,

    /// Diagnosis label carried through to batch and quality results; never scored
    #[serde(default)]
    #[schema(example = "Diabetes")]
    pub condition: Option<String>,
}

/// Outcome for one biomarker
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BiomarkerFinding {
    /// Biomarker name
    pub biomarker: String,

    /// Submitted value
    pub value: f64,

    /// Measurement unit
    pub unit: String,

    /// Lower bound of the reference range applied
    pub reference_lower: f64,

    /// Upper bound of the reference range applied
    pub reference_upper: f64,

    /// "low", "normal" or "high"
    pub status: String,

    /// Normalised deviation from the range, 0 (in range) to 1 (at or past the clipping bound)
    pub deviation: f64,
}

/// Health Score for a single panel
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthScoreResponse {
    /// Identifier of this assessment
    pub assessment_id: Uuid,

    /// When the assessment was produced
    pub generated_at: DateTime<Utc>,

    /// Scoring profile version used
    pub profile_version: String,

    /// Composite score from 0 (worst) to 100 (healthiest)
    #[schema(example = 92.4)]
    pub overall_score: f64,

    /// "Low", "Moderate" or "High"
    #[schema(example = "Low")]
    pub risk_tier: String,

    /// Condition sub-scores on the same 0 to 100 scale
    pub sub_scores: BTreeMap<String, f64>,

    /// Per-biomarker findings in canonical order
    pub biomarkers: Vec<BiomarkerFinding>,

    /// Biomarkers outside their reference range
    pub flagged: Vec<String>,
}

/// Percentile caps applied to each biomarker before batch scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, ToSchema)]
pub struct WinsorizeRequest {
    /// Lower percentile as a fraction, e.g. 0.01
    #[validate(range(min = 0.0, max = 1.0, message = "Lower percentile must be between 0 and 1"))]
    #[schema(example = 0.01)]
    pub lower: f64,

    /// Upper percentile as a fraction, e.g. 0.99
    #[validate(range(min = 0.0, max = 1.0, message = "Upper percentile must be between 0 and 1"))]
    #[schema(example = 0.99)]
    pub upper: f64,
}

/// Request payload for scoring many panels
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BatchHealthScoreRequest {
    /// Panels to score
    #[validate(length(min = 1, message = "At least one record is required"))]
    pub records: Vec<BiomarkerPanel>,

    /// Fill missing values with the batch median before scoring
    #[serde(default)]
    pub impute_missing: bool,

    /// Cap values at batch percentiles before scoring
    #[serde(default)]
    #[validate]
    pub winsorize: Option<WinsorizeRequest>,
}

/// Why one record of a batch could not be scored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordError {
    /// Offending field
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

/// Result for one record of a batch
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchItem {
    /// Position of the record in the request
    pub index: usize,

    /// Condition label, trimmed and title-cased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Present when the record was scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<HealthScoreResponse>,

    /// Present when the record was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordError>,
}

/// Response for a batch scoring request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchHealthScoreResponse {
    /// Identifier of this batch
    pub batch_id: Uuid,

    /// When the batch was processed
    pub generated_at: DateTime<Utc>,

    /// Scoring profile version used
    pub profile_version: String,

    /// Records submitted
    pub total_records: usize,

    /// Records scored
    pub scored_records: usize,

    /// Records rejected
    pub failed_records: usize,

    /// Missing values filled by imputation
    pub imputed_values: usize,

    /// Values capped by Winsorization
    pub winsorized_values: usize,

    /// Per-record results in request order
    pub results: Vec<BatchItem>,
}

impl From<BiomarkerPanel> for BiomarkerInput {
    fn from(panel: BiomarkerPanel) -> Self {
        BiomarkerInput {
            glucose: panel.glucose,
            hba1c: panel.hba1c,
            systolic_bp: panel.systolic_bp,
            diastolic_bp: panel.diastolic_bp,
            ldl: panel.ldl,
            hdl: panel.hdl,
            triglycerides: panel.triglycerides,
            haemoglobin: panel.haemoglobin,
            mcv: panel.mcv,
            sex: panel.sex,
            condition: panel.condition,
        }
    }
}

impl From<&BiomarkerAssessment> for BiomarkerFinding {
    fn from(assessment: &BiomarkerAssessment) -> Self {
        BiomarkerFinding {
            biomarker: assessment.biomarker.key().to_string(),
            value: assessment.value,
            unit: assessment.biomarker.unit().to_string(),
            reference_lower: assessment.range.lower,
            reference_upper: assessment.range.upper,
            status: assessment.status.to_string(),
            deviation: assessment.deviation,
        }
    }
}

impl BatchItem {
    pub fn new(index: usize, outcome: &BatchRecordOutcome) -> Self {
        let (result, error) = match &outcome.result {
            Ok(score) => (Some(to_public_score(score)), None),
            Err(e) => (None, Some(RecordError::from(e))),
        };
        BatchItem {
            index,
            condition: outcome.condition.clone(),
            result,
            error,
        }
    }
}

impl From<&InvalidInputError> for RecordError {
    fn from(err: &InvalidInputError) -> Self {
        RecordError {
            field: err.field.clone(),
            message: err.to_string(),
        }
    }
}

/// Wrap a domain result in a response envelope
pub fn to_public_score(result: &HealthScoreResult) -> HealthScoreResponse {
    HealthScoreResponse {
        assessment_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        profile_version: result.profile_version.clone(),
        overall_score: result.overall_score,
        risk_tier: result.risk_tier.to_string(),
        sub_scores: result
            .sub_scores
            .iter()
            .map(|(condition, score)| (condition.to_string().to_lowercase(), *score))
            .collect(),
        biomarkers: result.biomarkers.iter().map(BiomarkerFinding::from).collect(),
        flagged: result.flagged().iter().map(|b| b.key().to_string()).collect(),
    }
}
