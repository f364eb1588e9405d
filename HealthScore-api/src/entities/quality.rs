use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use health_score_domain::entities::{BiomarkerQuality, QualityReport, RecordQuality};

use super::health_score::BiomarkerPanel;

/// Request payload for a data quality assessment
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DataQualityRequest {
    /// Panels to assess; missing values are allowed here
    #[validate(length(min = 1, message = "At least one record is required"))]
    pub records: Vec<BiomarkerPanel>,
}

/// Quality of one submitted record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordQualityResponse {
    pub index: usize,
    pub missing_values: usize,
    pub implausible_values: usize,
    pub outlier_values: usize,
    /// 0 to 100
    pub quality_score: u32,
    /// Quality score of at least 80
    pub analytics_eligible: bool,
    /// Condition label, trimmed and title-cased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Column statistics for one biomarker
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BiomarkerQualityResponse {
    pub biomarker: String,
    pub missing_percentage: f64,
    pub implausible_count: usize,
    pub outlier_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_fence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_fence: Option<f64>,
}

/// Data quality report for a batch
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataQualityResponse {
    pub total_records: usize,
    pub eligible_records: usize,
    /// Share of records without a condition label, in percent
    pub condition_missing_percentage: f64,
    pub records: Vec<RecordQualityResponse>,
    pub biomarkers: Vec<BiomarkerQualityResponse>,
}

impl From<&RecordQuality> for RecordQualityResponse {
    fn from(record: &RecordQuality) -> Self {
        RecordQualityResponse {
            index: record.index,
            missing_values: record.missing,
            implausible_values: record.implausible,
            outlier_values: record.outliers,
            quality_score: record.quality_score,
            analytics_eligible: record.analytics_eligible,
            condition: record.condition.clone(),
        }
    }
}

impl From<&BiomarkerQuality> for BiomarkerQualityResponse {
    fn from(column: &BiomarkerQuality) -> Self {
        BiomarkerQualityResponse {
            biomarker: column.biomarker.key().to_string(),
            missing_percentage: column.missing_percentage,
            implausible_count: column.implausible_count,
            outlier_count: column.outlier_count,
            lower_fence: column.lower_fence,
            upper_fence: column.upper_fence,
        }
    }
}

impl From<QualityReport> for DataQualityResponse {
    fn from(report: QualityReport) -> Self {
        DataQualityResponse {
            total_records: report.total_records,
            eligible_records: report.eligible_records,
            condition_missing_percentage: report.condition_missing_percentage,
            records: report.records.iter().map(RecordQualityResponse::from).collect(),
            biomarkers: report.biomarkers.iter().map(BiomarkerQualityResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_conversion_keeps_condition_labels() {
        let report = QualityReport {
            total_records: 2,
            eligible_records: 2,
            records: vec![
                RecordQuality::new(0, 0, 0, 0).with_condition(Some("Diabetes".to_string())),
                RecordQuality::new(1, 0, 0, 0),
            ],
            condition_missing_percentage: 50.0,
            biomarkers: Vec::new(),
        };

        let response = DataQualityResponse::from(report);
        assert_eq!(response.condition_missing_percentage, 50.0);
        assert_eq!(response.records[0].condition.as_deref(), Some("Diabetes"));

        let json = serde_json::to_value(&response.records[1]).unwrap();
        assert!(json.get("condition").is_none());
    }
}
