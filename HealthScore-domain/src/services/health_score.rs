use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use health_score_data::models::{Biomarker, ScoringProfile};
use health_score_data::reference::{ReferenceTable, CLINICAL_REFERENCE_TABLE, PLAUSIBILITY_LIMITS};
use health_score_data::repository::{ProfileRepository, ProfileRepositoryTrait, RepositoryError};

use crate::entities::{
    BiomarkerAssessment, BiomarkerInput, BiomarkerRecord, HealthScoreResult, InvalidInputError,
    QualityReport,
};
use super::deviation::{categorize_score, condition_sub_score, normalized_deviation};
use super::preprocessing::{preprocess, PreprocessingOptions, PreprocessingSummary};
use super::quality::assess_quality;
use super::stats::round2;

/// Health score service errors
#[derive(Debug, Error)]
pub enum HealthScoreServiceError {
    /// The record failed validation
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// Batch preprocessing options were rejected
    #[error("Invalid preprocessing options: {0}")]
    Preprocessing(String),

    /// The scoring profile could not be obtained
    #[error("Scoring profile error: {0}")]
    Profile(#[from] RepositoryError),
}

/// Scores records against one scoring profile
///
/// Holds no mutable state, so one calculator can be shared across threads.
#[derive(Debug, Clone)]
pub struct HealthScoreCalculator {
    profile: Arc<ScoringProfile>,
    table: &'static ReferenceTable,
}

impl HealthScoreCalculator {
    /// Calculator using the clinical reference table
    pub fn new(profile: Arc<ScoringProfile>) -> Self {
        Self::with_reference_table(profile, &CLINICAL_REFERENCE_TABLE)
    }

    pub fn with_reference_table(profile: Arc<ScoringProfile>, table: &'static ReferenceTable) -> Self {
        Self { profile, table }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    /// Compute the Health Score of one record
    pub fn score(&self, record: &BiomarkerRecord) -> Result<HealthScoreResult, InvalidInputError> {
        record.validate()?;

        let clip_bound = self.profile.clip_bound;
        let biomarkers: Vec<BiomarkerAssessment> = Biomarker::ALL
            .iter()
            .map(|&biomarker| {
                let value = record.value(biomarker);
                let range = self.table.range_for(biomarker, record.sex);
                BiomarkerAssessment {
                    biomarker,
                    value,
                    range,
                    status: range.status(value),
                    deviation: normalized_deviation(value, range, clip_bound),
                }
            })
            .collect();

        let deviation_of = |biomarker: Biomarker| biomarkers[biomarker as usize].deviation;

        let mut sub_scores = BTreeMap::new();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for condition in &self.profile.conditions {
            let sub_score = condition_sub_score(condition, deviation_of);
            sub_scores.insert(condition.condition, round2(sub_score));
            weighted_sum += condition.weight * sub_score;
            weight_total += condition.weight;
        }

        let overall_score = if weight_total > 0.0 {
            round2((weighted_sum / weight_total).clamp(0.0, 100.0))
        } else {
            100.0
        };
        let risk_tier = categorize_score(overall_score, &self.profile.tiers);

        debug!(
            overall_score,
            risk_tier = %risk_tier,
            profile = %self.profile.version,
            "Scored biomarker record"
        );

        Ok(HealthScoreResult {
            overall_score,
            risk_tier,
            sub_scores,
            biomarkers,
            profile_version: self.profile.version.clone(),
        })
    }

    /// Score many records in parallel; results keep the input order
    pub fn score_batch(&self, records: &[BiomarkerRecord]) -> Vec<Result<HealthScoreResult, InvalidInputError>> {
        records.par_iter().map(|record| self.score(record)).collect()
    }
}

/// Outcome of scoring a batch
#[derive(Debug, Clone)]
pub struct BatchScoreOutcome {
    pub profile_version: String,

    /// What preprocessing changed before scoring
    pub preprocessing: PreprocessingSummary,

    /// One entry per submitted record, in order
    pub results: Vec<BatchRecordOutcome>,
}

/// Score or rejection of one record in a batch
#[derive(Debug, Clone)]
pub struct BatchRecordOutcome {
    /// Normalised condition label of the submitted record
    pub condition: Option<String>,
    pub result: Result<HealthScoreResult, InvalidInputError>,
}

impl BatchScoreOutcome {
    pub fn scored_count(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.scored_count()
    }
}

/// Trait for health score service operations
pub trait HealthScoreServiceTrait: Send + Sync {
    /// Validate and score one record
    fn score(&self, input: &BiomarkerInput) -> Result<HealthScoreResult, HealthScoreServiceError>;

    /// Preprocess and score a batch; a bad record fails only its own entry
    fn score_batch(
        &self,
        inputs: Vec<BiomarkerInput>,
        options: &PreprocessingOptions,
    ) -> Result<BatchScoreOutcome, HealthScoreServiceError>;

    /// Data quality report for a batch
    fn assess_quality(&self, inputs: &[BiomarkerInput]) -> QualityReport;

    /// The profile scoring currently uses
    fn active_profile(&self) -> Result<Arc<ScoringProfile>, HealthScoreServiceError>;

    /// The reference ranges scoring currently uses
    fn reference_table(&self) -> &'static ReferenceTable;
}

/// Health score service backed by a profile repository
pub struct HealthScoreService<R: ProfileRepositoryTrait> {
    repository: R,
}

impl<R: ProfileRepositoryTrait> HealthScoreService<R> {
    /// Create a new health score service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Calculator bound to the currently active profile
    fn calculator(&self) -> Result<HealthScoreCalculator, HealthScoreServiceError> {
        let profile = self.repository.active_profile()?;
        Ok(HealthScoreCalculator::new(profile))
    }
}

/// Rejections use the submitted values; preprocessing never repairs an invalid record
fn score_input(
    calculator: &HealthScoreCalculator,
    input: &BiomarkerInput,
) -> Result<HealthScoreResult, InvalidInputError> {
    input.check_present()?;
    let record = BiomarkerRecord::try_from(input)?;
    calculator.score(&record)
}

impl<R: ProfileRepositoryTrait> HealthScoreServiceTrait for HealthScoreService<R> {
    fn score(&self, input: &BiomarkerInput) -> Result<HealthScoreResult, HealthScoreServiceError> {
        let record = BiomarkerRecord::try_from(input)?;
        Ok(self.calculator()?.score(&record)?)
    }

    fn score_batch(
        &self,
        mut inputs: Vec<BiomarkerInput>,
        options: &PreprocessingOptions,
    ) -> Result<BatchScoreOutcome, HealthScoreServiceError> {
        let calculator = self.calculator()?;
        let preprocessing = preprocess(&mut inputs, options).map_err(HealthScoreServiceError::Preprocessing)?;

        let results: Vec<BatchRecordOutcome> = inputs
            .par_iter()
            .map(|input| BatchRecordOutcome {
                condition: input.condition_label(),
                result: score_input(&calculator, input),
            })
            .collect();

        let outcome = BatchScoreOutcome {
            profile_version: calculator.profile().version.clone(),
            preprocessing,
            results,
        };
        info!(
            "Scored batch of {} records ({} failed)",
            outcome.results.len(),
            outcome.failed_count()
        );
        Ok(outcome)
    }

    fn assess_quality(&self, inputs: &[BiomarkerInput]) -> QualityReport {
        assess_quality(inputs, &PLAUSIBILITY_LIMITS)
    }

    fn active_profile(&self) -> Result<Arc<ScoringProfile>, HealthScoreServiceError> {
        Ok(self.repository.active_profile()?)
    }

    fn reference_table(&self) -> &'static ReferenceTable {
        &CLINICAL_REFERENCE_TABLE
    }
}

/// Create a health score service using the built-in scoring profile
pub fn create_default_health_score_service() -> HealthScoreService<ProfileRepository> {
    HealthScoreService::new(ProfileRepository::new())
}
