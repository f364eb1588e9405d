use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use health_score_domain::models::{Biomarker, ReferenceRange, ScoringProfile, Sex};
use health_score_domain::reference::{ReferenceTable, PLAUSIBILITY_LIMITS};

/// Query parameters for the reference range listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReferenceRangeQuery {
    /// Restrict to one sex ("male" or "female"); both are listed when absent
    pub sex: Option<String>,
}

/// Reference range of one biomarker for one sex
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferenceRangeEntry {
    pub biomarker: String,
    pub unit: String,
    /// "male", "female", or "any" when the range does not depend on sex
    pub sex: String,
    /// Inclusive lower bound
    pub lower: f64,
    /// Inclusive upper bound
    pub upper: f64,
    /// Lowest value accepted as physiologically plausible
    pub plausible_lower: f64,
    /// Highest value accepted as physiologically plausible
    pub plausible_upper: f64,
}

/// Reference range listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferenceRangesResponse {
    pub ranges: Vec<ReferenceRangeEntry>,
}

/// Weight of a biomarker within a condition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BiomarkerWeightResponse {
    pub biomarker: String,
    pub weight: f64,
}

/// Weights of one condition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConditionWeightsResponse {
    pub condition: String,
    /// Weight of this condition in the overall score
    pub weight: f64,
    pub biomarkers: Vec<BiomarkerWeightResponse>,
}

/// Active scoring profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoringProfileResponse {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Deviation, in range widths, at which a biomarker counts as maximally abnormal
    pub clip_bound: f64,
    /// Minimum overall score for the Low risk tier
    pub low_risk_min: f64,
    /// Minimum overall score for the Moderate risk tier
    pub moderate_risk_min: f64,
    pub conditions: Vec<ConditionWeightsResponse>,
}

fn entry(biomarker: Biomarker, sex: &str, range: ReferenceRange) -> ReferenceRangeEntry {
    let plausible = PLAUSIBILITY_LIMITS.range_for(biomarker);
    ReferenceRangeEntry {
        biomarker: biomarker.key().to_string(),
        unit: biomarker.unit().to_string(),
        sex: sex.to_string(),
        lower: range.lower,
        upper: range.upper,
        plausible_lower: plausible.lower,
        plausible_upper: plausible.upper,
    }
}

/// List the table, either for one sex or for both
pub fn to_public_ranges(table: &ReferenceTable, sex: Option<Sex>) -> ReferenceRangesResponse {
    let mut ranges = Vec::new();
    for (biomarker, ranges_by_sex) in table.iter() {
        match sex {
            Some(sex) => ranges.push(entry(biomarker, &sex.to_string(), ranges_by_sex.for_sex(sex))),
            None if biomarker.is_sex_dependent() => {
                ranges.push(entry(biomarker, &Sex::Male.to_string(), ranges_by_sex.male));
                ranges.push(entry(biomarker, &Sex::Female.to_string(), ranges_by_sex.female));
            }
            None => ranges.push(entry(biomarker, "any", ranges_by_sex.male)),
        }
    }
    ReferenceRangesResponse { ranges }
}

impl From<&ScoringProfile> for ScoringProfileResponse {
    fn from(profile: &ScoringProfile) -> Self {
        ScoringProfileResponse {
            version: profile.version.clone(),
            description: profile.description.clone(),
            clip_bound: profile.clip_bound,
            low_risk_min: profile.tiers.low_risk_min,
            moderate_risk_min: profile.tiers.moderate_risk_min,
            conditions: profile
                .conditions
                .iter()
                .map(|c| ConditionWeightsResponse {
                    condition: c.condition.to_string().to_lowercase(),
                    weight: c.weight,
                    biomarkers: c
                        .biomarkers
                        .iter()
                        .map(|w| BiomarkerWeightResponse {
                            biomarker: w.biomarker.key().to_string(),
                            weight: w.weight,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
