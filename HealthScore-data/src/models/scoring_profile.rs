use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::biomarker::Biomarker;

/// Version tag of the built-in profile
pub const DEFAULT_PROFILE_VERSION: &str = "v1";

/// Conditions that receive their own sub-score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    Diabetes,
    Cardiovascular,
    Anemia,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Diabetes => f.write_str("Diabetes"),
            Condition::Cardiovascular => f.write_str("Cardiovascular"),
            Condition::Anemia => f.write_str("Anemia"),
        }
    }
}

/// Weight of one biomarker inside a condition sub-score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomarkerWeight {
    pub biomarker: Biomarker,
    pub weight: f64,
}

/// Weight table for one condition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionWeights {
    pub condition: Condition,

    /// Share of this sub-score in the overall score
    pub weight: f64,

    /// Biomarkers contributing to the sub-score
    pub biomarkers: Vec<BiomarkerWeight>,
}

impl ConditionWeights {
    fn total_biomarker_weight(&self) -> f64 {
        self.biomarkers.iter().map(|b| b.weight).sum()
    }
}

/// Score cut points for the risk tiers. Scores are on the 0-100
/// higher-is-healthier scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TierThresholds {
    /// Minimum score for the Low risk tier
    pub low_risk_min: f64,

    /// Minimum score for the Moderate risk tier; anything below is High
    pub moderate_risk_min: f64,
}

/// Versioned calibration of the Health Score
///
/// Weights, the deviation clipping bound and tier thresholds are data, so a
/// recalibration ships as a new profile version rather than a code change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringProfile {
    /// Version tag, e.g. "v1"
    pub version: String,

    /// Free-text notes about the calibration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Deviation (in multiples of the range width) at which a biomarker
    /// reaches its maximum penalty
    pub clip_bound: f64,

    pub tiers: TierThresholds,

    pub conditions: Vec<ConditionWeights>,
}

impl ScoringProfile {
    /// Check the profile is usable for scoring
    pub fn validate(&self) -> Result<(), String> {
        if self.version.trim().is_empty() {
            return Err("Profile version must not be empty".to_string());
        }

        if !self.clip_bound.is_finite() || self.clip_bound <= 0.0 {
            return Err(format!(
                "clip_bound must be a positive number, got {}",
                self.clip_bound
            ));
        }

        let tiers = self.tiers;
        if !(0.0..=100.0).contains(&tiers.moderate_risk_min)
            || !(0.0..=100.0).contains(&tiers.low_risk_min)
            || tiers.moderate_risk_min >= tiers.low_risk_min
        {
            return Err(format!(
                "Tier thresholds must satisfy 0 <= moderate_risk_min < low_risk_min <= 100, got {} and {}",
                tiers.moderate_risk_min, tiers.low_risk_min
            ));
        }

        if self.conditions.is_empty() {
            return Err("Profile must define at least one condition".to_string());
        }

        let mut seen_conditions = HashSet::new();
        for condition in &self.conditions {
            if !seen_conditions.insert(condition.condition) {
                return Err(format!("Condition {} is defined more than once", condition.condition));
            }

            if !condition.weight.is_finite() || condition.weight <= 0.0 {
                return Err(format!(
                    "Condition {} must have a positive weight",
                    condition.condition
                ));
            }

            if condition.biomarkers.is_empty() {
                return Err(format!(
                    "Condition {} must reference at least one biomarker",
                    condition.condition
                ));
            }

            let mut seen_biomarkers = HashSet::new();
            for entry in &condition.biomarkers {
                if !seen_biomarkers.insert(entry.biomarker) {
                    return Err(format!(
                        "Biomarker {} appears twice in condition {}",
                        entry.biomarker, condition.condition
                    ));
                }
                if !entry.weight.is_finite() || entry.weight <= 0.0 {
                    return Err(format!(
                        "Biomarker {} in condition {} must have a positive weight",
                        entry.biomarker, condition.condition
                    ));
                }
            }

            // Guards against a sum that overflows to infinity
            if !condition.total_biomarker_weight().is_finite() {
                return Err(format!("Weights of condition {} are not finite", condition.condition));
            }
        }

        Ok(())
    }
}

impl Default for ScoringProfile {
    /// Built-in calibration: glucose and HbA1c dominate diabetes, blood
    /// pressure and lipids drive cardiovascular, haemoglobin and MCV drive anemia.
    fn default() -> Self {
        fn w(biomarker: Biomarker, weight: f64) -> BiomarkerWeight {
            BiomarkerWeight { biomarker, weight }
        }

        Self {
            version: DEFAULT_PROFILE_VERSION.to_string(),
            description: Some("Built-in clinical weighting".to_string()),
            clip_bound: 1.0,
            tiers: TierThresholds {
                low_risk_min: 70.0,
                moderate_risk_min: 40.0,
            },
            conditions: vec![
                ConditionWeights {
                    condition: Condition::Diabetes,
                    weight: 0.35,
                    biomarkers: vec![
                        w(Biomarker::Glucose, 0.45),
                        w(Biomarker::Hba1c, 0.45),
                        w(Biomarker::Triglycerides, 0.10),
                    ],
                },
                ConditionWeights {
                    condition: Condition::Cardiovascular,
                    weight: 0.40,
                    biomarkers: vec![
                        w(Biomarker::SystolicBp, 0.30),
                        w(Biomarker::DiastolicBp, 0.20),
                        w(Biomarker::Ldl, 0.25),
                        w(Biomarker::Hdl, 0.15),
                        w(Biomarker::Triglycerides, 0.10),
                    ],
                },
                ConditionWeights {
                    condition: Condition::Anemia,
                    weight: 0.25,
                    biomarkers: vec![
                        w(Biomarker::Haemoglobin, 0.65),
                        w(Biomarker::Mcv, 0.35),
                    ],
                },
            ],
        }
    }
}
