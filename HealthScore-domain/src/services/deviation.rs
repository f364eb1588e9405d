use health_score_data::models::{Biomarker, ConditionWeights, ReferenceRange, TierThresholds};

use crate::entities::RiskTier;

/// Penalty for one value, in [0, 1]
///
/// Zero inside the range. Outside, the distance to the nearest bound in
/// multiples of the range width, capped at `clip_bound` and divided by it.
/// A point or inverted range has no width to scale by, so any value
/// outside it gets the full penalty.
pub fn normalized_deviation(value: f64, range: ReferenceRange, clip_bound: f64) -> f64 {
    let distance = range.distance_outside(value);
    if distance == 0.0 {
        return 0.0;
    }

    let width = range.width();
    if width <= 0.0 {
        return 1.0;
    }

    (distance / width).min(clip_bound) / clip_bound
}

/// Sub-score for one condition on the 0-100 scale
///
/// `deviation_of` returns the normalised deviation for each biomarker.
pub fn condition_sub_score<F>(weights: &ConditionWeights, deviation_of: F) -> f64
where
    F: Fn(Biomarker) -> f64,
{
    let (penalty, total) = weights
        .biomarkers
        .iter()
        .fold((0.0, 0.0), |(penalty, total), entry| {
            (penalty + entry.weight * deviation_of(entry.biomarker), total + entry.weight)
        });

    if total <= 0.0 {
        return 100.0;
    }
    (100.0 * (1.0 - penalty / total)).clamp(0.0, 100.0)
}

/// Map an overall score to its risk tier
pub fn categorize_score(score: f64, tiers: &TierThresholds) -> RiskTier {
    if score >= tiers.low_risk_min {
        RiskTier::Low
    } else if score >= tiers.moderate_risk_min {
        RiskTier::Moderate
    } else {
        RiskTier::High
    }
}
