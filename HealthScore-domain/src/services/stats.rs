use health_score_data::models::Biomarker;

use crate::entities::BiomarkerInput;

/// Present, finite values of one biomarker across a batch, sorted ascending
pub(crate) fn sorted_column<'a>(
    inputs: impl IntoIterator<Item = &'a BiomarkerInput>,
    biomarker: Biomarker,
) -> Vec<f64> {
    let mut values: Vec<f64> = inputs
        .into_iter()
        .filter_map(|input| input.value(biomarker))
        .filter(|v| v.is_finite())
        .collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Quantile with linear interpolation between closest ranks
///
/// `sorted` must be ascending; `q` is clamped to [0, 1].
pub(crate) fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Round to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
