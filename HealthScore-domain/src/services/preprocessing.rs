//! Upstream cleaning steps applied to a batch before scoring
//!
//! Both steps work per biomarker across the whole batch and never touch the
//! sex field. Records that fail `BiomarkerInput::check_present` are left
//! as submitted and contribute nothing to the batch statistics, so a
//! rejected record can neither be repaired nor skew its neighbours.

use serde::{Deserialize, Serialize};
use tracing::debug;

use health_score_data::models::Biomarker;

use crate::entities::BiomarkerInput;
use super::stats::{quantile, sorted_column};

/// Percentile bounds for Winsorization, as fractions in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WinsorizeLimits {
    pub lower: f64,
    pub upper: f64,
}

impl WinsorizeLimits {
    pub fn validate(&self) -> Result<(), String> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.lower) || !in_unit(self.upper) || self.lower >= self.upper {
            return Err(format!(
                "Winsorize limits must satisfy 0 <= lower < upper <= 1, got {} and {}",
                self.lower, self.upper
            ));
        }
        Ok(())
    }
}

/// Which preprocessing steps to run, in order: imputation, then Winsorization
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PreprocessingOptions {
    /// Fill missing biomarkers with the batch median
    #[serde(default)]
    pub impute_missing: bool,

    /// Cap biomarkers at batch percentiles
    #[serde(default)]
    pub winsorize: Option<WinsorizeLimits>,
}

/// What preprocessing changed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreprocessingSummary {
    pub imputed_values: usize,
    pub winsorized_values: usize,
}

/// Run the selected steps over a batch in place
pub fn preprocess(
    inputs: &mut [BiomarkerInput],
    options: &PreprocessingOptions,
) -> Result<PreprocessingSummary, String> {
    if let Some(limits) = &options.winsorize {
        limits.validate()?;
    }

    let mut summary = PreprocessingSummary::default();
    if options.impute_missing {
        summary.imputed_values = impute_median(inputs);
    }
    if let Some(limits) = options.winsorize {
        summary.winsorized_values = winsorize(inputs, limits)?;
    }
    Ok(summary)
}

/// Which records may feed and receive preprocessing
fn clean_mask(inputs: &[BiomarkerInput]) -> Vec<bool> {
    inputs.iter().map(|input| input.check_present().is_ok()).collect()
}

fn clean_records<'a>(
    inputs: &'a [BiomarkerInput],
    clean: &'a [bool],
) -> impl Iterator<Item = &'a BiomarkerInput> {
    inputs.iter().zip(clean).filter(|(_, ok)| **ok).map(|(input, _)| input)
}

/// Replace missing values with the median of the same biomarker over the
/// batch's valid records
///
/// A biomarker with no valid values in the batch stays missing. Returns
/// the number of values filled in.
pub fn impute_median(inputs: &mut [BiomarkerInput]) -> usize {
    let clean = clean_mask(inputs);
    let mut imputed = 0;

    for biomarker in Biomarker::ALL {
        let column = sorted_column(clean_records(inputs, &clean), biomarker);
        let Some(median) = quantile(&column, 0.5) else {
            continue;
        };

        for (input, _) in inputs
            .iter_mut()
            .zip(&clean)
            .filter(|(input, ok)| **ok && input.value(biomarker).is_none())
        {
            input.set_value(biomarker, Some(median));
            imputed += 1;
        }
    }

    debug!("Imputed {} missing values", imputed);
    imputed
}

/// Cap each biomarker of the valid records at the given batch percentiles
///
/// Returns the number of values that were moved.
pub fn winsorize(inputs: &mut [BiomarkerInput], limits: WinsorizeLimits) -> Result<usize, String> {
    limits.validate()?;
    let clean = clean_mask(inputs);
    let mut capped = 0;

    for biomarker in Biomarker::ALL {
        let column = sorted_column(clean_records(inputs, &clean), biomarker);
        let (Some(floor), Some(ceiling)) = (quantile(&column, limits.lower), quantile(&column, limits.upper)) else {
            continue;
        };

        for (input, _) in inputs.iter_mut().zip(&clean).filter(|(_, ok)| **ok) {
            if let Some(value) = input.value(biomarker) {
                let bounded = value.clamp(floor, ceiling);
                if bounded != value {
                    input.set_value(biomarker, Some(bounded));
                    capped += 1;
                }
            }
        }
    }

    debug!("Winsorized {} values", capped);
    Ok(capped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glucose_batch(values: &[Option<f64>]) -> Vec<BiomarkerInput> {
        values
            .iter()
            .map(|v| BiomarkerInput {
                glucose: *v,
                sex: Some("male".to_string()),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_impute_median_fills_gaps() {
        let mut batch = glucose_batch(&[Some(80.0), None, Some(100.0), Some(90.0)]);
        let imputed = impute_median(&mut batch);

        // Glucose gets one value; the eight other biomarkers have no data at all
        assert_eq!(imputed, 1);
        assert_eq!(batch[1].glucose, Some(90.0));
        assert_eq!(batch[1].mcv, None);
    }

    #[test]
    fn test_impute_median_even_count_averages() {
        let mut batch = glucose_batch(&[Some(80.0), Some(100.0), None]);
        impute_median(&mut batch);
        assert_eq!(batch[2].glucose, Some(90.0));
    }

    #[test]
    fn test_winsorize_caps_extremes() {
        let mut batch = glucose_batch(&[
            Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0),
            Some(6.0), Some(7.0), Some(8.0), Some(9.0), Some(1000.0),
        ]);
        let limits = WinsorizeLimits { lower: 0.1, upper: 0.9 };
        let capped = winsorize(&mut batch, limits).unwrap();

        // 10th percentile = 1.9, 90th percentile = 108.1
        assert_eq!(capped, 2);
        assert!((batch[0].glucose.unwrap() - 1.9).abs() < 1e-9);
        assert!((batch[9].glucose.unwrap() - 108.1).abs() < 1e-9);
        assert_eq!(batch[4].glucose, Some(5.0));
    }

    #[test]
    fn test_winsorize_rejects_bad_limits() {
        let mut batch = glucose_batch(&[Some(1.0)]);
        assert!(winsorize(&mut batch, WinsorizeLimits { lower: 0.9, upper: 0.1 }).is_err());
        assert!(winsorize(&mut batch, WinsorizeLimits { lower: -0.1, upper: 0.9 }).is_err());
    }

    #[test]
    fn test_preprocess_runs_imputation_before_winsorizing() {
        let mut batch = glucose_batch(&[Some(10.0), None, Some(20.0), Some(30.0)]);
        let options = PreprocessingOptions {
            impute_missing: true,
            winsorize: Some(WinsorizeLimits { lower: 0.0, upper: 1.0 }),
        };
        let summary = preprocess(&mut batch, &options).unwrap();
        assert_eq!(summary.imputed_values, 1);
        assert_eq!(summary.winsorized_values, 0);
        assert_eq!(batch[1].glucose, Some(20.0));
    }

    #[test]
    fn test_preprocess_validates_before_mutating() {
        let mut batch = glucose_batch(&[Some(10.0), None]);
        let options = PreprocessingOptions {
            impute_missing: true,
            winsorize: Some(WinsorizeLimits { lower: 0.5, upper: 0.5 }),
        };
        assert!(preprocess(&mut batch, &options).is_err());
        assert_eq!(batch[1].glucose, None);
    }

    #[test]
    fn test_invalid_records_are_left_out_of_imputation() {
        let mut batch = glucose_batch(&[Some(80.0), Some(-500.0), None, Some(100.0)]);
        batch[3].sex = Some("unknown".to_string());
        let imputed = impute_median(&mut batch);

        // Only the clean 80.0 feeds the median
        assert_eq!(imputed, 1);
        assert_eq!(batch[2].glucose, Some(80.0));
        assert_eq!(batch[1].glucose, Some(-500.0));
    }

    #[test]
    fn test_invalid_records_are_not_winsorized() {
        let mut batch = glucose_batch(&[
            Some(-1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0),
            Some(6.0), Some(7.0), Some(8.0), Some(9.0), Some(10.0),
        ]);
        let capped = winsorize(&mut batch, WinsorizeLimits { lower: 0.1, upper: 0.9 }).unwrap();

        // Percentiles over 2..=10: 10th = 2.8, 90th = 9.2
        assert_eq!(batch[0].glucose, Some(-1.0));
        assert!((batch[1].glucose.unwrap() - 2.8).abs() < 1e-9);
        assert!((batch[9].glucose.unwrap() - 9.2).abs() < 1e-9);
        assert_eq!(capped, 2);
    }

    #[test]
    fn test_record_without_sex_is_not_imputed() {
        let mut batch = glucose_batch(&[Some(80.0), None]);
        batch[1].sex = None;
        assert_eq!(impute_median(&mut batch), 0);
        assert_eq!(batch[1].glucose, None);
    }
}
