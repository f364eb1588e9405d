use tracing::debug;

use health_score_data::models::Biomarker;
use health_score_data::reference::PlausibilityLimits;

use crate::entities::{BiomarkerInput, BiomarkerQuality, QualityReport, RecordQuality};
use super::stats::{quantile, round2, sorted_column};

/// Multiplier applied to the interquartile range to place the fences
pub const IQR_FENCE_MULTIPLIER: f64 = 1.5;

/// Assess the data quality of a batch
///
/// Outlier fences are computed per biomarker from the batch itself, so the
/// same record can be an outlier in one batch and not in another.
pub fn assess_quality(inputs: &[BiomarkerInput], limits: &PlausibilityLimits) -> QualityReport {
    let total = inputs.len();
    let mut implausible = vec![0usize; total];
    let mut outliers = vec![0usize; total];
    let mut biomarkers = Vec::with_capacity(Biomarker::ALL.len());

    for biomarker in Biomarker::ALL {
        let fences = iqr_fences(inputs, biomarker);
        let mut missing_count = 0;
        let mut implausible_count = 0;
        let mut outlier_count = 0;

        for (index, input) in inputs.iter().enumerate() {
            let Some(value) = input.value(biomarker) else {
                missing_count += 1;
                continue;
            };

            if !limits.is_plausible(biomarker, value) {
                implausible[index] += 1;
                implausible_count += 1;
            }

            if let Some((lower, upper)) = fences {
                if value < lower || value > upper {
                    outliers[index] += 1;
                    outlier_count += 1;
                }
            }
        }

        let missing_percentage = percentage_of(missing_count, total);

        biomarkers.push(BiomarkerQuality {
            biomarker,
            missing_percentage,
            implausible_count,
            outlier_count,
            lower_fence: fences.map(|(lower, _)| lower),
            upper_fence: fences.map(|(_, upper)| upper),
        });
    }

    let records: Vec<RecordQuality> = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            RecordQuality::new(index, input.missing_count(), implausible[index], outliers[index])
                .with_condition(input.condition_label())
        })
        .collect();

    let unlabelled = records.iter().filter(|r| r.condition.is_none()).count();

    let eligible_records = records.iter().filter(|r| r.analytics_eligible).count();
    debug!("Quality assessed: {} of {} records eligible", eligible_records, total);

    QualityReport {
        total_records: total,
        eligible_records,
        records,
        condition_missing_percentage: percentage_of(unlabelled, total),
        biomarkers,
    }
}

fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(count as f64 * 100.0 / total as f64)
    }
}

/// Lower and upper IQR fences for one biomarker, if it has any values
pub fn iqr_fences(inputs: &[BiomarkerInput], biomarker: Biomarker) -> Option<(f64, f64)> {
    let column = sorted_column(inputs, biomarker);
    let q1 = quantile(&column, 0.25)?;
    let q3 = quantile(&column, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - IQR_FENCE_MULTIPLIER * iqr, q3 + IQR_FENCE_MULTIPLIER * iqr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_score_data::models::Sex;
    use health_score_data::reference::PLAUSIBILITY_LIMITS;
    use crate::testing::midpoint_input;

    #[test]
    fn test_clean_batch_is_fully_eligible() {
        let batch = vec![midpoint_input(Sex::Male), midpoint_input(Sex::Female)];
        let report = assess_quality(&batch, &PLAUSIBILITY_LIMITS);

        assert_eq!(report.total_records, 2);
        assert_eq!(report.eligible_records, 2);
        assert!(report.records.iter().all(|r| r.quality_score == 100));
        assert!(report.biomarkers.iter().all(|b| b.missing_percentage == 0.0));
    }

    #[test]
    fn test_missing_and_implausible_values_are_penalised() {
        let mut broken = midpoint_input(Sex::Male);
        broken.glucose = None;
        broken.mcv = Some(200.0);
        let batch = vec![midpoint_input(Sex::Male), broken];

        let report = assess_quality(&batch, &PLAUSIBILITY_LIMITS);
        let record = &report.records[1];
        assert_eq!(record.missing, 1);
        assert_eq!(record.implausible, 1);
        assert_eq!(record.quality_score, 85 - 3 * record.outliers as u32);

        let glucose = &report.biomarkers[0];
        assert_eq!(glucose.biomarker, Biomarker::Glucose);
        assert_eq!(glucose.missing_percentage, 50.0);
    }

    #[test]
    fn test_iqr_outlier_detection() {
        let mut batch: Vec<BiomarkerInput> = (0..8)
            .map(|i| BiomarkerInput { glucose: Some(90.0 + i as f64), ..Default::default() })
            .collect();
        batch.push(BiomarkerInput { glucose: Some(300.0), ..Default::default() });

        let (lower, upper) = iqr_fences(&batch, Biomarker::Glucose).unwrap();
        assert!(lower < 90.0);
        assert!(upper < 300.0);

        let report = assess_quality(&batch, &PLAUSIBILITY_LIMITS);
        assert_eq!(report.records[8].outliers, 1);
        assert_eq!(report.records[0].outliers, 0);
        assert_eq!(report.biomarkers[0].outlier_count, 1);
    }

    #[test]
    fn test_empty_batch() {
        let report = assess_quality(&[], &PLAUSIBILITY_LIMITS);
        assert_eq!(report.total_records, 0);
        assert_eq!(report.eligible_records, 0);
        assert_eq!(report.biomarkers.len(), 9);
        assert!(report.biomarkers.iter().all(|b| b.lower_fence.is_none()));
    }

    #[test]
    fn test_condition_labels_are_reported() {
        let mut diabetic = midpoint_input(Sex::Female);
        diabetic.condition = Some("diabetes".to_string());
        let mut blank = midpoint_input(Sex::Male);
        blank.condition = Some("  ".to_string());
        let batch = vec![diabetic, blank, midpoint_input(Sex::Male)];

        let report = assess_quality(&batch, &PLAUSIBILITY_LIMITS);
        assert_eq!(report.records[0].condition.as_deref(), Some("Diabetes"));
        assert_eq!(report.records[1].condition, None);
        assert_eq!(report.condition_missing_percentage, 66.67);

        // The label never affects the quality score
        assert!(report.records.iter().all(|r| r.quality_score == 100));
    }
}
