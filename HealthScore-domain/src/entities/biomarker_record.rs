use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use health_score_data::models::{Biomarker, Sex};

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidInputReason {
    /// The field has no value
    Missing,
    /// The value is below zero
    Negative,
    /// The value is NaN or infinite
    NotFinite,
    /// The sex field is not male or female
    UnrecognizedSex(String),
}

impl fmt::Display for InvalidInputReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidInputReason::Missing => f.write_str("value is missing"),
            InvalidInputReason::Negative => f.write_str("value must not be negative"),
            InvalidInputReason::NotFinite => f.write_str("value must be a finite number"),
            InvalidInputReason::UnrecognizedSex(value) => {
                write!(f, "'{}' is not a recognized sex (expected male or female)", value)
            }
        }
    }
}

/// A biomarker record failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid input for {field}: {reason}")]
pub struct InvalidInputError {
    /// Name of the offending field
    pub field: String,
    pub reason: InvalidInputReason,
}

impl InvalidInputError {
    pub fn new(field: impl Into<String>, reason: InvalidInputReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// One validated biomarker panel
///
/// Every value is finite and non-negative once `validate` has passed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BiomarkerRecord {
    /// Fasting blood glucose (mg/dL)
    pub glucose: f64,

    /// Glycated haemoglobin (%)
    pub hba1c: f64,

    /// Systolic blood pressure (mmHg)
    pub systolic_bp: f64,

    /// Diastolic blood pressure (mmHg)
    pub diastolic_bp: f64,

    /// LDL cholesterol (mg/dL)
    pub ldl: f64,

    /// HDL cholesterol (mg/dL)
    pub hdl: f64,

    /// Triglycerides (mg/dL)
    pub triglycerides: f64,

    /// Haemoglobin (g/dL)
    pub haemoglobin: f64,

    /// Mean corpuscular volume (fL)
    pub mcv: f64,

    pub sex: Sex,
}

impl BiomarkerRecord {
    pub fn value(&self, biomarker: Biomarker) -> f64 {
        match biomarker {
            Biomarker::Glucose => self.glucose,
            Biomarker::Hba1c => self.hba1c,
            Biomarker::SystolicBp => self.systolic_bp,
            Biomarker::DiastolicBp => self.diastolic_bp,
            Biomarker::Ldl => self.ldl,
            Biomarker::Hdl => self.hdl,
            Biomarker::Triglycerides => self.triglycerides,
            Biomarker::Haemoglobin => self.haemoglobin,
            Biomarker::Mcv => self.mcv,
        }
    }

    /// Copy of this record with one biomarker replaced
    pub fn with_value(mut self, biomarker: Biomarker, value: f64) -> Self {
        let slot = match biomarker {
            Biomarker::Glucose => &mut self.glucose,
            Biomarker::Hba1c => &mut self.hba1c,
            Biomarker::SystolicBp => &mut self.systolic_bp,
            Biomarker::DiastolicBp => &mut self.diastolic_bp,
            Biomarker::Ldl => &mut self.ldl,
            Biomarker::Hdl => &mut self.hdl,
            Biomarker::Triglycerides => &mut self.triglycerides,
            Biomarker::Haemoglobin => &mut self.haemoglobin,
            Biomarker::Mcv => &mut self.mcv,
        };
        *slot = value;
        self
    }

    /// Check the non-negativity invariant
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        for biomarker in Biomarker::ALL {
            check_value(biomarker, self.value(biomarker))?;
        }
        Ok(())
    }
}

fn check_value(biomarker: Biomarker, value: f64) -> Result<f64, InvalidInputError> {
    if !value.is_finite() {
        return Err(InvalidInputError::new(biomarker.key(), InvalidInputReason::NotFinite));
    }
    if value < 0.0 {
        return Err(InvalidInputError::new(biomarker.key(), InvalidInputReason::Negative));
    }
    Ok(value)
}

/// An unvalidated panel, possibly with gaps
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BiomarkerInput {
    pub glucose: Option<f64>,
    pub hba1c: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub ldl: Option<f64>,
    pub hdl: Option<f64>,
    pub triglycerides: Option<f64>,
    pub haemoglobin: Option<f64>,
    pub mcv: Option<f64>,
    pub sex: Option<String>,

    /// Free-form diagnosis label; carried through, never scored
    #[serde(default)]
    pub condition: Option<String>,
}

impl BiomarkerInput {
    pub fn value(&self, biomarker: Biomarker) -> Option<f64> {
        match biomarker {
            Biomarker::Glucose => self.glucose,
            Biomarker::Hba1c => self.hba1c,
            Biomarker::SystolicBp => self.systolic_bp,
            Biomarker::DiastolicBp => self.diastolic_bp,
            Biomarker::Ldl => self.ldl,
            Biomarker::Hdl => self.hdl,
            Biomarker::Triglycerides => self.triglycerides,
            Biomarker::Haemoglobin => self.haemoglobin,
            Biomarker::Mcv => self.mcv,
        }
    }

    pub fn set_value(&mut self, biomarker: Biomarker, value: Option<f64>) {
        let slot = match biomarker {
            Biomarker::Glucose => &mut self.glucose,
            Biomarker::Hba1c => &mut self.hba1c,
            Biomarker::SystolicBp => &mut self.systolic_bp,
            Biomarker::DiastolicBp => &mut self.diastolic_bp,
            Biomarker::Ldl => &mut self.ldl,
            Biomarker::Hdl => &mut self.hdl,
            Biomarker::Triglycerides => &mut self.triglycerides,
            Biomarker::Haemoglobin => &mut self.haemoglobin,
            Biomarker::Mcv => &mut self.mcv,
        };
        *slot = value;
    }

    /// Number of biomarkers without a value
    pub fn missing_count(&self) -> usize {
        Biomarker::ALL
            .iter()
            .filter(|b| self.value(**b).is_none())
            .count()
    }

    /// Condition label trimmed and title-cased, `None` when blank
    pub fn condition_label(&self) -> Option<String> {
        self.condition.as_deref().and_then(normalize_condition_label)
    }

    /// Validate the values that are present plus the sex field
    ///
    /// Gaps are allowed here; a record passing this check may still need
    /// imputation before it can be scored.
    pub fn check_present(&self) -> Result<(), InvalidInputError> {
        for biomarker in Biomarker::ALL {
            if let Some(value) = self.value(biomarker) {
                check_value(biomarker, value)?;
            }
        }
        self.parsed_sex().map(|_| ())
    }

    fn required(&self, biomarker: Biomarker) -> Result<f64, InvalidInputError> {
        let value = self
            .value(biomarker)
            .ok_or_else(|| InvalidInputError::new(biomarker.key(), InvalidInputReason::Missing))?;
        check_value(biomarker, value)
    }

    fn parsed_sex(&self) -> Result<Sex, InvalidInputError> {
        let raw_sex = self
            .sex
            .as_deref()
            .ok_or_else(|| InvalidInputError::new("sex", InvalidInputReason::Missing))?;
        raw_sex.parse::<Sex>().map_err(|_| {
            InvalidInputError::new("sex", InvalidInputReason::UnrecognizedSex(raw_sex.to_string()))
        })
    }
}

/// Trim a condition label and title-case each word
///
/// `"  type 2 DIABETES "` becomes `"Type 2 Diabetes"`. Blank labels count as missing.
pub fn normalize_condition_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut label = String::with_capacity(trimmed.len());
    let mut word_start = true;
    for ch in trimmed.chars() {
        if ch.is_alphabetic() {
            if word_start {
                label.extend(ch.to_uppercase());
            } else {
                label.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            label.push(ch);
            word_start = true;
        }
    }
    Some(label)
}

impl TryFrom<&BiomarkerInput> for BiomarkerRecord {
    type Error = InvalidInputError;

    /// Fields are checked in panel order; the first problem is reported
    fn try_from(input: &BiomarkerInput) -> Result<Self, Self::Error> {
        let glucose = input.required(Biomarker::Glucose)?;
        let hba1c = input.required(Biomarker::Hba1c)?;
        let systolic_bp = input.required(Biomarker::SystolicBp)?;
        let diastolic_bp = input.required(Biomarker::DiastolicBp)?;
        let ldl = input.required(Biomarker::Ldl)?;
        let hdl = input.required(Biomarker::Hdl)?;
        let triglycerides = input.required(Biomarker::Triglycerides)?;
        let haemoglobin = input.required(Biomarker::Haemoglobin)?;
        let mcv = input.required(Biomarker::Mcv)?;
        let sex = input.parsed_sex()?;

        Ok(BiomarkerRecord {
            glucose,
            hba1c,
            systolic_bp,
            diastolic_bp,
            ldl,
            hdl,
            triglycerides,
            haemoglobin,
            mcv,
            sex,
        })
    }
}

impl TryFrom<BiomarkerInput> for BiomarkerRecord {
    type Error = InvalidInputError;

    fn try_from(input: BiomarkerInput) -> Result<Self, Self::Error> {
        BiomarkerRecord::try_from(&input)
    }
}

impl From<&BiomarkerRecord> for BiomarkerInput {
    fn from(record: &BiomarkerRecord) -> Self {
        let mut input = BiomarkerInput {
            sex: Some(record.sex.to_string()),
            ..Default::default()
        };
        for biomarker in Biomarker::ALL {
            input.set_value(biomarker, Some(record.value(biomarker)));
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::midpoint_record;

    #[test]
    fn test_input_converts_to_record() {
        let record = midpoint_record(Sex::Female);
        let input = BiomarkerInput::from(&record);
        assert_eq!(input.missing_count(), 0);
        assert_eq!(BiomarkerRecord::try_from(&input).unwrap(), record);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let mut input = BiomarkerInput::from(&midpoint_record(Sex::Male));
        input.ldl = None;

        let err = BiomarkerRecord::try_from(&input).unwrap_err();
        assert_eq!(err.field, "ldl");
        assert_eq!(err.reason, InvalidInputReason::Missing);
    }

    #[test]
    fn test_missing_sex_is_rejected() {
        let mut input = BiomarkerInput::from(&midpoint_record(Sex::Male));
        input.sex = None;

        let err = BiomarkerRecord::try_from(input).unwrap_err();
        assert_eq!(err.field, "sex");
        assert_eq!(err.reason, InvalidInputReason::Missing);
    }

    #[test]
    fn test_unrecognized_sex_is_rejected() {
        let mut input = BiomarkerInput::from(&midpoint_record(Sex::Male));
        input.sex = Some("unknown".to_string());

        let err = BiomarkerRecord::try_from(&input).unwrap_err();
        assert_eq!(err.reason, InvalidInputReason::UnrecognizedSex("unknown".to_string()));
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn test_negative_value_is_rejected() {
        let mut input = BiomarkerInput::from(&midpoint_record(Sex::Female));
        input.glucose = Some(-1.0);

        let err = BiomarkerRecord::try_from(&input).unwrap_err();
        assert_eq!(err.field, "glucose");
        assert_eq!(err.reason, InvalidInputReason::Negative);
    }

    #[test]
    fn test_validate_catches_non_finite_values() {
        let record = midpoint_record(Sex::Female).with_value(Biomarker::Mcv, f64::NAN);
        let err = record.validate().unwrap_err();
        assert_eq!(err.field, "mcv");
        assert_eq!(err.reason, InvalidInputReason::NotFinite);
    }

    #[test]
    fn test_zero_is_allowed() {
        let record = midpoint_record(Sex::Male).with_value(Biomarker::Ldl, 0.0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_with_value_replaces_only_one_field() {
        let base = midpoint_record(Sex::Male);
        let changed = base.with_value(Biomarker::Hdl, 30.0);
        assert_eq!(changed.hdl, 30.0);
        for biomarker in Biomarker::ALL.iter().filter(|b| **b != Biomarker::Hdl) {
            assert_eq!(changed.value(*biomarker), base.value(*biomarker));
        }
    }

    #[test]
    fn test_check_present_allows_gaps_but_not_bad_values() {
        let mut input = BiomarkerInput::from(&midpoint_record(Sex::Male));
        input.glucose = None;
        assert!(input.check_present().is_ok());

        input.mcv = Some(-1.0);
        let err = input.check_present().unwrap_err();
        assert_eq!(err.field, "mcv");
        assert_eq!(err.reason, InvalidInputReason::Negative);
    }

    #[test]
    fn test_check_present_requires_sex() {
        let mut input = BiomarkerInput::from(&midpoint_record(Sex::Female));
        input.sex = Some("x".to_string());
        let err = input.check_present().unwrap_err();
        assert_eq!(err.field, "sex");

        input.sex = None;
        assert_eq!(input.check_present().unwrap_err().reason, InvalidInputReason::Missing);
    }

    #[test]
    fn test_condition_label_is_normalized() {
        assert_eq!(
            normalize_condition_label("  type 2 DIABETES "),
            Some("Type 2 Diabetes".to_string())
        );
        assert_eq!(normalize_condition_label("anemia"), Some("Anemia".to_string()));
        assert_eq!(normalize_condition_label("   "), None);

        let input = BiomarkerInput {
            condition: Some(" cardiovascular-disease".to_string()),
            ..Default::default()
        };
        assert_eq!(input.condition_label(), Some("Cardiovascular-Disease".to_string()));
    }

    #[test]
    fn test_condition_is_optional_on_the_wire() {
        let input: BiomarkerInput = serde_json::from_str(r#"{"glucose": 90.0, "sex": "male"}"#).unwrap();
        assert_eq!(input.condition, None);
        assert_eq!(input.glucose, Some(90.0));
    }
}
