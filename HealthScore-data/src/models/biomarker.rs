use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The nine biomarkers measured on every panel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Biomarker {
    /// Fasting blood glucose (mg/dL)
    Glucose,
    /// Glycated haemoglobin (%)
    Hba1c,
    /// Systolic blood pressure (mmHg)
    SystolicBp,
    /// Diastolic blood pressure (mmHg)
    DiastolicBp,
    /// Low-density lipoprotein cholesterol (mg/dL)
    Ldl,
    /// High-density lipoprotein cholesterol (mg/dL)
    Hdl,
    /// Triglycerides (mg/dL)
    Triglycerides,
    /// Haemoglobin (g/dL)
    Haemoglobin,
    /// Mean corpuscular volume (fL)
    Mcv,
}

impl Biomarker {
    /// All biomarkers in panel order
    pub const ALL: [Biomarker; 9] = [
        Biomarker::Glucose,
        Biomarker::Hba1c,
        Biomarker::SystolicBp,
        Biomarker::DiastolicBp,
        Biomarker::Ldl,
        Biomarker::Hdl,
        Biomarker::Triglycerides,
        Biomarker::Haemoglobin,
        Biomarker::Mcv,
    ];

    /// Field name used in records and on the wire
    pub fn key(&self) -> &'static str {
        match self {
            Biomarker::Glucose => "glucose",
            Biomarker::Hba1c => "hba1c",
            Biomarker::SystolicBp => "systolic_bp",
            Biomarker::DiastolicBp => "diastolic_bp",
            Biomarker::Ldl => "ldl",
            Biomarker::Hdl => "hdl",
            Biomarker::Triglycerides => "triglycerides",
            Biomarker::Haemoglobin => "haemoglobin",
            Biomarker::Mcv => "mcv",
        }
    }

    /// Measurement unit
    pub fn unit(&self) -> &'static str {
        match self {
            Biomarker::Glucose | Biomarker::Ldl | Biomarker::Hdl | Biomarker::Triglycerides => "mg/dL",
            Biomarker::Hba1c => "%",
            Biomarker::SystolicBp | Biomarker::DiastolicBp => "mmHg",
            Biomarker::Haemoglobin => "g/dL",
            Biomarker::Mcv => "fL",
        }
    }

    /// Whether the reference range differs between male and female records
    pub fn is_sex_dependent(&self) -> bool {
        matches!(self, Biomarker::Hdl | Biomarker::Haemoglobin)
    }
}

impl fmt::Display for Biomarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Biomarker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Biomarker::ALL
            .iter()
            .copied()
            .find(|b| b.key() == normalized)
            .ok_or_else(|| format!("Unknown biomarker: {}", s))
    }
}

/// Biological sex, needed because HDL and haemoglobin ranges differ
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => f.write_str("male"),
            Sex::Female => f.write_str("female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    /// Accepts `male`/`female` and the single-letter codes, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            _ => Err(format!("Unrecognized sex: {}", s)),
        }
    }
}
