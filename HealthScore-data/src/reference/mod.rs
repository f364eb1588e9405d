//! Static clinical tables
//!
//! Both tables are built once per process and shared by reference. Ranges
//! are inclusive at both ends.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::models::{Biomarker, ReferenceRange, Sex};

/// Normal ranges used for scoring
pub static CLINICAL_REFERENCE_TABLE: Lazy<ReferenceTable> = Lazy::new(ReferenceTable::clinical);

/// Physiologically plausible bounds used to spot data entry errors
pub static PLAUSIBILITY_LIMITS: Lazy<PlausibilityLimits> = Lazy::new(PlausibilityLimits::clinical);

/// Male and female ranges for one biomarker
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SexSpecificRange {
    pub male: ReferenceRange,
    pub female: ReferenceRange,
}

impl SexSpecificRange {
    /// Same range for both sexes
    pub const fn shared(lower: f64, upper: f64) -> Self {
        Self {
            male: ReferenceRange::new(lower, upper),
            female: ReferenceRange::new(lower, upper),
        }
    }

    pub fn for_sex(&self, sex: Sex) -> ReferenceRange {
        match sex {
            Sex::Male => self.male,
            Sex::Female => self.female,
        }
    }
}

/// Reference ranges for every biomarker, indexed in panel order
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    ranges: [SexSpecificRange; 9],
}

impl ReferenceTable {
    /// Build a table from ranges given in `Biomarker::ALL` order
    pub fn new(ranges: [SexSpecificRange; 9]) -> Self {
        Self { ranges }
    }

    /// The clinical table the service scores against
    pub fn clinical() -> Self {
        Self::new([
            // Glucose, fasting
            SexSpecificRange::shared(70.0, 99.0),
            // HbA1c
            SexSpecificRange::shared(4.0, 5.6),
            // Systolic BP
            SexSpecificRange::shared(90.0, 119.0),
            // Diastolic BP
            SexSpecificRange::shared(60.0, 79.0),
            // LDL
            SexSpecificRange::shared(0.0, 99.0),
            // HDL: 45 mg/dL is in range for female records and low for male records
            SexSpecificRange {
                male: ReferenceRange::new(50.0, 100.0),
                female: ReferenceRange::new(40.0, 100.0),
            },
            // Triglycerides
            SexSpecificRange::shared(0.0, 149.0),
            // Haemoglobin
            SexSpecificRange {
                male: ReferenceRange::new(13.5, 17.5),
                female: ReferenceRange::new(12.0, 15.5),
            },
            // MCV
            SexSpecificRange::shared(80.0, 100.0),
        ])
    }

    pub fn range_for(&self, biomarker: Biomarker, sex: Sex) -> ReferenceRange {
        self.ranges[biomarker as usize].for_sex(sex)
    }

    /// Iterate the table in panel order
    pub fn iter(&self) -> impl Iterator<Item = (Biomarker, &SexSpecificRange)> {
        Biomarker::ALL.iter().copied().zip(self.ranges.iter())
    }

    /// Check every range is finite and non-degenerate
    pub fn validate(&self) -> Result<(), String> {
        for (biomarker, entry) in self.iter() {
            for range in [entry.male, entry.female] {
                if !range.lower.is_finite() || !range.upper.is_finite() || range.lower >= range.upper {
                    return Err(format!(
                        "Invalid reference range for {}: [{}, {}]",
                        biomarker, range.lower, range.upper
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Sex-independent plausibility bounds per biomarker
#[derive(Debug, Clone, PartialEq)]
pub struct PlausibilityLimits {
    limits: [ReferenceRange; 9],
}

impl PlausibilityLimits {
    pub fn clinical() -> Self {
        Self {
            limits: [
                ReferenceRange::new(40.0, 500.0),
                ReferenceRange::new(3.0, 20.0),
                ReferenceRange::new(70.0, 250.0),
                ReferenceRange::new(40.0, 150.0),
                ReferenceRange::new(20.0, 400.0),
                ReferenceRange::new(10.0, 150.0),
                ReferenceRange::new(30.0, 1000.0),
                ReferenceRange::new(5.0, 25.0),
                ReferenceRange::new(50.0, 130.0),
            ],
        }
    }

    pub fn range_for(&self, biomarker: Biomarker) -> ReferenceRange {
        self.limits[biomarker as usize]
    }

    pub fn is_plausible(&self, biomarker: Biomarker, value: f64) -> bool {
        self.range_for(biomarker).contains(value)
    }
}
