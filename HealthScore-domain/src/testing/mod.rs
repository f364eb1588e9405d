// Testing utilities and fixtures for the domain layer
// Available to this crate's tests and, with the "mock" feature, to dependents

use std::collections::HashMap;

use async_trait::async_trait;

use health_score_data::models::{Biomarker, Sex};
use health_score_data::reference::CLINICAL_REFERENCE_TABLE;

use crate::entities::{BiomarkerInput, BiomarkerRecord};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};

/// Record with every biomarker at the midpoint of its reference range
pub fn midpoint_record(sex: Sex) -> BiomarkerRecord {
    let value = |biomarker: Biomarker| CLINICAL_REFERENCE_TABLE.range_for(biomarker, sex).midpoint();

    BiomarkerRecord {
        glucose: value(Biomarker::Glucose),
        hba1c: value(Biomarker::Hba1c),
        systolic_bp: value(Biomarker::SystolicBp),
        diastolic_bp: value(Biomarker::DiastolicBp),
        ldl: value(Biomarker::Ldl),
        hdl: value(Biomarker::Hdl),
        triglycerides: value(Biomarker::Triglycerides),
        haemoglobin: value(Biomarker::Haemoglobin),
        mcv: value(Biomarker::Mcv),
        sex,
    }
}

/// Complete input equivalent to `midpoint_record`
pub fn midpoint_input(sex: Sex) -> BiomarkerInput {
    BiomarkerInput::from(&midpoint_record(sex))
}

/// Health service with fixed, configurable component statuses
#[derive(Debug)]
pub struct MockHealthService {
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Every component healthy
    pub fn new() -> Self {
        let mut components = HashMap::new();
        for name in ["reference_table", "scoring_profile"] {
            components.insert(
                name.to_string(),
                HealthComponent {
                    status: ComponentStatus::Healthy,
                    details: None,
                },
            );
        }
        Self { components }
    }

    /// Override one component
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        SystemHealth {
            status: SystemStatus::from_components(self.components.values()),
            components: self.components.clone(),
        }
    }
}
