//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;

use async_trait::async_trait;
use health_score_data::reference::CLINICAL_REFERENCE_TABLE;
use health_score_data::repository::ProfileRepositoryTrait;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

impl SystemStatus {
    /// Worst status among the components
    pub fn from_components<'a>(components: impl IntoIterator<Item = &'a HealthComponent>) -> Self {
        let mut status = SystemStatus::Healthy;
        for component in components {
            match component.status {
                ComponentStatus::Unhealthy => return SystemStatus::Unhealthy,
                ComponentStatus::Degraded => status = SystemStatus::Degraded,
                ComponentStatus::Healthy => {}
            }
        }
        status
    }
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced performance
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

impl HealthComponent {
    fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            details: None,
        }
    }
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;
}

/// Check the static reference table is well formed
pub fn check_reference_table() -> HealthComponent {
    match CLINICAL_REFERENCE_TABLE.validate() {
        Ok(()) => HealthComponent::healthy(),
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    }
}

/// Check an active scoring profile is available and valid
///
/// A profile that exists but fails validation is reported as degraded:
/// scoring still runs, but against a questionable calibration.
pub fn check_scoring_profile(repository: &dyn ProfileRepositoryTrait) -> HealthComponent {
    match repository.active_profile() {
        Ok(profile) => match profile.validate() {
            Ok(()) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(format!("active profile {}", profile.version)),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some(e),
            },
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e.to_string()),
        },
    }
}

/// Get overall system health
pub fn get_system_health(repository: &dyn ProfileRepositoryTrait) -> SystemHealth {
    let components: HashMap<String, HealthComponent> = vec![
        ("reference_table".to_string(), check_reference_table()),
        ("scoring_profile".to_string(), check_scoring_profile(repository)),
    ]
    .into_iter()
    .collect();

    SystemHealth {
        status: SystemStatus::from_components(components.values()),
        components,
    }
}
