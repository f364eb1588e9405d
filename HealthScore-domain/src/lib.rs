// Health Score Domain
// This crate contains the business logic for the Health Score service

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the data layer types the domain API is expressed in
pub use health_score_data::models;
pub use health_score_data::reference;
pub use health_score_data::repository;

// Testing utilities - available to dependents with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
