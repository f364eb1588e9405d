// Public entities for the Health Score API
// This module contains data structures that are shared across the application boundary

// Scoring requests and responses
pub mod health_score;

// Data quality reports
pub mod quality;

// Reference ranges and scoring profile views
pub mod reference;
