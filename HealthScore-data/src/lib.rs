// Health Score Data
// This crate holds the clinical reference data and scoring calibrations

// Static reference tables
pub mod reference;

// Scoring profile repository
pub mod repository;

// Data models
pub mod models;
