use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive clinical reference interval for one biomarker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReferenceRange {
    /// Lowest value still considered normal
    pub lower: f64,

    /// Highest value still considered normal
    pub upper: f64,
}

/// Where a value sits relative to its reference range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    /// Below the lower bound
    Low,
    /// Within the bounds, endpoints included
    Normal,
    /// Above the upper bound
    High,
}

impl fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeStatus::Low => f.write_str("low"),
            RangeStatus::Normal => f.write_str("normal"),
            RangeStatus::High => f.write_str("high"),
        }
    }
}

impl ReferenceRange {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn status(&self, value: f64) -> RangeStatus {
        if value < self.lower {
            RangeStatus::Low
        } else if value > self.upper {
            RangeStatus::High
        } else {
            RangeStatus::Normal
        }
    }

    /// Absolute distance from the nearest bound, zero inside the range
    pub fn distance_outside(&self, value: f64) -> f64 {
        if value < self.lower {
            self.lower - value
        } else if value > self.upper {
            value - self.upper
        } else {
            0.0
        }
    }
}
