//! Session tuning knobs, loadable from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a render request does while another pass is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Remember one pending request and start a fresh pass when the current
    /// one finishes, reading whatever state is current by then.
    #[default]
    Coalesce,
    /// Ignore the request.
    Drop,
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to parse session options: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{field} must be greater than zero")]
    ZeroBudget { field: &'static str },

    #[error("validation tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Rows computed per tick for per-pixel kinds.
    pub rows_per_tick: u32,
    /// Points emitted per tick for point-cloud kinds.
    pub ifs_points_per_tick: u32,
    pub overlap_policy: OverlapPolicy,
    /// Compare compiled kernels against the interpreted ones before using them.
    pub validate_compiled: bool,
    pub validation_tolerance: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            rows_per_tick: 8,
            ifs_points_per_tick: 25_000,
            overlap_policy: OverlapPolicy::Coalesce,
            validate_compiled: true,
            validation_tolerance: 1e-9,
        }
    }
}

impl SessionOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let options: SessionOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.rows_per_tick == 0 {
            return Err(OptionsError::ZeroBudget {
                field: "rows_per_tick",
            });
        }
        if self.ifs_points_per_tick == 0 {
            return Err(OptionsError::ZeroBudget {
                field: "ifs_points_per_tick",
            });
        }
        if !(self.validation_tolerance.is_finite() && self.validation_tolerance >= 0.0) {
            return Err(OptionsError::InvalidTolerance(self.validation_tolerance));
        }
        Ok(())
    }
}
