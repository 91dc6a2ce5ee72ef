//! Standardization with constants captured from the training run.
//!
//! The mean/scale pair belongs to one specific model artifact. The artifact
//! carries a copy of both arrays and is refused at load time unless it
//! matches [`Standardizer::canonical`].

use serde::{Deserialize, Serialize};

use super::features::FEATURE_COUNT;
use crate::StrokeRiskError;

/// Per-column training means (see `FEATURE_COLUMNS` for order).
pub const TRAINING_MEAN: [f64; FEATURE_COUNT] = [
    47.4572, 106.1478, // age, glucose
    0.0482, 0.0513, // heart_disease, hypertension
    0.5527, 0.5431, // ever_married, smoking_status
    2.1356, 0.5064, // work_type, gender
    1850.37, 5067.84, 11645.2, // age_sq, age_glucose, glucose_sq
];

/// Per-column training scales (standard deviations).
pub const TRAINING_SCALE: [f64; FEATURE_COUNT] = [
    15.6753, 26.8145, // age, glucose
    0.2141, 0.2206, // heart_disease, hypertension
    0.4974, 0.4983, // ever_married, smoking_status
    0.9082, 0.4999, // work_type, gender
    2978.41, 6144.78, 10795.6, // age_sq, age_glucose, glucose_sq
];

/// Feature vector after `(x - mean) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardizedVector([f64; FEATURE_COUNT]);

impl StandardizedVector {
    /// Wrap values that are already in standardized space.
    #[must_use]
    pub fn from_standardized(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Element-wise linear rescaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Standardizer {
    /// Standardizer built from the baked-in training constants.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            mean: TRAINING_MEAN.to_vec(),
            scale: TRAINING_SCALE.to_vec(),
        }
    }

    /// Build a standardizer from explicit constants.
    ///
    /// # Errors
    /// `ShapeMismatch` if either table is not 11 long, `Validation` if a
    /// constant is non-finite or a scale is zero.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, StrokeRiskError> {
        for table in [&mean, &scale] {
            if table.len() != FEATURE_COUNT {
                return Err(StrokeRiskError::ShapeMismatch {
                    stage: "standardizer constants",
                    expected: FEATURE_COUNT,
                    actual: table.len(),
                });
            }
        }
        if mean.iter().any(|m| !m.is_finite()) {
            return Err(StrokeRiskError::Validation(
                "scaler mean contains non-finite values".into(),
            ));
        }
        if scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(StrokeRiskError::Validation(
                "scaler scale must be finite and non-zero".into(),
            ));
        }
        Ok(Self { mean, scale })
    }

    /// Apply `(x[i] - mean[i]) / scale[i]`.
    ///
    /// # Errors
    /// `ShapeMismatch` if `x` does not have one value per constant.
    pub fn standardize(&self, x: &[f64]) -> Result<StandardizedVector, StrokeRiskError> {
        if x.len() != self.mean.len() || x.len() != FEATURE_COUNT {
            return Err(StrokeRiskError::ShapeMismatch {
                stage: "standardization",
                expected: FEATURE_COUNT,
                actual: x.len(),
            });
        }

        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in x.iter().enumerate() {
            out[i] = (value - self.mean[i]) / self.scale[i];
        }
        Ok(StandardizedVector(out))
    }

    /// Map a standardized vector back to feature space.
    #[must_use]
    pub fn invert(&self, z: &StandardizedVector) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in z.0.iter().enumerate() {
            out[i] = value * self.scale[i] + self.mean[i];
        }
        out
    }

    /// Whether both tables agree with `other` within `tolerance`.
    #[must_use]
    pub fn matches(&self, other: &Self, tolerance: f64) -> bool {
        let close = |a: &[f64], b: &[f64]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tolerance)
        };
        close(&self.mean, &other.mean) && close(&self.scale, &other.scale)
    }
}

impl Default for Standardizer {
    fn default() -> Self {
        Self::canonical()
    }
}
