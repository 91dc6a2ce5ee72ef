//! Per-feature contribution attribution.
//!
//! Raw explainer output is restricted to the eight user-facing features,
//! taken as magnitudes and rescaled so the contributions sum to the
//! predicted probability.

use serde::{Deserialize, Serialize};

use super::features::{RawFeature, FEATURE_COUNT, RAW_FEATURE_COUNT};
use crate::StrokeRiskError;

/// Share of the total predicted risk attributed to one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    /// Position of the feature in the raw vector
    pub index: usize,

    /// Fraction of 1.0; all eight sum to the probability
    pub share: f64,
}

impl FeatureContribution {
    #[must_use]
    pub fn feature(&self) -> RawFeature {
        RawFeature::ALL[self.index]
    }

    /// Contribution in percentage points of total risk.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.share * 100.0
    }
}

/// Normalize raw attributions into contributions that sum to `probability`.
///
/// `raw` is the explainer output over all model columns; only the first
/// eight (pre-polynomial) positions are used.
///
/// A probability of exactly zero yields all-zero contributions without
/// looking at `raw`.
///
/// # Errors
/// - `ShapeMismatch` if `raw` does not cover every model column
/// - `AttributionInconsistency` if a used value is non-finite, or if all
///   used values are zero while the probability is not
pub fn attribute(
    raw: &[f64],
    probability: f64,
) -> Result<[FeatureContribution; RAW_FEATURE_COUNT], StrokeRiskError> {
    if raw.len() != FEATURE_COUNT {
        return Err(StrokeRiskError::ShapeMismatch {
            stage: "attribution",
            expected: FEATURE_COUNT,
            actual: raw.len(),
        });
    }

    let mut contributions = [FeatureContribution {
        index: 0,
        share: 0.0,
    }; RAW_FEATURE_COUNT];
    for (i, c) in contributions.iter_mut().enumerate() {
        c.index = i;
    }

    if probability == 0.0 {
        return Ok(contributions);
    }

    let magnitudes: Vec<f64> = raw[..RAW_FEATURE_COUNT].iter().map(|v| v.abs()).collect();
    if let Some(pos) = magnitudes.iter().position(|m| !m.is_finite()) {
        return Err(StrokeRiskError::AttributionInconsistency(format!(
            "non-finite attribution for {}",
            RawFeature::ALL[pos].label()
        )));
    }

    let total: f64 = magnitudes.iter().sum();
    if total == 0.0 {
        return Err(StrokeRiskError::AttributionInconsistency(format!(
            "explainer attributes nothing to a prediction of {probability:.4}"
        )));
    }

    for (c, m) in contributions.iter_mut().zip(magnitudes) {
        c.share = m / total * probability;
    }
    Ok(contributions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: [f64; RAW_FEATURE_COUNT]) -> Vec<f64> {
        let mut v = values.to_vec();
        v.extend([9.0, -9.0, 9.0]);
        v
    }

    #[test]
    fn test_contributions_sum_to_probability() {
        let r = raw([0.4, -0.2, 0.05, -0.1, 0.0, 0.3, -0.02, 0.01]);
        for probability in [0.0001, 0.12, 0.5, 0.87, 1.0] {
            let c = attribute(&r, probability).expect("Should attribute");
            let sum: f64 = c.iter().map(FeatureContribution::percent).sum();
            assert!((sum - probability * 100.0).abs() < 1e-9, "{sum}");
        }
    }

    #[test]
    fn test_signs_are_discarded() {
        let r = raw([-1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let c = attribute(&r, 0.4).expect("Should attribute");
        assert!((c[0].share - 0.2).abs() < 1e-12);
        assert!((c[1].share - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_polynomial_columns_are_ignored() {
        let mut r = raw([1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        r[8] = 1000.0;
        let c = attribute(&r, 0.5).expect("Should attribute");
        assert!((c[0].share - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_probability_forces_zero_contributions() {
        let r = raw([0.0; RAW_FEATURE_COUNT]);
        let c = attribute(&r, 0.0).expect("Zero probability is not an error");
        assert!(c.iter().all(|x| x.share == 0.0));

        let nonzero = raw([0.3, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let c = attribute(&nonzero, 0.0).expect("Zero probability is not an error");
        assert_eq!(c.map(|x| x.share), [0.0; RAW_FEATURE_COUNT]);
    }

    #[test]
    fn test_empty_attribution_with_risk_is_inconsistent() {
        let r = raw([0.0; RAW_FEATURE_COUNT]);
        assert!(matches!(
            attribute(&r, 0.25),
            Err(StrokeRiskError::AttributionInconsistency(_))
        ));
    }

    #[test]
    fn test_non_finite_attribution_is_inconsistent() {
        let r = raw([0.1, f64::NAN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            attribute(&r, 0.25),
            Err(StrokeRiskError::AttributionInconsistency(_))
        ));
    }

    #[test]
    fn test_short_explanation_is_shape_error() {
        assert!(matches!(
            attribute(&[0.1; RAW_FEATURE_COUNT], 0.25),
            Err(StrokeRiskError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_contributions_keep_feature_order() {
        let r = raw([0.1; RAW_FEATURE_COUNT]);
        let c = attribute(&r, 0.8).expect("Should attribute");
        for (i, contribution) in c.iter().enumerate() {
            assert_eq!(contribution.feature(), RawFeature::ALL[i]);
        }
    }
}
