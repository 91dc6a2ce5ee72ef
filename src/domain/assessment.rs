//! Assessment result types.
//!
//! Represents the output of one pass through the stroke risk pipeline.

use serde::{Deserialize, Serialize};

use super::attribution::FeatureContribution;
use super::features::RAW_FEATURE_COUNT;

/// Risk band, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    /// Predicted probability is exactly zero
    Zero,
    /// Below 30%
    Low,
    /// 30% up to but excluding 70%
    Moderate,
    /// 70% and above
    High,
}

impl RiskBand {
    /// Bucket a probability. Thresholds compare in probability space so
    /// 0.30 and 0.70 land exactly on their upper band.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability == 0.0 {
            Self::Zero
        } else if probability < 0.30 {
            Self::Low
        } else if probability < 0.70 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Zero => "No measurable risk",
            Self::Low => "Low risk - Maintain current habits",
            Self::Moderate => "Moderate risk - Proactive steps advised",
            Self::High => "High risk - Prompt medical consultation advised",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Zero => (56, 189, 248),     // Sky (#38BDF8)
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Moderate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),      // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zero => write!(f, "ZERO"),
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Probability plus the per-feature breakdown shown on the results chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of stroke (0.0 to 1.0)
    pub probability: f64,

    /// One entry per raw feature, in model order
    pub contributions: [FeatureContribution; RAW_FEATURE_COUNT],
}

impl PredictionResult {
    /// Probability as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }

    #[must_use]
    pub fn band(&self) -> RiskBand {
        RiskBand::from_probability(self.probability)
    }

    /// The contribution with the largest share, if any share is non-zero.
    #[must_use]
    pub fn dominant(&self) -> Option<&FeatureContribution> {
        self.contributions
            .iter()
            .filter(|c| c.share > 0.0)
            .max_by(|a, b| a.share.total_cmp(&b.share))
    }
}

/// Complete assessment record including metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier
    pub id: String,

    pub result: PredictionResult,

    pub band: RiskBand,

    /// Identifier of the model artifact that produced the result
    pub model_id: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    #[must_use]
    pub fn new(result: PredictionResult, model_id: impl Into<String>) -> Self {
        Self {
            id: uuid_v4(),
            band: result.band(),
            result,
            model_id: model_id.into(),
            created_at: chrono::Utc::now(),
        }
    }
}

/// Generate a random UUID v4 from a ChaCha20 CSPRNG seeded by the OS.
fn uuid_v4() -> String {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribution::attribute;

    fn result(probability: f64) -> PredictionResult {
        let raw = [0.5, 0.25, 0.0, 0.1, 0.0, 0.05, 0.0, 0.1, 0.0, 0.0, 0.0];
        PredictionResult {
            probability,
            contributions: attribute(&raw, probability).expect("Should attribute"),
        }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RiskBand::from_probability(0.0), RiskBand::Zero);
        assert_eq!(RiskBand::from_probability(0.2999), RiskBand::Low);
        assert_eq!(RiskBand::from_probability(0.30), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.6999), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.70), RiskBand::High);
        assert_eq!(RiskBand::from_probability(1.0), RiskBand::High);
    }

    #[test]
    fn test_smallest_positive_probability_is_low() {
        assert_eq!(RiskBand::from_probability(f64::MIN_POSITIVE), RiskBand::Low);
    }

    #[test]
    fn test_band_is_monotonic() {
        let mut previous = RiskBand::Zero;
        for step in 0..=1000 {
            let band = RiskBand::from_probability(f64::from(step) / 1000.0);
            assert!(band >= previous, "band dropped at step {step}");
            previous = band;
        }
        assert_eq!(previous, RiskBand::High);
    }

    #[test]
    fn test_zero_probability_assessment() {
        let assessment = Assessment::new(result(0.0), "test-model");
        assert_eq!(assessment.band, RiskBand::Zero);
        assert!(assessment.result.contributions.iter().all(|c| c.share == 0.0));
        assert!(assessment.result.dominant().is_none());
    }

    #[test]
    fn test_assessment_creation() {
        let assessment = Assessment::new(result(0.42), "test-model");
        assert_eq!(assessment.band, RiskBand::Moderate);
        assert_eq!(assessment.model_id, "test-model");
        assert!((assessment.result.percent() - 42.0).abs() < 1e-9);
        assert_eq!(
            assessment.result.dominant().map(|c| c.index),
            Some(0),
            "age carries the largest raw attribution"
        );
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(&id1[14..15], "4");
    }
}
