//! Canned recommendation text keyed on risk band.

use super::assessment::RiskBand;

/// Headline and action items for one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub headline: &'static str,
    pub actions: &'static [&'static str],
}

/// Prevention tips shown regardless of band.
pub const GENERAL_TIPS: &[&str] = &[
    "Discuss these results with your healthcare provider.",
    "Develop a personalised prevention plan.",
    "Schedule regular monitoring of risk factors.",
    "Learn the warning signs of stroke (F.A.S.T.) and what to do in an emergency.",
    "Eat more fruits and vegetables, reduce salt and processed foods.",
    "Maintain a healthy weight and sleep schedule.",
    "Monitor chronic conditions like diabetes or hypertension.",
];

impl Recommendation {
    #[must_use]
    pub fn for_band(band: RiskBand) -> Self {
        match band {
            RiskBand::Zero => Self {
                headline: "Incredible! Your calculated stroke risk is 0.00%. Keep up these great habits!",
                actions: &[
                    "Continue your current healthy lifestyle habits.",
                    "Maintain balanced diet, regular exercise, and stress management.",
                    "Keep up routine health checkups to stay on track.",
                ],
            },
            RiskBand::Low => Self {
                headline: "You have a low risk. Keep up the good work!",
                actions: &[
                    "Keep up with regular health checkups.",
                    "Maintain a balanced diet and exercise.",
                    "Avoid smoking and manage stress effectively.",
                ],
            },
            RiskBand::Moderate => Self {
                headline: "You are at moderate risk. Take proactive steps to lower it.",
                actions: &[
                    "Monitor and manage blood pressure and glucose levels.",
                    "Limit alcohol intake and avoid smoking.",
                    "Consider lifestyle modifications like increasing physical activity.",
                ],
            },
            RiskBand::High => Self {
                headline: "You are at high risk. Please take immediate action.",
                actions: &[
                    "Seek medical advice for detailed cardiovascular assessment.",
                    "Take prescribed medications if necessary (e.g., antihypertensives).",
                    "Adopt a strict healthy diet and consistent physical activity routine.",
                    "Completely avoid tobacco products and excessive alcohol.",
                ],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANDS: [RiskBand; 4] = [RiskBand::Zero, RiskBand::Low, RiskBand::Moderate, RiskBand::High];

    #[test]
    fn test_every_band_has_text() {
        for band in BANDS {
            let rec = Recommendation::for_band(band);
            assert!(!rec.headline.is_empty(), "{band}");
            assert!(!rec.actions.is_empty(), "{band}");
        }
        assert!(!GENERAL_TIPS.is_empty());
    }

    #[test]
    fn test_bands_have_distinct_headlines() {
        for (i, a) in BANDS.iter().enumerate() {
            for b in &BANDS[i + 1..] {
                assert_ne!(
                    Recommendation::for_band(*a).headline,
                    Recommendation::for_band(*b).headline
                );
            }
        }
    }

    #[test]
    fn test_headlines_match_band() {
        assert!(Recommendation::for_band(RiskBand::Zero).headline.contains("0.00%"));
        assert!(Recommendation::for_band(RiskBand::High).headline.contains("high risk"));
    }
}
