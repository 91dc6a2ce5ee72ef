//! Feature vector assembly and polynomial expansion.
//!
//! Column order is part of the model contract and must match training:
//! age, avg_glucose_level, heart_disease, hypertension, ever_married,
//! smoking_status, work_type, gender, then age_sq, age_glucose, glucose_sq.

use super::patient::PatientInput;

/// Number of raw (pre-polynomial) features.
pub const RAW_FEATURE_COUNT: usize = 8;

/// Number of features after polynomial expansion.
pub const FEATURE_COUNT: usize = RAW_FEATURE_COUNT + 3;

/// Column names in model order.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "age",
    "avg_glucose_level",
    "heart_disease",
    "hypertension",
    "ever_married",
    "smoking_status",
    "work_type",
    "gender",
    "age_sq",
    "age_glucose",
    "glucose_sq",
];

/// The eight user-facing features, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawFeature {
    Age,
    AvgGlucose,
    HeartDisease,
    Hypertension,
    EverMarried,
    SmokingStatus,
    WorkType,
    Gender,
}

impl RawFeature {
    pub const ALL: [Self; RAW_FEATURE_COUNT] = [
        Self::Age,
        Self::AvgGlucose,
        Self::HeartDisease,
        Self::Hypertension,
        Self::EverMarried,
        Self::SmokingStatus,
        Self::WorkType,
        Self::Gender,
    ];

    /// Position in the feature vector.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label for charts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::AvgGlucose => "Avg Glucose",
            Self::HeartDisease => "Heart Disease",
            Self::Hypertension => "Hypertension",
            Self::EverMarried => "Ever Married",
            Self::SmokingStatus => "Smoking Status",
            Self::WorkType => "Work Type",
            Self::Gender => "Gender",
        }
    }
}

/// Raw 8-element feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFeatures(pub [f64; RAW_FEATURE_COUNT]);

impl RawFeatures {
    /// Assemble the raw vector from a resolved input.
    #[must_use]
    pub fn from_input(input: &PatientInput) -> Self {
        Self([
            f64::from(input.age),
            input.avg_glucose_level,
            f64::from(input.heart_disease.code()),
            f64::from(input.hypertension.code()),
            f64::from(input.ever_married.code()),
            f64::from(input.smoking_status.code()),
            f64::from(input.work_type.code()),
            f64::from(input.gender.code()),
        ])
    }

    #[must_use]
    pub fn age(&self) -> f64 {
        self.0[RawFeature::Age.index()]
    }

    #[must_use]
    pub fn glucose(&self) -> f64 {
        self.0[RawFeature::AvgGlucose.index()]
    }

    /// Append age², age×glucose and glucose².
    #[must_use]
    pub fn expand(&self) -> FeatureVector {
        let (age, glucose) = (self.age(), self.glucose());
        let mut values = [0.0; FEATURE_COUNT];
        values[..RAW_FEATURE_COUNT].copy_from_slice(&self.0);
        values[RAW_FEATURE_COUNT] = age * age;
        values[RAW_FEATURE_COUNT + 1] = age * glucose;
        values[RAW_FEATURE_COUNT + 2] = glucose * glucose;
        FeatureVector(values)
    }
}

/// Expanded 11-element feature vector, before standardization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}
