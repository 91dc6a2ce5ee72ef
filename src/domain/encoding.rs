//! Categorical encoding tables.
//!
//! The codes below are the ones the deployed classifier was trained with.
//! They are pinned by [`ENCODING_VERSION`]; every model artifact declares the
//! version it expects and is refused on mismatch. Changing any code here
//! without retraining silently corrupts predictions, so the tables are
//! covered by literal tests.

use serde::{Deserialize, Serialize};

use crate::StrokeRiskError;

/// Version tag of the encoding tables in this module.
pub const ENCODING_VERSION: &str = "stroke-enc-v1";

/// Categorical fields of the intake record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    HeartDisease,
    Hypertension,
    EverMarried,
    SmokingStatus,
    WorkType,
    Gender,
}

impl CategoricalField {
    /// Column name as used in the training data.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HeartDisease => "heart_disease",
            Self::Hypertension => "hypertension",
            Self::EverMarried => "ever_married",
            Self::SmokingStatus => "smoking_status",
            Self::WorkType => "work_type",
            Self::Gender => "gender",
        }
    }

    /// Labels accepted for this field, in form display order.
    #[must_use]
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Self::HeartDisease | Self::Hypertension | Self::EverMarried => &["Yes", "No"],
            Self::SmokingStatus => &["never smoked", "formerly smoked", "smokes"],
            Self::WorkType => &["Private", "Self-employed", "Govt_job", "Never_worked"],
            Self::Gender => &["Male", "Female"],
        }
    }
}

impl std::fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode a categorical label for the given field.
///
/// # Errors
/// Returns `StrokeRiskError::EncodingDefect` if `value` is not a key of the
/// field's table. The value is never coerced to a default code.
pub fn encode(field: CategoricalField, value: &str) -> Result<u8, StrokeRiskError> {
    let code = match field {
        CategoricalField::HeartDisease
        | CategoricalField::Hypertension
        | CategoricalField::EverMarried => Answer::from_label(field, value)?.code(),
        CategoricalField::SmokingStatus => SmokingStatus::from_label(value)?.code(),
        CategoricalField::WorkType => WorkType::from_label(value)?.code(),
        CategoricalField::Gender => Gender::from_label(value)?.code(),
    };
    Ok(code)
}

fn defect(field: CategoricalField, value: &str) -> StrokeRiskError {
    StrokeRiskError::EncodingDefect {
        field: field.name(),
        value: value.to_owned(),
    }
}

/// Yes/No answer (heart disease, hypertension, ever married).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub const ALL: [Self; 2] = [Self::Yes, Self::No];

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Yes => 1,
            Self::No => 0,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    /// Parse a form label. `field` only names the field in the error.
    ///
    /// # Errors
    /// Returns `EncodingDefect` for anything but "Yes" or "No".
    pub fn from_label(field: CategoricalField, value: &str) -> Result<Self, StrokeRiskError> {
        Self::ALL
            .into_iter()
            .find(|a| a.label() == value)
            .ok_or_else(|| defect(field, value))
    }
}

/// Gender as recorded in the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Female => 0,
            Self::Male => 1,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// # Errors
    /// Returns `EncodingDefect` for unknown labels.
    pub fn from_label(value: &str) -> Result<Self, StrokeRiskError> {
        Self::ALL
            .into_iter()
            .find(|g| g.label() == value)
            .ok_or_else(|| defect(CategoricalField::Gender, value))
    }
}

/// Employment category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkType {
    #[serde(rename = "Private")]
    Private,
    #[serde(rename = "Self-employed")]
    SelfEmployed,
    #[serde(rename = "Govt_job")]
    GovtJob,
    #[serde(rename = "Never_worked")]
    NeverWorked,
}

impl WorkType {
    pub const ALL: [Self; 4] = [
        Self::Private,
        Self::SelfEmployed,
        Self::GovtJob,
        Self::NeverWorked,
    ];

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::GovtJob => 0,
            Self::NeverWorked => 1,
            Self::Private => 2,
            Self::SelfEmployed => 3,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::SelfEmployed => "Self-employed",
            Self::GovtJob => "Govt_job",
            Self::NeverWorked => "Never_worked",
        }
    }

    /// # Errors
    /// Returns `EncodingDefect` for unknown labels.
    pub fn from_label(value: &str) -> Result<Self, StrokeRiskError> {
        Self::ALL
            .into_iter()
            .find(|w| w.label() == value)
            .ok_or_else(|| defect(CategoricalField::WorkType, value))
    }
}

/// Smoking history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingStatus {
    #[serde(rename = "never smoked")]
    NeverSmoked,
    #[serde(rename = "formerly smoked")]
    FormerlySmoked,
    #[serde(rename = "smokes")]
    Smokes,
}

impl SmokingStatus {
    pub const ALL: [Self; 3] = [Self::NeverSmoked, Self::FormerlySmoked, Self::Smokes];

    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::FormerlySmoked => 0,
            Self::NeverSmoked => 1,
            Self::Smokes => 2,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NeverSmoked => "never smoked",
            Self::FormerlySmoked => "formerly smoked",
            Self::Smokes => "smokes",
        }
    }

    /// # Errors
    /// Returns `EncodingDefect` for unknown labels.
    pub fn from_label(value: &str) -> Result<Self, StrokeRiskError> {
        Self::ALL
            .into_iter()
            .find(|s| s.label() == value)
            .ok_or_else(|| defect(CategoricalField::SmokingStatus, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_tables() {
        for field in [
            CategoricalField::HeartDisease,
            CategoricalField::Hypertension,
            CategoricalField::EverMarried,
        ] {
            assert_eq!(encode(field, "Yes").expect("Yes"), 1);
            assert_eq!(encode(field, "No").expect("No"), 0);
        }
    }

    #[test]
    fn test_smoking_table() {
        let f = CategoricalField::SmokingStatus;
        assert_eq!(encode(f, "formerly smoked").expect("formerly"), 0);
        assert_eq!(encode(f, "never smoked").expect("never"), 1);
        assert_eq!(encode(f, "smokes").expect("smokes"), 2);
    }

    #[test]
    fn test_work_type_table() {
        let f = CategoricalField::WorkType;
        assert_eq!(encode(f, "Govt_job").expect("govt"), 0);
        assert_eq!(encode(f, "Never_worked").expect("never"), 1);
        assert_eq!(encode(f, "Private").expect("private"), 2);
        assert_eq!(encode(f, "Self-employed").expect("self"), 3);
    }

    #[test]
    fn test_gender_table() {
        let f = CategoricalField::Gender;
        assert_eq!(encode(f, "Female").expect("female"), 0);
        assert_eq!(encode(f, "Male").expect("male"), 1);
    }

    #[test]
    fn test_every_listed_label_encodes() {
        for field in [
            CategoricalField::HeartDisease,
            CategoricalField::Hypertension,
            CategoricalField::EverMarried,
            CategoricalField::SmokingStatus,
            CategoricalField::WorkType,
            CategoricalField::Gender,
        ] {
            for label in field.labels() {
                assert!(encode(field, label).is_ok(), "{field}: {label}");
            }
        }
    }

    #[test]
    fn test_unknown_labels_are_not_coerced() {
        let cases = [
            (CategoricalField::Gender, "Other"),
            (CategoricalField::SmokingStatus, "Unknown"),
            (CategoricalField::WorkType, "children"),
            (CategoricalField::Hypertension, "yes"),
            (CategoricalField::EverMarried, "Select option"),
        ];
        for (field, value) in cases {
            match encode(field, value) {
                Err(StrokeRiskError::EncodingDefect { field: f, value: v }) => {
                    assert_eq!(f, field.name());
                    assert_eq!(v, value);
                }
                other => panic!("{field}/{value}: expected EncodingDefect, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_serde_uses_form_labels() {
        let json = serde_json::to_string(&SmokingStatus::NeverSmoked).expect("serialize");
        assert_eq!(json, "\"never smoked\"");
        let work: WorkType = serde_json::from_str("\"Self-employed\"").expect("deserialize");
        assert_eq!(work, WorkType::SelfEmployed);
    }
}
