//! Patient intake types for stroke risk prediction.
//!
//! `PatientSubmission` is what the intake form hands over: every field may
//! still be unresolved and categories travel as their display labels.
//! `PatientInput` is the fully resolved record the pipeline accepts.

use serde::{Deserialize, Serialize};

use super::encoding::{Answer, CategoricalField, Gender, SmokingStatus, WorkType};
use crate::StrokeRiskError;

/// Accepted age range in whole years.
pub const AGE_RANGE: (u32, u32) = (18, 100);

/// Accepted average glucose range in mg/dL.
pub const GLUCOSE_RANGE: (f64, f64) = (55.0, 300.0);

/// Resolved patient record, guaranteed complete and in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Age in years (18-100)
    pub age: u32,

    /// Average glucose level in mg/dL (55-300)
    pub avg_glucose_level: f64,

    pub gender: Gender,
    pub ever_married: Answer,
    pub work_type: WorkType,
    pub hypertension: Answer,
    pub heart_disease: Answer,
    pub smoking_status: SmokingStatus,
}

impl PatientInput {
    /// Validate that numeric fields are within their documented ranges.
    ///
    /// # Errors
    /// Returns `StrokeRiskError::Validation` listing every violation.
    pub fn validate(&self) -> Result<(), StrokeRiskError> {
        let mut errors = Vec::new();

        if !(AGE_RANGE.0..=AGE_RANGE.1).contains(&self.age) {
            errors.push(format!(
                "Age {} out of range [{}, {}]",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            ));
        }
        if !(GLUCOSE_RANGE.0..=GLUCOSE_RANGE.1).contains(&self.avg_glucose_level) {
            errors.push(format!(
                "Average glucose {} out of range [{}, {}]",
                self.avg_glucose_level, GLUCOSE_RANGE.0, GLUCOSE_RANGE.1
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StrokeRiskError::Validation(errors.join("; ")))
        }
    }
}

/// Form submission before resolution.
///
/// Categorical values are the labels shown to the user ("never smoked",
/// "Govt_job", ...). `None` means the field was left on its placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientSubmission {
    pub age: Option<u32>,
    pub avg_glucose_level: Option<f64>,
    pub gender: Option<String>,
    pub ever_married: Option<String>,
    pub work_type: Option<String>,
    pub hypertension: Option<String>,
    pub heart_disease: Option<String>,
    pub smoking_status: Option<String>,
}

impl PatientSubmission {
    /// Names of fields still unresolved, in form order.
    #[must_use]
    pub fn unresolved_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("age", self.age.is_none()),
            ("avg_glucose_level", self.avg_glucose_level.is_none()),
            ("gender", self.gender.is_none()),
            ("ever_married", self.ever_married.is_none()),
            ("work_type", self.work_type.is_none()),
            ("hypertension", self.hypertension.is_none()),
            ("heart_disease", self.heart_disease.is_none()),
            ("smoking_status", self.smoking_status.is_none()),
        ];
        checks
            .into_iter()
            .filter_map(|(name, missing)| missing.then_some(name))
            .collect()
    }

    /// Resolve into a complete, validated `PatientInput`.
    ///
    /// # Errors
    /// - `UserInputIncomplete` if any field is unresolved (no defaults are substituted)
    /// - `EncodingDefect` if a categorical label is outside its lookup table
    /// - `Validation` if a numeric field is out of range
    pub fn resolve(&self) -> Result<PatientInput, StrokeRiskError> {
        let missing = self.unresolved_fields();
        if !missing.is_empty() {
            return Err(StrokeRiskError::UserInputIncomplete(missing));
        }

        let label = |value: &Option<String>| value.as_deref().unwrap_or_default().to_owned();

        let input = PatientInput {
            age: self.age.unwrap_or_default(),
            avg_glucose_level: self.avg_glucose_level.unwrap_or_default(),
            gender: Gender::from_label(&label(&self.gender))?,
            ever_married: Answer::from_label(CategoricalField::EverMarried, &label(&self.ever_married))?,
            work_type: WorkType::from_label(&label(&self.work_type))?,
            hypertension: Answer::from_label(CategoricalField::Hypertension, &label(&self.hypertension))?,
            heart_disease: Answer::from_label(CategoricalField::HeartDisease, &label(&self.heart_disease))?,
            smoking_status: SmokingStatus::from_label(&label(&self.smoking_status))?,
        };
        input.validate()?;
        Ok(input)
    }
}

impl From<&PatientInput> for PatientSubmission {
    fn from(input: &PatientInput) -> Self {
        Self {
            age: Some(input.age),
            avg_glucose_level: Some(input.avg_glucose_level),
            gender: Some(input.gender.label().to_owned()),
            ever_married: Some(input.ever_married.label().to_owned()),
            work_type: Some(input.work_type.label().to_owned()),
            hypertension: Some(input.hypertension.label().to_owned()),
            heart_disease: Some(input.heart_disease.label().to_owned()),
            smoking_status: Some(input.smoking_status.label().to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_submission() -> PatientSubmission {
        PatientSubmission {
            age: Some(45),
            avg_glucose_level: Some(110.0),
            gender: Some("Female".into()),
            ever_married: Some("Yes".into()),
            work_type: Some("Private".into()),
            hypertension: Some("No".into()),
            heart_disease: Some("No".into()),
            smoking_status: Some("never smoked".into()),
        }
    }

    #[test]
    fn test_resolve_complete_submission() {
        let input = complete_submission().resolve().expect("Should resolve");
        assert_eq!(input.age, 45);
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.work_type, WorkType::Private);
        assert_eq!(input.smoking_status, SmokingStatus::NeverSmoked);
        assert_eq!(input.ever_married, Answer::Yes);
    }

    #[test]
    fn test_unresolved_fields_block_resolution() {
        let submission = PatientSubmission {
            gender: None,
            smoking_status: None,
            ..complete_submission()
        };

        match submission.resolve() {
            Err(StrokeRiskError::UserInputIncomplete(fields)) => {
                assert_eq!(fields, vec!["gender", "smoking_status"]);
            }
            other => panic!("expected UserInputIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_submission_lists_every_field() {
        let fields = PatientSubmission::default().unresolved_fields();
        assert_eq!(fields.len(), 8);
    }

    #[test]
    fn test_unknown_category_is_encoding_defect() {
        let submission = PatientSubmission {
            work_type: Some("children".into()),
            ..complete_submission()
        };

        match submission.resolve() {
            Err(StrokeRiskError::EncodingDefect { field, value }) => {
                assert_eq!(field, "work_type");
                assert_eq!(value, "children");
            }
            other => panic!("expected EncodingDefect, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let young = PatientSubmission {
            age: Some(17),
            ..complete_submission()
        };
        assert!(matches!(young.resolve(), Err(StrokeRiskError::Validation(_))));

        let glucose = PatientSubmission {
            avg_glucose_level: Some(320.0),
            ..complete_submission()
        };
        assert!(matches!(glucose.resolve(), Err(StrokeRiskError::Validation(_))));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let edges = PatientSubmission {
            age: Some(100),
            avg_glucose_level: Some(55.0),
            ..complete_submission()
        };
        assert!(edges.resolve().is_ok());
    }

    #[test]
    fn test_submission_round_trips_through_input() {
        let input = complete_submission().resolve().expect("Should resolve");
        let again = PatientSubmission::from(&input).resolve().expect("Should resolve");
        assert_eq!(input, again);
    }
}
