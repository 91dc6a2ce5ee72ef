//! Assessment service: Orchestrates the stroke risk pipeline.
//!
//! This service coordinates:
//! - Submission resolution and validation
//! - Feature assembly, polynomial expansion and standardization
//! - Inference and explanation through the classifier port
//! - Attribution normalization and risk banding

use std::sync::Arc;

use crate::domain::attribution::attribute;
use crate::domain::{
    Assessment, PatientInput, PatientSubmission, PredictionResult, RawFeatures, StandardizedVector,
    Standardizer, FEATURE_COUNT,
};
use crate::ports::StrokeClassifier;
use crate::{Result, StrokeRiskError};

/// Pipeline step about to run, reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentStage {
    Preparing,
    Predicting,
    Explaining,
}

/// Runs the full pipeline against a shared, immutable classifier.
///
/// The classifier is loaded once at startup and handed in; the service
/// holds no other state, so one instance serves every submission.
pub struct AssessmentService<C>
where
    C: StrokeClassifier,
{
    classifier: Arc<C>,
    standardizer: Standardizer,
}

impl<C> AssessmentService<C>
where
    C: StrokeClassifier,
{
    /// Create a service using the compiled training constants.
    pub fn new(classifier: Arc<C>) -> Self {
        Self {
            classifier,
            standardizer: Standardizer::canonical(),
        }
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        self.classifier.model_id()
    }

    /// Encode, expand and standardize one input.
    ///
    /// # Errors
    /// Returns `Validation` for out-of-range values and `ShapeMismatch` if
    /// the standardizer tables disagree with the vector length.
    pub fn prepare(&self, input: &PatientInput) -> Result<StandardizedVector> {
        input.validate()?;
        let features = RawFeatures::from_input(input).expand();
        self.standardizer.standardize(features.as_slice())
    }

    /// Run the pipeline on a resolved input.
    ///
    /// # Errors
    /// Propagates every pipeline defect; nothing is retried.
    pub fn assess(&self, input: &PatientInput) -> Result<Assessment> {
        self.assess_with_progress(input, |_| {})
    }

    /// Resolve a raw form submission, then run the pipeline.
    ///
    /// # Errors
    /// `UserInputIncomplete` if any field is unresolved, plus everything
    /// [`Self::assess`] can return.
    pub fn assess_submission(&self, submission: &PatientSubmission) -> Result<Assessment> {
        let input = submission.resolve()?;
        self.assess(&input)
    }

    /// Run the pipeline, calling `on_stage` before each step.
    ///
    /// # Errors
    /// Same as [`Self::assess`].
    pub fn assess_with_progress<F>(&self, input: &PatientInput, mut on_stage: F) -> Result<Assessment>
    where
        F: FnMut(AssessmentStage),
    {
        tracing::info!("Starting stroke risk assessment...");

        on_stage(AssessmentStage::Preparing);
        let x = self.prepare(input)?;

        on_stage(AssessmentStage::Predicting);
        let probability = self.classifier.predict_probability(&x)?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(StrokeRiskError::ModelOutput(format!(
                "probability {probability} outside [0, 1]"
            )));
        }
        tracing::debug!("Predicted probability={:.4}", probability);

        on_stage(AssessmentStage::Explaining);
        let contributions = if probability == 0.0 {
            attribute(&[0.0; FEATURE_COUNT], probability)?
        } else {
            let raw = self.classifier.explain(&x)?;
            attribute(&raw, probability)?
        };

        let result = PredictionResult {
            probability,
            contributions,
        };
        let assessment = Assessment::new(result, self.classifier.model_id());

        tracing::info!(
            "Assessment complete: probability={:.4} band={} model={}",
            assessment.result.probability,
            assessment.band,
            assessment.model_id
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::GbmAdapter;
    use crate::domain::{Answer, Gender, RiskBand, SmokingStatus, WorkType};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic stand-in for a trained model.
    struct FakeClassifier {
        probability: f64,
        attribution: Vec<f64>,
        explain_calls: AtomicUsize,
    }

    impl FakeClassifier {
        fn new(probability: f64, attribution: Vec<f64>) -> Self {
            Self {
                probability,
                attribution,
                explain_calls: AtomicUsize::new(0),
            }
        }
    }

    impl StrokeClassifier for FakeClassifier {
        fn model_id(&self) -> &str {
            "fake"
        }

        fn predict_probability(&self, _x: &StandardizedVector) -> Result<f64> {
            Ok(self.probability)
        }

        fn explain(&self, _x: &StandardizedVector) -> Result<Vec<f64>> {
            self.explain_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.attribution.clone())
        }
    }

    fn sample_input() -> PatientInput {
        PatientInput {
            age: 45,
            avg_glucose_level: 110.0,
            gender: Gender::Female,
            ever_married: Answer::Yes,
            work_type: WorkType::Private,
            hypertension: Answer::No,
            heart_disease: Answer::No,
            smoking_status: SmokingStatus::NeverSmoked,
        }
    }

    fn attribution() -> Vec<f64> {
        vec![0.6, -0.3, 0.05, 0.05, -0.1, 0.2, 0.1, -0.1, 0.4, 0.4, 0.4]
    }

    fn service(probability: f64, attribution: Vec<f64>) -> AssessmentService<FakeClassifier> {
        AssessmentService::new(Arc::new(FakeClassifier::new(probability, attribution)))
    }

    #[test]
    fn test_prepare_standardizes_reference_vector() {
        let svc = service(0.5, attribution());
        let z = svc.prepare(&sample_input()).expect("Should prepare");
        let x = Standardizer::canonical().invert(&z);
        let expected = [45.0, 110.0, 0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 2025.0, 4950.0, 12100.0];
        for (a, b) in x.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn test_contributions_sum_to_risk() {
        let svc = service(0.42, attribution());
        let assessment = svc.assess(&sample_input()).expect("Should assess");
        let total: f64 = assessment.result.contributions.iter().map(|c| c.percent()).sum();
        assert!((total - 42.0).abs() < 1e-9);
        assert_eq!(assessment.band, RiskBand::Moderate);
        assert_eq!(assessment.model_id, "fake");
    }

    #[test]
    fn test_zero_probability_skips_explainer() {
        let classifier = Arc::new(FakeClassifier::new(0.0, vec![0.0; FEATURE_COUNT]));
        let svc = AssessmentService::new(Arc::clone(&classifier));
        let assessment = svc.assess(&sample_input()).expect("Should assess");

        assert_eq!(assessment.band, RiskBand::Zero);
        assert!(assessment.result.contributions.iter().all(|c| c.share == 0.0));
        assert_eq!(classifier.explain_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_silent_explainer_is_a_defect() {
        let svc = service(0.3, vec![0.0; FEATURE_COUNT]);
        assert!(matches!(
            svc.assess(&sample_input()),
            Err(StrokeRiskError::AttributionInconsistency(_))
        ));
    }

    #[test]
    fn test_short_explanation_is_shape_mismatch() {
        let svc = service(0.3, vec![0.1; 8]);
        assert!(matches!(
            svc.assess(&sample_input()),
            Err(StrokeRiskError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_out_of_range_probability_is_rejected() {
        for p in [1.5, -0.1, f64::NAN] {
            let svc = service(p, attribution());
            assert!(matches!(
                svc.assess(&sample_input()),
                Err(StrokeRiskError::ModelOutput(_))
            ));
        }
    }

    #[test]
    fn test_incomplete_submission_never_reaches_model() {
        let classifier = Arc::new(FakeClassifier::new(0.5, attribution()));
        let svc = AssessmentService::new(Arc::clone(&classifier));
        let submission = PatientSubmission {
            hypertension: None,
            ..PatientSubmission::from(&sample_input())
        };

        assert!(matches!(
            svc.assess_submission(&submission),
            Err(StrokeRiskError::UserInputIncomplete(_))
        ));
        assert_eq!(classifier.explain_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_input_is_rejected_before_inference() {
        let svc = service(0.5, attribution());
        let input = PatientInput {
            age: 12,
            ..sample_input()
        };
        assert!(matches!(svc.assess(&input), Err(StrokeRiskError::Validation(_))));
    }

    #[test]
    fn test_progress_stages_in_order() {
        let svc = service(0.2, attribution());
        let mut stages = Vec::new();
        svc.assess_with_progress(&sample_input(), |s| stages.push(s))
            .expect("Should assess");
        assert_eq!(
            stages,
            vec![
                AssessmentStage::Preparing,
                AssessmentStage::Predicting,
                AssessmentStage::Explaining
            ]
        );
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let svc = service(0.77, attribution());
        let a = svc.assess(&sample_input()).expect("first");
        let b = svc.assess(&sample_input()).expect("second");
        assert_eq!(a.result, b.result);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_shipped_model_end_to_end() {
        let model_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let adapter = GbmAdapter::load(&model_dir, false).expect("shipped model loads");
        let svc = AssessmentService::new(Arc::new(adapter));

        let first = svc.assess(&sample_input()).expect("Should assess");
        let second = svc.assess(&sample_input()).expect("Should assess");
        assert_eq!(first.result, second.result);

        let p = first.result.probability;
        assert!(p > 0.0 && p < 1.0);
        let total: f64 = first.result.contributions.iter().map(|c| c.percent()).sum();
        assert!((total - p * 100.0).abs() < 1e-9);

        let older = PatientInput {
            age: 82,
            avg_glucose_level: 240.0,
            hypertension: Answer::Yes,
            heart_disease: Answer::Yes,
            smoking_status: SmokingStatus::Smokes,
            ..sample_input()
        };
        let high = svc.assess(&older).expect("Should assess");
        assert!(high.result.probability > p);
    }
}
