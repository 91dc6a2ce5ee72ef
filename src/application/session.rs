//! Per-session state: the latest submission and its assessment.
//!
//! Created on the first submission, overwritten on every resubmission and
//! discarded when the session ends. Nothing is written to disk.

use crate::domain::{Assessment, PatientInput};

/// Latest submission paired with the assessment computed from it.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub input: PatientInput,
    pub assessment: Assessment,
}

#[derive(Debug, Default)]
pub struct Session {
    latest: Option<SessionRecord>,
    submissions: usize,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new submission, replacing the previous one.
    pub fn record(&mut self, input: PatientInput, assessment: Assessment) {
        self.submissions += 1;
        self.latest = Some(SessionRecord { input, assessment });
        tracing::debug!("Session updated (submissions={})", self.submissions);
    }

    #[must_use]
    pub fn latest(&self) -> Option<&SessionRecord> {
        self.latest.as_ref()
    }

    /// Number of submissions recorded since the session started.
    #[must_use]
    pub fn submissions(&self) -> usize {
        self.submissions
    }

    /// Drop the stored submission.
    pub fn clear(&mut self) {
        self.latest = None;
        self.submissions = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribution::attribute;
    use crate::domain::{Answer, Gender, PredictionResult, SmokingStatus, WorkType};

    fn input(age: u32) -> PatientInput {
        PatientInput {
            age,
            avg_glucose_level: 95.0,
            gender: Gender::Male,
            ever_married: Answer::No,
            work_type: WorkType::GovtJob,
            hypertension: Answer::No,
            heart_disease: Answer::No,
            smoking_status: SmokingStatus::FormerlySmoked,
        }
    }

    fn assessment(probability: f64) -> Assessment {
        let raw = [0.1; crate::domain::FEATURE_COUNT];
        let result = PredictionResult {
            probability,
            contributions: attribute(&raw, probability).expect("Should attribute"),
        };
        Assessment::new(result, "session-test")
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.latest().is_none());
        assert_eq!(session.submissions(), 0);
    }

    #[test]
    fn test_resubmission_overwrites() {
        let mut session = Session::new();
        session.record(input(30), assessment(0.05));
        session.record(input(70), assessment(0.55));

        let latest = session.latest().expect("Should hold a record");
        assert_eq!(latest.input.age, 70);
        assert!((latest.assessment.result.probability - 0.55).abs() < f64::EPSILON);
        assert_eq!(session.submissions(), 2);
    }

    #[test]
    fn test_clear_discards_record() {
        let mut session = Session::new();
        session.record(input(30), assessment(0.05));
        session.clear();
        assert!(session.latest().is_none());
        assert_eq!(session.submissions(), 0);
    }
}
