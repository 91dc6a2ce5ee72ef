//! Background assessment worker.
//!
//! Runs the pipeline on its own thread so the TUI main loop keeps drawing
//! while the explanation is computed.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::{AssessmentService, AssessmentStage};
use crate::domain::{Assessment, PatientInput};
use crate::ports::StrokeClassifier;

/// Progress updates from the assessment worker.
#[derive(Debug, Clone)]
pub enum AssessmentProgress {
    /// Encoding and standardizing the input
    Preparing,
    /// Running the classifier
    Predicting,
    /// Computing per-feature attributions
    Explaining,
    /// Assessment complete
    Complete(Box<Assessment>),
    /// Error occurred during assessment
    Error(String),
}

impl From<AssessmentStage> for AssessmentProgress {
    fn from(stage: AssessmentStage) -> Self {
        match stage {
            AssessmentStage::Preparing => Self::Preparing,
            AssessmentStage::Predicting => Self::Predicting,
            AssessmentStage::Explaining => Self::Explaining,
        }
    }
}

/// Handle to a running assessment worker.
pub struct AssessmentWorkerHandle {
    pub progress_rx: Receiver<AssessmentProgress>,
    _handle: JoinHandle<()>,
}

impl AssessmentWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<AssessmentProgress> {
        self.progress_rx.try_recv().ok()
    }
}

pub struct AssessmentWorker;

impl AssessmentWorker {
    /// Spawn a background assessment for `input`.
    pub fn spawn<C>(service: Arc<AssessmentService<C>>, input: PatientInput) -> AssessmentWorkerHandle
    where
        C: StrokeClassifier + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run(&service, &input, &tx);
        });

        AssessmentWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run<C: StrokeClassifier>(
        service: &AssessmentService<C>,
        input: &PatientInput,
        tx: &Sender<AssessmentProgress>,
    ) {
        // The receiver may be gone if the user left the screen; results are
        // then dropped.
        let result = service.assess_with_progress(input, |stage| {
            let _ = tx.send(stage.into());
        });

        let _ = match result {
            Ok(assessment) => tx.send(AssessmentProgress::Complete(Box::new(assessment))),
            Err(e) => {
                tracing::error!("Assessment failed: {e}");
                tx.send(AssessmentProgress::Error(e.to_string()))
            }
        };
    }
}
