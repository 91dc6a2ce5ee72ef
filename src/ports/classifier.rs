//! Classifier port: Trait for the opaque pre-trained stroke model.
//!
//! The model and its explainer are produced offline. The pipeline only
//! needs the two operations below.

use crate::domain::StandardizedVector;
use crate::Result;

/// A loaded, immutable binary classifier with a companion explainer.
///
/// Implementations must not mutate shared state in either operation; the
/// same instance is read concurrently from the UI worker threads.
pub trait StrokeClassifier: Send + Sync {
    /// Identifier of the loaded artifact, recorded on each assessment.
    fn model_id(&self) -> &str;

    /// Probability of the positive (stroke) class.
    ///
    /// # Errors
    /// Returns `StrokeRiskError::ShapeMismatch` if the model expects a
    /// different number of columns.
    fn predict_probability(&self, x: &StandardizedVector) -> Result<f64>;

    /// Raw per-column attribution values, one per model column.
    ///
    /// Signs and units are the explainer's own; the attribution engine
    /// only uses magnitudes of the first eight.
    ///
    /// # Errors
    /// Returns `StrokeRiskError::ShapeMismatch` on a column count mismatch.
    fn explain(&self, x: &StandardizedVector) -> Result<Vec<f64>>;
}
