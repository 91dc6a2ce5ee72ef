//! Domain layer: Core types and pure pipeline stages.
//!
//! Encoding, expansion, standardization, attribution and banding are pure
//! functions over these types. Nothing here touches the classifier.

mod assessment;
pub mod attribution;
pub mod encoding;
pub mod features;
pub mod model;
mod patient;
mod recommendation;
pub mod scaler;

pub use assessment::{Assessment, PredictionResult, RiskBand};
pub use attribution::FeatureContribution;
pub use encoding::{Answer, CategoricalField, Gender, SmokingStatus, WorkType, ENCODING_VERSION};
pub use features::{FeatureVector, RawFeature, RawFeatures, FEATURE_COLUMNS, FEATURE_COUNT, RAW_FEATURE_COUNT};
pub use model::{ArtifactError, ModelManifest};
pub use patient::{PatientInput, PatientSubmission, AGE_RANGE, GLUCOSE_RANGE};
pub use recommendation::{Recommendation, GENERAL_TIPS};
pub use scaler::{StandardizedVector, Standardizer};
