//! # Strokesense
//!
//! Local stroke risk assessment.
//!
//! This crate provides:
//! - A deterministic feature pipeline (category encoding, polynomial
//!   expansion, standardization) matching an offline-trained classifier
//! - Gradient-boosted tree inference with exact TreeSHAP attribution
//! - Risk banding and canned recommendations
//! - Terminal UI for local-only use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types and pure pipeline stages
//! - `ports`: Trait definitions for the opaque classifier boundary
//! - `adapters`: Concrete implementations (tree-ensemble artifact, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, PatientInput, PatientSubmission, PredictionResult, RiskBand};

/// Result type for Strokesense operations
pub type Result<T> = std::result::Result<T, StrokeRiskError>;

/// Main error type for Strokesense.
///
/// Every variant except `Validation` is a defect: the pipeline surfaces it
/// and never retries or substitutes a default.
#[derive(Debug, thiserror::Error)]
pub enum StrokeRiskError {
    #[error("Incomplete submission, unresolved fields: {}", .0.join(", "))]
    UserInputIncomplete(Vec<&'static str>),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Encoding defect: {value:?} is not a known {field} category")]
    EncodingDefect { field: &'static str, value: String },

    #[error("Shape mismatch in {stage}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Attribution inconsistent with prediction: {0}")]
    AttributionInconsistency(String),

    #[error("Model artifact unavailable: {0}")]
    ArtifactUnavailable(#[from] domain::ArtifactError),

    #[error("Model returned an invalid output: {0}")]
    ModelOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
