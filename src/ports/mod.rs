//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, the trained classifier is reached only
//! through the trait defined here, so the pipeline can run against any
//! artifact format or a deterministic fake in tests.

mod classifier;

pub use classifier::StrokeClassifier;
