//! Adapters layer: Concrete implementations of ports.
//!
//! - `gbm`: gradient-boosted tree artifact with TreeSHAP explanations
//! - `sanitize`: redaction of identifiers and clinical values in logs

pub mod gbm;
pub mod sanitize;

pub use gbm::GbmAdapter;
