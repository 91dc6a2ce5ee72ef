//! Gradient-boosted tree adapter: Implementation of `StrokeClassifier`.
//!
//! Loads a tree-ensemble artifact exported by the offline training run and
//! serves predictions and exact TreeSHAP explanations from it.
//!
//! # Integrity
//!
//! - The artifact must be bound by `manifest.json` (SHA-256 per file)
//! - In release builds a missing manifest is always fatal
//! - In debug builds it can be bypassed with
//!   `STROKESENSE_ALLOW_UNVERIFIED_MODEL=true` for local experiments
//!
//! # Compatibility
//!
//! An artifact is refused unless its column order, encoding version and
//! scaler constants are the ones compiled into this build. Each of those
//! is silently fatal to prediction quality if it drifts.

mod tree;
mod tree_shap;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::model::{ArtifactError, ModelManifest, MODEL_FILE};
use crate::domain::{StandardizedVector, Standardizer, ENCODING_VERSION, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::ports::StrokeClassifier;
use crate::{Result, StrokeRiskError};

pub use tree::{Node, Tree};

/// Artifact layout understood by this adapter.
pub const FORMAT_VERSION: u32 = 1;

/// Tolerance when comparing artifact scaler constants to the compiled ones.
const SCALER_TOLERANCE: f64 = 1e-9;

/// Tree-ensemble artifact as written by the export step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_id: String,
    pub encoding_version: String,
    pub feature_names: Vec<String>,
    pub scaler: Standardizer,

    /// Initial margin in log-odds
    pub base_score: f64,

    pub trees: Vec<Tree>,
}

impl ModelArtifact {
    /// Check the artifact against this build.
    ///
    /// # Errors
    /// `Incompatible` for contract drift, `Malformed` for structural defects.
    pub fn validate(&self) -> std::result::Result<(), ArtifactError> {
        if self.format_version != FORMAT_VERSION {
            return Err(ArtifactError::Incompatible(format!(
                "format_version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        if self.encoding_version != ENCODING_VERSION {
            return Err(ArtifactError::Incompatible(format!(
                "encoding_version {:?} (expected {ENCODING_VERSION:?})",
                self.encoding_version
            )));
        }
        if self.feature_names != FEATURE_COLUMNS {
            return Err(ArtifactError::Incompatible(format!(
                "feature_names {:?} do not match {:?}",
                self.feature_names, FEATURE_COLUMNS
            )));
        }
        if !self.scaler.matches(&Standardizer::canonical(), SCALER_TOLERANCE) {
            return Err(ArtifactError::Incompatible(
                "scaler constants differ from the compiled training constants".into(),
            ));
        }
        if !self.base_score.is_finite() {
            return Err(ArtifactError::Malformed("base_score is not finite".into()));
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::Malformed("artifact contains no trees".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(FEATURE_COUNT)
                .map_err(|e| ArtifactError::Malformed(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }
}

/// Loaded ensemble. Immutable after construction.
#[derive(Debug, Clone)]
pub struct GbmAdapter {
    model_id: String,
    base_score: f64,
    trees: Vec<Tree>,
    expected_value: f64,
}

impl GbmAdapter {
    /// Load and verify the artifact in `model_path`.
    ///
    /// `model_path` is either the model directory or the artifact file
    /// itself. `allow_unverified` only has an effect in debug builds.
    ///
    /// # Errors
    /// Returns `ArtifactError` if the artifact is missing, fails
    /// verification or is incompatible with this build.
    pub fn load(model_path: &Path, allow_unverified: bool) -> std::result::Result<Self, ArtifactError> {
        let (base_dir, file_name) = if model_path.is_file() {
            let name = model_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| ArtifactError::NotFound(model_path.to_path_buf()))?;
            (model_path.parent().unwrap_or(Path::new(".")), name)
        } else {
            (model_path, MODEL_FILE)
        };

        let artifact_path = base_dir.join(file_name);
        if !artifact_path.exists() {
            return Err(ArtifactError::NotFound(artifact_path));
        }

        match ModelManifest::read(base_dir)? {
            Some(manifest) => {
                manifest.verify(base_dir, file_name)?;
                tracing::debug!("Manifest verified ({} files)", manifest.files.len());
            }
            None => Self::unverified(allow_unverified, &artifact_path)?,
        }

        let content = std::fs::read(&artifact_path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&content)?;
        let adapter = Self::from_artifact(artifact)?;

        tracing::info!(
            "Loaded model {} from {:?} (trees={}, expected_value={:.4})",
            adapter.model_id,
            artifact_path,
            adapter.trees.len(),
            adapter.expected_value
        );
        Ok(adapter)
    }

    #[cfg(debug_assertions)]
    fn unverified(allow: bool, path: &Path) -> std::result::Result<(), ArtifactError> {
        if allow {
            tracing::warn!(
                "Loading UNVERIFIED model {:?}. This is only allowed in debug builds.",
                path
            );
            Ok(())
        } else {
            tracing::error!(
                "No manifest next to {:?}. Set STROKESENSE_ALLOW_UNVERIFIED_MODEL=true to bypass in debug builds.",
                path
            );
            Err(ArtifactError::Unverified("manifest.json not found".into()))
        }
    }

    #[cfg(not(debug_assertions))]
    fn unverified(_allow: bool, path: &Path) -> std::result::Result<(), ArtifactError> {
        tracing::error!("No manifest next to {:?}. Release builds require one.", path);
        Err(ArtifactError::Unverified(
            "manifest.json is required in release builds".into(),
        ))
    }

    /// Build an adapter from an in-memory artifact.
    ///
    /// # Errors
    /// Returns `ArtifactError` if the artifact fails validation.
    pub fn from_artifact(artifact: ModelArtifact) -> std::result::Result<Self, ArtifactError> {
        artifact.validate()?;
        let expected_value =
            artifact.base_score + artifact.trees.iter().map(Tree::expected_value).sum::<f64>();
        Ok(Self {
            model_id: artifact.model_id,
            base_score: artifact.base_score,
            trees: artifact.trees,
            expected_value,
        })
    }

    /// Mean margin over the training distribution (log-odds).
    #[must_use]
    pub fn expected_value(&self) -> f64 {
        self.expected_value
    }

    /// Raw ensemble output in log-odds.
    #[must_use]
    pub fn margin(&self, x: &StandardizedVector) -> f64 {
        let x = x.as_slice();
        self.base_score + self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }

    fn check_shape(x: &StandardizedVector, stage: &'static str) -> Result<()> {
        let actual = x.as_slice().len();
        if actual != FEATURE_COUNT {
            return Err(StrokeRiskError::ShapeMismatch {
                stage,
                expected: FEATURE_COUNT,
                actual,
            });
        }
        Ok(())
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl StrokeClassifier for GbmAdapter {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn predict_probability(&self, x: &StandardizedVector) -> Result<f64> {
        Self::check_shape(x, "inference")?;
        Ok(sigmoid(self.margin(x)))
    }

    fn explain(&self, x: &StandardizedVector) -> Result<Vec<f64>> {
        Self::check_shape(x, "explanation")?;
        let mut phi = vec![0.0; FEATURE_COUNT];
        for tree in &self.trees {
            tree_shap::accumulate(tree, x.as_slice(), &mut phi);
        }
        Ok(phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn shipped_model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models")
    }

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            format_version: FORMAT_VERSION,
            model_id: "unit-test".into(),
            encoding_version: ENCODING_VERSION.into(),
            feature_names: FEATURE_COLUMNS.iter().map(|s| (*s).to_owned()).collect(),
            scaler: Standardizer::canonical(),
            base_score: -2.0,
            trees: vec![
                Tree {
                    nodes: vec![
                        Node::Split {
                            feature: 0,
                            threshold: 0.0,
                            left: 1,
                            right: 2,
                            cover: 100.0,
                        },
                        Node::Leaf {
                            value: -0.5,
                            cover: 60.0,
                        },
                        Node::Leaf {
                            value: 0.75,
                            cover: 40.0,
                        },
                    ],
                },
                Tree {
                    nodes: vec![
                        Node::Split {
                            feature: 9,
                            threshold: 1.0,
                            left: 1,
                            right: 2,
                            cover: 100.0,
                        },
                        Node::Leaf {
                            value: -0.1,
                            cover: 90.0,
                        },
                        Node::Leaf {
                            value: 0.9,
                            cover: 10.0,
                        },
                    ],
                },
            ],
        }
    }

    fn write_sealed(dir: &Path, artifact: &ModelArtifact) {
        let json = serde_json::to_vec_pretty(artifact).expect("serialize artifact");
        std::fs::write(dir.join(MODEL_FILE), json).expect("write artifact");
        ModelManifest::seal(dir, &artifact.model_id, &[MODEL_FILE])
            .expect("seal")
            .write(dir)
            .expect("write manifest");
    }

    fn vector(values: [f64; FEATURE_COUNT]) -> StandardizedVector {
        StandardizedVector::from_standardized(values)
    }

    #[test]
    fn test_probability_is_sigmoid_of_margin() {
        let adapter = GbmAdapter::from_artifact(artifact()).expect("valid artifact");
        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 1.0;
        x[9] = 2.0;
        let margin: f64 = -2.0 + 0.75 + 0.9;
        let p = adapter.predict_probability(&vector(x)).expect("predict");
        assert!((p - 1.0 / (1.0 + (-margin).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_explanation_is_locally_accurate() {
        let adapter = GbmAdapter::from_artifact(artifact()).expect("valid artifact");
        let x = vector([-1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0]);
        let phi = adapter.explain(&x).expect("explain");
        assert_eq!(phi.len(), FEATURE_COUNT);
        let total = phi.iter().sum::<f64>() + adapter.expected_value();
        assert!((total - adapter.margin(&x)).abs() < 1e-10);
        assert!(phi[0] < 0.0);
        assert!(phi[9] > 0.0);
    }

    #[test]
    fn test_rejects_wrong_encoding_version() {
        let mut a = artifact();
        a.encoding_version = "stroke-enc-v0".into();
        assert!(matches!(
            GbmAdapter::from_artifact(a),
            Err(ArtifactError::Incompatible(_))
        ));
    }

    #[test]
    fn test_rejects_reordered_columns() {
        let mut a = artifact();
        a.feature_names.swap(5, 6);
        assert!(matches!(
            GbmAdapter::from_artifact(a),
            Err(ArtifactError::Incompatible(_))
        ));
    }

    #[test]
    fn test_rejects_drifted_scaler() {
        let mut a = artifact();
        a.scaler.mean[1] += 1.0;
        assert!(matches!(
            GbmAdapter::from_artifact(a),
            Err(ArtifactError::Incompatible(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_tree() {
        let mut a = artifact();
        a.trees[1].nodes[0] = Node::Split {
            feature: FEATURE_COUNT,
            threshold: 0.0,
            left: 1,
            right: 2,
            cover: 100.0,
        };
        assert!(matches!(
            GbmAdapter::from_artifact(a),
            Err(ArtifactError::Malformed(_))
        ));

        let mut empty = artifact();
        empty.trees.clear();
        assert!(GbmAdapter::from_artifact(empty).is_err());
    }

    #[test]
    fn test_load_sealed_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sealed(dir.path(), &artifact());
        let adapter = GbmAdapter::load(dir.path(), false).expect("load");
        assert_eq!(adapter.model_id(), "unit-test");
    }

    #[test]
    fn test_load_accepts_artifact_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sealed(dir.path(), &artifact());
        assert!(GbmAdapter::load(&dir.path().join(MODEL_FILE), false).is_ok());
    }

    #[test]
    fn test_tampered_artifact_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_sealed(dir.path(), &artifact());

        let mut tampered = artifact();
        tampered.base_score = 5.0;
        let json = serde_json::to_vec_pretty(&tampered).expect("serialize");
        std::fs::write(dir.path().join(MODEL_FILE), json).expect("overwrite");

        assert!(matches!(
            GbmAdapter::load(dir.path(), true),
            Err(ArtifactError::DigestMismatch(_))
        ));
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            GbmAdapter::load(dir.path(), true),
            Err(ArtifactError::NotFound(_))
        ));
    }

    #[test]
    fn test_unverified_artifact_requires_opt_in() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json = serde_json::to_vec(&artifact()).expect("serialize");
        std::fs::write(dir.path().join(MODEL_FILE), json).expect("write");

        assert!(matches!(
            GbmAdapter::load(dir.path(), false),
            Err(ArtifactError::Unverified(_))
        ));
        if cfg!(debug_assertions) {
            assert!(GbmAdapter::load(dir.path(), true).is_ok());
        }
    }

    #[test]
    fn test_shipped_model_loads_and_explains() {
        let adapter = GbmAdapter::load(&shipped_model_dir(), false).expect("shipped model");
        let x = Standardizer::canonical()
            .standardize(&[45.0, 110.0, 0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 2025.0, 4950.0, 12100.0])
            .expect("standardize");

        let p = adapter.predict_probability(&x).expect("predict");
        assert!(p > 0.0 && p < 1.0);

        let phi = adapter.explain(&x).expect("explain");
        let total = phi.iter().sum::<f64>() + adapter.expected_value();
        assert!((total - adapter.margin(&x)).abs() < 1e-9);
    }
}
