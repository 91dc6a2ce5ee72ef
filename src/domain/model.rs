//! Model artifact integrity types.
//!
//! A model directory holds the tree-ensemble JSON plus a `manifest.json`
//! that binds every shipped file to its SHA-256 digest.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Manifest file name inside a model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Artifact file name inside a model directory.
pub const MODEL_FILE: &str = "stroke_gbm.json";

/// Only supported manifest layout.
pub const MANIFEST_VERSION: u32 = 1;

/// Error type for loading and verifying model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found at {0:?}")]
    NotFound(PathBuf),

    #[error("Artifact is not verified: {0}")]
    Unverified(String),

    #[error("Digest mismatch for {0}")]
    DigestMismatch(String),

    #[error("Malformed artifact: {0}")]
    Malformed(String),

    #[error("Artifact incompatible with this build: {0}")]
    Incompatible(String),

    #[error("Artifact IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

/// Digest manifest for a model directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,

    pub model_id: String,

    /// Unix timestamp (seconds) when the manifest was written
    pub created_at: i64,

    /// Relative file name -> hex SHA-256
    pub files: BTreeMap<String, String>,
}

impl ModelManifest {
    /// Hash `files` inside `dir` and build a manifest for them.
    ///
    /// # Errors
    /// Returns `Io` if a file cannot be read.
    pub fn seal(dir: &Path, model_id: impl Into<String>, files: &[&str]) -> Result<Self, ArtifactError> {
        let mut digests = BTreeMap::new();
        for name in files {
            let bytes = fs::read(dir.join(name))?;
            digests.insert((*name).to_owned(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            model_id: model_id.into(),
            created_at: chrono::Utc::now().timestamp(),
            files: digests,
        })
    }

    /// Read `manifest.json` from `dir`, or `None` if there is none.
    ///
    /// # Errors
    /// Returns `Io`/`Json` if the manifest exists but cannot be parsed.
    pub fn read(dir: &Path) -> Result<Option<Self>, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&content)?))
    }

    /// Write the manifest as pretty JSON into `dir`.
    ///
    /// # Errors
    /// Returns `Io`/`Json` on write failure.
    pub fn write(&self, dir: &Path) -> Result<PathBuf, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        Ok(path)
    }

    /// Check that every listed file in `dir` matches its digest and that
    /// `required` is among them.
    ///
    /// # Errors
    /// - `Incompatible` for an unknown manifest version
    /// - `Unverified` if `required` is not bound by the manifest
    /// - `DigestMismatch` if a file's content changed
    pub fn verify(&self, dir: &Path, required: &str) -> Result<(), ArtifactError> {
        if self.version != MANIFEST_VERSION {
            return Err(ArtifactError::Incompatible(format!(
                "unsupported manifest version {}",
                self.version
            )));
        }
        if !self.files.contains_key(required) {
            return Err(ArtifactError::Unverified(format!(
                "{MANIFEST_FILE} does not bind {required}"
            )));
        }

        for (name, expected) in &self.files {
            let path = dir.join(name);
            let bytes = fs::read(&path).map_err(|_| ArtifactError::NotFound(path.clone()))?;
            if !sha256_hex(&bytes).eq_ignore_ascii_case(expected) {
                return Err(ArtifactError::DigestMismatch(name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_seal_then_verify() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(MODEL_FILE), b"{}").expect("write model");

        let manifest = ModelManifest::seal(dir.path(), "m1", &[MODEL_FILE]).expect("seal");
        manifest.write(dir.path()).expect("write manifest");

        let read = ModelManifest::read(dir.path()).expect("read").expect("present");
        assert_eq!(read, manifest);
        read.verify(dir.path(), MODEL_FILE).expect("verify");
    }

    #[test]
    fn test_tampered_file_fails_verification() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(MODEL_FILE), b"{}").expect("write model");
        let manifest = ModelManifest::seal(dir.path(), "m1", &[MODEL_FILE]).expect("seal");

        fs::write(dir.path().join(MODEL_FILE), b"{ }").expect("tamper");
        assert!(matches!(
            manifest.verify(dir.path(), MODEL_FILE),
            Err(ArtifactError::DigestMismatch(name)) if name == MODEL_FILE
        ));
    }

    #[test]
    fn test_manifest_must_bind_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("notes.txt"), b"x").expect("write");
        let manifest = ModelManifest::seal(dir.path(), "m1", &["notes.txt"]).expect("seal");
        assert!(matches!(
            manifest.verify(dir.path(), MODEL_FILE),
            Err(ArtifactError::Unverified(_))
        ));
    }

    #[test]
    fn test_missing_manifest_reads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(ModelManifest::read(dir.path()).expect("read").is_none());
    }
}
