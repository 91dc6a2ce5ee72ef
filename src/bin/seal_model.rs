//! Model sealing utility for Strokesense artifacts.
//!
//! Validates the tree-ensemble artifact against this build, then writes
//! `manifest.json` binding it by SHA-256.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin seal_model -- <model_dir> [--file <name>] [--check]
//! ```
//!
//! `--check` verifies an existing manifest instead of writing one.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use strokesense::adapters::gbm::{GbmAdapter, ModelArtifact};
use strokesense::domain::model::{ModelManifest, MODEL_FILE};
use strokesense::ports::StrokeClassifier;

struct Args {
    model_dir: PathBuf,
    file: String,
    check: bool,
}

fn usage() -> anyhow::Error {
    anyhow!("Usage: seal_model <model_dir> [--file <name>] [--check]")
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let mut model_dir: Option<PathBuf> = None;
    let mut file: Option<String> = None;
    let mut check = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => file = Some(args.next().ok_or_else(usage)?),
            "--check" => check = true,
            "-h" | "--help" => return Err(usage()),
            _ if model_dir.is_none() => model_dir = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }

    let model_dir = model_dir.ok_or_else(usage)?;

    // Accept the artifact path itself.
    if model_dir.is_file() {
        let name = model_dir
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("Invalid artifact path {model_dir:?}"))?;
        let dir = model_dir
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("Model path has no parent directory"))?;
        return Ok(Args {
            model_dir: dir,
            file: file.unwrap_or(name),
            check,
        });
    }

    Ok(Args {
        model_dir,
        file: file.unwrap_or_else(|| MODEL_FILE.to_string()),
        check,
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let artifact_path = args.model_dir.join(&args.file);

    if args.check {
        let adapter = GbmAdapter::load(&artifact_path, false)
            .with_context(|| format!("Verification failed for {artifact_path:?}"))?;
        println!("Verified {artifact_path:?} (model {})", adapter.model_id());
        return Ok(());
    }

    let bytes = fs::read(&artifact_path).with_context(|| format!("Failed to read {artifact_path:?}"))?;
    let artifact: ModelArtifact = serde_json::from_slice(&bytes)
        .with_context(|| format!("{artifact_path:?} is not a model artifact"))?;
    let model_id = artifact.model_id.clone();
    let tree_count = artifact.trees.len();

    // Never seal something the runtime would refuse.
    let adapter = GbmAdapter::from_artifact(artifact)
        .with_context(|| format!("Refusing to seal {artifact_path:?}"))?;
    if !adapter.expected_value().is_finite() {
        bail!("Artifact expected value is not finite");
    }

    let manifest = ModelManifest::seal(&args.model_dir, model_id.as_str(), &[args.file.as_str()])?;
    let manifest_path = manifest.write(&args.model_dir)?;

    println!("Sealed {artifact_path:?} (model {model_id}, {tree_count} trees)");
    println!("Wrote manifest: {manifest_path:?}");
    Ok(())
}
