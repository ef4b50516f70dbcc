// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Owns the model directory layout:
//
//   data/models/ner_resume/
//     model_config.json        ← ModelManifest (backend, tag set,
//                                the TrainConfig used)
//     perceptron.json          ← perceptron backend weights
//     tokenizer.json           ← neural backend vocabulary
//     classifier.json          ← neural backend architecture
//     classifier.mpk.gz        ← neural backend weights
//     metrics.csv              ← one row per epoch
//     checkpoint_epoch_10/     ← full, loadable model snapshots
//     checkpoint_epoch_20/
//
// Why save the manifest separately?
//   Loading needs to know WHICH backend wrote the directory and
//   which tag set it was trained with before it can read any
//   weights. The manifest is written before training starts, so
//   every checkpoint can carry a copy of it and be loaded on its
//   own with `predict --model-dir .../checkpoint_epoch_10`.
//
// Neural weights go through burn's CompactRecorder
// (MessagePack + gzip, half precision).
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::traits::SequenceLabeler;
use crate::ml::{model::TokenClassifier, tags::TagSet, BackendKind};

const MANIFEST_FILE: &str = "model_config.json";

/// Everything needed to rebuild a model before its weights load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub backend:      BackendKind,
    pub tags:         TagSet,
    pub train_config: TrainConfig,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager. Creates the directory if needed;
    /// a failure to create it surfaces on the first write.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Manager for an existing model directory (no directory creation).
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        anyhow::ensure!(
            dir.is_dir(),
            "model directory '{}' does not exist. Have you run 'train' first?",
            dir.display()
        );
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_manifest(&self, manifest: &ModelManifest) -> Result<()> {
        let path = self.dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(manifest)?)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))?;
        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_manifest(&self) -> Result<ModelManifest> {
        let path = self.dir.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read model config from '{}'. \
                 Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Corrupt model config '{}'", path.display()))
    }

    /// Snapshot `labeler` into `checkpoint_epoch_<epoch>/`.
    pub fn save_checkpoint(&self, epoch: usize, labeler: &dyn SequenceLabeler) -> Result<()> {
        let sub = self.dir.join(format!("checkpoint_epoch_{epoch}"));
        labeler.save(&sub)?;

        let manifest = self.dir.join(MANIFEST_FILE);
        if manifest.exists() {
            fs::copy(&manifest, sub.join(MANIFEST_FILE))
                .with_context(|| format!("Cannot copy model config into '{}'", sub.display()))?;
        }

        tracing::info!("  [CHECKPOINT] Saved at: {}", sub.display());
        Ok(())
    }
}

/// Write neural weights to `<dir>/<name>.mpk.gz`.
pub fn save_classifier<B: Backend>(model: &TokenClassifier<B>, dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(name);
    CompactRecorder::new()
        .record(model.clone().into_record(), path.clone())
        .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;
    Ok(())
}

/// Load neural weights saved by `save_classifier` into `model`.
pub fn load_classifier<B: Backend>(
    model:  TokenClassifier<B>,
    dir:    &Path,
    name:   &str,
    device: &B::Device,
) -> Result<TokenClassifier<B>> {
    let path   = dir.join(name);
    let record = CompactRecorder::new()
        .load(path.clone(), device)
        .with_context(|| format!("Cannot load weights '{}'", path.display()))?;
    Ok(model.load_record(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotation::Label;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_round_trip() {
        let dir  = TempDir::new().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_string_lossy());
        let manifest = ModelManifest {
            backend:      BackendKind::Perceptron,
            tags:         TagSet::new(Label::ALL.to_vec()),
            train_config: TrainConfig::default(),
        };
        ckpt.save_manifest(&manifest).unwrap();

        let back = ckpt.load_manifest().unwrap();
        assert_eq!(back.backend, BackendKind::Perceptron);
        assert_eq!(back.tags, manifest.tags);
        assert_eq!(back.train_config.seed, manifest.train_config.seed);
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let err = CheckpointManager::open("/no/such/model").err().unwrap();
        assert!(err.to_string().contains("Have you run 'train' first?"));
    }
}
