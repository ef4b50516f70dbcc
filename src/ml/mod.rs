// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// Everything statistical lives here. The rest of the crate only
// sees the SequenceLabeler trait plus the two entry points below:
//
//   fit(...)   — train the configured backend, get a labeler back
//   load(dir)  — read model_config.json, rebuild that backend
//
// What's in this layer:
//
//   tags.rs        — BIO tag set, span ⇄ tag conversion
//   features.rs    — lexical features and coarse word shapes
//   evaluate.rs    — exact-match entity precision / recall / F1
//
//   perceptron.rs  — averaged-perceptron tagger (default backend)
//                    pure Rust, JSON weights, fully deterministic
//
//   model.rs       — burn windowed token classifier
//   trainer.rs     — burn training loop (Adam, DataLoader)
//   inferencer.rs  — NeuralTagger: loads weights, predicts
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

use crate::application::train_use_case::TrainConfig;
use crate::domain::annotation::TrainingExample;
use crate::domain::traits::SequenceLabeler;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};

/// BIO tag set and span ⇄ tag conversion
pub mod tags;

/// Token features shared by both backends
pub mod features;

/// Entity-level evaluation
pub mod evaluate;

/// Averaged-perceptron tagger
pub mod perceptron;

/// Windowed token classifier architecture
pub mod model;

/// Neural training loop
pub mod trainer;

/// Neural tagger: load and predict
pub mod inferencer;

use inferencer::NeuralTagger;
use perceptron::PerceptronTagger;
use tags::TagSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Perceptron,
    Neural,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Perceptron => write!(f, "perceptron"),
            BackendKind::Neural     => write!(f, "neural"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "perceptron" => Ok(BackendKind::Perceptron),
            "neural"     => Ok(BackendKind::Neural),
            other        => Err(format!("unknown backend '{other}' (expected perceptron or neural)")),
        }
    }
}

pub struct TrainOutcome {
    pub labeler: Box<dyn SequenceLabeler>,
    pub history: Vec<EpochMetrics>,
}

/// Train the backend named in `cfg`.
pub fn fit(
    cfg:     &TrainConfig,
    tags:    &TagSet,
    train:   &[TrainingExample],
    val:     &[TrainingExample],
    ckpt:    &CheckpointManager,
    metrics: &MetricsLogger,
) -> Result<TrainOutcome> {
    tracing::info!("Training {} backend", cfg.backend);
    match cfg.backend {
        BackendKind::Perceptron => {
            let (tagger, history) = perceptron::train(cfg, tags, train, val, ckpt, metrics)?;
            Ok(TrainOutcome { labeler: Box::new(tagger), history })
        }
        BackendKind::Neural => {
            let (tagger, history) = trainer::train(cfg, tags, train, val, ckpt, metrics)?;
            Ok(TrainOutcome { labeler: Box::new(tagger), history })
        }
    }
}

/// Rebuild whichever backend wrote `dir`.
pub fn load(dir: &Path) -> Result<Box<dyn SequenceLabeler>> {
    let manifest = CheckpointManager::open(dir)?.load_manifest()?;
    Ok(match manifest.backend {
        BackendKind::Perceptron => Box::new(PerceptronTagger::load(dir, manifest.tags)?),
        BackendKind::Neural     => Box::new(NeuralTagger::load(dir, manifest.tags)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parse_and_display() {
        assert_eq!("Neural".parse::<BackendKind>().unwrap(), BackendKind::Neural);
        assert_eq!(BackendKind::default().to_string(), "perceptron");
        assert!("crf".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_load_without_manifest_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = load(dir.path()).err().unwrap();
        assert!(err.to_string().contains("model_config.json"));
    }
}
