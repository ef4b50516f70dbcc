// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Step 3 of the pipeline. Orchestrates training in order:
//
//   Step 1: Load the merged training artifact   (Layer 6 - infra)
//   Step 2: Re-validate every example           (Layer 4 - data)
//   Step 3: Seeded train/validation split       (Layer 4 - data)
//   Step 4: Save the model manifest             (Layer 6 - infra)
//   Step 5: Fit the configured backend          (Layer 5 - ml)
//   Step 6: Save, reload, smoke-test            (Layer 5 / 6)
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{merger::clean_spans, splitter::split_train_val};
use crate::domain::annotation::{Label, RawRecord, TrainingExample};
use crate::infra::{
    artifacts::read_json,
    checkpoint::{CheckpointManager, ModelManifest},
    metrics::MetricsLogger,
};
use crate::ml::{self, tags::TagSet, BackendKind};

/// Sentences run through the reloaded model after training.
const SMOKE_SENTENCES: [&str; 3] = [
    "Name: Jane Doe\nEmail: jane.doe@example.com",
    "## Nguyen Van An\nSoftware Engineer | nguyenvanan@gmail.com",
    "Please contact John Smith at john.smith@company.org for details.",
];

/// Fewer examples than this trains, but with a warning.
const MIN_RECOMMENDED_EXAMPLES: usize = 10;

// ─── Training Configuration ──────────────────────────────────────────────────
// Serialisable so it is saved into model_config.json next to the
// weights. The neural-only fields are ignored by the perceptron.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_data:          String,
    pub model_dir:           String,
    pub backend:             BackendKind,
    pub labels:              Vec<Label>,
    pub epochs:              usize,
    pub validation_fraction: f64,
    pub seed:                u64,
    /// Save `checkpoint_epoch_<n>/` every n epochs; 0 disables
    pub checkpoint_every:    usize,
    pub batch_size:          usize,
    pub lr:                  f64,
    pub word_dim:            usize,
    pub hidden_dim:          usize,
    pub dropout:             f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_data:          "data/train_data.json".to_string(),
            model_dir:           "data/models/ner_resume".to_string(),
            backend:             BackendKind::Perceptron,
            labels:              Label::ALL.to_vec(),
            epochs:              50,
            validation_fraction: 0.2,
            seed:                42,
            checkpoint_every:    10,
            batch_size:          32,
            lr:                  1e-3,
            word_dim:            64,
            hidden_dim:          128,
            dropout:             0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub model_dir:        PathBuf,
    pub backend:          BackendKind,
    pub train_examples:   usize,
    pub val_examples:     usize,
    pub spans_used:       usize,
    pub spans_skipped:    usize,
    pub examples_skipped: usize,
    pub initial_loss:     Option<f64>,
    pub final_loss:       Option<f64>,
    /// (epoch, loss)
    pub best_loss:        Option<(usize, f64)>,
    pub final_val_f1:     Option<f64>,
    /// Entities the reloaded model found in the smoke sentences
    pub smoke_entities:   usize,
}

pub struct TrainUseCase {
    config: TrainConfig,
}

/// Examples that survived re-validation, plus what was thrown out.
struct Prepared {
    examples:         Vec<TrainingExample>,
    spans_used:       usize,
    spans_skipped:    usize,
    examples_skipped: usize,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg = &self.config;

        // ── Step 1: Load the artifact ─────────────────────────────────────────
        let path = Path::new(&cfg.train_data);
        if !path.is_file() {
            bail!(
                "training data '{}' not found. Run 'merge' first.",
                path.display()
            );
        }
        // Raw records: a bad span is skipped below, not a parse failure
        let raw: Vec<RawRecord> = read_json(path)?;
        if raw.is_empty() {
            bail!("training data '{}' contains no examples", path.display());
        }
        tracing::info!("Loaded {} examples from '{}'", raw.len(), path.display());

        // ── Step 2: Re-validate ───────────────────────────────────────────────
        let prepared = self.prepare(raw);
        if prepared.spans_used == 0 {
            bail!(
                "training data '{}' has no valid {} spans",
                path.display(),
                cfg.labels.iter().map(|l| l.as_str()).collect::<Vec<_>>().join("/")
            );
        }
        if prepared.spans_skipped > 0 || prepared.examples_skipped > 0 {
            tracing::warn!(
                "Skipped {} invalid spans and {} near-empty examples",
                prepared.spans_skipped,
                prepared.examples_skipped
            );
        }
        if prepared.examples.len() < MIN_RECOMMENDED_EXAMPLES {
            tracing::warn!(
                "Only {} training examples; at least {} are recommended",
                prepared.examples.len(),
                MIN_RECOMMENDED_EXAMPLES
            );
        }

        // ── Step 3: Split ─────────────────────────────────────────────────────
        let (train, val) = split_train_val(prepared.examples, cfg.validation_fraction, cfg.seed);
        tracing::info!("Split: {} train, {} validation", train.len(), val.len());

        // ── Step 4: Manifest ──────────────────────────────────────────────────
        let tags = TagSet::new(cfg.labels.clone());
        let ckpt = CheckpointManager::new(&cfg.model_dir);
        ckpt.save_manifest(&ModelManifest {
            backend:      cfg.backend,
            tags:         tags.clone(),
            train_config: cfg.clone(),
        })?;
        let metrics = MetricsLogger::new(&cfg.model_dir)?;

        // ── Step 5: Fit ───────────────────────────────────────────────────────
        let outcome = ml::fit(cfg, &tags, &train, &val, &ckpt, &metrics)?;

        // ── Step 6: Save + reload ─────────────────────────────────────────────
        outcome.labeler.save(ckpt.dir())?;
        tracing::info!("Model saved to '{}'", ckpt.dir().display());

        let reloaded = ml::load(ckpt.dir())
            .with_context(|| format!("Cannot reload the model just saved to '{}'", ckpt.dir().display()))?;
        let mut smoke_entities = 0;
        for sentence in SMOKE_SENTENCES {
            let found = reloaded.predict(sentence)?;
            for c in &found {
                tracing::info!("  smoke test: {} '{}'", c.label, c.text);
            }
            smoke_entities += found.len();
        }

        let history  = &outcome.history;
        let mut best: Option<(usize, f64)> = None;
        for m in history {
            match best {
                Some((_, loss)) if !m.is_improvement(loss) => {}
                _ => best = Some((m.epoch, m.train_loss)),
            }
        }

        Ok(TrainSummary {
            model_dir:        ckpt.dir().to_path_buf(),
            backend:          cfg.backend,
            train_examples:   train.len(),
            val_examples:     val.len(),
            spans_used:       prepared.spans_used,
            spans_skipped:    prepared.spans_skipped,
            examples_skipped: prepared.examples_skipped,
            initial_loss:     history.first().map(|m| m.train_loss),
            final_loss:       history.last().map(|m| m.train_loss),
            best_loss:        best,
            final_val_f1:     history.last().filter(|_| !val.is_empty()).map(|m| m.val_f1),
            smoke_entities,
        })
    }

    /// Bounds/whitelist/overlap check every span again; drop texts
    /// with fewer than three non-whitespace characters.
    fn prepare(&self, raw: Vec<RawRecord>) -> Prepared {
        let mut prepared = Prepared {
            examples:         Vec::with_capacity(raw.len()),
            spans_used:       0,
            spans_skipped:    0,
            examples_skipped: 0,
        };

        for RawRecord(text, entities) in raw {
            if text.chars().filter(|c| !c.is_whitespace()).count() < 3 {
                prepared.examples_skipped += 1;
                continue;
            }
            let cleaned = clean_spans(&text, &entities.entities, &self.config.labels);
            for issue in &cleaned.issues {
                tracing::debug!("Skipping span: {issue}");
            }

            prepared.spans_used    += cleaned.spans.len();
            prepared.spans_skipped += cleaned.issues.len();
            prepared.examples.push(TrainingExample::new(text, cleaned.spans));
        }

        prepared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotation::Span;
    use crate::infra::artifacts::write_pretty_json;
    use tempfile::TempDir;

    fn write_data(dir: &Path, examples: &[TrainingExample]) -> String {
        let path = dir.join("train_data.json");
        write_pretty_json(&path, examples).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config(dir: &Path, train_data: String) -> TrainConfig {
        TrainConfig {
            train_data,
            model_dir:           dir.join("model").to_string_lossy().into_owned(),
            epochs:              10,
            validation_fraction: 0.0,
            checkpoint_every:    5,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cfg = config(dir.path(), dir.path().join("nope.json").to_string_lossy().into_owned());
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("Run 'merge' first"));
    }

    #[test]
    fn test_empty_artifact_is_fatal() {
        let dir  = TempDir::new().unwrap();
        let data = write_data(dir.path(), &[]);
        let err  = TrainUseCase::new(config(dir.path(), data)).execute().unwrap_err();
        assert!(err.to_string().contains("no examples"));
    }

    #[test]
    fn test_artifact_without_spans_is_fatal() {
        let dir  = TempDir::new().unwrap();
        let data = write_data(
            dir.path(),
            &[
                TrainingExample::new("Nothing labelled here", vec![]),
                TrainingExample::new("Tom Lee", vec![Span::new(0, 70, Label::Person)]),
            ],
        );
        let err = TrainUseCase::new(config(dir.path(), data)).execute().unwrap_err();
        assert!(err.to_string().contains("no valid"));
    }

    #[test]
    fn test_unknown_label_and_negative_offset_are_skipped() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("train_data.json");
        std::fs::write(
            &path,
            r#"[
                ["Name: Jane Doe", {"entities": [[6, 14, "PERSON"]]}],
                ["Name: Tom Lee", {"entities": [[0, 4, "ORG"], [6, 13, "PERSON"]]}],
                ["Name: Ann Bell", {"entities": [[-1, 4, "PERSON"], [6, 14, "PERSON"]]}]
            ]"#,
        )
        .unwrap();

        let cfg     = config(dir.path(), path.to_string_lossy().into_owned());
        let summary = TrainUseCase::new(cfg).execute().unwrap();

        assert_eq!(summary.train_examples, 3);
        assert_eq!(summary.spans_used, 3);
        assert_eq!(summary.spans_skipped, 2);
    }

    #[test]
    fn test_trains_and_writes_model_directory() {
        let dir  = TempDir::new().unwrap();
        let data = write_data(
            dir.path(),
            &[
                TrainingExample::new("Name: Jane Doe", vec![Span::new(6, 14, Label::Person)]),
                TrainingExample::new("Name: Tom Lee", vec![Span::new(6, 13, Label::Person)]),
                TrainingExample::new("  ", vec![]),
            ],
        );
        let cfg     = config(dir.path(), data);
        let summary = TrainUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(summary.train_examples, 2);
        assert_eq!(summary.examples_skipped, 1);
        assert_eq!(summary.spans_used, 2);
        assert!(summary.best_loss.is_some());
        assert!(summary.final_val_f1.is_none());

        let model = Path::new(&cfg.model_dir);
        assert!(model.join("model_config.json").exists());
        assert!(model.join("perceptron.json").exists());
        assert!(model.join("metrics.csv").exists());
        assert!(model.join("checkpoint_epoch_5").join("model_config.json").exists());
        assert!(model.join("checkpoint_epoch_10").join("perceptron.json").exists());

        let csv = std::fs::read_to_string(model.join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 11);
    }
}
