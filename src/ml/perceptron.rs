// ============================================================
// Layer 5 — Averaged Perceptron Tagger (default backend)
// ============================================================
// A greedy left-to-right BIO tagger. Each token is scored with a
// linear model over string features (see features.rs), and the
// two previous *predicted* tags feed into the next token's
// features.
//
// Training is the classic averaged perceptron: on a wrong guess,
// +1 to the gold tag's weights and -1 to the guessed tag's weights
// for every active feature. The weights that get saved are the
// AVERAGE over every update step. This keeps the final model from
// overreacting to the last few examples it saw.
//
// Everything is deterministic. Feature order is fixed, tags are
// scanned in id order, and the hash maps are only used for
// lookups. Same examples + same seed → same weights, bit for bit.
//
// Persisted as `perceptron.json` (BTreeMap → sorted keys).
//
// Reference: Collins (2002) Discriminative Training Methods for HMMs

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    splitter::shuffle_in_place,
    tokens::{tokenize, Token},
};
use crate::domain::annotation::TrainingExample;
use crate::domain::prediction::Candidate;
use crate::domain::traits::SequenceLabeler;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::{evaluate::evaluate, features::token_features, tags::TagSet};

const WEIGHTS_FILE: &str = "perceptron.json";

// ─── AveragedPerceptron ───────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct AveragedPerceptron {
    n_tags:    usize,
    weights:   HashMap<String, Vec<f64>>,
    totals:    HashMap<String, Vec<f64>>,
    stamps:    HashMap<String, Vec<u64>>,
    instances: u64,
}

impl AveragedPerceptron {
    pub fn new(n_tags: usize) -> Self {
        Self { n_tags, ..Default::default() }
    }

    pub fn scores(&self, feats: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.n_tags];
        for f in feats {
            if let Some(w) = self.weights.get(f) {
                for (s, w) in scores.iter_mut().zip(w) {
                    *s += w;
                }
            }
        }
        scores
    }

    pub fn predict(&self, feats: &[String]) -> (usize, f32) {
        let scores = self.scores(feats);
        let best   = argmax(&scores);
        (best, softmax_at(&scores, best))
    }

    pub fn update(&mut self, truth: usize, guess: usize, feats: &[String]) {
        self.instances += 1;
        if truth == guess {
            return;
        }
        for f in feats {
            for (tag, delta) in [(truth, 1.0), (guess, -1.0)] {
                let n       = self.n_tags;
                let weights = self.weights.entry(f.clone()).or_insert_with(|| vec![0.0; n]);
                let totals  = self.totals.entry(f.clone()).or_insert_with(|| vec![0.0; n]);
                let stamps  = self.stamps.entry(f.clone()).or_insert_with(|| vec![0; n]);

                totals[tag] += (self.instances - stamps[tag]) as f64 * weights[tag];
                stamps[tag]  = self.instances;
                weights[tag] += delta;
            }
        }
    }

    /// Averaged copy of the current weights.
    pub fn averaged(&self) -> AveragedPerceptron {
        let mut weights = HashMap::with_capacity(self.weights.len());
        let steps       = self.instances.max(1) as f64;

        for (f, w) in &self.weights {
            let totals = &self.totals[f];
            let stamps = &self.stamps[f];
            let avg: Vec<f64> = (0..self.n_tags)
                .map(|t| {
                    let total = totals[t] + (self.instances - stamps[t]) as f64 * w[t];
                    total / steps
                })
                .collect();
            if avg.iter().any(|v| *v != 0.0) {
                weights.insert(f.clone(), avg);
            }
        }

        AveragedPerceptron { n_tags: self.n_tags, weights, ..Default::default() }
    }
}

fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, s) in scores.iter().enumerate() {
        if *s > scores[best] {
            best = i;
        }
    }
    best
}

fn softmax_at(scores: &[f64], idx: usize) -> f32 {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = scores.iter().map(|s| (s - max).exp()).sum();
    ((scores[idx] - max).exp() / sum) as f32
}

// ─── PerceptronTagger ─────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct PerceptronTagger {
    tags:  TagSet,
    model: AveragedPerceptron,
}

#[derive(Serialize, Deserialize)]
struct WeightsFile {
    tags:    Vec<String>,
    weights: BTreeMap<String, Vec<f64>>,
}

impl PerceptronTagger {
    pub fn new(tags: TagSet, model: AveragedPerceptron) -> Self {
        Self { tags, model }
    }

    /// Tag every token greedily; returns (tags, confidences).
    fn tag_tokens(&self, tokens: &[Token]) -> (Vec<usize>, Vec<f32>) {
        let mut tags  = Vec::with_capacity(tokens.len());
        let mut confs = Vec::with_capacity(tokens.len());
        let (mut prev, mut prev2) = ("-START-".to_string(), "-START-".to_string());

        for idx in 0..tokens.len() {
            let feats        = token_features(tokens, idx, &prev, &prev2);
            let (tag, conf)  = self.model.predict(&feats);
            prev2 = std::mem::replace(&mut prev, self.tags.name(tag));
            tags.push(tag);
            confs.push(conf);
        }

        (tags, confs)
    }

    pub fn load(dir: &Path, tags: TagSet) -> Result<Self> {
        let path = dir.join(WEIGHTS_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read perceptron weights '{}'", path.display()))?;
        let file: WeightsFile = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt perceptron weights '{}'", path.display()))?;

        let expected: Vec<String> = (0..tags.len()).map(|t| tags.name(t)).collect();
        anyhow::ensure!(
            file.tags == expected,
            "perceptron tag set {:?} does not match model config {:?}",
            file.tags,
            expected
        );

        let model = AveragedPerceptron {
            n_tags:  tags.len(),
            weights: file.weights.into_iter().collect(),
            ..Default::default()
        };
        Ok(Self { tags, model })
    }
}

impl SequenceLabeler for PerceptronTagger {
    fn backend_name(&self) -> &'static str {
        "perceptron"
    }

    fn predict(&self, text: &str) -> Result<Vec<Candidate>> {
        let tokens        = tokenize(text);
        let (tags, confs) = self.tag_tokens(&tokens);
        Ok(self.tags.decode(text, &tokens, &tags, &confs))
    }

    fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;
        let file = WeightsFile {
            tags:    (0..self.tags.len()).map(|t| self.tags.name(t)).collect(),
            weights: self.model.weights.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        };
        let path = dir.join(WEIGHTS_FILE);
        fs::write(&path, serde_json::to_string(&file)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(())
    }
}

// ─── Training loop ────────────────────────────────────────────────────────────

/// Fit a perceptron tagger. One metrics row per epoch; the
/// "loss" is the fraction of training tokens tagged wrong.
pub fn train(
    cfg:     &TrainConfig,
    tags:    &TagSet,
    train:   &[TrainingExample],
    val:     &[TrainingExample],
    ckpt:    &CheckpointManager,
    metrics: &MetricsLogger,
) -> Result<(PerceptronTagger, Vec<EpochMetrics>)> {
    // Tokenize once; each epoch only reorders
    let mut sentences: Vec<_> = train
        .iter()
        .map(|ex| {
            let tokens = tokenize(&ex.text);
            let gold   = tags.encode(&tokens, &ex.spans);
            (tokens, gold)
        })
        .collect();

    let mut model   = AveragedPerceptron::new(tags.len());
    let mut rng     = StdRng::seed_from_u64(cfg.seed);
    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {
        shuffle_in_place(&mut sentences, &mut rng);

        let (mut wrong, mut total) = (0usize, 0usize);
        for (tokens, gold) in &sentences {
            let (mut prev, mut prev2) = ("-START-".to_string(), "-START-".to_string());
            for idx in 0..tokens.len() {
                let feats      = token_features(tokens, idx, &prev, &prev2);
                let (guess, _) = model.predict(&feats);
                model.update(gold[idx], guess, &feats);

                if guess != gold[idx] {
                    wrong += 1;
                }
                total += 1;
                prev2 = std::mem::replace(&mut prev, tags.name(guess));
            }
        }

        let loss     = if total > 0 { wrong as f64 / total as f64 } else { 0.0 };
        let snapshot = PerceptronTagger::new(tags.clone(), model.averaged());
        let scores   = evaluate(&snapshot, val)?;
        let row      = EpochMetrics::new(epoch, loss, scores.precision, scores.recall, scores.f1);

        tracing::info!(
            "Epoch {:>3}/{} | loss={:.6} | val_f1={:.3}",
            epoch, cfg.epochs, loss, scores.f1
        );
        metrics.log(&row)?;
        history.push(row);

        if cfg.checkpoint_every > 0 && epoch % cfg.checkpoint_every == 0 {
            ckpt.save_checkpoint(epoch, &snapshot)?;
        }
    }

    Ok((PerceptronTagger::new(tags.clone(), model.averaged()), history))
}
