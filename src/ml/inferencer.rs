// ============================================================
// Layer 5 — Neural Tagger (inference side of the neural backend)
// ============================================================
use anyhow::{Context, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::activation::softmax,
};
use std::{fs, path::Path};
use tokenizers::Tokenizer;

use crate::data::{
    batcher::TokenBatcher,
    dataset::{build_windows, TokenWindow},
    tokens::{tokenize, Token},
};
use crate::domain::prediction::Candidate;
use crate::domain::traits::SequenceLabeler;
use crate::infra::checkpoint::{load_classifier, save_classifier};
use crate::infra::tokenizer_store::{word_id, TokenizerStore};
use crate::ml::{
    features::coarse_shape,
    model::{TokenClassifier, TokenClassifierConfig},
    tags::TagSet,
};

pub type InferBackend = NdArray;

const WEIGHTS_NAME: &str = "classifier";
const CONFIG_FILE: &str = "classifier.json";

pub struct NeuralTagger {
    model:     TokenClassifier<InferBackend>,
    config:    TokenClassifierConfig,
    tokenizer: Tokenizer,
    tags:      TagSet,
    device:    NdArrayDevice,
}

impl NeuralTagger {
    pub fn new(
        model:     TokenClassifier<InferBackend>,
        config:    TokenClassifierConfig,
        tokenizer: Tokenizer,
        tags:      TagSet,
    ) -> Self {
        Self { model, config, tokenizer, tags, device: NdArrayDevice::default() }
    }

    pub fn load(dir: &Path, tags: TagSet) -> Result<Self> {
        let device = NdArrayDevice::default();
        let path   = dir.join(CONFIG_FILE);
        let config = TokenClassifierConfig::load(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read classifier config '{}': {}", path.display(), e))?;
        anyhow::ensure!(
            config.num_tags == tags.len(),
            "classifier has {} tags but the model config lists {}",
            config.num_tags,
            tags.len()
        );

        let tokenizer = TokenizerStore::new(dir).load()?;
        let model     = config.init::<InferBackend>(&device);
        let model     = load_classifier(model, dir, WEIGHTS_NAME, &device)?;
        tracing::info!("Neural tagger loaded from '{}'", dir.display());

        Ok(Self { model, config, tokenizer, tags, device })
    }

    /// Prediction-time windows for a token sequence.
    pub fn windows(&self, tokens: &[Token]) -> Vec<TokenWindow> {
        encode_tokens(&self.tokenizer, tokens, None, self.config.window)
    }
}

/// Vocabulary + shape ids for `tokens`, cut into windows.
pub fn encode_tokens(
    tokenizer: &Tokenizer,
    tokens:    &[Token],
    gold:      Option<&[usize]>,
    width:     usize,
) -> Vec<TokenWindow> {
    let ids: Vec<u32>    = tokens.iter().map(|t| word_id(tokenizer, &t.lower())).collect();
    let shapes: Vec<u32> = tokens.iter().map(|t| coarse_shape(t) as u32).collect();
    build_windows(&ids, &shapes, gold, width)
}

impl SequenceLabeler for NeuralTagger {
    fn backend_name(&self) -> &'static str {
        "neural"
    }

    fn predict(&self, text: &str) -> Result<Vec<Candidate>> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let batch  = TokenBatcher::<InferBackend>::new(self.device.clone()).batch(self.windows(&tokens));
        let logits = self.model.forward(batch.words, batch.shapes);
        let probs: Vec<f32> = softmax(logits, 1)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read tag probabilities: {e:?}"))?;

        let n_tags = self.tags.len();
        let (tags, confs): (Vec<usize>, Vec<f32>) = probs
            .chunks(n_tags)
            .map(|row| {
                let mut best = 0;
                for (i, p) in row.iter().enumerate() {
                    if *p > row[best] {
                        best = i;
                    }
                }
                (best, row[best])
            })
            .unzip();

        Ok(self.tags.decode(text, &tokens, &tags, &confs))
    }

    fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;

        save_classifier(&self.model, dir, WEIGHTS_NAME)?;
        self.config
            .save(dir.join(CONFIG_FILE))
            .with_context(|| format!("Cannot write classifier config into '{}'", dir.display()))?;
        self.tokenizer
            .save(dir.join("tokenizer.json"), true)
            .map_err(|e| anyhow::anyhow!("Cannot write tokenizer into '{}': {e}", dir.display()))?;
        Ok(())
    }
}
