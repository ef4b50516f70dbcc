// ============================================================
// Layer 5 — Neural Training Loop
// ============================================================
// Mini-batch training of the windowed token classifier with
// Burn's DataLoader and Adam on the CPU ndarray backend.
//
//   - Training runs on TrainBackend (Autodiff<NdArray>)
//   - model.valid() drops autodiff (and dropout) for evaluation,
//     giving a TokenClassifier<NdArray> that NeuralTagger wraps
//   - The vocabulary is built from the training split only, so
//     validation words the model never saw map to [UNK]
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TokenBatcher, dataset::TokenDataset, tokens::tokenize};
use crate::domain::annotation::TrainingExample;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::{
    evaluate::evaluate,
    inferencer::{encode_tokens, NeuralTagger},
    model::{TokenClassifier, TokenClassifierConfig},
    tags::TagSet,
};

type TrainBackend = Autodiff<NdArray>;

pub fn train(
    cfg:     &TrainConfig,
    tags:    &TagSet,
    train:   &[TrainingExample],
    val:     &[TrainingExample],
    ckpt:    &CheckpointManager,
    metrics: &MetricsLogger,
) -> Result<(NeuralTagger, Vec<EpochMetrics>)> {
    let device = NdArrayDevice::default();
    TrainBackend::seed(cfg.seed);

    // ── Vocabulary ────────────────────────────────────────────────────────────
    let tokenized: Vec<_> = train.iter().map(|ex| (tokenize(&ex.text), ex)).collect();
    let words: Vec<String> = tokenized
        .iter()
        .flat_map(|(tokens, _)| tokens.iter().map(|t| t.lower()))
        .collect();
    let (tokenizer, vocab_size) = TokenizerStore::new(ckpt.dir()).build_and_save(&words)?;

    // ── Windows ───────────────────────────────────────────────────────────────
    let model_cfg = TokenClassifierConfig::new(vocab_size, tags.len())
        .with_word_dim(cfg.word_dim)
        .with_hidden_dim(cfg.hidden_dim)
        .with_dropout(cfg.dropout);

    let windows: Vec<_> = tokenized
        .iter()
        .flat_map(|(tokens, ex)| {
            let gold = tags.encode(tokens, &ex.spans);
            encode_tokens(&tokenizer, tokens, Some(&gold), model_cfg.window)
        })
        .collect();
    tracing::info!("Training windows: {} | vocabulary: {}", windows.len(), vocab_size);

    // ── Model + Adam ──────────────────────────────────────────────────────────
    let mut model: TokenClassifier<TrainBackend> = model_cfg.init(&device);
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let loader = DataLoaderBuilder::new(TokenBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.batch_size.max(1))
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(TokenDataset::new(windows));

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut history = Vec::with_capacity(cfg.epochs);

    for epoch in 1..=cfg.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;

        for batch in loader.iter() {
            let (loss, _) = model.forward_loss(batch.words, batch.shapes, batch.targets);
            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let loss     = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        let snapshot = NeuralTagger::new(model.valid(), model_cfg.clone(), tokenizer.clone(), tags.clone());
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

    tracing::info!("Neural training complete");
    Ok((NeuralTagger::new(model.valid(), model_cfg, tokenizer, tags.clone()), history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotation::{Label, Span};
    use crate::domain::traits::SequenceLabeler;
    use tempfile::TempDir;

    #[test]
    fn test_neural_smoke_train_save_load() {
        let dir = TempDir::new().unwrap();
        let cfg = TrainConfig {
            model_dir:        dir.path().to_string_lossy().into_owned(),
            epochs:           2,
            checkpoint_every: 1,
            word_dim:         8,
            hidden_dim:       16,
            batch_size:       4,
            ..TrainConfig::default()
        };
        let tags = TagSet::new(Label::ALL.to_vec());
        let examples = vec![
            TrainingExample::new(
                "Name: Jane Doe\nEmail: jane@acme.io",
                vec![Span::new(6, 14, Label::Person), Span::new(22, 34, Label::Email)],
            ),
            TrainingExample::new("Name: Tom Lee", vec![Span::new(6, 13, Label::Person)]),
        ];
        let ckpt = CheckpointManager::new(&cfg.model_dir);
        let log  = MetricsLogger::new(&cfg.model_dir).unwrap();

        let (tagger, history) = train(&cfg, &tags, &examples, &examples[..1], &ckpt, &log).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.train_loss.is_finite()));
        assert!(dir.path().join("checkpoint_epoch_2").join("classifier.json").exists());

        tagger.save(dir.path()).unwrap();
        let loaded = NeuralTagger::load(dir.path(), tags).unwrap();
        assert!(loaded.predict("Name: Ann Bell").is_ok());
        assert!(loaded.predict("").unwrap().is_empty());
    }
}
