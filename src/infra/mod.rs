// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence that several layers share:
//
//   checkpoint.rs      — model directory layout
//                        model_config.json manifest, per-epoch
//                        checkpoint snapshots, burn
//                        CompactRecorder weights for the
//                        neural backend.
//
//   tokenizer_store.rs — vocabulary persistence
//                        Builds a WordLevel tokenizer JSON from
//                        the training words and reloads it, so
//                        training and prediction use the same
//                        word ids.
//
//   metrics.rs         — training metrics logging
//                        One CSV row per epoch (loss and
//                        validation precision / recall / F1).
//
//   artifacts.rs       — JSON files passed between steps
//                        (training artifact, merge summary,
//                        per-document prediction results).
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model directory, manifest and checkpoint management
pub mod checkpoint;

/// Vocabulary building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;

/// Pretty JSON artifacts and prediction result files
pub mod artifacts;
