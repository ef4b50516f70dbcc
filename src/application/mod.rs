// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// One use case per pipeline step. Each one owns a serde config
// struct with baked-in default paths and coordinates the other
// layers; it returns a summary and never prints (that's Layer 1).
//
//   extract  — PDF → text            (ExtractUseCase)
//   merge    — annotations → artifact (MergeUseCase)
//   train    — artifact → model       (TrainUseCase)
//   predict  — text → names / emails  (PredictUseCase)
//
// Steps talk to each other only through files on disk.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

/// PDF-to-text conversion
pub mod extract_use_case;

/// Annotation merging
pub mod merge_use_case;

/// The training workflow
pub mod train_use_case;

/// The inference workflow
pub mod predict_use_case;
