// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams of the pipeline:
//
//   DocumentSource   — where document text comes from
//                      (PdfLoader, TextLoader)
//   SequenceLabeler  — the statistical model, a black box with
//                      a predict(text) → candidates contract
//                      (PerceptronTagger, NeuralTagger)
//
// The application layer only talks to these traits, so a new
// model backend never touches the predictor.
//
// Reference: Rust Book §10 (Traits), §17 (Trait Objects)

use anyhow::Result;
use std::path::Path;

use crate::domain::document::LoadOutcome;
use crate::domain::prediction::Candidate;

// ─── DocumentSource ───────────────────────────────────────────────────────────
/// Any component that can load documents from a source.
pub trait DocumentSource {
    /// Load every document. An `Err` means the source itself is
    /// unusable (e.g. the directory is missing); individual bad
    /// documents are reported in `LoadOutcome::failures`.
    fn load_all(&self) -> Result<LoadOutcome>;
}

// ─── SequenceLabeler ──────────────────────────────────────────────────────────
/// A fitted sequence-labeling model.
pub trait SequenceLabeler {
    /// Short backend name, stored in the model manifest
    fn backend_name(&self) -> &'static str;

    /// Raw labeled spans for `text`, in document order.
    fn predict(&self, text: &str) -> Result<Vec<Candidate>>;

    /// Write the backend's files into `dir`.
    fn save(&self, dir: &Path) -> Result<()>;
}
