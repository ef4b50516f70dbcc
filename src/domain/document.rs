// ============================================================
// Layer 3 — Document Domain Type
// ============================================================
// A single document as seen by the pipeline: the file it came
// from and its extracted plain text.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A raw document loaded from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// File name the text came from, kept so results can be
    /// written next to a matching `<stem>` name
    pub source: String,

    /// Full extracted text content
    pub text: String,
}

impl Document {
    /// Create a new Document with a source name and text content.
    ///
    /// Example:
    ///   let doc = Document::new("jane_doe.pdf", "Name: Jane Doe ...");
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
        }
    }

    /// File stem of the source, e.g. "jane_doe" for "jane_doe.pdf"
    pub fn stem(&self) -> &str {
        Path::new(&self.source)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.source)
    }
}

/// One document that could not be loaded, with the reason.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub source: String,
    pub reason: String,
}

/// Result of loading a whole directory. Per-document failures are
/// collected here instead of aborting the batch.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<Document>,
    pub failures:  Vec<LoadFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_strips_extension() {
        let doc = Document::new("NguyenVanThang_AI_Engineer.pdf", "");
        assert_eq!(doc.stem(), "NguyenVanThang_AI_Engineer");
    }
}
