// ============================================================
// Layer 2 — ExtractUseCase
// ============================================================
// Step 1 of the pipeline: PDF → plain text.
//
//   data/raw/resumes/jane_doe.pdf  ──►  data/text/jane_doe.txt
//
//   Step 1: Load every .pdf, in file-name order  (Layer 4 - data)
//   Step 2: Clean the extracted text             (Layer 4 - data)
//   Step 3: Write <stem>.txt                     (filesystem)
//
// A PDF that fails, panics or times out is counted and skipped.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::data::{loader::PdfLoader, preprocessor::Preprocessor};
use crate::domain::document::LoadFailure;
use crate::domain::traits::DocumentSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub pdf_dir:      String,
    pub text_dir:     String,
    pub timeout_secs: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            pdf_dir:      "data/raw/resumes".to_string(),
            text_dir:     "data/text".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Default)]
pub struct ExtractSummary {
    pub extracted: usize,
    /// Extracted, but no text survived cleaning
    pub empty:     usize,
    pub failures:  Vec<LoadFailure>,
}

impl ExtractSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

pub struct ExtractUseCase {
    config: ExtractConfig,
}

impl ExtractUseCase {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ExtractSummary> {
        let cfg = &self.config;

        tracing::info!("Extracting PDFs from '{}'", cfg.pdf_dir);
        let loader  = PdfLoader::new(&cfg.pdf_dir, Duration::from_secs(cfg.timeout_secs));
        let outcome = loader.load_all()?;

        let text_dir = Path::new(&cfg.text_dir);
        fs::create_dir_all(text_dir)
            .with_context(|| format!("Cannot create text directory '{}'", text_dir.display()))?;

        let preprocessor = Preprocessor::new();
        let mut summary  = ExtractSummary { failures: outcome.failures, ..Default::default() };

        for doc in &outcome.documents {
            let text = preprocessor.clean(&doc.text);
            if text.is_empty() {
                tracing::warn!("'{}' has no extractable text (scanned image?)", doc.source);
                summary.empty += 1;
            }

            let path = text_dir.join(format!("{}.txt", doc.stem()));
            fs::write(&path, &text)
                .with_context(|| format!("Cannot write '{}'", path.display()))?;
            tracing::info!("{} → {} ({} chars)", doc.source, path.display(), text.chars().count());
            summary.extracted += 1;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(pdf_dir: &Path, text_dir: &Path) -> ExtractConfig {
        ExtractConfig {
            pdf_dir:      pdf_dir.to_string_lossy().into_owned(),
            text_dir:     text_dir.to_string_lossy().into_owned(),
            timeout_secs: 10,
        }
    }

    #[test]
    fn test_missing_pdf_dir_is_fatal() {
        let out = TempDir::new().unwrap();
        let cfg = config(Path::new("/no/such/pdfs"), out.path());
        assert!(ExtractUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_corrupt_pdf_is_counted_not_fatal() {
        let pdfs = TempDir::new().unwrap();
        let out  = TempDir::new().unwrap();
        fs::write(pdfs.path().join("broken.pdf"), b"this is not a pdf").unwrap();
        fs::write(pdfs.path().join("notes.md"), b"ignored").unwrap();

        let summary = ExtractUseCase::new(config(pdfs.path(), out.path())).execute().unwrap();
        assert_eq!(summary.extracted, 0);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures[0].source, "broken.pdf");
    }
}
