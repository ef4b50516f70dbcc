// ============================================================
// Layer 4 — Document Loaders
// ============================================================
// Two DocumentSource implementations:
//
//   PdfLoader   — raw PDFs, text pulled out with pdf-extract
//   TextLoader  — the .txt files the `extract` step wrote
//
// Files are visited in file-name order so every step of the
// pipeline sees documents in the same, reproducible order.
//
// pdf-extract is a black box: it can be slow on odd files, and it
// can panic on malformed ones. Each PDF is parsed on a worker
// thread and we wait at most `timeout` for it. A hung or panicking
// parse becomes one failed document, not a stuck or crashed batch.
// (A timed-out worker is left to finish on its own; nothing reads
// its result.)
//
// Reference: Rust Book §16.2 (Message Passing)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use crate::domain::document::{Document, LoadFailure, LoadOutcome};
use crate::domain::traits::DocumentSource;

/// List files in `dir` with extension `ext`, sorted by file name.
/// A missing directory is an error: every step needs its input.
pub fn list_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("input directory '{}' does not exist", dir.display());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

// ─── PDF ──────────────────────────────────────────────────────────────────────

/// Extract the text of one PDF, giving up after `timeout`.
pub fn extract_pdf_text(path: &Path, timeout: Duration) -> Result<String> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    run_with_timeout(path, timeout, move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
    })
}

/// Run `extract` on a worker thread and wait at most `timeout` for it.
fn run_with_timeout<F>(path: &Path, timeout: Duration, extract: F) -> Result<String>
where
    F: FnOnce() -> std::result::Result<String, String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("pdf-extract".to_string())
        .spawn(move || {
            // The receiver may have timed out already
            let _ = tx.send(extract());
        })
        .context("Cannot spawn PDF extraction worker")?;

    match rx.recv_timeout(timeout) {
        Ok(Ok(text))  => Ok(text),
        Ok(Err(e))    => bail!("pdf-extract failed on '{}': {e}", path.display()),
        Err(RecvTimeoutError::Timeout) => {
            bail!("extraction of '{}' timed out after {:?}", path.display(), timeout)
        }
        Err(RecvTimeoutError::Disconnected) => {
            bail!("extraction worker for '{}' panicked", path.display())
        }
    }
}

/// Loads every .pdf in a directory.
pub struct PdfLoader {
    dir:     PathBuf,
    timeout: Duration,
}

impl PdfLoader {
    pub fn new(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { dir: dir.into(), timeout }
    }
}

impl DocumentSource for PdfLoader {
    fn load_all(&self) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::default();

        for path in list_files(&self.dir, "pdf")? {
            let source = file_name(&path);
            match extract_pdf_text(&path, self.timeout) {
                Ok(text) => {
                    tracing::debug!("Extracted: {} ({} chars)", source, text.len());
                    outcome.documents.push(Document::new(source, text));
                }
                Err(e) => {
                    tracing::warn!("Skipping '{}': {:#}", path.display(), e);
                    outcome.failures.push(LoadFailure { source, reason: format!("{e:#}") });
                }
            }
        }

        Ok(outcome)
    }
}

// ─── Plain text ───────────────────────────────────────────────────────────────

/// Loads every .txt in a directory.
pub struct TextLoader {
    dir: PathBuf,
}

impl TextLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for TextLoader {
    fn load_all(&self) -> Result<LoadOutcome> {
        let mut outcome = LoadOutcome::default();

        for path in list_files(&self.dir, "txt")? {
            let source = file_name(&path);
            match fs::read_to_string(&path) {
                Ok(text) => outcome.documents.push(Document::new(source, text)),
                Err(e) => {
                    tracing::warn!("Skipping '{}': {}", path.display(), e);
                    outcome.failures.push(LoadFailure { source, reason: e.to_string() });
                }
            }
        }

        tracing::info!(
            "Loaded {} text documents from '{}'",
            outcome.documents.len(),
            self.dir.display()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = list_files(Path::new("/definitely/not/here"), "pdf").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_list_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "c.json", "D.TXT"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let names: Vec<String> = list_files(dir.path(), "txt")
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["D.TXT", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_corrupt_pdf_is_a_per_document_failure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not a pdf at all").unwrap();

        let outcome = PdfLoader::new(dir.path(), Duration::from_secs(10)).load_all().unwrap();
        assert!(outcome.documents.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, "broken.pdf");
    }

    #[test]
    fn test_slow_extraction_times_out() {
        let err = run_with_timeout(Path::new("slow.pdf"), Duration::from_millis(10), || {
            thread::sleep(Duration::from_millis(500));
            Ok("late".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_panicking_extraction_is_an_error() {
        let err = run_with_timeout(Path::new("bad.pdf"), Duration::from_secs(5), || {
            panic!("malformed xref table")
        })
        .unwrap_err();
        assert!(err.to_string().contains("panicked"));
    }

    #[test]
    fn test_fast_extraction_returns_text() {
        let text = run_with_timeout(Path::new("ok.pdf"), Duration::from_secs(5), || {
            Ok("Jane Doe".to_string())
        })
        .unwrap();
        assert_eq!(text, "Jane Doe");
    }

    #[test]
    fn test_text_loader_reads_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("jane.txt"), "Name: Jane Doe").unwrap();

        let outcome = TextLoader::new(dir.path()).load_all().unwrap();
        assert_eq!(outcome.documents.len(), 1);
        assert_eq!(outcome.documents[0].stem(), "jane");
    }
}
