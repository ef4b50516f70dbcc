// ============================================================
// Layer 6 — Artifact Files
// ============================================================
// JSON files the pipeline hands from one step to the next:
//
//   data/train_data.json             ← merge   (read by train)
//   data/train_data.summary.json     ← merge
//   data/predictions/<stem>_result.json ← predict
//
// All of them are pretty-printed (two-space indent), end with a
// newline, and keep non-ASCII text as-is. Same value in → same
// bytes out.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::prediction::{Entity, PredictionResult};

pub fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory '{}'", parent.display()))?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("Cannot write '{}'", path.display()))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid JSON in '{}'", path.display()))
}

/// `<dir>/<stem>.summary.json` next to `artifact`.
pub fn summary_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("train_data");
    artifact.with_file_name(format!("{stem}.summary.json"))
}

// ─── Prediction result file ───────────────────────────────────────────────────

#[derive(Serialize)]
struct ResultDetails<'a> {
    names:  Vec<&'a Entity>,
    emails: Vec<&'a Entity>,
}

/// On-disk shape of one document's predictions.
#[derive(Serialize)]
struct ResultFile<'a> {
    file:    &'a str,
    name:    Vec<&'a str>,
    email:   Vec<&'a str>,
    details: ResultDetails<'a>,
}

impl<'a> From<&'a PredictionResult> for ResultFile<'a> {
    fn from(result: &'a PredictionResult) -> Self {
        use crate::domain::annotation::Label;
        Self {
            file:  &result.file,
            name:  result.names(),
            email: result.emails(),
            details: ResultDetails {
                names:  result.of_label(Label::Person).collect(),
                emails: result.of_label(Label::Email).collect(),
            },
        }
    }
}

/// Write `<dir>/<stem>_result.json` and return its path.
pub fn write_result(dir: &Path, stem: &str, result: &PredictionResult) -> Result<PathBuf> {
    let path = dir.join(format!("{stem}_result.json"));
    write_pretty_json(&path, &ResultFile::from(result))?;
    tracing::debug!("Saved predictions to '{}'", path.display());
    Ok(path)
}
