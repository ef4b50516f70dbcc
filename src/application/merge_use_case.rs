// ============================================================
// Layer 2 — MergeUseCase
// ============================================================
// Step 2 of the pipeline: many annotation files → one training
// artifact.
//
//   Step 1: List *.json in the annotation dir      (Layer 4 - data)
//   Step 2: Parse each file; bad files are skipped (Layer 3 - domain)
//   Step 3: Validate spans, resolve overlaps       (Layer 4 - data)
//   Step 4: Write artifact + summary JSON          (Layer 6 - infra)
//
// Running it twice on the same files writes the same bytes.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::data::{
    loader::{file_name, list_files},
    merger::{AnnotationMerger, MergeSummary},
};
use crate::domain::annotation::{AnnotationFile, Label};
use crate::infra::artifacts::{summary_path, write_pretty_json};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    pub annotations_dir: String,
    pub output_file:     String,
    pub labels:          Vec<Label>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            annotations_dir: "data/annotations".to_string(),
            output_file:     "data/train_data.json".to_string(),
            labels:          Label::ALL.to_vec(),
        }
    }
}

pub struct MergeUseCase {
    config: MergeConfig,
}

impl MergeUseCase {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<MergeSummary> {
        let cfg = &self.config;

        let files = list_files(Path::new(&cfg.annotations_dir), "json")?;
        tracing::info!("Merging {} annotation files from '{}'", files.len(), cfg.annotations_dir);

        let mut merger = AnnotationMerger::new(cfg.labels.clone());
        for path in &files {
            let name   = file_name(path);
            let parsed = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    serde_json::from_str::<AnnotationFile>(&json).map_err(|e| e.to_string())
                });

            match parsed {
                Ok(file)    => merger.add_file(&name, file),
                Err(reason) => merger.add_failed(&name, &reason),
            }
        }

        let (examples, summary) = merger.finish();

        let output = Path::new(&cfg.output_file);
        write_pretty_json(output, &examples)?;
        write_pretty_json(&summary_path(output), &summary)?;

        tracing::info!(
            "Merged {} examples ({} spans kept, {} dropped) into '{}'",
            summary.examples,
            summary.spans_kept,
            summary.total_dropped(),
            output.display()
        );
        Ok(summary)
    }
}
