// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Step 4 of the pipeline: text → validated names and emails.
//
//   Step 1: Load the model named in model_config.json (Layer 5 - ml)
//   Step 2: Gather documents (one file, or every .txt) (Layer 4 - data)
//   Step 3: Per document:
//             model candidates + rule candidates
//             → filters → dedup                     (post-processing)
//   Step 4: Write <stem>_result.json                 (Layer 6 - infra)
//
// A document that cannot be read or predicted is counted and the
// batch moves on. A document with nothing found is a normal,
// empty result.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::data::{
    loader::{extract_pdf_text, file_name, TextLoader},
    preprocessor::Preprocessor,
};
use crate::domain::annotation::Label;
use crate::domain::document::{Document, LoadFailure, LoadOutcome};
use crate::domain::prediction::PredictionResult;
use crate::domain::traits::{DocumentSource, SequenceLabeler};
use crate::infra::artifacts::write_result;
use crate::ml;
use crate::postprocess::{patterns::rule_candidates, postprocess, FilterConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    pub model_dir:            String,
    /// A single .pdf or .txt; `None` means every .txt in `text_dir`
    pub input:                Option<String>,
    pub text_dir:             String,
    pub output_dir:           String,
    pub labels:               Vec<Label>,
    pub confidence_threshold: f32,
    pub use_rules:            bool,
    pub timeout_secs:         u64,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            model_dir:            "data/models/ner_resume".to_string(),
            input:                None,
            text_dir:             "data/text".to_string(),
            output_dir:           "data/predictions".to_string(),
            labels:               Label::ALL.to_vec(),
            confidence_threshold: 0.0,
            use_rules:            true,
            timeout_secs:         60,
        }
    }
}

#[derive(Debug, Default)]
pub struct PredictSummary {
    pub results:  Vec<PredictionResult>,
    pub failures: Vec<LoadFailure>,
    /// Documents where nothing survived post-processing
    pub empty:    usize,
}

impl PredictSummary {
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

pub struct PredictUseCase {
    config:  PredictConfig,
    filter:  FilterConfig,
    labeler: Box<dyn SequenceLabeler>,
}

impl PredictUseCase {
    pub fn new(config: PredictConfig) -> Result<Self> {
        let labeler = ml::load(Path::new(&config.model_dir))?;
        tracing::info!("Loaded {} model from '{}'", labeler.backend_name(), config.model_dir);

        let filter = FilterConfig {
            labels:               config.labels.clone(),
            confidence_threshold: config.confidence_threshold,
        };
        Ok(Self { config, filter, labeler })
    }

    /// Predict one document's entities from its text.
    pub fn predict_text(&self, file: &str, text: &str) -> Result<PredictionResult> {
        let mut candidates = self.labeler.predict(text)?;
        let from_model     = candidates.len();
        if self.config.use_rules {
            candidates.extend(rule_candidates(text));
        }
        tracing::debug!(
            "{}: {} model candidates, {} rule candidates",
            file,
            from_model,
            candidates.len() - from_model
        );

        Ok(PredictionResult::new(file, postprocess(candidates, &self.filter)))
    }

    pub fn execute(&self) -> Result<PredictSummary> {
        let outcome    = self.gather()?;
        let output_dir = PathBuf::from(&self.config.output_dir);
        let mut summary = PredictSummary { failures: outcome.failures, ..Default::default() };

        for doc in &outcome.documents {
            let result = match self.predict_text(&doc.source, &doc.text) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Prediction failed for '{}': {:#}", doc.source, e);
                    summary.failures.push(LoadFailure { source: doc.source.clone(), reason: format!("{e:#}") });
                    continue;
                }
            };

            if result.is_empty() {
                tracing::info!("{}: no name or email found", doc.source);
                summary.empty += 1;
            } else {
                tracing::info!(
                    "{}: names {:?}, emails {:?}",
                    doc.source,
                    result.names(),
                    result.emails()
                );
            }

            write_result(&output_dir, doc.stem(), &result)?;
            summary.results.push(result);
        }

        Ok(summary)
    }

    fn gather(&self) -> Result<LoadOutcome> {
        let Some(input) = &self.config.input else {
            return TextLoader::new(&self.config.text_dir).load_all();
        };

        let path = Path::new(input);
        if !path.is_file() {
            bail!("input file '{}' does not exist", path.display());
        }

        let source  = file_name(path);
        let ext     = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
        let text    = match ext.as_str() {
            "pdf" => extract_pdf_text(path, Duration::from_secs(self.config.timeout_secs))
                .map(|raw| Preprocessor::new().clean(&raw)),
            "txt" => fs::read_to_string(path).map_err(anyhow::Error::from),
            other => bail!("unsupported input '{}' (.{other}); expected .pdf or .txt", path.display()),
        };

        let mut outcome = LoadOutcome::default();
        match text {
            Ok(text) => outcome.documents.push(Document::new(source, text)),
            Err(e) => {
                tracing::warn!("Cannot read '{}': {:#}", path.display(), e);
                outcome.failures.push(LoadFailure { source, reason: format!("{e:#}") });
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};
    use crate::domain::annotation::{Span, TrainingExample};
    use crate::domain::prediction::Origin;
    use crate::infra::artifacts::{read_json, write_pretty_json};
    use crate::ml::BackendKind;
    use tempfile::TempDir;

    /// Train a perceptron on three resumes; returns the predict config.
    fn trained(dir: &Path) -> PredictConfig {
        let examples = vec![
            TrainingExample::new(
                "Name: Jane Doe\nEmail: jane.doe@example.com\nSkills: Python, SQL",
                vec![Span::new(6, 14, Label::Person), Span::new(22, 42, Label::Email)],
            ),
            TrainingExample::new(
                "Name: Tom Lee\nEmail: tom.lee@acme.io\nSkills: Python, SQL",
                vec![Span::new(6, 13, Label::Person), Span::new(21, 36, Label::Email)],
            ),
            TrainingExample::new(
                "Name: Ann Bell\nEmail: ann.bell@mail.net\nSkills: Python, SQL",
                vec![Span::new(6, 14, Label::Person), Span::new(22, 39, Label::Email)],
            ),
        ];
        let data = dir.join("train_data.json");
        write_pretty_json(&data, &examples).unwrap();

        let model_dir = dir.join("model").to_string_lossy().into_owned();
        TrainUseCase::new(TrainConfig {
            train_data:          data.to_string_lossy().into_owned(),
            model_dir:           model_dir.clone(),
            backend:             BackendKind::Perceptron,
            epochs:              20,
            validation_fraction: 0.0,
            seed:                7,
            checkpoint_every:    0,
            ..TrainConfig::default()
        })
        .execute()
        .unwrap();

        let text_dir = dir.join("text");
        fs::create_dir_all(&text_dir).unwrap();

        PredictConfig {
            model_dir,
            text_dir:   text_dir.to_string_lossy().into_owned(),
            output_dir: dir.join("predictions").to_string_lossy().into_owned(),
            ..PredictConfig::default()
        }
    }

    #[test]
    fn test_train_then_predict_held_out_document() {
        let dir = TempDir::new().unwrap();
        let cfg = trained(dir.path());
        fs::write(
            Path::new(&cfg.text_dir).join("john_smith.txt"),
            "Name: John Smith\nEmail: john.smith@mail.org\nSkills: Python, SQL",
        )
        .unwrap();

        let summary = PredictUseCase::new(cfg.clone()).unwrap().execute().unwrap();
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.failed(), 0);

        let result = &summary.results[0];
        assert_eq!(result.names(), vec!["John Smith"]);
        assert_eq!(result.emails(), vec!["john.smith@mail.org"]);

        let saved: serde_json::Value =
            read_json(&Path::new(&cfg.output_dir).join("john_smith_result.json")).unwrap();
        assert_eq!(saved["file"], "john_smith.txt");
        assert_eq!(saved["name"], serde_json::json!(["John Smith"]));
    }

    #[test]
    fn test_trained_model_alone_finds_held_out_pair() {
        let dir     = TempDir::new().unwrap();
        let mut cfg = trained(dir.path());
        cfg.use_rules = false;
        fs::write(
            Path::new(&cfg.text_dir).join("john_smith.txt"),
            "Name: John Smith\nEmail: john.smith@mail.org\nSkills: Python, SQL",
        )
        .unwrap();

        let summary = PredictUseCase::new(cfg).unwrap().execute().unwrap();
        let result  = &summary.results[0];
        assert_eq!(result.names(), vec!["John Smith"]);
        assert_eq!(result.emails(), vec!["john.smith@mail.org"]);
        assert!(result.entities.iter().all(|e| e.source == Origin::Model));
    }

    #[test]
    fn test_document_without_entities_is_empty_not_error() {
        let dir = TempDir::new().unwrap();
        let cfg = trained(dir.path());
        fs::write(Path::new(&cfg.text_dir).join("numbers.txt"), "2019 - 2024 | 42 % 7").unwrap();

        let summary = PredictUseCase::new(cfg).unwrap().execute().unwrap();
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.empty, 1);
        assert!(summary.results[0].is_empty());
    }

    #[test]
    fn test_single_input_file() {
        let dir     = TempDir::new().unwrap();
        let mut cfg = trained(dir.path());
        let input   = dir.path().join("ann.txt");
        fs::write(&input, "Name: Ann Bell\nEmail: ann.bell@mail.net\nSkills: Python, SQL").unwrap();
        cfg.input = Some(input.to_string_lossy().into_owned());

        let summary = PredictUseCase::new(cfg.clone()).unwrap().execute().unwrap();
        assert_eq!(summary.processed(), 1);
        assert_eq!(summary.results[0].names(), vec!["Ann Bell"]);
        assert_eq!(summary.results[0].emails(), vec!["ann.bell@mail.net"]);
        assert!(Path::new(&cfg.output_dir).join("ann_result.json").exists());
    }

    #[test]
    fn test_unsupported_input_is_fatal() {
        let dir     = TempDir::new().unwrap();
        let mut cfg = trained(dir.path());
        let input   = dir.path().join("resume.docx");
        fs::write(&input, "x").unwrap();
        cfg.input = Some(input.to_string_lossy().into_owned());

        let err = PredictUseCase::new(cfg).unwrap().execute().unwrap_err();
        assert!(err.to_string().contains("unsupported input"));
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let cfg = PredictConfig { model_dir: "/no/such/model".to_string(), ..PredictConfig::default() };
        assert!(PredictUseCase::new(cfg).is_err());
    }
}
