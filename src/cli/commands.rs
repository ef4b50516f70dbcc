// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// The four pipeline steps, in the order they are run:
//
//   resume-ner extract   PDFs → text files
//   resume-ner merge     annotation files → training artifact
//   resume-ner train     training artifact → model directory
//   resume-ner predict   text files → <stem>_result.json
//
// Every flag has a default, so each step runs with no arguments
// against the standard data/ layout.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    extract_use_case::ExtractConfig,
    merge_use_case::MergeConfig,
    predict_use_case::PredictConfig,
    train_use_case::TrainConfig,
};
use crate::domain::annotation::Label;
use crate::ml::BackendKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every PDF in a directory to a cleaned .txt file
    Extract(ExtractArgs),

    /// Merge per-document annotation files into one training file
    Merge(MergeArgs),

    /// Train the NER model on the merged training file
    Train(TrainArgs),

    /// Extract names and emails with a trained model
    Predict(PredictArgs),
}

// ─── extract ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory containing the source PDFs
    #[arg(long, default_value = "data/raw/resumes")]
    pub pdf_dir: String,

    /// Directory to write <stem>.txt files into
    #[arg(long, default_value = "data/text")]
    pub text_dir: String,

    /// Seconds to wait for one PDF before giving up on it
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

impl From<ExtractArgs> for ExtractConfig {
    fn from(a: ExtractArgs) -> Self {
        ExtractConfig {
            pdf_dir:      a.pdf_dir,
            text_dir:     a.text_dir,
            timeout_secs: a.timeout_secs,
        }
    }
}

// ─── merge ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Directory containing one annotation .json per document
    #[arg(long, default_value = "data/annotations")]
    pub annotations_dir: String,

    /// Where to write the merged training data
    #[arg(long, default_value = "data/train_data.json")]
    pub output: String,

    /// Labels to keep; spans with any other label are dropped
    #[arg(long, value_delimiter = ',', default_values_t = Label::ALL.to_vec())]
    pub labels: Vec<Label>,
}

impl From<MergeArgs> for MergeConfig {
    fn from(a: MergeArgs) -> Self {
        MergeConfig {
            annotations_dir: a.annotations_dir,
            output_file:     a.output,
            labels:          a.labels,
        }
    }
}

// ─── train ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Merged training data produced by `merge`
    #[arg(long, default_value = "data/train_data.json")]
    pub train_data: String,

    /// Directory to save the model, metrics and checkpoints
    #[arg(long, default_value = "data/models/ner_resume")]
    pub model_dir: String,

    /// Model backend: perceptron or neural
    #[arg(long, default_value_t = BackendKind::Perceptron)]
    pub backend: BackendKind,

    /// Labels to train
    #[arg(long, value_delimiter = ',', default_values_t = Label::ALL.to_vec())]
    pub labels: Vec<Label>,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Share of examples held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub validation_fraction: f64,

    /// Seed for the split and the per-epoch shuffles
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Save a checkpoint every N epochs (0 = never)
    #[arg(long, default_value_t = 10)]
    pub checkpoint_every: usize,

    /// Windows per mini-batch (neural backend)
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate (neural backend)
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Word embedding size (neural backend)
    #[arg(long, default_value_t = 64)]
    pub word_dim: usize,

    /// Hidden layer size (neural backend)
    #[arg(long, default_value_t = 128)]
    pub hidden_dim: usize,

    /// Dropout probability (neural backend)
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,
}

/// This is the boundary between Layer 1 and Layer 2:
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_data:          a.train_data,
            model_dir:           a.model_dir,
            backend:             a.backend,
            labels:              a.labels,
            epochs:              a.epochs,
            validation_fraction: a.validation_fraction,
            seed:                a.seed,
            checkpoint_every:    a.checkpoint_every,
            batch_size:          a.batch_size,
            lr:                  a.lr,
            word_dim:            a.word_dim,
            hidden_dim:          a.hidden_dim,
            dropout:             a.dropout,
        }
    }
}

// ─── predict ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// A single .pdf or .txt file; omit to process every .txt in --text-dir
    pub input: Option<String>,

    /// Directory of the trained model
    #[arg(long, default_value = "data/models/ner_resume")]
    pub model_dir: String,

    /// Directory of .txt files written by `extract`
    #[arg(long, default_value = "data/text")]
    pub text_dir: String,

    /// Directory to write <stem>_result.json files into
    #[arg(long, default_value = "data/predictions")]
    pub output_dir: String,

    /// Labels to report
    #[arg(long, value_delimiter = ',', default_values_t = Label::ALL.to_vec())]
    pub labels: Vec<Label>,

    /// Drop candidates scored below this confidence
    #[arg(long, default_value_t = 0.0)]
    pub confidence_threshold: f32,

    /// Use the model only, without the regex rules
    #[arg(long)]
    pub no_rules: bool,

    /// Seconds to wait for a PDF input
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

impl From<PredictArgs> for PredictConfig {
    fn from(a: PredictArgs) -> Self {
        PredictConfig {
            model_dir:            a.model_dir,
            input:                a.input,
            text_dir:             a.text_dir,
            output_dir:           a.output_dir,
            labels:               a.labels,
            confidence_threshold: a.confidence_threshold,
            use_rules:            !a.no_rules,
            timeout_secs:         a.timeout_secs,
        }
    }
}
