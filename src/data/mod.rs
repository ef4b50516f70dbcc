// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between files on disk and tensor batches.
//
// Two flows run through this layer:
//
//   PDF resumes                      annotation .json files
//       │                                    │
//       ▼                                    ▼
//   PdfLoader     → raw text          AnnotationMerger → validated spans
//       │                                    │
//       ▼                                    ▼
//   Preprocessor  → cleaned text      train_data.json
//       │                                    │
//       ▼                                    ▼
//   TextLoader    → Documents         splitter → train / validation
//                                            │
//                                            ▼
//                                     tokens → char-offset words + BIO tags
//                                            │
//                                            ▼
//                                     TokenDataset → TokenBatcher → DataLoader
//
// The dataset and batcher are only used by the neural backend.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Loads PDFs (pdf-extract) and .txt files from a directory
pub mod loader;

/// Cleans and normalises raw extracted text
pub mod preprocessor;

/// Whitespace tokens with character offsets
pub mod tokens;

/// Validates annotation files and merges them into one artifact
pub mod merger;

/// Implements Burn's Dataset trait for token windows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
