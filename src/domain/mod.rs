// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what the pipeline works with:
// documents, labeled spans, training examples, and the
// candidates/entities produced at prediction time.
//
// Rules for this layer:
//   - NO burn or tokenizers types
//   - NO file I/O
//   - Only structs, enums, and the traits other layers implement
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A loaded document (PDF-extracted or plain text)
pub mod document;

// Labels, spans, annotation files, training examples
pub mod annotation;

// Model/rule candidates and accepted entities
pub mod prediction;

// Core abstractions (traits) that other layers implement
pub mod traits;
