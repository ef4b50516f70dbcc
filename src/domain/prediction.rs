// ============================================================
// Layer 3 — Prediction Domain Types
// ============================================================
// A Candidate is anything that *might* be a name or email: a span
// the model tagged, or a span a regex rule matched. An Entity is a
// candidate that survived post-processing, carrying its normalized
// value.

use serde::{Deserialize, Serialize};

use crate::domain::annotation::Label;

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "rule-based")]
    Rule,
}

/// A raw, unvalidated prediction. Offsets are character offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub label:      Label,
    pub text:       String,
    pub start:      usize,
    pub end:        usize,
    /// Absent when the source gives no score; such candidates are
    /// all treated as equally trusted
    pub confidence: Option<f32>,
    pub origin:     Origin,
}

impl Candidate {
    pub fn new(label: Label, text: impl Into<String>, start: usize, end: usize, origin: Origin) -> Self {
        Self { label, text: text.into(), start, end, confidence: None, origin }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// An accepted, normalized entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub label:      Label,
    /// Normalized value (lowercased email, whitespace-collapsed name)
    pub value:      String,
    /// Text as it appeared in the document
    pub text:       String,
    pub start:      usize,
    pub end:        usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub source:     Origin,
}

/// All accepted entities for one document. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub file:     String,
    pub entities: Vec<Entity>,
}

impl PredictionResult {
    pub fn new(file: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self { file: file.into(), entities }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn of_label(&self, label: Label) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.label == label)
    }

    pub fn names(&self) -> Vec<&str> {
        self.of_label(Label::Person).map(|e| e.value.as_str()).collect()
    }

    pub fn emails(&self) -> Vec<&str> {
        self.of_label(Label::Email).map(|e| e.value.as_str()).collect()
    }
}
