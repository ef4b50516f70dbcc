// ============================================================
// Layer 3 — Annotation Domain Types
// ============================================================
// Labels, spans, the raw shapes annotation files arrive in, and
// the validated TrainingExample written to the training artifact.
//
// Offsets are CHARACTER offsets (Unicode scalar values), not byte
// offsets. Annotation tools count characters, so "Nguyễn" is 6
// long even though it takes 8 bytes in UTF-8. Every slice of the
// text goes through `char_slice` for that reason.
//
// Reference: Rust Book §8.2 (Strings are not indexable)

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

// ─── Label ────────────────────────────────────────────────────────────────────
/// The closed set of entity classes the pipeline recognises.
///
/// Serialized as "PERSON" / "EMAIL". The annotation tool used to
/// build the training set calls the person class "NAME", so that
/// spelling is accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Label {
    Person,
    Email,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Person, Label::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Person => "PERSON",
            Label::Email  => "EMAIL",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized label '{0}'")]
pub struct LabelError(pub String);

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERSON" | "NAME" => Ok(Label::Person),
            "EMAIL"           => Ok(Label::Email),
            _                 => Err(LabelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Label {
    type Error = LabelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.as_str().to_string()
    }
}

// ─── Span ─────────────────────────────────────────────────────────────────────
/// A validated, labeled character range `[start, end)`.
/// On disk it is the 3-element array `[start, end, "LABEL"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize, Label)", into = "(usize, usize, Label)")]
pub struct Span {
    pub start: usize,
    pub end:   usize,
    pub label: Label,
}

impl Span {
    pub fn new(start: usize, end: usize, label: Label) -> Self {
        Self { start, end, label }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The covered text
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        char_slice(text, self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.start, self.end, self.label)
    }
}

impl From<(usize, usize, Label)> for Span {
    fn from((start, end, label): (usize, usize, Label)) -> Self {
        Self { start, end, label }
    }
}

impl From<Span> for (usize, usize, Label) {
    fn from(s: Span) -> Self {
        (s.start, s.end, s.label)
    }
}

// ─── Raw annotation input ─────────────────────────────────────────────────────
/// A span exactly as the annotation tool wrote it, before any checks.
///
/// Offsets are signed so a negative offset becomes one dropped
/// span rather than a parse failure for the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawSpan {
    Tuple(i64, i64, String),
    Object { start: i64, end: i64, label: String },
}

impl RawSpan {
    pub fn parts(&self) -> (i64, i64, &str) {
        match self {
            RawSpan::Tuple(s, e, l)               => (*s, *e, l.as_str()),
            RawSpan::Object { start, end, label } => (*start, *end, label.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntities {
    #[serde(default)]
    pub entities: Vec<RawSpan>,
}

/// `[text, {"entities": [...]}]`, the record shape shared by the
/// annotation tool export and the training artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord(pub String, pub RawEntities);

/// Every on-disk shape an annotation file may take.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnnotationFile {
    /// Annotation tool export: `{"classes": [...], "annotations": [record | null, ...]}`
    Export {
        annotations: Vec<Option<RawRecord>>,
    },
    /// One document: `{"text": "...", "entities": [...]}`
    Single {
        text: String,
        #[serde(default, alias = "spans")]
        entities: Vec<RawSpan>,
    },
    /// A bare list of records (a previously merged artifact)
    List(Vec<Option<RawRecord>>),
}

impl AnnotationFile {
    /// Flatten into records in file order, skipping `null` entries.
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            AnnotationFile::Export { annotations } | AnnotationFile::List(annotations) => {
                annotations.into_iter().flatten().collect()
            }
            AnnotationFile::Single { text, entities } => {
                vec![RawRecord(text, RawEntities { entities })]
            }
        }
    }
}

// ─── SpanIssue ────────────────────────────────────────────────────────────────
/// Why a span did not make it into a TrainingExample.
/// The Display text is the warning recorded in the merge summary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanIssue {
    #[error("span ({start}, {end}) is outside text of length {len}")]
    OutOfBounds { start: i64, end: i64, len: usize },

    #[error("span ({start}, {end}) is empty")]
    Empty { start: i64, end: i64 },

    #[error("span ({start}, {end}) covers only whitespace")]
    Blank { start: i64, end: i64 },

    #[error("span ({start}, {end}) has unrecognized label '{label}'")]
    UnknownLabel { start: i64, end: i64, label: String },

    #[error("span ({start}, {end}) label {label} is not enabled")]
    DisabledLabel { start: i64, end: i64, label: Label },

    #[error("span {dropped} overlaps kept span {kept}")]
    Overlap { dropped: Span, kept: Span },
}

impl SpanIssue {
    /// Stable key used for the per-reason drop counters
    pub fn reason(&self) -> &'static str {
        match self {
            SpanIssue::OutOfBounds { .. }   => "out_of_bounds",
            SpanIssue::Empty { .. }         => "empty",
            SpanIssue::Blank { .. }         => "blank",
            SpanIssue::UnknownLabel { .. }  => "unknown_label",
            SpanIssue::DisabledLabel { .. } => "disabled_label",
            SpanIssue::Overlap { .. }       => "overlap",
        }
    }
}

// ─── TrainingExample ──────────────────────────────────────────────────────────
/// A validated (text, spans) pair.
///
/// Wire format: `[text, {"entities": [[start, end, "LABEL"], ...]}]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExampleWire", into = "ExampleWire")]
pub struct TrainingExample {
    pub text:  String,
    pub spans: Vec<Span>,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, spans: Vec<Span>) -> Self {
        Self { text: text.into(), spans }
    }
}

#[derive(Serialize, Deserialize)]
struct ExampleWire(String, EntitiesWire);

#[derive(Serialize, Deserialize)]
struct EntitiesWire {
    entities: Vec<Span>,
}

impl From<ExampleWire> for TrainingExample {
    fn from(ExampleWire(text, ents): ExampleWire) -> Self {
        Self { text, spans: ents.entities }
    }
}

impl From<TrainingExample> for ExampleWire {
    fn from(ex: TrainingExample) -> Self {
        ExampleWire(ex.text, EntitiesWire { entities: ex.spans })
    }
}

// ─── Character offset helpers ────────────────────────────────────────────────

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice `text` by character offsets `[start, end)`.
/// Offsets past the end are clamped to the end of the string.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let mut bounds = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));
    let s = bounds.nth(start).unwrap_or(text.len());
    let e = if end > start {
        bounds.nth(end - start - 1).unwrap_or(text.len())
    } else {
        s
    };
    &text[s..e]
}

/// Convert a byte index (e.g. from a regex match) into a char offset.
pub fn char_offset(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_accepts_tool_alias() {
        assert_eq!("NAME".parse::<Label>().unwrap(), Label::Person);
        assert_eq!("person".parse::<Label>().unwrap(), Label::Person);
        assert_eq!("EMAIL".parse::<Label>().unwrap(), Label::Email);
        assert!("ORG".parse::<Label>().is_err());
    }

    #[test]
    fn test_char_slice_counts_characters_not_bytes() {
        let text = "Tên: Nguyễn Văn Thắng";
        assert_eq!(char_slice(text, 5, 11), "Nguyễn");
        assert_eq!(char_slice(text, 5, 100), "Nguyễn Văn Thắng");
        assert_eq!(char_slice(text, 3, 3), "");
    }

    #[test]
    fn test_char_offset_from_byte_index() {
        let text = "Tên: Jane";
        let byte = text.find("Jane").unwrap();
        assert_eq!(char_offset(text, byte), 5);
    }

    #[test]
    fn test_training_example_wire_format() {
        let ex = TrainingExample::new("Jane Doe", vec![Span::new(0, 8, Label::Person)]);
        let json = serde_json::to_string(&ex).unwrap();
        assert_eq!(json, r#"["Jane Doe",{"entities":[[0,8,"PERSON"]]}]"#);

        let back: TrainingExample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ex);
    }

    #[test]
    fn test_annotation_file_shapes() {
        let export = r#"{"classes": ["NAME", "EMAIL"],
            "annotations": [["Jane Doe", {"entities": [[0, 8, "NAME"]]}], null]}"#;
        let records = serde_json::from_str::<AnnotationFile>(export).unwrap().into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1.entities[0].parts(), (0, 8, "NAME"));

        let single = r#"{"text": "a@b.io", "spans": [{"start": 0, "end": 6, "label": "EMAIL"}]}"#;
        let records = serde_json::from_str::<AnnotationFile>(single).unwrap().into_records();
        assert_eq!(records[0].0, "a@b.io");
        assert_eq!(records[0].1.entities[0].parts(), (0, 6, "EMAIL"));
    }

    #[test]
    fn test_negative_offset_still_parses() {
        let single = r#"{"text": "abc", "entities": [[-1, 2, "PERSON"]]}"#;
        let records = serde_json::from_str::<AnnotationFile>(single).unwrap().into_records();
        assert_eq!(records[0].1.entities[0].parts(), (-1, 2, "PERSON"));
    }
}
