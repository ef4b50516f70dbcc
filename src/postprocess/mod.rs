// ============================================================
// Post-processing — Candidate Validation
// ============================================================
// Turns raw candidates (model output + rule matches) into the
// final entity list:
//
//   candidates ──► document order ──► accept() ──► dedup() ──► entities
//                                     │
//                                     ├─ label enabled?
//                                     ├─ confidence ≥ threshold?
//                                     │  (no confidence → passes)
//                                     └─ email / name rules
//
// Everything here is a pure function of its input.

/// Email validation, normalization and regex search
pub mod email;

/// Person-name plausibility rules
pub mod name;

/// Regex name/email candidates
pub mod patterns;

/// Confidence-first deduplication
pub mod dedup;

use serde::{Deserialize, Serialize};

use crate::domain::annotation::{char_len, Label};
use crate::domain::prediction::{Candidate, Entity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub labels:               Vec<Label>,
    pub confidence_threshold: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { labels: Label::ALL.to_vec(), confidence_threshold: 0.0 }
    }
}

/// Validate and normalize one candidate.
pub fn accept(candidate: &Candidate, cfg: &FilterConfig) -> Option<Entity> {
    if !cfg.labels.contains(&candidate.label) {
        return None;
    }
    if candidate.confidence.is_some_and(|c| c < cfg.confidence_threshold) {
        tracing::debug!("'{}' below confidence threshold", candidate.text);
        return None;
    }

    let (value, is_edge): (_, fn(char) -> bool) = match candidate.label {
        Label::Email  => (email::normalize_email(&candidate.text), email::is_edge_char),
        Label::Person => (name::normalize_name(&candidate.text), name::is_edge_char),
    };
    let Some(value) = value else {
        tracing::debug!("Rejected {} candidate '{}'", candidate.label, candidate.text);
        return None;
    };

    // Offsets follow the trimmed text, not the raw candidate
    let tail = candidate.text.trim_start_matches(is_edge);
    let lead = char_len(&candidate.text[..candidate.text.len() - tail.len()]);
    let core = tail.trim_end_matches(is_edge);
    let start = candidate.start + lead;

    Some(Entity {
        label:      candidate.label,
        value,
        text:       core.to_string(),
        start,
        end:        start + char_len(core),
        confidence: candidate.confidence,
        source:     candidate.origin,
    })
}

/// Full post-processing pass. An empty result is a valid outcome.
pub fn postprocess(mut candidates: Vec<Candidate>, cfg: &FilterConfig) -> Vec<Entity> {
    candidates.sort_by_key(|c| (c.start, c.end));
    let accepted: Vec<Entity> = candidates.iter().filter_map(|c| accept(c, cfg)).collect();
    dedup::dedup(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::Origin;

    fn cand(label: Label, text: &str, start: usize, conf: Option<f32>) -> Candidate {
        let c = Candidate::new(label, text, start, start + text.chars().count(), Origin::Model);
        match conf {
            Some(v) => c.with_confidence(v),
            None    => c,
        }
    }

    #[test]
    fn test_threshold_only_applies_to_scored_candidates() {
        let cfg = FilterConfig { confidence_threshold: 0.5, ..FilterConfig::default() };
        assert!(accept(&cand(Label::Person, "Jane Doe", 0, Some(0.4)), &cfg).is_none());
        assert!(accept(&cand(Label::Person, "Jane Doe", 0, Some(0.5)), &cfg).is_some());
        assert!(accept(&cand(Label::Person, "Jane Doe", 0, None), &cfg).is_some());
    }

    #[test]
    fn test_disabled_label_dropped() {
        let cfg = FilterConfig { labels: vec![Label::Email], ..FilterConfig::default() };
        assert!(accept(&cand(Label::Person, "Jane Doe", 0, None), &cfg).is_none());
    }

    #[test]
    fn test_names_collapse_to_one_entry() {
        let out = postprocess(
            vec![
                cand(Label::Person, "jane  doe", 30, None),
                cand(Label::Person, "Jane Doe", 0, None),
            ],
            &FilterConfig::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, "Jane Doe");
    }

    #[test]
    fn test_output_sorted_and_normalized() {
        let out = postprocess(
            vec![
                cand(Label::Email, "Jane@Example.com", 20, Some(0.9)),
                cand(Label::Person, "Jane Doe", 2, Some(0.9)),
                cand(Label::Email, "not-an-email", 40, Some(0.9)),
            ],
            &FilterConfig::default(),
        );
        let values: Vec<_> = out.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["Jane Doe", "jane@example.com"]);
    }

    #[test]
    fn test_entity_offsets_exclude_trimmed_punctuation() {
        let text = "Contact: <jane@acme.io>, thanks";
        let raw  = "<jane@acme.io>,";
        let start = text.find(raw).unwrap();
        let entity = accept(&cand(Label::Email, raw, start, Some(0.95)), &FilterConfig::default()).unwrap();

        assert_eq!(entity.text, "jane@acme.io");
        assert_eq!(crate::domain::annotation::char_slice(text, entity.start, entity.end), "jane@acme.io");
    }

    #[test]
    fn test_name_offsets_exclude_trimmed_bullets() {
        let entity = accept(&cand(Label::Person, "• Jane  Doe,", 4, None), &FilterConfig::default()).unwrap();
        assert_eq!(entity.value, "Jane Doe");
        assert_eq!(entity.text, "Jane  Doe");
        assert_eq!((entity.start, entity.end), (6, 15));
    }

    #[test]
    fn test_no_candidates_gives_empty_result() {
        assert!(postprocess(Vec::new(), &FilterConfig::default()).is_empty());
    }
}
