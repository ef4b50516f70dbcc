// ============================================================
// Post-processing — Rule-based Candidates
// ============================================================
// Deterministic extraction that runs alongside the model:
//
//   "Full Name: Jane Doe"   → PERSON  (confidence 0.9)
//   "Tên: Nguyễn Văn Thắng" → PERSON  (confidence 0.9)
//   "## Jane Doe"           → PERSON  (confidence 0.8)
//   any address-shaped run  → EMAIL   (confidence 0.95)
//
// Names must stay on the field's own line.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::annotation::{char_offset, Label};
use crate::domain::prediction::{Candidate, Origin};
use crate::postprocess::email::find_emails;

static LABELLED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)\b(?:Full[ \t]+[Nn]ame|Name|Tên)[ \t]*:?[ \t]*(\p{Lu}\p{Ll}+(?:[ \t]+\p{Lu}\p{Ll}+)*)",
    )
    .expect("valid labelled-name regex")
});

static HEADING_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^##[ \t]+(\p{Lu}\p{Ll}+(?:[ \t]+\p{Lu}\p{Ll}+)*)[ \t]*\r?$")
        .expect("valid heading-name regex")
});

fn name_candidates(text: &str) -> Vec<Candidate> {
    let patterns: [(&Regex, f32); 2] = [(&LABELLED_NAME, 0.9), (&HEADING_NAME, 0.8)];

    let mut out = Vec::new();
    for (pattern, confidence) in patterns {
        for caps in pattern.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                out.push(
                    Candidate::new(
                        Label::Person,
                        m.as_str(),
                        char_offset(text, m.start()),
                        char_offset(text, m.end()),
                        Origin::Rule,
                    )
                    .with_confidence(confidence),
                );
            }
        }
    }
    out
}

/// All rule candidates for `text`: names first, then emails.
pub fn rule_candidates(text: &str) -> Vec<Candidate> {
    let mut out = name_candidates(text);
    out.extend(find_emails(text));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_name_stops_at_line_end() {
        let cands = rule_candidates("Name: Jane Doe\nEmail: jane@acme.io");
        let names: Vec<_> = cands.iter().filter(|c| c.label == Label::Person).collect();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].text, "Jane Doe");
        assert_eq!((names[0].start, names[0].end), (6, 14));
        assert_eq!(names[0].confidence, Some(0.9));
    }

    #[test]
    fn test_full_name_and_vietnamese_label() {
        let cands = rule_candidates("Full name: Ann Bell\nTên: Nguyễn Văn Thắng");
        let texts: Vec<_> = cands.iter().map(|c| c.text.as_str()).collect();
        assert!(texts.contains(&"Ann Bell"));
        assert!(texts.contains(&"Nguyễn Văn Thắng"));
    }

    #[test]
    fn test_heading_name() {
        let cands = rule_candidates("## Tom Lee\nBackend developer");
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].text, "Tom Lee");
        assert_eq!(cands[0].confidence, Some(0.8));
    }

    #[test]
    fn test_heading_name_with_crlf_line_endings() {
        let cands = rule_candidates("## Jane Doe\r\nData analyst\r\n");
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].text, "Jane Doe");
        assert_eq!((cands[0].start, cands[0].end), (3, 11));
    }

    #[test]
    fn test_no_matches() {
        assert!(rule_candidates("nothing to see here").is_empty());
    }
}
