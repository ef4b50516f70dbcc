// ============================================================
// Post-processing — Email Rules
// ============================================================
use regex::Regex;
use std::sync::LazyLock;

use crate::domain::annotation::{char_offset, Label};
use crate::domain::prediction::{Candidate, Origin};

pub const RULE_CONFIDENCE: f32 = 0.95;

static STRICT_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});

static EMAIL_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email search regex")
});

/// Profile links and repository URLs that look like addresses.
const BLOCKED: [&str; 4] = ["http", "github", "linkedin", ".git"];

/// Characters stripped from either end of an email candidate.
pub(crate) fn is_edge_char(c: char) -> bool {
    c.is_whitespace()
        || matches!(c, '<' | '>' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'' | ',' | ';' | ':' | '.' | '!' | '?')
}

/// Lowercased address, or `None` if `raw` is not a plausible email.
pub fn normalize_email(raw: &str) -> Option<String> {
    let value = raw.trim_matches(is_edge_char);
    if value.matches('@').count() != 1 || !STRICT_EMAIL.is_match(value) {
        return None;
    }
    let lower = value.to_lowercase();
    if BLOCKED.iter().any(|b| lower.contains(b)) {
        return None;
    }
    Some(lower)
}

pub fn is_valid_email(raw: &str) -> bool {
    normalize_email(raw).is_some()
}

/// Every email-shaped substring of `text` as a rule candidate.
pub fn find_emails(text: &str) -> Vec<Candidate> {
    EMAIL_IN_TEXT
        .find_iter(text)
        .map(|m| {
            Candidate::new(
                Label::Email,
                m.as_str(),
                char_offset(text, m.start()),
                char_offset(text, m.end()),
                Origin::Rule,
            )
            .with_confidence(RULE_CONFIDENCE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_address() {
        assert!(is_valid_email("jane.doe@example.com"));
        assert_eq!(normalize_email("Jane.Doe@Example.COM").as_deref(), Some("jane.doe@example.com"));
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!is_valid_email("jane.doe@@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn test_rejects_profile_links() {
        assert!(!is_valid_email("git@github.com"));
        assert!(!is_valid_email("jane@linkedin.com"));
    }

    #[test]
    fn test_trims_surrounding_punctuation() {
        assert_eq!(normalize_email("<jane@acme.io>,").as_deref(), Some("jane@acme.io"));
    }

    #[test]
    fn test_find_emails_uses_char_offsets() {
        let text  = "Tên: Lê Văn\nmail: le.van@acme.vn";
        let found = find_emails(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "le.van@acme.vn");
        assert_eq!(found[0].start, 18);
        assert_eq!(found[0].end, 32);
        assert_eq!(found[0].confidence, Some(RULE_CONFIDENCE));
    }
}
