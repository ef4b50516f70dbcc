// ============================================================
// Post-processing — Person Name Rules
// ============================================================
// A tagged span is kept as a name only if it *looks* like one:
//
//   "Jane  Doe"        → "Jane Doe"     (whitespace collapsed)
//   "CURRICULUM VITAE" → rejected       (only stoplist words)
//   "Jane Doe 2024"    → rejected       (digits)
//   "Email Address"    → rejected       (contact-field label)
//   "J"                → rejected       (too short)

/// Words that head resume and invoice sections, or are common
/// boilerplate. A candidate made only of these is not a name.
const STOPLIST: &[&str] = &[
    "about", "address", "bill", "certificate", "certificates", "company", "contact",
    "curriculum", "cv", "date", "developer", "education", "email", "engineer",
    "experience", "hobbies", "information", "interests", "invoice", "languages",
    "manager", "me", "name", "objective", "personal", "phone", "profile",
    "projects", "references", "resume", "skills", "software", "summary", "to",
    "total", "vitae", "work",
];

/// Contact-field words that never appear inside a name.
const BLOCKED: [&str; 3] = ["email", "phone", "address"];

const MIN_CHARS: usize = 3;
const MAX_CHARS: usize = 50;

pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Characters stripped from either end of a name candidate.
pub(crate) fn is_edge_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | ';' | ':' | '|' | '•' | '-' | '*' | '#')
}

fn is_alpha_word(word: &str) -> bool {
    word.chars().filter(|c| c.is_alphabetic()).count() >= 2
        && word.chars().all(|c| c.is_alphabetic() || matches!(c, '\'' | '’' | '-' | '.'))
}

/// Collapsed name, or `None` if `raw` is not a plausible person name.
pub fn normalize_name(raw: &str) -> Option<String> {
    let value = collapse_whitespace(raw.trim_matches(is_edge_char));

    let len = value.chars().count();
    if !(MIN_CHARS..=MAX_CHARS).contains(&len) {
        return None;
    }

    let lower = value.to_lowercase();
    if value.contains('@') || lower.contains("http") || value.chars().any(|c| c.is_numeric()) {
        return None;
    }
    if BLOCKED.iter().any(|b| lower.contains(b)) {
        return None;
    }

    let words: Vec<&str> = value.split(' ').collect();
    if !words.iter().any(|w| is_alpha_word(w)) {
        return None;
    }
    let all_stop = lower
        .split(' ')
        .all(|w| STOPLIST.contains(&w.trim_matches(|c: char| !c.is_alphanumeric())));
    if all_stop {
        return None;
    }

    Some(value)
}

pub fn is_plausible_name(raw: &str) -> bool {
    normalize_name(raw).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize_name("  Jane \t Doe\n").as_deref(), Some("Jane Doe"));
        assert_eq!(normalize_name("jane  doe").as_deref(), Some("jane doe"));
    }

    #[test]
    fn test_accepts_diacritics() {
        assert!(is_plausible_name("Nguyễn Văn Thắng"));
        assert!(is_plausible_name("Mary-Jane O'Neil"));
    }

    #[test]
    fn test_rejects_stoplist_only() {
        assert!(!is_plausible_name("CURRICULUM VITAE"));
        assert!(!is_plausible_name("Software Engineer"));
        assert!(!is_plausible_name("Resume"));
    }

    #[test]
    fn test_rejects_contact_fields_and_noise() {
        assert!(!is_plausible_name("Jane Email"));
        assert!(!is_plausible_name("Jane Doe 2024"));
        assert!(!is_plausible_name("jane@acme.io"));
        assert!(!is_plausible_name("https://jane.dev"));
        assert!(!is_plausible_name("J"));
        assert!(!is_plausible_name(": -"));
    }

    #[test]
    fn test_length_limits() {
        assert!(!is_plausible_name(&"Abc ".repeat(13)));
        assert!(is_plausible_name("Al Bo"));
    }
}
