// ============================================================
// Layer 4 — Word Tokenizer
// ============================================================
// Splits text into the units the sequence labeler tags.
//
// Rules, tried left to right at every position:
//   1. an email-looking run  (jane.doe@example.com → one token)
//   2. a word                (letters/digits, incl. "O'Neil")
//   3. any other single non-space character (":" "|" "(" ...)
//
// Keeping emails whole matters: if "jane.doe@example.com" were
// split at "." and "@", the EMAIL span would cover five tokens
// and the model would have to learn to glue them back together.
//
// Every token carries CHARACTER offsets into the original text
// so BIO tags map straight back onto annotation spans.

use regex::Regex;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w.%+\-]+@[\w\-]+(?:\.[\w\-]+)*|[\p{L}\p{M}\p{N}_]+(?:['’][\p{L}]+)?|\S")
        .expect("token pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text:  String,
    pub start: usize,
    pub end:   usize,
    /// First token on its line
    pub line_start: bool,
}

impl Token {
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }
}

/// Tokenize `text`, tracking char offsets as we go.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens    = Vec::new();
    let mut last_byte = 0usize;
    let mut last_char = 0usize;

    for m in TOKEN_PATTERN.find_iter(text) {
        let gap   = &text[last_byte..m.start()];
        let start = last_char + gap.chars().count();
        let len   = m.as_str().chars().count();

        let line_start = tokens.is_empty() || gap.contains('\n');

        tokens.push(Token {
            text: m.as_str().to_string(),
            start,
            end: start + len,
            line_start,
        });

        last_byte = m.end();
        last_char = start + len;
    }

    tokens
}
