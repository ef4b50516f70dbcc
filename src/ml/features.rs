// ============================================================
// Layer 5 — Token Features
// ============================================================
// Hand-crafted lexical features for the perceptron tagger, and a
// coarse shape class shared with the neural tagger.
//
// Resume text is noisy, so the features lean on context that
// survives extraction: the words right before a token ("Name :",
// "Email :"), where the token sits on its line, and the token's
// shape ("Xx", "x.x@x.x") rather than the word itself.

use crate::data::tokens::Token;

/// Collapsed character-class shape: "Jane" → "Xx",
/// "jane.doe@acme.io" → "x.x@x.x", "2024" → "d".
pub fn shape(word: &str) -> String {
    let mut out  = String::new();
    let mut last = None;
    for c in word.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };
        if last != Some(class) {
            out.push(class);
            last = Some(class);
        }
    }
    out
}

/// Number of coarse shape classes, including padding (0).
pub const SHAPE_CLASSES: usize = 16;

/// Small closed shape vocabulary for the neural tagger's embedding.
/// Classes 1–7 describe the word; +7 marks a line-initial token.
pub fn coarse_shape(token: &Token) -> usize {
    let text  = token.text.as_str();
    let first = text.chars().next().unwrap_or(' ');
    let class = if text.contains('@') {
        5
    } else if text.chars().all(|c| c.is_numeric()) {
        4
    } else if !first.is_alphanumeric() {
        6
    } else if text.chars().all(|c| !c.is_alphabetic() || c.is_uppercase()) && text.chars().count() > 1 {
        3
    } else if first.is_uppercase() {
        2
    } else if text.chars().all(|c| !c.is_alphabetic() || c.is_lowercase()) {
        1
    } else {
        7
    };
    if token.line_start { class + 7 } else { class }
}

fn context_word(tokens: &[Token], idx: usize, offset: isize) -> String {
    let pos = idx as isize + offset;
    if pos < 0 {
        "<s>".to_string()
    } else if pos as usize >= tokens.len() {
        "</s>".to_string()
    } else {
        tokens[pos as usize].lower()
    }
}

/// Feature strings for token `idx`, given the two previously
/// predicted tag names.
pub fn token_features(tokens: &[Token], idx: usize, prev: &str, prev2: &str) -> Vec<String> {
    let tok   = &tokens[idx];
    let lower = tok.lower();
    let chars: Vec<char> = lower.chars().collect();
    let prefix: String = chars.iter().take(3).collect();
    let suffix: String = chars[chars.len().saturating_sub(3)..].iter().collect();

    let mut feats = vec![
        "bias".to_string(),
        format!("w={lower}"),
        format!("p3={prefix}"),
        format!("s3={suffix}"),
        format!("shape={}", shape(&tok.text)),
        format!("w-1={}", context_word(tokens, idx, -1)),
        format!("w-2={}", context_word(tokens, idx, -2)),
        format!("w+1={}", context_word(tokens, idx, 1)),
        format!("w+2={}", context_word(tokens, idx, 2)),
        format!("w-2,w-1={},{}", context_word(tokens, idx, -2), context_word(tokens, idx, -1)),
        format!("t-1={prev}"),
        format!("t-2,t-1={prev2},{prev}"),
        format!("t-1,shape={prev},{}", shape(&tok.text)),
    ];

    if tok.line_start {
        feats.push("bol".to_string());
        feats.push(format!("bol,shape={}", shape(&tok.text)));
    }
    if tok.text.contains('@') {
        feats.push("has_at".to_string());
    }

    feats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tokens::tokenize;

    #[test]
    fn test_shape() {
        assert_eq!(shape("Jane"), "Xx");
        assert_eq!(shape("jane.doe@acme.io"), "x.x@x.x");
        assert_eq!(shape("NASA"), "X");
        assert_eq!(shape("2024"), "d");
    }

    #[test]
    fn test_coarse_shape_classes() {
        let toks = tokenize("Jane doe jane@acme.io 42 :\nNASA");
        let classes: Vec<usize> = toks.iter().map(coarse_shape).collect();
        assert_eq!(classes, vec![2 + 7, 1, 5, 4, 6, 3 + 7]);
        assert!(classes.iter().all(|c| *c < SHAPE_CLASSES));
    }

    #[test]
    fn test_features_include_left_context() {
        let toks  = tokenize("Name: Jane Doe");
        let feats = token_features(&toks, 2, "O", "O");
        assert!(feats.contains(&"w-2,w-1=name,:".to_string()));
        assert!(feats.contains(&"shape=Xx".to_string()));
    }
}
