// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans text pulled out of a PDF before it is written to disk
// for annotation and prediction.
//
// This runs ONCE, in the `extract` step. Annotators label the
// cleaned .txt files, so the offsets they produce refer to the
// cleaned text. Cleaning again later would shift every offset.
//
// Cleaning steps (applied in order):
//   1. Map Unicode whitespace variants (NBSP, zero-width, BOM,
//      tabs) to a plain space; \r and form feeds (page breaks
//      from pdf-extract) become \n
//   2. Drop remaining control characters
//   3. Collapse runs of spaces and trim each line
//   4. Allow at most one blank line in a row
//
// Reference: Rust Book §8 (Strings in Rust)

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, text: &str) -> String {
        let normalised: String = text
            .chars()
            .filter_map(|c| match c {
                '\t' | '\u{00A0}' | '\u{2007}' | '\u{202F}' => Some(' '),
                '\u{200B}' | '\u{FEFF}' | '\u{00AD}' => None,
                '\r' | '\u{000C}' => Some('\n'),
                c if c.is_control() && c != '\n' => None,
                c => Some(c),
            })
            .collect();

        let mut out   = String::with_capacity(normalised.len());
        let mut blank = 0usize;

        for line in normalised.lines() {
            let line = line.split(' ').filter(|w| !w.is_empty()).collect::<Vec<_>>().join(" ");

            if line.is_empty() {
                blank += 1;
                if blank > 1 || out.is_empty() {
                    continue;
                }
            } else {
                blank = 0;
            }

            out.push_str(&line);
            out.push('\n');
        }

        out.trim_end().to_string()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
