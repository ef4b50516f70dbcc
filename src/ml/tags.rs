// ============================================================
// Layer 5 — BIO Tag Set
// ============================================================
// Span-level annotations become one tag per token:
//
//   "Name : Jane  Doe"         labels: PERSON = [Jane Doe]
//     O    O B-PERSON I-PERSON
//
// Tag ids are laid out as  0 = O,  1 + 2k = B-label_k,
// 2 + 2k = I-label_k  for the labels in the set's order.
//
// `encode` only tags tokens that lie entirely inside a span; a
// span boundary that cuts a token in half leaves that token O.

use serde::{Deserialize, Serialize};

use crate::data::tokens::Token;
use crate::domain::annotation::{char_slice, Label, Span};
use crate::domain::prediction::{Candidate, Origin};

pub const OUTSIDE: usize = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    labels: Vec<Label>,
}

impl TagSet {
    pub fn new(mut labels: Vec<Label>) -> Self {
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        1 + 2 * self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn index_of(&self, label: Label) -> Option<usize> {
        self.labels.iter().position(|l| *l == label)
    }

    pub fn begin(&self, label: Label) -> Option<usize> {
        self.index_of(label).map(|k| 1 + 2 * k)
    }

    pub fn inside(&self, label: Label) -> Option<usize> {
        self.index_of(label).map(|k| 2 + 2 * k)
    }

    /// (label, is_begin) for a non-O tag
    pub fn decode_tag(&self, tag: usize) -> Option<(Label, bool)> {
        if tag == OUTSIDE || tag >= self.len() {
            return None;
        }
        let k = (tag - 1) / 2;
        Some((self.labels[k], tag % 2 == 1))
    }

    pub fn name(&self, tag: usize) -> String {
        match self.decode_tag(tag) {
            None                => "O".to_string(),
            Some((label, true)) => format!("B-{label}"),
            Some((label, false)) => format!("I-{label}"),
        }
    }

    /// Gold tag per token for the given spans.
    pub fn encode(&self, tokens: &[Token], spans: &[Span]) -> Vec<usize> {
        let mut tags = vec![OUTSIDE; tokens.len()];

        for span in spans {
            let (Some(b), Some(i)) = (self.begin(span.label), self.inside(span.label)) else {
                continue;
            };
            let mut first = true;
            for (idx, tok) in tokens.iter().enumerate() {
                if tok.start >= span.start && tok.end <= span.end {
                    tags[idx] = if first { b } else { i };
                    first = false;
                }
            }
        }

        tags
    }

    /// Group tagged tokens back into spans.
    ///
    /// An I- tag that does not continue a span of the same label
    /// starts a new one. Span confidence is the mean token confidence.
    pub fn decode(
        &self,
        text:        &str,
        tokens:      &[Token],
        tags:        &[usize],
        confidences: &[f32],
    ) -> Vec<Candidate> {
        let mut out  = Vec::new();
        // (label, first token, last token, confidence sum)
        let mut open: Option<(Label, usize, usize, f32)> = None;

        let close = |open: Option<(Label, usize, usize, f32)>, out: &mut Vec<Candidate>| {
            if let Some((label, first, last, sum)) = open {
                let (start, end) = (tokens[first].start, tokens[last].end);
                let count        = (last - first + 1) as f32;
                out.push(
                    Candidate::new(label, char_slice(text, start, end), start, end, Origin::Model)
                        .with_confidence(sum / count),
                );
            }
        };

        for (idx, &tag) in tags.iter().enumerate() {
            let conf = confidences.get(idx).copied().unwrap_or(1.0);
            match self.decode_tag(tag) {
                None => close(open.take(), &mut out),
                Some((label, is_begin)) => match open.take() {
                    Some((open_label, first, _, sum)) if !is_begin && open_label == label => {
                        open = Some((open_label, first, idx, sum + conf));
                    }
                    prev => {
                        close(prev, &mut out);
                        open = Some((label, idx, idx, conf));
                    }
                },
            }
        }
        close(open.take(), &mut out);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tokens::tokenize;

    #[test]
    fn test_tag_layout() {
        let tags = TagSet::new(vec![Label::Email, Label::Person]);
        assert_eq!(tags.len(), 5);
        assert_eq!(tags.name(0), "O");
        assert_eq!(tags.name(1), "B-PERSON");
        assert_eq!(tags.name(4), "I-EMAIL");
    }

    #[test]
    fn test_encode_then_decode_recovers_spans() {
        let text   = "Name: Jane Doe\nEmail: jane@acme.io";
        let tokens = tokenize(text);
        let spans  = vec![Span::new(6, 14, Label::Person), Span::new(22, 34, Label::Email)];
        let tags   = TagSet::new(Label::ALL.to_vec());

        let gold   = tags.encode(&tokens, &spans);
        let names: Vec<String> = gold.iter().map(|t| tags.name(*t)).collect();
        assert_eq!(names, vec!["O", "O", "B-PERSON", "I-PERSON", "O", "O", "B-EMAIL"]);

        let conf  = vec![1.0; tokens.len()];
        let cands = tags.decode(text, &tokens, &gold, &conf);
        assert_eq!(cands.len(), 2);
        assert_eq!(cands[0].text, "Jane Doe");
        assert_eq!((cands[0].start, cands[0].end), (6, 14));
        assert_eq!(cands[1].text, "jane@acme.io");
    }

    #[test]
    fn test_stray_inside_tag_starts_span() {
        let text   = "Jane Doe";
        let tokens = tokenize(text);
        let tags   = TagSet::new(vec![Label::Person]);
        let inside = tags.inside(Label::Person).unwrap();
        let cands  = tags.decode(text, &tokens, &[inside, inside], &[0.5, 1.0]);
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].text, "Jane Doe");
        assert_eq!(cands[0].confidence, Some(0.75));
    }
}
