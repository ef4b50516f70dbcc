// ============================================================
// Layer 5 — Entity-level Evaluation
// ============================================================
// Exact-match precision / recall / F1 over (start, end, label).
// A predicted span only counts if both boundaries and the label
// match a gold span.

use anyhow::Result;
use std::collections::HashSet;

use crate::domain::annotation::{Span, TrainingExample};
use crate::domain::traits::SequenceLabeler;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scores {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
}

impl Scores {
    pub fn from_counts(correct: usize, predicted: usize, gold: usize) -> Self {
        let precision = if predicted > 0 { correct as f64 / predicted as f64 } else { 0.0 };
        let recall    = if gold > 0 { correct as f64 / gold as f64 } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self { precision, recall, f1 }
    }
}

/// Score `labeler` against held-out examples. No examples → all zeros.
pub fn evaluate(labeler: &dyn SequenceLabeler, examples: &[TrainingExample]) -> Result<Scores> {
    let (mut correct, mut predicted, mut gold) = (0, 0, 0);

    for ex in examples {
        let expected: HashSet<Span> = ex.spans.iter().copied().collect();
        let found: HashSet<Span> = labeler
            .predict(&ex.text)?
            .into_iter()
            .map(|c| Span::new(c.start, c.end, c.label))
            .collect();

        correct   += found.intersection(&expected).count();
        predicted += found.len();
        gold      += expected.len();
    }

    Ok(Scores::from_counts(correct, predicted, gold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_from_counts() {
        let s = Scores::from_counts(1, 2, 4);
        assert_eq!(s.precision, 0.5);
        assert_eq!(s.recall, 0.25);
        assert!((s.f1 - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_predictions_is_zero_not_nan() {
        let s = Scores::from_counts(0, 0, 0);
        assert_eq!(s, Scores::default());
    }
}
