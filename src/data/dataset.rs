// ============================================================
// Layer 4 — Token Window Dataset
// ============================================================
// The neural tagger classifies one token at a time, so a sample is
// one token plus its neighbours:
//
//   tokens:   Name  :  Jane  Doe  Email
//   window around "Jane" (width 5):
//     words  = [name, :, jane, doe, email]   (vocabulary ids)
//     shapes = [Xx@bol, :, Xx, Xx, Xx@bol]   (coarse shape ids)
//     tag    = B-PERSON
//
// Positions past either end of the text are padding (id 0 in both
// the word and the shape vocabulary).

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::ml::tags::OUTSIDE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWindow {
    pub words:  Vec<u32>,
    pub shapes: Vec<u32>,
    pub tag:    usize,
}

/// One window per token. `tags` is `None` at prediction time.
pub fn build_windows(
    word_ids: &[u32],
    shapes:   &[u32],
    tags:     Option<&[usize]>,
    width:    usize,
) -> Vec<TokenWindow> {
    let half = (width / 2) as isize;
    let n    = word_ids.len() as isize;

    (0..word_ids.len())
        .map(|idx| {
            let positions = (idx as isize - half)..=(idx as isize + half);
            let pick = |source: &[u32]| -> Vec<u32> {
                positions
                    .clone()
                    .map(|p| if p < 0 || p >= n { 0 } else { source[p as usize] })
                    .collect()
            };
            TokenWindow {
                words:  pick(word_ids),
                shapes: pick(shapes),
                tag:    tags.map_or(OUTSIDE, |t| t[idx]),
            }
        })
        .collect()
}

pub struct TokenDataset {
    windows: Vec<TokenWindow>,
}

impl TokenDataset {
    pub fn new(windows: Vec<TokenWindow>) -> Self { Self { windows } }
}

impl Dataset<TokenWindow> for TokenDataset {
    fn get(&self, index: usize) -> Option<TokenWindow> {
        self.windows.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_are_padded_at_edges() {
        let windows = build_windows(&[5, 6, 7], &[9, 2, 2], Some(&[0, 1, 2]), 5);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].words, vec![0, 0, 5, 6, 7]);
        assert_eq!(windows[2].words, vec![5, 6, 7, 0, 0]);
        assert_eq!(windows[1].shapes, vec![0, 9, 2, 2, 0]);
        assert_eq!(windows[2].tag, 2);
    }

    #[test]
    fn test_prediction_windows_default_to_outside() {
        let windows = build_windows(&[5], &[1], None, 3);
        assert_eq!(windows[0].words, vec![0, 5, 0]);
        assert_eq!(windows[0].tag, OUTSIDE);
    }

    #[test]
    fn test_dataset_len_and_get() {
        let ds = TokenDataset::new(build_windows(&[1, 2], &[1, 1], None, 5));
        assert_eq!(ds.len(), 2);
        assert!(ds.get(1).is_some());
        assert!(ds.get(2).is_none());
    }
}
