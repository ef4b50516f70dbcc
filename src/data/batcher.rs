// ============================================================
// Layer 4 — Token Window Batcher
// ============================================================
// Implements Burn's Batcher trait to stack TokenWindows into
// tensors.
//
//   Input:  Vec of N TokenWindows, each of width W
//   Output: TokenBatch with words/shapes [N, W] and targets [N]
//
// Every window has the same width, so the flattened ids reshape
// straight into [N, W] with no padding step here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TokenWindow;

#[derive(Debug, Clone)]
pub struct TokenBatch<B: Backend> {
    /// Vocabulary ids — shape: [batch_size, window]
    pub words: Tensor<B, 2, Int>,

    /// Coarse shape ids — shape: [batch_size, window]
    pub shapes: Tensor<B, 2, Int>,

    /// Gold tag of each centre token — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct TokenBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TokenBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TokenWindow, TokenBatch<B>> for TokenBatcher<B> {
    fn batch(&self, items: Vec<TokenWindow>) -> TokenBatch<B> {
        let batch_size = items.len();
        let width      = items.first().map_or(0, |w| w.words.len());

        let words: Vec<i32> = items
            .iter()
            .flat_map(|w| w.words.iter().map(|&x| x as i32))
            .collect();
        let shapes: Vec<i32> = items
            .iter()
            .flat_map(|w| w.shapes.iter().map(|&x| x as i32))
            .collect();
        let targets: Vec<i32> = items.iter().map(|w| w.tag as i32).collect();

        let words = Tensor::<B, 1, Int>::from_ints(words.as_slice(), &self.device)
            .reshape([batch_size, width]);
        let shapes = Tensor::<B, 1, Int>::from_ints(shapes.as_slice(), &self.device)
            .reshape([batch_size, width]);
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        TokenBatch { words, shapes, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::build_windows;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    #[test]
    fn test_batch_shapes() {
        let batcher = TokenBatcher::<NdArray>::new(NdArrayDevice::default());
        let windows = build_windows(&[4, 5, 6], &[2, 2, 1], Some(&[1, 2, 0]), 5);
        let batch   = batcher.batch(windows);

        assert_eq!(batch.words.dims(), [3, 5]);
        assert_eq!(batch.shapes.dims(), [3, 5]);
        assert_eq!(batch.targets.dims(), [3]);
    }
}
