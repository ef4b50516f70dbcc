// ============================================================
// Layer 5 — Windowed Token Classifier (neural backend)
// ============================================================
// Classifies one token at a time from a fixed window of its
// neighbours (±2 by default):
//
//   words  [N, W] ─► word embedding  [N, W, word_dim]  ─┐
//   shapes [N, W] ─► shape embedding [N, W, shape_dim] ─┤ flatten + concat
//                                                       ▼
//                                  [N, W·(word_dim + shape_dim)]
//                                                       │
//                                   dropout → Linear → ReLU → dropout
//                                                       │
//                                            Linear → tag logits [N, T]
//
// Index 0 of both embeddings is padding (positions past the text
// edge). Shape classes come from features::coarse_shape.
//
// Reference: Collobert et al. (2011) Natural Language Processing
//            (Almost) from Scratch, window approach

use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend},
};

use crate::ml::features::SHAPE_CLASSES;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TokenClassifierConfig {
    pub vocab_size: usize,
    pub num_tags:   usize,
    #[config(default = 5)]
    pub window:     usize,
    #[config(default = 64)]
    pub word_dim:   usize,
    #[config(default = 16)]
    pub shape_dim:  usize,
    #[config(default = 128)]
    pub hidden_dim: usize,
    #[config(default = 0.5)]
    pub dropout:    f64,
}

impl TokenClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TokenClassifier<B> {
        let word_embedding  = EmbeddingConfig::new(self.vocab_size, self.word_dim).init(device);
        let shape_embedding = EmbeddingConfig::new(SHAPE_CLASSES, self.shape_dim).init(device);
        let input_dim       = self.window * (self.word_dim + self.shape_dim);
        let hidden          = LinearConfig::new(input_dim, self.hidden_dim).init(device);
        let output          = LinearConfig::new(self.hidden_dim, self.num_tags).init(device);
        let dropout         = DropoutConfig::new(self.dropout).init();
        TokenClassifier { word_embedding, shape_embedding, hidden, output, dropout }
    }
}

#[derive(Module, Debug)]
pub struct TokenClassifier<B: Backend> {
    pub word_embedding:  Embedding<B>,
    pub shape_embedding: Embedding<B>,
    pub hidden:          Linear<B>,
    pub output:          Linear<B>,
    pub dropout:         Dropout,
}

impl<B: Backend> TokenClassifier<B> {
    /// words, shapes: [batch, window] → logits: [batch, num_tags]
    pub fn forward(&self, words: Tensor<B, 2, Int>, shapes: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let words  = self.word_embedding.forward(words).flatten::<2>(1, 2);
        let shapes = self.shape_embedding.forward(shapes).flatten::<2>(1, 2);

        let x = Tensor::cat(vec![words, shapes], 1);
        let x = relu(self.hidden.forward(self.dropout.forward(x)));
        self.output.forward(self.dropout.forward(x))
    }

    pub fn forward_loss(
        &self,
        words:   Tensor<B, 2, Int>,
        shapes:  Tensor<B, 2, Int>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let logits = self.forward(words, shapes);
        let ce     = CrossEntropyLossConfig::new().init(&logits.device());
        (ce.forward(logits.clone(), targets), logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    #[test]
    fn test_forward_shape() {
        let device = NdArrayDevice::default();
        let model: TokenClassifier<NdArray> = TokenClassifierConfig::new(20, 5)
            .with_word_dim(8)
            .with_shape_dim(4)
            .with_hidden_dim(16)
            .init(&device);

        let words  = Tensor::<NdArray, 2, Int>::from_ints([[0, 2, 3, 4, 0], [2, 3, 4, 0, 0]], &device);
        let shapes = Tensor::<NdArray, 2, Int>::from_ints([[0, 9, 2, 1, 0], [9, 2, 1, 0, 0]], &device);

        assert_eq!(model.forward(words, shapes).dims(), [2, 5]);
    }
}
