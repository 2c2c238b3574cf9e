// ============================================================
// Layer 4 — Transformer Block
// ============================================================
// One post-norm encoder layer:
//
//   x = norm1(x + dropout(attention(x)))
//   x = norm2(x + dropout(ff(x)))
//   ff = Linear(e, ff_dim) → GELU → dropout → Linear(ff_dim, e)
//
// Same arithmetic as burn's TransformerEncoderLayer with
// norm_first = false, which is what lets the hand-built and the
// builtin encoder stacks stand in for each other.

use burn::{
    nn::{
        Dropout, DropoutConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::gelu,
};

use crate::ml::attention::{MultiSelfAttention, MultiSelfAttentionConfig};
use crate::ml::error::{self, ModelError};

#[derive(Config, Debug)]
pub struct TransformerBlockConfig {
    pub embeddings:   usize,
    pub heads:        usize,
    pub ff_dimension: usize,
    #[config(default = false)]
    pub mask:         bool,
    #[config(default = 0.0)]
    pub dropout:      f64,
}

impl TransformerBlockConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<TransformerBlock<B>> {
        if self.ff_dimension == 0 {
            return Err(ModelError::ZeroSize("ff_dimension"));
        }
        let attention = MultiSelfAttentionConfig::new(self.embeddings, self.heads)
            .with_mask(self.mask)
            .with_dropout(self.dropout)
            .init(device)?;

        Ok(TransformerBlock {
            attention,
            norm1:     LayerNormConfig::new(self.embeddings).init(device),
            norm2:     LayerNormConfig::new(self.embeddings).init(device),
            ff_inner:  LinearConfig::new(self.embeddings, self.ff_dimension).init(device),
            ff_outer:  LinearConfig::new(self.ff_dimension, self.embeddings).init(device),
            dropout:   DropoutConfig::new(self.dropout).init(),
        })
    }
}

#[derive(Module, Debug)]
pub struct TransformerBlock<B: Backend> {
    pub attention: MultiSelfAttention<B>,
    pub norm1:     LayerNorm<B>,
    pub norm2:     LayerNorm<B>,
    pub ff_inner:  Linear<B>,
    pub ff_outer:  Linear<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> TransformerBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attended = self.attention.forward(x.clone());
        let x = self.norm1.forward(x + self.dropout.forward(attended));

        let hidden      = self.dropout.forward(gelu(self.ff_inner.forward(x.clone())));
        let fedforward  = self.ff_outer.forward(hidden);
        self.norm2.forward(x + self.dropout.forward(fedforward))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_block_preserves_shape() {
        let device = Default::default();
        let block = TransformerBlockConfig::new(16, 4, 64)
            .init::<TestBackend>(&device)
            .unwrap();
        let x = Tensor::<TestBackend, 3>::random([2, 9, 16], Distribution::Default, &device);
        assert_eq!(block.forward(x).dims(), [2, 9, 16]);
    }

    #[test]
    fn test_output_is_layer_normalised() {
        let device = Default::default();
        let block = TransformerBlockConfig::new(8, 2, 32)
            .init::<TestBackend>(&device)
            .unwrap();
        let x = Tensor::<TestBackend, 3>::random([1, 3, 8], Distribution::Default, &device);

        // Fresh LayerNorm has gamma = 1, beta = 0: each row has ~zero mean
        let means = block.forward(x).mean_dim(2).into_data().to_vec::<f32>().unwrap();
        assert!(means.iter().all(|m| m.abs() < 1e-4));
    }

    #[test]
    fn test_zero_ff_dimension_rejected() {
        let device = Default::default();
        let err = TransformerBlockConfig::new(8, 2, 0)
            .init::<TestBackend>(&device)
            .unwrap_err();
        assert_eq!(err, ModelError::ZeroSize("ff_dimension"));
    }

    #[test]
    fn test_bad_heads_propagate() {
        let device = Default::default();
        let err = TransformerBlockConfig::new(10, 3, 40)
            .init::<TestBackend>(&device)
            .unwrap_err();
        assert!(matches!(err, ModelError::HeadsMismatch { embeddings: 10, heads: 3 }));
    }
}
