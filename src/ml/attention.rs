// ============================================================
// Layer 4 — Multi-Head Self-Attention (hand-built)
// ============================================================
// Scaled dot-product attention with `heads` independent
// subspaces of size s = embeddings / heads:
//
//   Q, K, V = x·Wq, x·Wk, x·Wv            [b, t, e]
//   split   → [b, h, t, s]
//   scores  = Q·Kᵀ / sqrt(s)               [b, h, t, t]
//   (mask)  scores[.., i, j] = -inf  for j > i
//   out     = softmax(scores)·V → merge heads → x·Wo
//
// The parameter layout (four biased Linear(e, e)) mirrors burn's
// MultiHeadAttention so weights can be moved between the two.
//
// Reference: Vaswani et al. (2017) §3.2

use burn::{
    nn::{
        attention::generate_autoregressive_mask,
        Dropout, DropoutConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::softmax,
};

use crate::ml::error::{self, ModelError};

#[derive(Config, Debug)]
pub struct MultiSelfAttentionConfig {
    pub embeddings: usize,
    pub heads:      usize,
    #[config(default = false)]
    pub mask:       bool,
    #[config(default = 0.0)]
    pub dropout:    f64,
}

impl MultiSelfAttentionConfig {
    pub fn validate(&self) -> error::Result<()> {
        if self.embeddings == 0 {
            return Err(ModelError::ZeroSize("embeddings"));
        }
        if self.heads == 0 || self.embeddings % self.heads != 0 {
            return Err(ModelError::HeadsMismatch {
                embeddings: self.embeddings,
                heads:      self.heads,
            });
        }
        Ok(())
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<MultiSelfAttention<B>> {
        self.validate()?;
        let linear = || LinearConfig::new(self.embeddings, self.embeddings).init(device);
        Ok(MultiSelfAttention {
            to_queries:  linear(),
            to_keys:     linear(),
            to_values:   linear(),
            unify_heads: linear(),
            dropout:     DropoutConfig::new(self.dropout).init(),
            heads:       self.heads,
            head_dim:    self.embeddings / self.heads,
            mask:        self.mask,
        })
    }
}

#[derive(Module, Debug)]
pub struct MultiSelfAttention<B: Backend> {
    pub to_queries:  Linear<B>,
    pub to_keys:     Linear<B>,
    pub to_values:   Linear<B>,
    pub unify_heads: Linear<B>,
    pub dropout:     Dropout,
    pub heads:       usize,
    pub head_dim:    usize,
    pub mask:        bool,
}

impl<B: Backend> MultiSelfAttention<B> {
    /// x: [batch, seq_len, embeddings] → [batch, seq_len, embeddings]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, seq_len, embeddings] = x.dims();

        let queries = self.split_heads(self.to_queries.forward(x.clone()), batch, seq_len);
        let keys    = self.split_heads(self.to_keys.forward(x.clone()), batch, seq_len);
        let values  = self.split_heads(self.to_values.forward(x), batch, seq_len);

        let scale  = (self.head_dim as f32).sqrt();
        let mut scores = queries.matmul(keys.transpose()).div_scalar(scale); // [b, h, t, t]

        if self.mask {
            let causal = generate_autoregressive_mask::<B>(batch, seq_len, &scores.device())
                .unsqueeze_dim::<4>(1)
                .expand([batch, self.heads, seq_len, seq_len]);
            scores = scores.mask_fill(causal, f32::NEG_INFINITY);
        }

        let weights = self.dropout.forward(softmax(scores, 3));
        let context = weights
            .matmul(values)           // [b, h, t, s]
            .swap_dims(1, 2)          // [b, t, h, s]
            .reshape([batch, seq_len, embeddings]);

        self.unify_heads.forward(context)
    }

    fn split_heads(&self, x: Tensor<B, 3>, batch: usize, seq_len: usize) -> Tensor<B, 4> {
        x.reshape([batch, seq_len, self.heads, self.head_dim])
            .swap_dims(1, 2)
    }
}
