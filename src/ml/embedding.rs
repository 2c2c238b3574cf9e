// ============================================================
// Layer 4 — Token + Position Embedding
// ============================================================
// tokens: [batch, *spatial] (Int)
//   → learned lookup        [batch, L, e]   L = prod(spatial)
//   + sinusoidal positions  [L, e] broadcast over the batch
//
// The positional table is recomputed per call from the input's
// spatial shape; only the token table is trainable.

use burn::{
    nn::{Embedding, EmbeddingConfig},
    prelude::*,
};

use crate::ml::error::{self, ModelError};
use crate::ml::params;
use crate::ml::positional::PositionalEncoding;

#[derive(Config, Debug)]
pub struct TokenPositionEmbeddingConfig {
    pub num_tokens: usize,
    pub embeddings: usize,
}

impl TokenPositionEmbeddingConfig {
    /// Only the token table is trainable.
    pub fn num_params(&self) -> error::Result<usize> {
        params::mul(self.num_tokens, self.embeddings, "token table")
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<TokenPositionEmbedding<B>> {
        if self.num_tokens == 0 {
            return Err(ModelError::ZeroSize("num_tokens"));
        }
        if self.embeddings == 0 {
            return Err(ModelError::ZeroSize("embeddings"));
        }
        Ok(TokenPositionEmbedding {
            tokens:     EmbeddingConfig::new(self.num_tokens, self.embeddings).init(device),
            num_tokens: self.num_tokens,
            embeddings: self.embeddings,
        })
    }
}

#[derive(Module, Debug)]
pub struct TokenPositionEmbedding<B: Backend> {
    pub tokens:     Embedding<B>,
    pub num_tokens: usize,
    pub embeddings: usize,
}

impl<B: Backend> TokenPositionEmbedding<B> {
    /// x: [batch, *spatial] → [batch, prod(spatial), embeddings]
    pub fn forward<const D: usize>(&self, x: Tensor<B, D, Int>) -> Tensor<B, 3> {
        let dims    = x.dims();
        let batch   = dims[0];
        let spatial = &dims[1..];
        let seq_len: usize = spatial.iter().product();
        let device  = x.device();

        let tokens = self.tokens.forward(x.reshape([batch, seq_len]));
        let positions = PositionalEncoding::new(self.embeddings)
            .forward::<B>(spatial, &device)
            .unsqueeze::<3>()
            .expand([batch, seq_len, self.embeddings]);

        tokens + positions
    }

    /// Every index must lie in [0, num_tokens). Reads the tensor back to
    /// the host, so callers should only use it on the checked path.
    pub fn check_tokens<const D: usize>(&self, x: &Tensor<B, D, Int>) -> error::Result<()> {
        let min = x.clone().min().into_scalar().elem::<i64>();
        if min < 0 {
            return Err(ModelError::TokenOutOfRange { token: min, num_tokens: self.num_tokens });
        }
        let max = x.clone().max().into_scalar().elem::<i64>();
        if max >= self.num_tokens as i64 {
            return Err(ModelError::TokenOutOfRange { token: max, num_tokens: self.num_tokens });
        }
        Ok(())
    }
}
