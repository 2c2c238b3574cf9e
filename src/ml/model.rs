use burn::prelude::*;

use crate::ml::embedding::{TokenPositionEmbedding, TokenPositionEmbeddingConfig};
use crate::ml::encoder::{EncoderKind, EncoderStack, EncoderStackConfig, SequenceEncoder};
use crate::ml::error::{self, ModelError};
use crate::ml::head::{OutputHead, OutputHeadConfig};
use crate::ml::params;

// #[derive(Config)] brings Clone, Display and the serde impls with it.
#[derive(Config, Debug)]
pub struct GridTransformerConfig {
    #[config(default = "EncoderKind::Custom")]
    pub encoder:       EncoderKind,
    #[config(default = 256)]
    pub embeddings:    usize,
    #[config(default = 8)]
    pub heads:         usize,
    #[config(default = 6)]
    pub depth:         usize,
    /// Flattened spatial length of every input grid.
    #[config(default = 216)]
    pub seq_length:    usize,
    #[config(default = 10)]
    pub num_tokens:    usize,
    /// (channels, height, width) the caller reshapes the output into.
    #[config(default = "[3, 11, 11]")]
    pub output_size:   [usize; 3],
    #[config(default = 4)]
    pub ff_multiplier: usize,
    #[config(default = false)]
    pub mask:          bool,
    #[config(default = 0.0)]
    pub dropout:       f64,
}

impl GridTransformerConfig {
    pub fn ff_dimension(&self) -> usize {
        self.ff_multiplier * self.embeddings
    }

    pub fn output_len(&self) -> usize {
        self.output_size.iter().product()
    }

    pub fn encoder_config(&self) -> EncoderStackConfig {
        EncoderStackConfig::new(
            self.encoder, self.embeddings, self.heads, self.depth, self.ff_dimension(),
        )
        .with_mask(self.mask)
        .with_dropout(self.dropout)
    }

    pub fn embedding_config(&self) -> TokenPositionEmbeddingConfig {
        TokenPositionEmbeddingConfig::new(self.num_tokens, self.embeddings)
    }

    pub fn head_config(&self) -> OutputHeadConfig {
        OutputHeadConfig::new(self.seq_length, self.embeddings, self.output_size)
    }

    /// Checks every precondition without allocating any parameter.
    pub fn validate(&self) -> error::Result<()> {
        let output_len = params::product(&self.output_size, "output_size")?;
        let sizes = [
            ("embeddings",    self.embeddings),
            ("depth",         self.depth),
            ("seq_length",    self.seq_length),
            ("num_tokens",    self.num_tokens),
            ("ff_multiplier", self.ff_multiplier),
            ("output_size",   output_len),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(ModelError::ZeroSize(*name));
        }
        if self.heads == 0 || self.embeddings % self.heads != 0 {
            return Err(ModelError::HeadsMismatch {
                embeddings: self.embeddings,
                heads:      self.heads,
            });
        }
        params::mul(self.ff_multiplier, self.embeddings, "ff_dimension")?;
        self.head_config().validate()
    }

    /// Parameter count of the model `init` would build, computed
    /// without building it.
    pub fn num_params(&self) -> error::Result<usize> {
        self.validate()?;
        params::sum(
            &[
                self.embedding_config().num_params()?,
                self.encoder_config().num_params()?,
                self.head_config().num_params()?,
            ],
            "model parameters",
        )
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<GridTransformer<B>> {
        self.validate()?;

        let embedding = self.embedding_config().init(device)?;
        let encoder   = self.encoder_config().init(device)?;
        let head      = self.head_config().init(device)?;
        let [channels, height, width] = self.output_size;

        let model = GridTransformer {
            embedding, encoder, head,
            seq_length: self.seq_length,
            channels, height, width,
        };
        tracing::debug!(
            "GridTransformer ready: encoder={} depth={} embeddings={} params={}",
            self.encoder, self.depth, self.embeddings, model.num_params(),
        );
        Ok(model)
    }
}

#[derive(Module, Debug)]
pub struct GridTransformer<B: Backend> {
    pub embedding:  TokenPositionEmbedding<B>,
    pub encoder:    EncoderStack<B>,
    pub head:       OutputHead<B>,
    pub seq_length: usize,
    pub channels:   usize,
    pub height:     usize,
    pub width:      usize,
}

impl<B: Backend> GridTransformer<B> {
    /// input: [batch, *spatial] → [batch, prod(output_size)]
    ///
    /// Unchecked: bad shapes or token indices give backend-defined
    /// results (a panic on NdArray, garbage on Wgpu). Use
    /// `try_forward` for untrusted input.
    pub fn forward<const D: usize>(&self, input: Tensor<B, D, Int>) -> Tensor<B, 2> {
        let x = self.embedding.forward(input);
        let x = self.encoder.encode(x);
        self.head.forward(x)
    }

    pub fn try_forward<const D: usize>(&self, input: Tensor<B, D, Int>) -> error::Result<Tensor<B, 2>> {
        self.check_input(&input)?;
        Ok(self.forward(input))
    }

    pub fn check_input<const D: usize>(&self, input: &Tensor<B, D, Int>) -> error::Result<()> {
        if D < 2 {
            return Err(ModelError::InputRank { rank: D });
        }
        let dims = input.dims();
        if dims[0] == 0 {
            return Err(ModelError::EmptyBatch);
        }
        let seq_len: usize = dims[1..].iter().product();
        if seq_len != self.seq_length {
            return Err(ModelError::SequenceLength { expected: self.seq_length, actual: seq_len });
        }
        self.embedding.check_tokens(input)
    }

    pub fn output_size(&self) -> [usize; 3] {
        [self.channels, self.height, self.width]
    }

    pub fn output_len(&self) -> usize {
        self.channels * self.height * self.width
    }

    pub fn encoder_kind(&self) -> EncoderKind {
        self.encoder.kind()
    }
}
