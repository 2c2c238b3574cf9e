// ============================================================
// Layer 4 — Encoder Stack
// ============================================================
// `depth` transformer layers applied in order. Two
// implementations are selectable when the model is built:
//
//   Builtin — burn's TransformerEncoder (post-norm, GELU)
//   Custom  — our own TransformerBlock stack
//
// Both compute the same function for the same weights; the
// rest of the model only sees the SequenceEncoder capability.

use std::{fmt, str::FromStr};

use burn::{
    nn::{
        attention::generate_autoregressive_mask,
        transformer::{TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::ml::attention::MultiSelfAttention;
use crate::ml::block::{TransformerBlock, TransformerBlockConfig};
use crate::ml::error::{self, ModelError};
use crate::ml::params;

// ─── EncoderKind ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    Builtin,
    Custom,
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderKind::Builtin => write!(f, "builtin"),
            EncoderKind::Custom  => write!(f, "custom"),
        }
    }
}

impl FromStr for EncoderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "builtin" => Ok(EncoderKind::Builtin),
            "custom"  => Ok(EncoderKind::Custom),
            other     => Err(format!("unknown encoder '{other}', expected 'builtin' or 'custom'")),
        }
    }
}

// ─── SequenceEncoder ──────────────────────────────────────────────────────────
/// Anything that maps [batch, seq_len, embeddings] to the same shape.
pub trait SequenceEncoder<B: Backend> {
    fn encode(&self, x: Tensor<B, 3>) -> Tensor<B, 3>;

    fn kind(&self) -> EncoderKind;
}

// ─── Config ───────────────────────────────────────────────────────────────────
#[derive(Config, Debug)]
pub struct EncoderStackConfig {
    pub kind:         EncoderKind,
    pub embeddings:   usize,
    pub heads:        usize,
    pub depth:        usize,
    pub ff_dimension: usize,
    #[config(default = false)]
    pub mask:         bool,
    #[config(default = 0.0)]
    pub dropout:      f64,
}

impl EncoderStackConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<EncoderStack<B>> {
        Ok(match self.kind {
            EncoderKind::Builtin => EncoderStack::Builtin(self.init_builtin(device)?),
            EncoderKind::Custom  => EncoderStack::Custom(self.init_custom(device)?),
        })
    }

    pub fn init_builtin<B: Backend>(&self, device: &B::Device) -> error::Result<BuiltinEncoder<B>> {
        self.validate()?;
        let encoder = TransformerEncoderConfig::new(
            self.embeddings, self.ff_dimension, self.heads, self.depth,
        )
        .with_dropout(self.dropout)
        .with_norm_first(false)
        .init(device);
        Ok(BuiltinEncoder { encoder, mask: self.mask })
    }

    pub fn init_custom<B: Backend>(&self, device: &B::Device) -> error::Result<CustomEncoder<B>> {
        self.validate()?;
        let block_cfg = TransformerBlockConfig::new(self.embeddings, self.heads, self.ff_dimension)
            .with_mask(self.mask)
            .with_dropout(self.dropout);
        let blocks = (0..self.depth)
            .map(|_| block_cfg.init(device))
            .collect::<error::Result<Vec<_>>>()?;
        Ok(CustomEncoder { blocks })
    }

    /// Same count for both kinds: per layer four biased `Linear(e, e)`,
    /// two layer norms and the two feed-forward projections.
    pub fn num_params(&self) -> error::Result<usize> {
        self.validate()?;
        let e  = self.embeddings;
        let ff = self.ff_dimension;
        let layer = params::sum(
            &[
                params::mul(4, params::linear(e, e, "attention")?, "attention")?,
                params::mul(2, params::layer_norm(e, "layer norm")?, "layer norm")?,
                params::linear(e, ff, "feed-forward")?,
                params::linear(ff, e, "feed-forward")?,
            ],
            "encoder layer",
        )?;
        params::mul(self.depth, layer, "encoder parameters")
    }

    // burn's MultiHeadAttention does not check divisibility itself.
    fn validate(&self) -> error::Result<()> {
        if self.depth == 0 {
            return Err(ModelError::ZeroSize("depth"));
        }
        if self.ff_dimension == 0 {
            return Err(ModelError::ZeroSize("ff_dimension"));
        }
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
}

// ─── Builtin ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BuiltinEncoder<B: Backend> {
    pub encoder: TransformerEncoder<B>,
    pub mask:    bool,
}

impl<B: Backend> SequenceEncoder<B> for BuiltinEncoder<B> {
    fn encode(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, seq_len, _] = x.dims();
        let device = x.device();
        let mut input = TransformerEncoderInput::new(x);
        if self.mask {
            input = input.mask_attn(generate_autoregressive_mask(batch, seq_len, &device));
        }
        self.encoder.forward(input)
    }

    fn kind(&self) -> EncoderKind {
        EncoderKind::Builtin
    }
}

// ─── Custom ───────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct CustomEncoder<B: Backend> {
    pub blocks: Vec<TransformerBlock<B>>,
}

impl<B: Backend> CustomEncoder<B> {
    /// Hand-built stack carrying exactly the weights of `builtin`.
    /// `config` must describe the same architecture.
    pub fn from_builtin(
        builtin: &BuiltinEncoder<B>,
        config:  &EncoderStackConfig,
        device:  &B::Device,
    ) -> error::Result<Self> {
        let template = config.init_custom(device)?;
        let record   = builtin.encoder.clone().into_record();

        let blocks = template.blocks
            .into_iter()
            .zip(record.layers)
            .map(|(block, layer)| TransformerBlock {
                attention: MultiSelfAttention {
                    to_queries:  block.attention.to_queries.load_record(layer.mha.query),
                    to_keys:     block.attention.to_keys.load_record(layer.mha.key),
                    to_values:   block.attention.to_values.load_record(layer.mha.value),
                    unify_heads: block.attention.unify_heads.load_record(layer.mha.output),
                    ..block.attention
                },
                norm1:    block.norm1.load_record(layer.norm_1),
                norm2:    block.norm2.load_record(layer.norm_2),
                ff_inner: block.ff_inner.load_record(layer.pwff.linear_inner),
                ff_outer: block.ff_outer.load_record(layer.pwff.linear_outer),
                dropout:  block.dropout,
            })
            .collect();

        Ok(Self { blocks })
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }
}

impl<B: Backend> SequenceEncoder<B> for CustomEncoder<B> {
    fn encode(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        self.blocks.iter().fold(x, |x, block| block.forward(x))
    }

    fn kind(&self) -> EncoderKind {
        EncoderKind::Custom
    }
}

// ─── EncoderStack ─────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub enum EncoderStack<B: Backend> {
    Builtin(BuiltinEncoder<B>),
    Custom(CustomEncoder<B>),
}

impl<B: Backend> SequenceEncoder<B> for EncoderStack<B> {
    fn encode(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        match self {
            EncoderStack::Builtin(encoder) => encoder.encode(x),
            EncoderStack::Custom(encoder)  => encoder.encode(x),
        }
    }

    fn kind(&self) -> EncoderKind {
        match self {
            EncoderStack::Builtin(encoder) => encoder.kind(),
            EncoderStack::Custom(encoder)  => encoder.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    fn max_abs_diff(a: Tensor<TestBackend, 3>, b: Tensor<TestBackend, 3>) -> f32 {
        let a = a.into_data().to_vec::<f32>().unwrap();
        let b = b.into_data().to_vec::<f32>().unwrap();
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
    }

    fn config(kind: EncoderKind) -> EncoderStackConfig {
        EncoderStackConfig::new(kind, 16, 4, 2, 32)
    }

    #[test]
    fn test_encoder_kind_parsing() {
        assert_eq!("builtin".parse::<EncoderKind>(), Ok(EncoderKind::Builtin));
        assert_eq!(" Custom ".parse::<EncoderKind>(), Ok(EncoderKind::Custom));
        assert!("lstm".parse::<EncoderKind>().is_err());
        assert_eq!(EncoderKind::Builtin.to_string(), "builtin");
    }

    #[test]
    fn test_encoder_kind_serde() {
        let json = serde_json::to_string(&EncoderKind::Custom).unwrap();
        assert_eq!(json, "\"custom\"");
        let kind: EncoderKind = serde_json::from_str("\"builtin\"").unwrap();
        assert_eq!(kind, EncoderKind::Builtin);
    }

    #[test]
    fn test_both_stacks_preserve_shape() {
        let device = Default::default();
        for kind in [EncoderKind::Builtin, EncoderKind::Custom] {
            let stack = config(kind).init::<TestBackend>(&device).unwrap();
            assert_eq!(stack.kind(), kind);
            let x = Tensor::<TestBackend, 3>::random([2, 6, 16], Distribution::Default, &device);
            assert_eq!(stack.encode(x).dims(), [2, 6, 16]);
        }
    }

    #[test]
    fn test_parameter_count_matches_both_stacks() {
        let device = Default::default();
        for kind in [EncoderKind::Builtin, EncoderKind::Custom] {
            let cfg   = config(kind);
            let stack = cfg.init::<TestBackend>(&device).unwrap();
            assert_eq!(cfg.num_params(), Ok(stack.num_params()), "{kind}");
        }
    }

    #[test]
    fn test_custom_depth() {
        let device = Default::default();
        let custom = EncoderStackConfig::new(EncoderKind::Custom, 16, 4, 5, 32)
            .init_custom::<TestBackend>(&device)
            .unwrap();
        assert_eq!(custom.depth(), 5);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let device = Default::default();
        let err = EncoderStackConfig::new(EncoderKind::Builtin, 16, 4, 0, 32)
            .init::<TestBackend>(&device)
            .unwrap_err();
        assert_eq!(err, ModelError::ZeroSize("depth"));
    }

    #[test]
    fn test_builtin_checks_heads_before_burn() {
        let device = Default::default();
        let err = EncoderStackConfig::new(EncoderKind::Builtin, 10, 3, 1, 40)
            .init::<TestBackend>(&device)
            .unwrap_err();
        assert_eq!(err, ModelError::HeadsMismatch { embeddings: 10, heads: 3 });
    }

    #[test]
    fn test_implementations_interchangeable() {
        let device = Default::default();
        let cfg     = config(EncoderKind::Builtin);
        let builtin = cfg.init_builtin::<TestBackend>(&device).unwrap();
        let custom  = CustomEncoder::from_builtin(&builtin, &cfg, &device).unwrap();

        let x = Tensor::<TestBackend, 3>::random([3, 7, 16], Distribution::Default, &device);
        let diff = max_abs_diff(builtin.encode(x.clone()), custom.encode(x));
        assert!(diff < 1e-4, "builtin and custom differ by {diff}");
    }

    #[test]
    fn test_implementations_interchangeable_with_mask() {
        let device = Default::default();
        let cfg     = config(EncoderKind::Builtin).with_mask(true);
        let builtin = cfg.init_builtin::<TestBackend>(&device).unwrap();
        let custom  = CustomEncoder::from_builtin(&builtin, &cfg, &device).unwrap();

        let x = Tensor::<TestBackend, 3>::random([2, 5, 16], Distribution::Default, &device);
        let diff = max_abs_diff(builtin.encode(x.clone()), custom.encode(x));
        assert!(diff < 1e-4, "masked builtin and custom differ by {diff}");
    }

    #[test]
    fn test_stack_is_causal_when_masked() {
        let device = Default::default();
        for kind in [EncoderKind::Builtin, EncoderKind::Custom] {
            let stack = config(kind).with_mask(true).init::<TestBackend>(&device).unwrap();

            let x  = Tensor::<TestBackend, 3>::random([1, 6, 16], Distribution::Default, &device);
            let x2 = x.clone().slice_assign(
                [0..1, 4..6, 0..16],
                Tensor::<TestBackend, 3>::random([1, 2, 16], Distribution::Default, &device),
            );

            let diff = max_abs_diff(
                stack.encode(x).slice([0..1, 0..4, 0..16]),
                stack.encode(x2).slice([0..1, 0..4, 0..16]),
            );
            assert!(diff < 1e-5, "{kind}: prefix changed by {diff}");
        }
    }
}
