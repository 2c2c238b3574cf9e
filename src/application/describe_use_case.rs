// ============================================================
// Layer 2 — DescribeUseCase
// ============================================================
// Reports the configured architecture and its parameter count.
// Everything comes from the config: nothing is allocated, so the
// reference-size models can be described on any machine.

use anyhow::Result;

use crate::infra::run_config::RunConfig;
use crate::ml::encoder::EncoderKind;

#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub encoder:      EncoderKind,
    pub embeddings:   usize,
    pub heads:        usize,
    pub head_dim:     usize,
    pub depth:        usize,
    pub ff_dimension: usize,
    pub num_tokens:   usize,
    pub seq_length:   usize,
    /// Widths of the output head: seq*e → middle → e → out
    pub head_widths:  [usize; 4],
    pub output_size:  [usize; 3],
    pub masked:       bool,
    pub num_params:   usize,
}

pub struct DescribeUseCase {
    config: RunConfig,
}

impl DescribeUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ModelSummary> {
        let model = &self.config.model;
        model.validate()?;

        let head       = model.head_config();
        let num_params = model.num_params()?;
        tracing::debug!("Described {} encoder: {} parameters", model.encoder, num_params);

        Ok(ModelSummary {
            encoder:      model.encoder,
            embeddings:   model.embeddings,
            heads:        model.heads,
            head_dim:     model.embeddings / model.heads,
            depth:        model.depth,
            ff_dimension: model.ff_dimension(),
            num_tokens:   model.num_tokens,
            seq_length:   model.seq_length,
            head_widths:  [head.flat_input(), head.middle_width(), model.embeddings, head.output_len()],
            output_size:  model.output_size,
            masked:       model.mask,
            num_params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::device::DeviceKind;
    use crate::ml::model::GridTransformerConfig;

    fn run_config(model: GridTransformerConfig) -> RunConfig {
        RunConfig { device: DeviceKind::Cpu, model, input_shape: vec![1, 2], seed: 0 }
    }

    #[test]
    fn test_summary_counts_parameters() {
        let run = RunConfig {
            device: DeviceKind::Cpu,
            model: GridTransformerConfig::new()
                .with_embeddings(4)
                .with_heads(2)
                .with_depth(1)
                .with_seq_length(2)
                .with_num_tokens(3)
                .with_ff_multiplier(2)
                .with_output_size([1, 1, 2]),
            input_shape: vec![1, 2],
            seed: 0,
        };
        let summary = DescribeUseCase::new(run).execute().unwrap();

        assert_eq!(summary.head_dim, 2);
        assert_eq!(summary.head_widths, [8, 6, 4, 2]);

        // embedding 3*4
        // attention 4 * (4*4 + 4), two layer norms 2 * 8
        // feed-forward (4*8 + 8) + (8*4 + 4)
        // head (8*6 + 6) + (6*4 + 4) + (4*2 + 2)
        let expected = 12 + 80 + 16 + 40 + 36 + 54 + 28 + 10;
        assert_eq!(summary.num_params, expected);
    }

    #[test]
    fn test_summary_agrees_with_built_model() {
        let cfg = GridTransformerConfig::new()
            .with_encoder(EncoderKind::Builtin)
            .with_embeddings(8)
            .with_heads(2)
            .with_depth(2)
            .with_seq_length(6)
            .with_output_size([1, 2, 2]);
        let built = cfg.init::<burn::backend::NdArray>(&Default::default()).unwrap();

        let summary = DescribeUseCase::new(run_config(cfg)).execute().unwrap();
        assert_eq!(summary.encoder, EncoderKind::Builtin);
        assert_eq!(summary.num_params, burn::module::Module::num_params(&built));
    }

    #[test]
    fn test_reference_scenario_described_without_allocating() {
        let cfg = GridTransformerConfig::new().with_seq_length(720);
        let summary = DescribeUseCase::new(run_config(cfg)).execute().unwrap();

        assert_eq!(summary.head_widths, [184_320, 92_288, 256, 363]);
        assert!(summary.num_params > 184_320 * 92_288);
    }

    #[test]
    fn test_oversized_config_reported_as_error() {
        let cfg = GridTransformerConfig::new().with_seq_length(usize::MAX / 2);
        let err = DescribeUseCase::new(run_config(cfg)).execute().unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
