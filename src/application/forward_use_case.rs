// ============================================================
// Layer 2 — ForwardUseCase
// ============================================================
// One forward pass on a random token grid, the quickest way to
// check that a configuration builds and produces the expected
// output shape:
//
//   Step 1: Validate the configuration       (Layer 4 - ml)
//   Step 2: Generate a seeded random grid    (Layer 3 - domain)
//   Step 3: Build the model on the device    (Layer 4 - ml)
//   Step 4: Run the checked forward pass     (Layer 4 - ml)

use anyhow::{ensure, Result};

use crate::domain::grid::TokenGrid;
use crate::infra::{device::DeviceKind, run_config::RunConfig};
use crate::ml::encoder::EncoderKind;
use crate::ml::inferencer::DeviceInferencer;

/// What the forward run produced, ready for Layer 1 to print.
#[derive(Debug, Clone)]
pub struct ForwardReport {
    pub device:       DeviceKind,
    pub encoder:      EncoderKind,
    pub input_shape:  Vec<usize>,
    pub output_dims:  [usize; 2],
    pub output_size:  [usize; 3],
    pub num_params:   usize,
    /// Leading values of the first output row
    pub preview:      Vec<f32>,
}

const PREVIEW_LEN: usize = 8;

pub struct ForwardUseCase {
    config: RunConfig,
}

impl ForwardUseCase {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<ForwardReport> {
        let cfg = &self.config;

        // ── Step 1: Fail early on bad hyperparameters ────────────────────────
        cfg.model.validate()?;
        ensure!(
            cfg.input_seq_length() == cfg.model.seq_length,
            "input shape {:?} flattens to {} positions but the model expects seq_length {}",
            cfg.input_shape,
            cfg.input_seq_length(),
            cfg.model.seq_length,
        );

        // ── Step 2: Random tokens in [0, num_tokens) ─────────────────────────
        let grid = TokenGrid::random(cfg.input_shape.clone(), cfg.model.num_tokens, cfg.seed)?;
        tracing::info!("Generated token grid {:?} (seed {})", grid.shape(), cfg.seed);

        // ── Step 3 + 4: Build and run ────────────────────────────────────────
        let inferencer = DeviceInferencer::new(cfg.device, &cfg.model)?;
        let prediction = inferencer.predict(&grid)?;
        tracing::debug!("Forward pass produced {} values", prediction.values.len());

        let preview = prediction
            .row(0)
            .map(|row| row.iter().take(PREVIEW_LEN).copied().collect())
            .unwrap_or_default();

        Ok(ForwardReport {
            device:      cfg.device,
            encoder:     inferencer.encoder_kind(),
            input_shape: grid.shape().to_vec(),
            output_dims: [prediction.batch, prediction.row_len()],
            output_size: prediction.output_size,
            num_params:  inferencer.num_params(),
            preview,
        })
    }
}
