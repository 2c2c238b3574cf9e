// ============================================================
// Layer 4 — Inferencer
// ============================================================
// Builds a GridTransformer on the configured backend, uploads a
// TokenGrid, runs the checked forward pass and brings the flat
// output back to the host. The output is NOT reshaped: callers
// index it with `Prediction::row` and `output_size`.

use anyhow::Result;
use burn::prelude::*;

use crate::domain::grid::TokenGrid;
use crate::infra::device::DeviceKind;
use crate::ml::encoder::EncoderKind;
use crate::ml::input::grid_tensor;
use crate::ml::model::{GridTransformer, GridTransformerConfig};

pub type CpuBackend = burn::backend::NdArray;
pub type GpuBackend = burn::backend::Wgpu;

/// Flat model output on the host, one row per batch element.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub batch:       usize,
    pub output_size: [usize; 3],
    pub values:      Vec<f32>,
}

impl Prediction {
    pub fn row_len(&self) -> usize {
        self.output_size.iter().product()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let len = self.row_len();
        self.values.get(index * len..(index + 1) * len)
    }
}

pub struct Inferencer<B: Backend> {
    model:  GridTransformer<B>,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(cfg: &GridTransformerConfig, device: B::Device) -> Result<Self> {
        let model = cfg.init::<B>(&device)?;
        tracing::info!(
            "Model ready: {} encoder, {} layers, embeddings={}, {} parameters",
            cfg.encoder, cfg.depth, cfg.embeddings, model.num_params(),
        );
        Ok(Self { model, device })
    }

    pub fn model(&self) -> &GridTransformer<B> {
        &self.model
    }

    pub fn predict(&self, grid: &TokenGrid) -> Result<Prediction> {
        let output = match grid.rank() {
            2 => self.forward_rank::<2>(grid)?,
            3 => self.forward_rank::<3>(grid)?,
            4 => self.forward_rank::<4>(grid)?,
            5 => self.forward_rank::<5>(grid)?,
            6 => self.forward_rank::<6>(grid)?,
            r => anyhow::bail!("token grids of rank {r} are not supported (2..=6)"),
        };

        let [batch, _] = output.dims();
        let values = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Reading model output: {e:?}"))?;

        Ok(Prediction { batch, output_size: self.model.output_size(), values })
    }

    fn forward_rank<const D: usize>(&self, grid: &TokenGrid) -> Result<Tensor<B, 2>> {
        let input = grid_tensor::<B, D>(grid, &self.device)?;
        Ok(self.model.try_forward(input)?)
    }
}

/// An Inferencer on whichever backend the run configuration asked for.
pub enum DeviceInferencer {
    Cpu(Inferencer<CpuBackend>),
    Gpu(Inferencer<GpuBackend>),
}

impl DeviceInferencer {
    pub fn new(device: DeviceKind, cfg: &GridTransformerConfig) -> Result<Self> {
        tracing::info!("Using {} backend", device);
        Ok(match device {
            DeviceKind::Cpu  => Self::Cpu(Inferencer::new(cfg, Default::default())?),
            DeviceKind::Wgpu => Self::Gpu(Inferencer::new(
                cfg,
                burn::backend::wgpu::WgpuDevice::default(),
            )?),
        })
    }

    pub fn predict(&self, grid: &TokenGrid) -> Result<Prediction> {
        match self {
            Self::Cpu(inner) => inner.predict(grid),
            Self::Gpu(inner) => inner.predict(grid),
        }
    }

    pub fn num_params(&self) -> usize {
        match self {
            Self::Cpu(inner) => inner.model().num_params(),
            Self::Gpu(inner) => inner.model().num_params(),
        }
    }

    pub fn encoder_kind(&self) -> EncoderKind {
        match self {
            Self::Cpu(inner) => inner.model().encoder_kind(),
            Self::Gpu(inner) => inner.model().encoder_kind(),
        }
    }
}
