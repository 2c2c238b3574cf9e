// ============================================================
// Layer 4 — Sinusoidal Positional Encoding
// ============================================================
// Self-attention is permutation-invariant, so position must be
// injected explicitly. Unlike a learned position embedding the
// signal here is a fixed function of the grid coordinates:
//
//   c           = ceil(channels / (2 * n_axes)) * 2
//   inv_freq[j] = 10000^(-2j / c)
//   axis a owns channels [a*c, (a+1)*c), interleaved as
//     sin(pos_a * inv_freq[j]), cos(pos_a * inv_freq[j])
//
// and the result is truncated to `channels`. With one or two
// spatial axes this is the classic 1D / 2D sinusoidal scheme.
//
// Reference: Vaswani et al. (2017) §3.5
//            Wang & Liu (2019) 2D positional encoding

use burn::{prelude::*, tensor::TensorData};

const BASE: f32 = 10_000.0;

/// Channels given to each spatial axis (always even).
pub fn channels_per_axis(channels: usize, n_axes: usize) -> usize {
    channels.div_ceil(2 * n_axes) * 2
}

/// Row-major table of shape `[prod(spatial), channels]`.
pub fn sinusoidal_table(spatial: &[usize], channels: usize) -> Vec<f32> {
    let n_axes = spatial.len();
    let positions: usize = spatial.iter().product();
    if n_axes == 0 || channels == 0 || positions == 0 {
        return Vec::new();
    }

    let per_axis  = channels_per_axis(channels, n_axes);
    let inv_freq: Vec<f32> = (0..per_axis / 2)
        .map(|j| 1.0 / BASE.powf((2 * j) as f32 / per_axis as f32))
        .collect();

    let mut table = Vec::with_capacity(positions * channels);
    let mut coord = vec![0usize; n_axes];
    let mut row   = vec![0.0f32; per_axis * n_axes];

    for _ in 0..positions {
        for (axis, &pos) in coord.iter().enumerate() {
            let offset = axis * per_axis;
            for (j, freq) in inv_freq.iter().enumerate() {
                let angle = pos as f32 * freq;
                row[offset + 2 * j]     = angle.sin();
                row[offset + 2 * j + 1] = angle.cos();
            }
        }
        table.extend_from_slice(&row[..channels]);

        // Advance the coordinate odometer, last axis fastest.
        for axis in (0..n_axes).rev() {
            coord[axis] += 1;
            if coord[axis] < spatial[axis] {
                break;
            }
            coord[axis] = 0;
        }
    }
    table
}

/// Stateless positional encoder for a fixed channel width.
#[derive(Debug, Clone, Copy)]
pub struct PositionalEncoding {
    channels: usize,
}

impl PositionalEncoding {
    pub fn new(channels: usize) -> Self {
        Self { channels }
    }

    /// spatial: grid dims without the batch axis → `[prod(spatial), channels]`
    pub fn forward<B: Backend>(&self, spatial: &[usize], device: &B::Device) -> Tensor<B, 2> {
        let positions: usize = spatial.iter().product();
        let table = sinusoidal_table(spatial, self.channels);
        Tensor::from_data(TensorData::new(table, [positions, self.channels]), device)
    }
}
