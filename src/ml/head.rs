// ============================================================
// Layer 4 — Output Head
// ============================================================
// [batch, seq, e] → flatten → [batch, seq*e]
//   → Linear(seq*e, middle) → Linear(middle, e) → Linear(e, out)
//
// middle = (seq*e + e) / 2, out = prod(output_size).
// No activation between or after the layers: the caller gets raw
// scores and reshapes them to output_size itself.

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
};

use crate::ml::error::{self, ModelError};
use crate::ml::params;

#[derive(Config, Debug)]
pub struct OutputHeadConfig {
    pub seq_length:  usize,
    pub embeddings:  usize,
    pub output_size: [usize; 3],
}

impl OutputHeadConfig {
    pub fn flat_input(&self) -> usize {
        self.seq_length * self.embeddings
    }

    pub fn middle_width(&self) -> usize {
        (self.flat_input() + self.embeddings) / 2
    }

    pub fn output_len(&self) -> usize {
        self.output_size.iter().product()
    }

    /// Zero sizes and overflowing widths, checked before any allocation.
    pub fn validate(&self) -> error::Result<()> {
        if self.seq_length == 0 {
            return Err(ModelError::ZeroSize("seq_length"));
        }
        if self.embeddings == 0 {
            return Err(ModelError::ZeroSize("embeddings"));
        }
        if params::product(&self.output_size, "output_size")? == 0 {
            return Err(ModelError::ZeroSize("output_size"));
        }
        let flat = params::mul(self.seq_length, self.embeddings, "flat_input")?;
        params::sum(&[flat, self.embeddings], "middle_width")?;
        Ok(())
    }

    pub fn num_params(&self) -> error::Result<usize> {
        self.validate()?;
        let middle = self.middle_width();
        params::sum(
            &[
                params::linear(self.flat_input(), middle, "project_in")?,
                params::linear(middle, self.embeddings, "project_mid")?,
                params::linear(self.embeddings, self.output_len(), "project_out")?,
            ],
            "head parameters",
        )
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<OutputHead<B>> {
        self.validate()?;

        let middle = self.middle_width();
        Ok(OutputHead {
            project_in:  LinearConfig::new(self.flat_input(), middle).init(device),
            project_mid: LinearConfig::new(middle, self.embeddings).init(device),
            project_out: LinearConfig::new(self.embeddings, self.output_len()).init(device),
        })
    }
}

#[derive(Module, Debug)]
pub struct OutputHead<B: Backend> {
    pub project_in:  Linear<B>,
    pub project_mid: Linear<B>,
    pub project_out: Linear<B>,
}

impl<B: Backend> OutputHead<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let x = x.flatten::<2>(1, 2);
        let x = self.project_in.forward(x);
        let x = self.project_mid.forward(x);
        self.project_out.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_middle_width() {
        let cfg = OutputHeadConfig::new(720, 256, [3, 11, 11]);
        assert_eq!(cfg.flat_input(), 184_320);
        assert_eq!(cfg.middle_width(), 92_288);
        assert_eq!(cfg.output_len(), 363);

        // Odd sum rounds down
        let cfg = OutputHeadConfig::new(3, 3, [1, 1, 1]);
        assert_eq!(cfg.middle_width(), 6);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let head = OutputHeadConfig::new(6, 4, [3, 2, 2])
            .init::<TestBackend>(&device)
            .unwrap();
        assert_eq!(head.project_in.weight.val().dims(), [24, 14]);

        let x = Tensor::<TestBackend, 3>::random([5, 6, 4], Distribution::Default, &device);
        assert_eq!(head.forward(x).dims(), [5, 12]);
    }

    #[test]
    fn test_empty_output_rejected() {
        let device = Default::default();
        let err = OutputHeadConfig::new(6, 4, [3, 0, 2])
            .init::<TestBackend>(&device)
            .unwrap_err();
        assert_eq!(err, ModelError::ZeroSize("output_size"));
    }

    #[test]
    fn test_parameter_count_matches_built_head() {
        let device = Default::default();
        let cfg  = OutputHeadConfig::new(6, 4, [3, 2, 2]);
        let head = cfg.init::<TestBackend>(&device).unwrap();
        assert_eq!(cfg.num_params(), Ok(head.num_params()));
    }

    #[test]
    fn test_huge_widths_overflow_instead_of_panicking() {
        let cfg = OutputHeadConfig::new(usize::MAX / 2, 4, [3, 11, 11]);
        assert_eq!(cfg.validate(), Err(ModelError::SizeOverflow("flat_input")));

        let cfg = OutputHeadConfig::new(6, 4, [usize::MAX, 2, 1]);
        assert_eq!(cfg.num_params(), Err(ModelError::SizeOverflow("output_size")));
    }
}
