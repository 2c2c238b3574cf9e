use anyhow::{ensure, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A batch of token grids stored row-major on the host.
/// Shape is (batch, *spatial); the model flattens the spatial axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrid {
    shape:  Vec<usize>,
    tokens: Vec<i32>,
}

impl TokenGrid {
    pub fn new(shape: Vec<usize>, tokens: Vec<i32>) -> Result<Self> {
        ensure!(shape.len() >= 2, "grid shape {shape:?} needs a batch axis and a spatial axis");
        let expected: usize = shape.iter().product();
        ensure!(
            expected == tokens.len(),
            "grid shape {shape:?} needs {expected} tokens, got {}",
            tokens.len()
        );
        Ok(Self { shape, tokens })
    }

    /// Uniform tokens in [0, num_tokens), reproducible from `seed`.
    pub fn random(shape: Vec<usize>, num_tokens: usize, seed: u64) -> Result<Self> {
        ensure!(num_tokens > 0, "num_tokens must be greater than zero");
        let len: usize = shape.iter().product();
        let mut rng = StdRng::seed_from_u64(seed);
        let tokens = (0..len)
            .map(|_| rng.random_range(0..num_tokens as i32))
            .collect();
        Self::new(shape, tokens)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn tokens(&self) -> &[i32] {
        &self.tokens
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}
