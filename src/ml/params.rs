// ============================================================
// Layer 4 — Parameter Arithmetic
// ============================================================
// Sizes and parameter counts computed from configs alone, so a
// model can be described (or rejected) before anything is
// allocated. Every product is checked: a config read from JSON
// may carry values whose products overflow usize.

use crate::ml::error::{self, ModelError};

pub fn mul(a: usize, b: usize, what: &'static str) -> error::Result<usize> {
    a.checked_mul(b).ok_or(ModelError::SizeOverflow(what))
}

pub fn sum(values: &[usize], what: &'static str) -> error::Result<usize> {
    values
        .iter()
        .try_fold(0usize, |acc, v| acc.checked_add(*v))
        .ok_or(ModelError::SizeOverflow(what))
}

pub fn product(values: &[usize], what: &'static str) -> error::Result<usize> {
    values
        .iter()
        .try_fold(1usize, |acc, v| acc.checked_mul(*v))
        .ok_or(ModelError::SizeOverflow(what))
}

/// Weight `[d_in, d_out]` plus bias `[d_out]`.
pub fn linear(d_in: usize, d_out: usize, what: &'static str) -> error::Result<usize> {
    sum(&[mul(d_in, d_out, what)?, d_out], what)
}

/// Gamma and beta.
pub fn layer_norm(d: usize, what: &'static str) -> error::Result<usize> {
    mul(2, d, what)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_counts_bias() {
        assert_eq!(linear(4, 3, "l"), Ok(15));
        assert_eq!(layer_norm(8, "n"), Ok(16));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(mul(usize::MAX, 2, "flat"), Err(ModelError::SizeOverflow("flat")));
        assert_eq!(sum(&[usize::MAX, 1], "total"), Err(ModelError::SizeOverflow("total")));
        assert_eq!(product(&[usize::MAX / 2, 3, 1], "out"), Err(ModelError::SizeOverflow("out")));
        assert_eq!(product(&[3, 11, 11], "out"), Ok(363));
    }
}
