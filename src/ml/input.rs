use burn::prelude::*;

use crate::domain::grid::TokenGrid;
use crate::ml::error::{self, ModelError};

/// Uploads a host grid as a rank-D Int tensor on `device`.
pub fn grid_tensor<B: Backend, const D: usize>(
    grid:   &TokenGrid,
    device: &B::Device,
) -> error::Result<Tensor<B, D, Int>> {
    let shape: [usize; D] = grid
        .shape()
        .try_into()
        .map_err(|_| ModelError::GridRank { expected: D, actual: grid.rank() })?;
    Ok(Tensor::<B, 1, Int>::from_ints(grid.tokens(), device).reshape(shape))
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_grid_becomes_tensor_of_same_shape() {
        let device = Default::default();
        let grid = TokenGrid::new(vec![2, 2, 3], (0..12).collect()).unwrap();
        let t = grid_tensor::<TestBackend, 3>(&grid, &device).unwrap();
        assert_eq!(t.dims(), [2, 2, 3]);

        let values: Vec<i64> = t.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(values, (0..12).collect::<Vec<i64>>());
    }

    #[test]
    fn test_rank_mismatch() {
        let device = Default::default();
        let grid = TokenGrid::new(vec![2, 6], vec![1; 12]).unwrap();
        let err = grid_tensor::<TestBackend, 3>(&grid, &device).unwrap_err();
        assert_eq!(err, ModelError::GridRank { expected: 3, actual: 2 });
    }
}
