// ============================================================
// Layer 4 — Model Errors
// ============================================================
// Construction preconditions and checked-forward violations.
// Everything above the ml layer wraps these in anyhow.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{0} must be greater than zero")]
    ZeroSize(&'static str),

    #[error("embeddings ({embeddings}) must be divisible by heads ({heads})")]
    HeadsMismatch { embeddings: usize, heads: usize },

    #[error("input must have a batch axis and at least one spatial axis, got rank {rank}")]
    InputRank { rank: usize },

    #[error("input batch is empty")]
    EmptyBatch,

    #[error("flattened input length {actual} does not match seq_length {expected}")]
    SequenceLength { expected: usize, actual: usize },

    #[error("token index {token} out of range for vocabulary of {num_tokens}")]
    TokenOutOfRange { token: i64, num_tokens: usize },

    #[error("expected a rank-{expected} token grid, got rank {actual}")]
    GridRank { expected: usize, actual: usize },

    #[error("{0} is too large to represent")]
    SizeOverflow(&'static str),
}

pub type Result<T> = std::result::Result<T, ModelError>;
