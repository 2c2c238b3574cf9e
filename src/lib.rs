#![recursion_limit = "256"]

//! Transformer over grids of discrete tokens.
//!
//! tokens → embedding + positional signal → encoder stack → flatten →
//! three linear layers → flat output per batch element.
//!
//! The encoder stack is either burn's `TransformerEncoder` or a hand-built
//! equivalent, chosen through [`ml::encoder::EncoderKind`].

pub mod cli;
pub mod application;
pub mod domain;
pub mod ml;
pub mod infra;

pub use ml::encoder::EncoderKind;
pub use ml::error::ModelError;
pub use ml::model::{GridTransformer, GridTransformerConfig};
