// ============================================================
// Layer 4 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// Domain, infra and application code never touch tensors.
//
// What's in this layer, leaf-first:
//
//   params.rs     — checked sizes and parameter counts
//   positional.rs — fixed sinusoidal table over N spatial axes
//   embedding.rs  — learned token lookup + positional signal
//   attention.rs  — hand-built multi-head self-attention
//   block.rs      — attention + feed-forward, post-norm
//   encoder.rs    — the two interchangeable encoder stacks
//   head.rs       — flatten + three linear layers
//   model.rs      — GridTransformer and its Config
//   input.rs      — host TokenGrid → Int tensor
//   inferencer.rs — backend selection + checked forward pass
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need
//            Bloem (2019) Transformers from Scratch

pub mod error;

pub mod params;

pub mod positional;

pub mod embedding;

/// Hand-built multi-head self-attention
pub mod attention;

pub mod block;

/// Builtin and custom encoder stacks behind one trait
pub mod encoder;

pub mod head;

/// Full model: embedding → encoder stack → output head
pub mod model;

pub mod input;

/// Runs the model on the configured backend
pub mod inferencer;
