// ============================================================
// Layer 3 — Domain
// ============================================================
// Plain host-side types with no burn dependency. The ml layer
// turns them into tensors; nothing here knows about backends.

/// Token grids fed to the model
pub mod grid;
