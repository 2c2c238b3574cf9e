// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one CLI command each.
//
// Rules for this layer:
//   - No tensor code here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

/// Random-grid forward pass
pub mod forward_use_case;

/// Architecture and parameter count report
pub mod describe_use_case;
