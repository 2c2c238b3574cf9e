// ============================================================
// Layer 5 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to the model:
//
//   run_config.rs — the JSON run configuration (device, model
//                   hyperparameters, input shape, seed) and the
//                   store that reads/writes it
//
//   device.rs     — which burn backend to run on
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Run configuration file handling
pub mod run_config;

/// Backend / device selection
pub mod device;
