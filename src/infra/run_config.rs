// ============================================================
// Layer 5 — Run Configuration
// ============================================================
// Everything a run needs besides the weights, stored as JSON:
//
//   {
//     "device": "cpu",
//     "model": { "encoder": "custom", "embeddings": 64, ... },
//     "input_shape": [8, 24, 5],
//     "seed": 42
//   }
//
// The model section is burn's Config serialisation of
// GridTransformerConfig; `init-config` writes a complete one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::device::DeviceKind;
use crate::ml::encoder::EncoderKind;
use crate::ml::model::GridTransformerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub device:      DeviceKind,
    pub model:       GridTransformerConfig,
    /// (batch, *spatial) of the random grid used by `forward`
    pub input_shape: Vec<usize>,
    #[serde(default = "default_seed")]
    pub seed:        u64,
}

fn default_seed() -> u64 {
    42
}

impl Default for RunConfig {
    /// A compact model on an 8 × 24 × 5 grid, small enough for a CPU.
    fn default() -> Self {
        Self {
            device: DeviceKind::Cpu,
            model: GridTransformerConfig::new()
                .with_encoder(EncoderKind::Custom)
                .with_embeddings(64)
                .with_heads(8)
                .with_depth(2)
                .with_seq_length(24 * 5),
            input_shape: vec![8, 24, 5],
            seed:        default_seed(),
        }
    }
}

impl RunConfig {
    pub fn input_seq_length(&self) -> usize {
        self.input_shape.iter().skip(1).product()
    }
}

/// Reads and writes a RunConfig at a fixed path.
pub struct RunConfigStore {
    path: PathBuf,
}

impl RunConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn load(&self) -> Result<RunConfig> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read run config '{}'", self.path.display()))?;
        let cfg: RunConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid run config '{}'", self.path.display()))?;
        tracing::debug!("Loaded run config from '{}'", self.path.display());
        Ok(cfg)
    }

    pub fn save(&self, cfg: &RunConfig) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write run config to '{}'", self.path.display()))?;
        tracing::debug!("Saved run config to '{}'", self.path.display());
        Ok(())
    }

    /// No path means the built-in default; a given path must exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<RunConfig> {
        match path {
            Some(p) => Self::new(p).load(),
            None    => Ok(RunConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("grid-transformer-{}-{name}", std::process::id()))
            .join("run.json")
    }

    #[test]
    fn test_default_is_consistent() {
        let cfg = RunConfig::default();
        assert_eq!(cfg.input_seq_length(), cfg.model.seq_length);
        assert!(cfg.model.validate().is_ok());
    }

    #[test]
    fn test_save_then_load() {
        let path  = scratch_path("roundtrip");
        let store = RunConfigStore::new(&path);
        let mut cfg = RunConfig::default();
        cfg.device = DeviceKind::Wgpu;
        cfg.model  = cfg.model.with_encoder(EncoderKind::Builtin);

        store.save(&cfg).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.device, DeviceKind::Wgpu);
        assert_eq!(loaded.model.encoder, EncoderKind::Builtin);
        assert_eq!(loaded.input_shape, vec![8, 24, 5]);

        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_device_and_seed_optional() {
        let mut value = serde_json::to_value(RunConfig::default()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("device");
        obj.remove("seed");

        let cfg: RunConfig = serde_json::from_value(value).unwrap();
        assert_eq!(cfg.device, DeviceKind::Cpu);
        assert_eq!(cfg.seed, 42);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = RunConfigStore::new(scratch_path("missing")).load().unwrap_err();
        assert!(err.to_string().contains("Cannot read run config"));
    }

    #[test]
    fn test_no_path_gives_default() {
        let cfg = RunConfigStore::load_or_default(None).unwrap();
        assert_eq!(cfg.input_shape, vec![8, 24, 5]);
    }
}
