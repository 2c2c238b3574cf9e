// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `forward`, `describe` and `init-config`.
// Flags override individual fields of the run configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::infra::{
    device::DeviceKind,
    run_config::{RunConfig, RunConfigStore},
};
use crate::ml::encoder::EncoderKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one forward pass on a random token grid
    Forward(ForwardArgs),

    /// Print the model architecture and parameter count
    Describe(DescribeArgs),

    /// Write the default run configuration as JSON
    InitConfig(InitConfigArgs),
}

/// Options shared by commands that build a model.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// JSON run configuration; built-in compact defaults if omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend to run on: cpu or wgpu
    #[arg(long)]
    pub device: Option<DeviceKind>,

    /// Encoder stack implementation: builtin or custom
    #[arg(long)]
    pub encoder: Option<EncoderKind>,

    /// Restrict attention to earlier positions
    #[arg(long)]
    pub mask: bool,
}

impl ConfigArgs {
    /// Load the configuration file (or defaults) and apply overrides.
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut cfg = RunConfigStore::load_or_default(self.config.as_deref())?;
        if let Some(device) = self.device {
            cfg.device = device;
        }
        if let Some(encoder) = self.encoder {
            cfg.model.encoder = encoder;
        }
        if self.mask {
            cfg.model.mask = true;
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
pub struct ForwardArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Input grid shape, batch first, e.g. 8,24,5
    #[arg(long, value_delimiter = ',')]
    pub shape: Option<Vec<usize>>,

    /// Seed for the random token grid
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ForwardArgs {
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut cfg = self.config.resolve()?;
        if let Some(shape) = &self.shape {
            cfg.input_shape = shape.clone();
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Where to write the configuration
    #[arg(long, default_value = "run_config.json")]
    pub out: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitConfigArgs {
    pub fn write(&self) -> Result<()> {
        if self.out.exists() && !self.force {
            anyhow::bail!("'{}' already exists (use --force to overwrite)", self.out.display());
        }
        RunConfigStore::new(&self.out)
            .save(&RunConfig::default())
            .with_context(|| "Failed to write default run configuration")
    }
}
