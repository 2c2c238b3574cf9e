// ============================================================
// Layer 5 — Device Selection
// ============================================================
// Which burn backend the model runs on. Read from the run
// configuration (or a --device flag) once at start-up:
//
//   cpu  → burn::backend::NdArray   (always available)
//   wgpu → burn::backend::Wgpu      (Vulkan / Metal / DX12)

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Cpu,
    Wgpu,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Cpu  => write!(f, "cpu"),
            DeviceKind::Wgpu => write!(f, "wgpu"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu"         => Ok(DeviceKind::Cpu),
            "wgpu" | "gpu" => Ok(DeviceKind::Wgpu),
            other         => Err(format!("unknown device '{other}', expected 'cpu' or 'wgpu'")),
        }
    }
}
