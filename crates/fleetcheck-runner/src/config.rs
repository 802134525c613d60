use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fleetcheck_core::StatusThresholds;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::orchestrator::RunOptions;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub thresholds: StatusThresholds,
    #[serde(default)]
    pub devices: DevicesConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Devices checked at the same time. 1 runs the fleet strictly in order.
    pub concurrency: usize,
    pub adapter_timeout_ms: u64,
    /// Minimum spacing between device starts.
    pub device_pause_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            adapter_timeout_ms: 5_000,
            device_pause_ms: 1_000,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DevicesConfig {
    /// JSON or YAML device map. The built-in devices are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub path: String,
    pub assigned_to: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: "test_report.json".to_string(),
            assigned_to: "verification_team".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub port_failure_rate: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            port_failure_rate: 0.05,
        }
    }
}

impl HarnessConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: HarnessConfig =
            toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    /// Load `path` when it exists, otherwise start from defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn devices_path(&self) -> Option<PathBuf> {
        self.devices.path.as_deref().map(expand)
    }

    pub fn report_path(&self) -> PathBuf {
        expand(&self.report.path)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            concurrency: self.run.concurrency.clamp(1, Semaphore::MAX_PERMITS),
            adapter_timeout: Duration::from_millis(self.run.adapter_timeout_ms),
            device_pause: Duration::from_millis(self.run.device_pause_ms),
            thresholds: self.thresholds,
            assigned_to: self.report.assigned_to.clone(),
        }
    }
}

fn expand(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}
