//! Runtime settings for the console.
//!
//! Every field has a default matching a Harvester ISO/node layout. An optional
//! JSON file can override any subset of them; command line flags are applied
//! on top by `main`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Console settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Seconds between status and management URL refreshes
    pub poll_interval_secs: u64,
    /// Node port the management UI is exposed on
    pub node_port: u16,
    /// k3s service environment file; a `K3S_URL` entry marks a joining node
    pub k3s_env_file: PathBuf,
    /// Kubeconfig used on joining nodes
    pub agent_kubeconfig: PathBuf,
    /// Installed system configuration holding the `--flannel-iface` argument
    pub system_config_file: PathBuf,
    /// Shadow file consulted for the shell credential check
    pub shadow_file: PathBuf,
    /// Account whose password unlocks the shell
    pub admin_user: String,
    /// Installer executable; receives the target configuration path
    pub installer_command: String,
    /// Where the target configuration is written before installing
    pub install_config_path: PathBuf,
    /// Shell started from the dashboard
    pub shell: String,
    /// Seconds to wait before rebooting after the user declines
    pub reboot_delay_secs: u64,
    /// Skip destructive actions (installer run, reboot)
    pub dry_run: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            node_port: 30443,
            k3s_env_file: PathBuf::from("/etc/rancher/k3s/k3s-service.env"),
            agent_kubeconfig: PathBuf::from("/var/lib/rancher/k3s/agent/kubelet.kubeconfig"),
            system_config_file: PathBuf::from("/k3os/system/config.yaml"),
            shadow_file: PathBuf::from("/etc/shadow"),
            admin_user: "rancher".to_string(),
            installer_command: "harvester-installer".to_string(),
            install_config_path: PathBuf::from("/tmp/harvester-install.json"),
            shell: "/bin/bash".to_string(),
            reboot_delay_secs: 5,
            dry_run: false,
        }
    }
}

impl ConsoleSettings {
    /// Load settings from a JSON file; missing fields keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than zero");
        }
        if self.installer_command.trim().is_empty() {
            anyhow::bail!("installer_command must not be empty");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn reboot_delay(&self) -> Duration {
        Duration::from_secs(self.reboot_delay_secs)
    }
}
