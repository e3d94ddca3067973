//! Target configuration handed to the installer.
//!
//! The wizard fills this in field by field as screens are confirmed. It is
//! written as JSON once the user accepts the summary and passed to the
//! installer process untouched.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::types::InstallMode;
use crate::validation;

/// Environment keys written when a proxy is configured
pub const PROXY_ENV_KEYS: [&str; 2] = ["http_proxy", "https_proxy"];

/// Disk and media section of the target configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallTarget {
    /// Block device that will be formatted, e.g. `/dev/sda`
    pub device: String,
    /// Optional remote cloud-init document merged by the installer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_url: Option<String>,
    /// Unattended install; the confirmation summary is not shown
    #[serde(default)]
    pub silent: bool,
}

/// Installation configuration produced by the wizard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallConfig {
    pub install_mode: Option<InstallMode>,
    #[serde(default)]
    pub install: InstallTarget,
    /// Formatted management server URL (join mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default)]
    pub token: String,
    /// Password hash in crypt(3) format; never the clear text
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ssh_authorized_keys: Vec<String>,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub dns_nameservers: Vec<String>,
    /// Commands run once after first boot
    #[serde(default)]
    pub runcmd: Vec<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Extra arguments for the cluster agent, e.g. `--flannel-iface eth0`
    #[serde(default)]
    pub extra_k3s_args: Vec<String>,
}

impl InstallConfig {
    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize install configuration to JSON")?;

        fs::write(&path, json).with_context(|| {
            format!("Failed to write install configuration to {:?}", path.as_ref())
        })?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).with_context(|| {
            format!("Failed to read install configuration from {:?}", path.as_ref())
        })?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse install configuration JSON")?;

        Ok(config)
    }

    /// Check a saved configuration with the same rules the wizard applies.
    pub fn validate(&self) -> Result<()> {
        let mode = self
            .install_mode
            .ok_or_else(|| anyhow::anyhow!("install mode is not set"))?;
        if self.install.device.is_empty() {
            anyhow::bail!("install device is not set");
        }
        if mode == InstallMode::Join && self.server_url.as_deref().unwrap_or_default().is_empty() {
            anyhow::bail!("management address is required to join a cluster");
        }
        validation::require(&self.token, "Cluster token").map_err(anyhow::Error::msg)?;
        if self.password.is_empty() {
            anyhow::bail!("password hash is not set");
        }
        validation::validate_hostname(&self.hostname).map_err(anyhow::Error::msg)?;
        for server in &self.dns_nameservers {
            validation::validate_ip(server).map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }

    /// Set or clear the proxy environment variables
    pub fn set_proxy(&mut self, proxy: Option<&str>) {
        for key in PROXY_ENV_KEYS {
            match proxy {
                Some(value) => {
                    self.environment.insert(key.to_string(), value.to_string());
                }
                None => {
                    self.environment.remove(key);
                }
            }
        }
    }

    /// Proxy address, if one was configured
    pub fn proxy(&self) -> Option<&str> {
        self.environment.get(PROXY_ENV_KEYS[0]).map(String::as_str)
    }
}
