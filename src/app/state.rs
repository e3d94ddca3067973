//! Wizard state
//!
//! Everything the user has confirmed so far, plus the target configuration
//! that mirrors it in the installer's shape.
//!
//! # Invariants
//!
//! - A field is only written by the confirm handler that validated it.
//! - Values derived from superseded input are cleared, never left stale:
//!   leaving static networking clears every static field and the matching
//!   parts of the target configuration.
//! - The target configuration never holds the clear-text password.

use crate::app::UiEvent;
use crate::components::keybindings::KeybindingContext;
use crate::config::InstallConfig;
use crate::probes::Probes;
use crate::settings::ConsoleSettings;
use crate::types::{InstallMode, NetworkMode};
use crate::validation::CidrAddress;
use rand::Rng;
use std::net::Ipv4Addr;
use std::sync::mpsc::Sender;

/// Characters used for the random hostname suffix
const HOSTNAME_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const HOSTNAME_SUFFIX_LEN: usize = 5;

/// Default DNS server offered for static networking
pub const DEFAULT_DNS_SERVERS: &str = "8.8.8.8";

/// Command run after first boot to apply static networking
const MANUAL_NETWORK_COMMAND: &str = "/sbin/configure-network-manual";

/// Answers collected during the wizard.
///
/// Fields start as `None` and are filled in by confirm handlers.
#[derive(Debug, Clone, Default)]
pub struct InstallData {
    pub install_mode: Option<InstallMode>,
    /// Selected disk device path (e.g., `/dev/sda`).
    pub device: Option<String>,
    /// Management address as typed by the user.
    pub server_url: Option<String>,
    pub token: Option<String>,
    /// Clear-text password, kept only to pre-fill the inputs (zeroed before install).
    pub password: Option<String>,
    pub ssh_key_url: Option<String>,
    /// Management network interface.
    pub interface: Option<String>,
    pub network_mode: Option<NetworkMode>,
    pub hostname: Option<String>,
    /// Static address as typed, in CIDR form.
    pub address: Option<String>,
    pub ip: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    /// DNS servers as typed (comma separated).
    pub dns_servers: Option<String>,
    pub proxy: Option<String>,
    pub cloud_init_url: Option<String>,
}

impl InstallData {
    /// Zero out the clear-text password.
    pub fn zero_sensitive_data(&mut self) {
        if let Some(ref mut pwd) = self.password {
            pwd.clear();
            pwd.shrink_to_fit();
        }
        self.password = None;
    }
}

impl Drop for InstallData {
    fn drop(&mut self) {
        self.zero_sensitive_data();
    }
}

/// Values read from the running system that pre-fill inputs.
///
/// Hints are never copied into `InstallData` until the user confirms them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkHints {
    /// Current address of the chosen interface, CIDR form
    pub address: Option<String>,
    /// Current default gateway of the chosen interface
    pub gateway: Option<String>,
}

/// Wizard answers and the target configuration built from them
#[derive(Debug, Clone)]
pub struct WizardState {
    pub data: InstallData,
    pub config: InstallConfig,
    pub hints: NetworkHints,
    default_hostname: String,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(random_hostname())
    }
}

impl WizardState {
    pub fn new(default_hostname: impl Into<String>) -> Self {
        Self {
            data: InstallData::default(),
            config: InstallConfig::default(),
            hints: NetworkHints::default(),
            default_hostname: default_hostname.into(),
        }
    }

    /// Hostname offered when the user has not confirmed one yet
    pub fn default_hostname(&self) -> &str {
        &self.default_hostname
    }

    pub fn install_mode(&self) -> InstallMode {
        self.data.install_mode.unwrap_or_default()
    }

    pub fn network_mode(&self) -> NetworkMode {
        self.data.network_mode.unwrap_or_default()
    }

    pub fn set_install_mode(&mut self, mode: InstallMode) {
        self.data.install_mode = Some(mode);
        self.config.install_mode = Some(mode);
        if mode == InstallMode::Create {
            // A management address only means something when joining
            self.clear_server_url();
        }
    }

    pub fn set_device(&mut self, device: &str) {
        self.data.device = Some(device.to_string());
        self.config.install.device = device.to_string();
    }

    /// Record the typed management address and its normalized URL
    pub fn set_server_url(&mut self, raw: &str, formatted: &str) {
        self.data.server_url = Some(raw.to_string());
        self.config.server_url = Some(formatted.to_string());
    }

    pub fn clear_server_url(&mut self) {
        self.data.server_url = None;
        self.config.server_url = None;
    }

    pub fn set_token(&mut self, token: &str) {
        self.data.token = Some(token.to_string());
        self.config.token = token.to_string();
    }

    /// Record a confirmed password. Only `hash` reaches the target configuration.
    pub fn set_password(&mut self, raw: &str, hash: &str) {
        self.data.password = Some(raw.to_string());
        self.config.password = hash.to_string();
    }

    pub fn set_ssh_keys(&mut self, url: &str, keys: Vec<String>) {
        self.data.ssh_key_url = Some(url.to_string());
        self.config.ssh_authorized_keys = keys;
    }

    pub fn clear_ssh_keys(&mut self) {
        self.data.ssh_key_url = None;
        self.config.ssh_authorized_keys.clear();
    }

    /// Record the management interface and remember its current address
    /// as a hint for the static address input.
    pub fn select_interface(&mut self, name: &str, current_address: Option<&str>) {
        if self.data.interface.as_deref() != Some(name) {
            self.hints = NetworkHints::default();
        }
        self.data.interface = Some(name.to_string());
        self.hints.address = current_address.map(str::to_string);
        self.config.extra_k3s_args = vec!["--flannel-iface".to_string(), name.to_string()];
        self.refresh_runcmd();
    }

    pub fn set_gateway_hint(&mut self, gateway: Option<Ipv4Addr>) {
        self.hints.gateway = gateway.map(|gw| gw.to_string());
    }

    /// Switch network mode. Leaving static clears every static field.
    pub fn set_network_mode(&mut self, mode: NetworkMode) {
        self.data.network_mode = Some(mode);
        if !mode.is_static() {
            self.clear_static();
        }
    }

    fn clear_static(&mut self) {
        self.data.address = None;
        self.data.ip = None;
        self.data.netmask = None;
        self.data.gateway = None;
        self.data.dns_servers = None;
        self.config.dns_nameservers.clear();
        self.config.runcmd.clear();
    }

    pub fn set_hostname(&mut self, hostname: &str) {
        self.data.hostname = Some(hostname.to_string());
        self.config.hostname = hostname.to_string();
    }

    pub fn set_static_address(&mut self, input: &str, cidr: &CidrAddress) {
        self.data.address = Some(input.trim().to_string());
        self.data.ip = Some(cidr.ip.to_string());
        self.data.netmask = Some(cidr.netmask_string());
        self.refresh_runcmd();
    }

    pub fn set_gateway(&mut self, gateway: Ipv4Addr) {
        self.data.gateway = Some(gateway.to_string());
        self.refresh_runcmd();
    }

    pub fn set_dns_servers(&mut self, input: &str, servers: Vec<String>) {
        self.data.dns_servers = Some(input.to_string());
        self.config.dns_nameservers = servers;
        self.refresh_runcmd();
    }

    /// Rebuild the post-boot network command from the static fields
    fn refresh_runcmd(&mut self) {
        self.config.runcmd.clear();
        if !self.network_mode().is_static() {
            return;
        }
        let d = &self.data;
        if let (Some(iface), Some(ip), Some(mask), Some(gw)) =
            (&d.interface, &d.ip, &d.netmask, &d.gateway)
        {
            if self.config.dns_nameservers.is_empty() {
                return;
            }
            let mut command = vec![
                MANUAL_NETWORK_COMMAND.to_string(),
                iface.clone(),
                ip.clone(),
                mask.clone(),
                gw.clone(),
            ];
            command.extend(self.config.dns_nameservers.iter().cloned());
            self.config.runcmd.push(command.join(" "));
        }
    }

    /// Empty input removes the proxy
    pub fn set_proxy(&mut self, proxy: &str) {
        let proxy = proxy.trim();
        if proxy.is_empty() {
            self.data.proxy = None;
            self.config.set_proxy(None);
        } else {
            self.data.proxy = Some(proxy.to_string());
            self.config.set_proxy(Some(proxy));
        }
    }

    pub fn set_cloud_init_url(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            self.data.cloud_init_url = None;
            self.config.install.config_url = None;
        } else {
            self.data.cloud_init_url = Some(url.to_string());
            self.config.install.config_url = Some(url.to_string());
        }
    }

    /// Static mode has every static field; dhcp mode has none of them
    pub fn static_fields_consistent(&self) -> bool {
        let d = &self.data;
        let fields = [&d.address, &d.ip, &d.netmask, &d.gateway, &d.dns_servers];
        if self.network_mode().is_static() {
            fields.iter().all(|f| f.as_ref().is_some_and(|v| !v.is_empty()))
                && !self.config.dns_nameservers.is_empty()
        } else {
            fields.iter().all(|f| f.is_none())
                && self.config.dns_nameservers.is_empty()
                && self.config.runcmd.is_empty()
        }
    }

    /// Human readable summary shown before installing
    pub fn summary(&self) -> String {
        let d = &self.data;
        let mut lines = vec![format!("install mode: {}", self.install_mode())];
        if self.install_mode() == InstallMode::Join {
            if let Some(url) = &self.config.server_url {
                lines.push(format!("management address: {}", url));
            }
        }
        if let Some(proxy) = self.config.proxy() {
            lines.push(format!("proxy address: {}", proxy));
        }
        if let Some(url) = &d.ssh_key_url {
            lines.push(format!("ssh keys http url: {}", url));
        }
        lines.push(format!(
            "management interface: {}",
            d.interface.as_deref().unwrap_or_default()
        ));
        lines.push(format!("network mode: {}", self.network_mode()));
        lines.push(format!("hostname: {}", self.config.hostname));
        if self.network_mode().is_static() {
            lines.push(format!("ipv4 address: {}", d.address.as_deref().unwrap_or_default()));
            lines.push(format!("gateway: {}", d.gateway.as_deref().unwrap_or_default()));
            lines.push(format!("dns servers: {}", d.dns_servers.as_deref().unwrap_or_default()));
        }
        lines.push(format!("install device: {}", self.config.install.device));
        if let Some(url) = &self.config.install.config_url {
            lines.push(format!("cloud-init url: {}", url));
        }
        lines.join("\n")
    }

    pub fn zero_sensitive_data(&mut self) {
        self.data.zero_sensitive_data();
    }
}

/// `harvester-` followed by a short random suffix
pub fn random_hostname() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..HOSTNAME_SUFFIX_LEN)
        .map(|_| HOSTNAME_ALPHABET[rng.gen_range(0..HOSTNAME_ALPHABET.len())] as char)
        .collect();
    format!("harvester-{}", suffix)
}

/// Single-owner context threaded through every handler
pub struct Session {
    pub wizard: WizardState,
    pub probes: Probes,
    pub settings: ConsoleSettings,
    pub keys: KeybindingContext,
    /// Sender half of the render loop's update channel
    pub updates: Sender<UiEvent>,
}

impl Session {
    pub fn new(probes: Probes, settings: ConsoleSettings, updates: Sender<UiEvent>) -> Self {
        Self {
            wizard: WizardState::default(),
            probes,
            settings,
            keys: KeybindingContext::new(),
            updates,
        }
    }
}
