//! Shared fixtures for the integration tests
//!
//! Scripted probes whose answers each test can choose, plus helpers that
//! drive a console the way key presses would.

#![allow(dead_code)]

use harvester_console::app::Console;
use harvester_console::components::KeyAction;
use harvester_console::error::ProbeError;
use harvester_console::probes::{
    ClusterProbe, NetworkInterface, PasswordHasher, Probes, RemoteProbe, SystemProbe,
};
use harvester_console::settings::ConsoleSettings;
use harvester_console::types::SelectOption;
use harvester_console::ScreenId;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct ScriptedSystem {
    pub disks: Vec<SelectOption>,
    /// How many times the disk list was requested
    pub disk_listings: Arc<AtomicUsize>,
}

impl Default for ScriptedSystem {
    fn default() -> Self {
        Self {
            disks: vec![
                SelectOption::new("/dev/sda", "sda 100G"),
                SelectOption::new("/dev/nvme0n1", "nvme0n1 1T"),
            ],
            disk_listings: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SystemProbe for ScriptedSystem {
    fn list_disks(&self) -> Result<Vec<SelectOption>, ProbeError> {
        self.disk_listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.disks.clone())
    }

    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, ProbeError> {
        Ok(vec![
            NetworkInterface {
                name: "eth0".to_string(),
                addresses: vec!["192.168.1.50/24".to_string()],
            },
            NetworkInterface {
                name: "eth1".to_string(),
                addresses: Vec::new(),
            },
        ])
    }

    fn default_gateway(&self, interface: &str) -> Result<Option<Ipv4Addr>, ProbeError> {
        match interface {
            "eth0" => Ok(Some(Ipv4Addr::new(192, 168, 1, 1))),
            _ => Ok(None),
        }
    }

    fn interface_address(&self, interface: &str) -> Result<Option<Ipv4Addr>, ProbeError> {
        match interface {
            "eth0" => Ok(Some(Ipv4Addr::new(192, 168, 1, 50))),
            _ => Ok(None),
        }
    }

    fn management_interface(&self) -> Result<Option<String>, ProbeError> {
        Ok(Some("eth0".to_string()))
    }

    fn hostname(&self) -> Result<String, ProbeError> {
        Ok("node1".to_string())
    }
}

/// Cluster answers, adjustable while a poller reads them
#[derive(Default)]
pub struct ScriptedCluster {
    pub state: Mutex<ClusterState>,
}

#[derive(Clone)]
pub struct ClusterState {
    pub job_succeeded: Result<bool, ProbeError>,
    pub node_registered: Result<bool, ProbeError>,
    pub phases: Result<Vec<String>, ProbeError>,
    pub master_ip: Option<String>,
}

impl Default for ClusterState {
    fn default() -> Self {
        Self {
            job_succeeded: Ok(true),
            node_registered: Ok(true),
            phases: Ok(vec!["Running".to_string()]),
            master_ip: Some("10.0.0.1".to_string()),
        }
    }
}

impl ScriptedCluster {
    pub fn with(state: ClusterState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn snapshot(&self) -> ClusterState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ClusterProbe for ScriptedCluster {
    fn node_names(&self) -> Result<Vec<String>, ProbeError> {
        Ok(vec!["node1".to_string()])
    }

    fn install_job_succeeded(&self) -> Result<bool, ProbeError> {
        self.snapshot().job_succeeded
    }

    fn node_registered(&self, _hostname: &str) -> Result<bool, ProbeError> {
        self.snapshot().node_registered
    }

    fn pod_phases(&self) -> Result<Vec<String>, ProbeError> {
        self.snapshot().phases
    }

    fn first_ready_master_ip(&self) -> Result<Option<String>, ProbeError> {
        Ok(self.snapshot().master_ip)
    }
}

pub struct ScriptedRemote {
    pub ping: Result<(), ProbeError>,
    pub keys: Result<Vec<String>, ProbeError>,
    pub delay: Duration,
}

impl Default for ScriptedRemote {
    fn default() -> Self {
        Self {
            ping: Ok(()),
            keys: Ok(vec!["ssh-ed25519 AAAAC3Nza admin@example".to_string()]),
            delay: Duration::ZERO,
        }
    }
}

/// Hosts containing `unreachable` never answer a ping and URLs containing
/// `missing` have no keys, whatever the scripted answers say.
impl RemoteProbe for ScriptedRemote {
    fn ping(&self, url: &str) -> Result<(), ProbeError> {
        thread::sleep(self.delay);
        if url.contains("unreachable") {
            return Err(ProbeError::Http("connection refused".to_string()));
        }
        self.ping.clone()
    }

    fn fetch_ssh_keys(&self, url: &str) -> Result<Vec<String>, ProbeError> {
        thread::sleep(self.delay);
        if url.contains("missing") {
            return Err(ProbeError::Http("404 Not Found".to_string()));
        }
        self.keys.clone()
    }
}

/// Deterministic stand-in for crypt(3)
pub struct ScriptedHasher;

impl PasswordHasher for ScriptedHasher {
    fn hash(&self, password: &str) -> Result<String, ProbeError> {
        Ok(format!("$6$salt${}", password.chars().rev().collect::<String>()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, ProbeError> {
        Ok(self.hash(password)? == hash)
    }
}

pub fn probes_with(remote: ScriptedRemote, cluster: ScriptedCluster) -> Probes {
    Probes {
        system: Arc::new(ScriptedSystem::default()),
        cluster: Arc::new(cluster),
        remote: Arc::new(remote),
        hasher: Arc::new(ScriptedHasher),
    }
}

pub fn probes() -> Probes {
    probes_with(ScriptedRemote::default(), ScriptedCluster::default())
}

/// Dry-run settings writing the target configuration into `dir`
pub fn settings_in(dir: &Path) -> ConsoleSettings {
    ConsoleSettings {
        dry_run: true,
        install_config_path: dir.join("install.json"),
        reboot_delay_secs: 0,
        poll_interval_secs: 1,
        k3s_env_file: dir.join("k3s-service.env"),
        shadow_file: dir.join("shadow"),
        ..Default::default()
    }
}

pub fn install_console(probes: Probes, dir: &Path) -> Console {
    Console::install(probes, settings_in(dir)).expect("install console")
}

pub fn press(console: &mut Console, action: KeyAction) {
    console.handle_action(action).expect("key handled");
}

/// Replace the focused input's text the way typing would
pub fn type_text(console: &mut Console, text: &str) {
    let id = console.focused().expect("a focused screen");
    console
        .registry_mut()
        .get_mut(id)
        .expect("focused view")
        .set_value("");
    for c in text.chars() {
        press(console, KeyAction::Input(c));
    }
}

pub fn value(console: &Console, id: ScreenId) -> String {
    console
        .registry()
        .get(id)
        .expect("registered view")
        .data()
        .unwrap_or_default()
}

pub fn text(console: &Console, id: ScreenId) -> String {
    console.registry().get(id).expect("registered view").text.clone()
}

/// Apply updates until no background task is left
pub fn finish_tasks(console: &mut Console) {
    while console.pending_tasks() > 0 {
        assert!(
            console.wait_for_update(Duration::from_secs(5)),
            "background task did not report back"
        );
    }
}

/// Create mode, first disk, token and password confirmed, no SSH keys:
/// ends focused on the interface list.
pub fn walk_to_network(console: &mut Console) {
    press(console, KeyAction::Confirm); // create
    press(console, KeyAction::Confirm); // first disk
    type_text(console, "secret-token");
    press(console, KeyAction::Confirm);
    type_text(console, "p4ssw0rd");
    press(console, KeyAction::Confirm);
    type_text(console, "p4ssw0rd");
    press(console, KeyAction::Confirm);
    press(console, KeyAction::Confirm); // empty SSH key URL
    assert_eq!(console.focused(), Some(ScreenId::Network));
}
