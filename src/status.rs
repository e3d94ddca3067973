//! Dashboard status poller
//!
//! Two tickers feed the dashboard: one reduces the cluster probes to a
//! `StatusSnapshot`, the other resolves the management URL. Each runs on
//! its own thread, ticks once immediately and then on a fixed interval, and
//! only ever sends rendered text to the render loop. Cancelling a ticker
//! stops future ticks; a probe already in flight finishes and its result
//! is dropped.

use crate::app::UiEvent;
use crate::error::{ConsoleError, Result};
use crate::probes::{ClusterProbe, Probes};
use crate::settings::ConsoleSettings;
use crate::theme::{AnsiColor, wrap_color};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const STATUS_RUNNING: &str = "Running";
pub const STATUS_UNKNOWN: &str = "Unknown";
pub const STATUS_SETTING_UP: &str = "Setting up Harvester";

/// Reduced install/cluster health
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSnapshot {
    SettingUp,
    Unknown,
    Running,
    /// Pods exist but are not all running; space separated phases
    Phase(String),
    Error(String),
}

impl StatusSnapshot {
    /// Status text with its ANSI colour
    pub fn render(&self) -> String {
        match self {
            Self::Running => wrap_color(STATUS_RUNNING, AnsiColor::Green),
            Self::Unknown => wrap_color(STATUS_UNKNOWN, AnsiColor::Yellow),
            Self::SettingUp => wrap_color(STATUS_SETTING_UP, AnsiColor::Yellow),
            Self::Phase(phases) => wrap_color(phases, AnsiColor::Yellow),
            Self::Error(msg) => wrap_color(msg, AnsiColor::Red),
        }
    }
}

/// Whether this node created the cluster or joined one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    FirstHost,
    Joining,
}

impl NodeRole {
    /// A non-empty `K3S_URL` in the k3s service env file marks a joining node.
    ///
    /// An unreadable file is treated as the first host.
    pub fn detect(env_file: &Path) -> Self {
        match fs::read_to_string(env_file) {
            Ok(content) => Self::from_env(&content),
            Err(e) => {
                warn!("Failed to read {:?}: {}", env_file, e);
                Self::FirstHost
            }
        }
    }

    pub fn from_env(content: &str) -> Self {
        let joining = content
            .lines()
            .filter_map(|line| line.trim().strip_prefix("K3S_URL="))
            .any(|value| !value.trim().trim_matches(|c| c == '"' || c == '\'').is_empty());
        if joining { Self::Joining } else { Self::FirstHost }
    }

    /// Kubeconfig for cluster probes; the first host uses kubectl's default
    pub fn kubeconfig(self, settings: &ConsoleSettings) -> Option<PathBuf> {
        match self {
            Self::FirstHost => None,
            Self::Joining => Some(settings.agent_kubeconfig.clone()),
        }
    }
}

/// Remembers whether the install was ever observed complete
#[derive(Debug, Clone)]
pub struct StatusTracker {
    installed: bool,
}

impl StatusTracker {
    /// Joining nodes never run the install check
    pub fn new(role: NodeRole) -> Self {
        Self {
            installed: role == NodeRole::Joining,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// One reduction over the cluster probes; first match wins
    pub fn evaluate(&mut self, cluster: &dyn ClusterProbe, hostname: &str) -> StatusSnapshot {
        if !self.installed {
            if !install_complete(cluster) {
                return StatusSnapshot::SettingUp;
            }
            info!("Harvester install observed complete");
            self.installed = true;
        }

        match cluster.node_registered(hostname) {
            Ok(true) => {}
            Ok(false) => return StatusSnapshot::Unknown,
            Err(e) => {
                debug!("Node registration check failed: {}", e);
                return StatusSnapshot::Unknown;
            }
        }

        match cluster.pod_phases() {
            Err(e) => StatusSnapshot::Error(e.to_string()),
            Ok(phases) if phases.is_empty() => StatusSnapshot::Unknown,
            Ok(phases) if phases.len() == 1 && phases[0] == STATUS_RUNNING => {
                StatusSnapshot::Running
            }
            Ok(phases) => StatusSnapshot::Phase(phases.join(" ")),
        }
    }
}

fn install_complete(cluster: &dyn ClusterProbe) -> bool {
    match cluster.node_names() {
        Ok(nodes) if !nodes.is_empty() => {}
        Ok(_) => return false,
        Err(e) => {
            debug!("Node listing failed: {}", e);
            return false;
        }
    }
    match cluster.install_job_succeeded() {
        Ok(done) => done,
        Err(e) => {
            debug!("Install job check failed: {}", e);
            false
        }
    }
}

/// `https://<ip>:<port>` of the first ready master, else of the local
/// management interface
pub fn management_url(probes: &Probes, port: u16) -> Option<String> {
    match probes.cluster.first_ready_master_ip() {
        Ok(Some(ip)) => return Some(format!("https://{}:{}", ip, port)),
        Ok(None) => debug!("No ready master node found"),
        Err(e) => debug!("Failed to get master node address: {}", e),
    }

    let interface = match probes.system.management_interface() {
        Ok(Some(interface)) => interface,
        Ok(None) => {
            warn!("Management interface not configured");
            return None;
        }
        Err(e) => {
            warn!("Failed to read management interface: {}", e);
            return None;
        }
    };
    match probes.system.interface_address(&interface) {
        Ok(Some(ip)) => Some(format!("https://{}:{}", ip, port)),
        Ok(None) => {
            warn!("No IPv4 address on {}", interface);
            None
        }
        Err(e) => {
            warn!("Failed to get address of {}: {}", interface, e);
            None
        }
    }
}

/// Stop switch of a running ticker; cancels when dropped
pub struct PollerHandle {
    name: String,
    stop: Option<Sender<()>>,
}

impl PollerHandle {
    pub fn cancel(&mut self) {
        if self.stop.take().is_some() {
            debug!("Cancelled poller {}", self.name);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.is_none()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Run `tick` now and then every `interval` on a named thread, sending
/// whatever it produces to the render loop.
pub fn spawn_ticker<F>(
    name: &str,
    interval: Duration,
    mut tick: F,
    updates: Sender<UiEvent>,
) -> Result<PollerHandle>
where
    F: FnMut() -> Option<UiEvent> + Send + 'static,
{
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    thread::Builder::new()
        .name(format!("poll-{}", name))
        .spawn(move || {
            loop {
                if let Some(event) = tick() {
                    // Cancelled while the probes ran
                    if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
                        break;
                    }
                    if updates.send(event).is_err() {
                        break;
                    }
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }
        })
        .map_err(|e| ConsoleError::general(format!("Failed to start poller: {}", e)))?;

    info!("Started poller {} every {:?}", name, interval);
    Ok(PollerHandle {
        name: name.to_string(),
        stop: Some(stop_tx),
    })
}

/// Poll the cluster and send the rendered status line
pub fn spawn_status_poller(
    probes: &Probes,
    settings: &ConsoleSettings,
    role: NodeRole,
    updates: Sender<UiEvent>,
) -> Result<PollerHandle> {
    let cluster = probes.cluster.clone();
    let system = probes.system.clone();
    let mut tracker = StatusTracker::new(role);
    let mut hostname: Option<String> = None;

    spawn_ticker(
        "status",
        settings.poll_interval(),
        move || {
            if hostname.is_none() {
                match system.hostname() {
                    Ok(name) => hostname = Some(name),
                    Err(e) => warn!("Failed to get hostname: {}", e),
                }
            }
            let snapshot = tracker.evaluate(cluster.as_ref(), hostname.as_deref().unwrap_or(""));
            Some(UiEvent::Status(snapshot.render()))
        },
        updates,
    )
}

/// Resolve the management URL and send it when found
pub fn spawn_url_poller(
    probes: &Probes,
    settings: &ConsoleSettings,
    updates: Sender<UiEvent>,
) -> Result<PollerHandle> {
    let probes = probes.clone();
    let port = settings.node_port;
    spawn_ticker(
        "url",
        settings.poll_interval(),
        move || management_url(&probes, port).map(UiEvent::ManagementUrl),
        updates,
    )
}

/// Single evaluation for `dashboard --once`
pub fn evaluate_once(probes: &Probes, role: NodeRole) -> StatusSnapshot {
    let hostname = probes.system.hostname().unwrap_or_else(|e| {
        warn!("Failed to get hostname: {}", e);
        String::new()
    });
    StatusTracker::new(role).evaluate(probes.cluster.as_ref(), &hostname)
}
