//! Blocking probes of the host, the cluster and remote endpoints.
//!
//! Every probe is a plain blocking call. The wizard calls the cheap ones
//! (disk and interface listing) directly from a `pre_show` hook; anything
//! that may wait on the network goes through the background task runner or
//! the status poller so the render loop never blocks on it.
//!
//! The traits exist so tests can swap in scripted fakes; the `Host*`
//! implementations shell out or use the network.

pub mod cluster;
pub mod password;
pub mod remote;
pub mod system;

use crate::error::ProbeError;
use crate::types::SelectOption;
use std::net::Ipv4Addr;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::debug;

pub use cluster::Kubectl;
pub use password::{OpensslHasher, shadow_hash};
pub use remote::HttpRemote;
pub use system::HostSystem;

/// A non-loopback network interface and its IPv4 addresses in CIDR form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub addresses: Vec<String>,
}

impl NetworkInterface {
    /// Option shown in the interface list
    pub fn option(&self) -> SelectOption {
        if self.addresses.is_empty() {
            SelectOption::new(&self.name, &self.name)
        } else {
            SelectOption::new(
                &self.name,
                format!("{} ({})", self.name, self.addresses.join(",")),
            )
        }
    }
}

/// Facts about the local machine
pub trait SystemProbe: Send + Sync {
    /// Whole disks suitable as install targets
    fn list_disks(&self) -> Result<Vec<SelectOption>, ProbeError>;
    /// Non-loopback interfaces with their IPv4 addresses
    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, ProbeError>;
    /// IPv4 default gateway routed through `interface`
    fn default_gateway(&self, interface: &str) -> Result<Option<Ipv4Addr>, ProbeError>;
    /// First IPv4 address bound to `interface`
    fn interface_address(&self, interface: &str) -> Result<Option<Ipv4Addr>, ProbeError>;
    /// Interface the installed system uses for the management network
    fn management_interface(&self) -> Result<Option<String>, ProbeError>;
    fn hostname(&self) -> Result<String, ProbeError>;
}

/// Queries against the node-management layer
pub trait ClusterProbe: Send + Sync {
    /// Names of all registered nodes
    fn node_names(&self) -> Result<Vec<String>, ProbeError>;
    /// Whether the chart install job has at least one successful completion
    fn install_job_succeeded(&self) -> Result<bool, ProbeError>;
    /// Whether `hostname` is registered as a node
    fn node_registered(&self, hostname: &str) -> Result<bool, ProbeError>;
    /// Distinct phases of the install-owning pods
    fn pod_phases(&self) -> Result<Vec<String>, ProbeError>;
    /// Internal IP of the oldest ready master node
    fn first_ready_master_ip(&self) -> Result<Option<String>, ProbeError>;
}

/// Probes that reach over the network
pub trait RemoteProbe: Send + Sync {
    /// Succeeds when `url` answers with a success status
    fn ping(&self, url: &str) -> Result<(), ProbeError>;
    /// Public keys listed one per line at `url`
    fn fetch_ssh_keys(&self, url: &str) -> Result<Vec<String>, ProbeError>;
}

/// crypt(3) style password hashing
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, ProbeError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, ProbeError>;
}

/// The probe set shared by the wizard, the task runner and the poller
#[derive(Clone)]
pub struct Probes {
    pub system: Arc<dyn SystemProbe>,
    pub cluster: Arc<dyn ClusterProbe>,
    pub remote: Arc<dyn RemoteProbe>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl Probes {
    /// Probes backed by the real host
    pub fn host(
        system_config_file: impl Into<std::path::PathBuf>,
        kubeconfig: Option<std::path::PathBuf>,
    ) -> Self {
        Self {
            system: Arc::new(HostSystem::new(system_config_file)),
            cluster: Arc::new(Kubectl::new(kubeconfig)),
            remote: Arc::new(HttpRemote::new()),
            hasher: Arc::new(OpensslHasher),
        }
    }
}

/// Run a command to completion and return its stdout.
///
/// A non-zero exit becomes `ProbeError::Command` carrying stderr (or stdout
/// when stderr is empty), which is what ends up on screen.
pub(crate) fn run_command(
    program: &str,
    args: &[&str],
    envs: &[(&str, &str)],
) -> Result<String, ProbeError> {
    let command_line = format!("{} {}", program, args.join(" "));
    debug!("Running probe command: {}", command_line);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let output = cmd.output().map_err(|e| ProbeError::Spawn {
        command: program.to_string(),
        reason: e.to_string(),
    })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(ProbeError::Command {
            command: command_line,
            output: detail,
        })
    }
}
