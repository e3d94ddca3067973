//! Scripted probes for unit tests

use crate::app::{Session, UiEvent};
use crate::error::ProbeError;
use crate::probes::{
    ClusterProbe, NetworkInterface, PasswordHasher, Probes, RemoteProbe, SystemProbe,
};
use crate::settings::ConsoleSettings;
use crate::types::SelectOption;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

pub struct FakeSystem;

impl SystemProbe for FakeSystem {
    fn list_disks(&self) -> Result<Vec<SelectOption>, ProbeError> {
        Ok(vec![
            SelectOption::new("/dev/sda", "sda 100G"),
            SelectOption::new("/dev/sdb", "sdb 500G"),
        ])
    }

    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, ProbeError> {
        Ok(vec![NetworkInterface {
            name: "eth0".to_string(),
            addresses: vec!["192.168.1.50/24".to_string()],
        }])
    }

    fn default_gateway(&self, _interface: &str) -> Result<Option<Ipv4Addr>, ProbeError> {
        Ok(Some(Ipv4Addr::new(192, 168, 1, 1)))
    }

    fn interface_address(&self, _interface: &str) -> Result<Option<Ipv4Addr>, ProbeError> {
        Ok(Some(Ipv4Addr::new(192, 168, 1, 50)))
    }

    fn management_interface(&self) -> Result<Option<String>, ProbeError> {
        Ok(Some("eth0".to_string()))
    }

    fn hostname(&self) -> Result<String, ProbeError> {
        Ok("harvester-test".to_string())
    }
}

pub struct FakeCluster;

impl ClusterProbe for FakeCluster {
    fn node_names(&self) -> Result<Vec<String>, ProbeError> {
        Ok(vec!["harvester-test".to_string()])
    }

    fn install_job_succeeded(&self) -> Result<bool, ProbeError> {
        Ok(true)
    }

    fn node_registered(&self, _hostname: &str) -> Result<bool, ProbeError> {
        Ok(true)
    }

    fn pod_phases(&self) -> Result<Vec<String>, ProbeError> {
        Ok(vec!["Running".to_string()])
    }

    fn first_ready_master_ip(&self) -> Result<Option<String>, ProbeError> {
        Ok(Some("10.0.0.1".to_string()))
    }
}

pub struct FakeRemote;

impl RemoteProbe for FakeRemote {
    fn ping(&self, _url: &str) -> Result<(), ProbeError> {
        Ok(())
    }

    fn fetch_ssh_keys(&self, _url: &str) -> Result<Vec<String>, ProbeError> {
        Ok(vec!["ssh-ed25519 AAAAC3Nza test@example".to_string()])
    }
}

/// Prefixes instead of hashing, so tests can tell raw from hashed
pub struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash(&self, password: &str) -> Result<String, ProbeError> {
        Ok(format!("$6$test${}", password.len()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, ProbeError> {
        Ok(self.hash(password)? == hash)
    }
}

pub fn fake_probes() -> Probes {
    Probes {
        system: Arc::new(FakeSystem),
        cluster: Arc::new(FakeCluster),
        remote: Arc::new(FakeRemote),
        hasher: Arc::new(FakeHasher),
    }
}

/// Dry-run settings writing into the temp directory
pub fn test_settings() -> ConsoleSettings {
    ConsoleSettings {
        dry_run: true,
        install_config_path: std::env::temp_dir().join("harvester-console-unit.json"),
        reboot_delay_secs: 0,
        ..Default::default()
    }
}

pub fn test_session() -> (Session, Receiver<UiEvent>) {
    let (tx, rx) = mpsc::channel();
    (Session::new(fake_probes(), test_settings(), tx), rx)
}
