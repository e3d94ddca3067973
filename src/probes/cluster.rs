//! Cluster probes backed by `kubectl`.

use super::{ClusterProbe, run_command};
use crate::error::ProbeError;
use serde_json::Value;
use std::path::PathBuf;

const KUBECTL: &str = "kubectl";
const INSTALL_JOB_NAMESPACE: &str = "kube-system";
const INSTALL_JOB: &str = "helm-install-harvester";
const POD_NAMESPACE: &str = "harvester-system";
const POD_SELECTOR: &str = "app.kubernetes.io/name=harvester";
const MASTER_SELECTOR: &str = "node-role.kubernetes.io/master=true";

/// `kubectl` wrapper; joining nodes talk through the agent kubeconfig
#[derive(Debug, Clone, Default)]
pub struct Kubectl {
    kubeconfig: Option<PathBuf>,
}

impl Kubectl {
    pub fn new(kubeconfig: Option<PathBuf>) -> Self {
        Self { kubeconfig }
    }

    fn run(&self, args: &[&str]) -> Result<String, ProbeError> {
        match &self.kubeconfig {
            Some(path) => {
                let path = path.to_string_lossy();
                run_command(KUBECTL, args, &[("KUBECONFIG", path.as_ref())])
            }
            None => run_command(KUBECTL, args, &[]),
        }
    }
}

impl ClusterProbe for Kubectl {
    fn node_names(&self) -> Result<Vec<String>, ProbeError> {
        let output = self.run(&["get", "no", "-o", "jsonpath={.items[*].metadata.name}"])?;
        Ok(output.split_whitespace().map(str::to_string).collect())
    }

    fn install_job_succeeded(&self) -> Result<bool, ProbeError> {
        let output = self.run(&[
            "-n",
            INSTALL_JOB_NAMESPACE,
            "get",
            "job",
            INSTALL_JOB,
            "-o",
            "jsonpath={.status.succeeded}",
        ])?;
        parse_succeeded_count(&output)
    }

    fn node_registered(&self, hostname: &str) -> Result<bool, ProbeError> {
        match self.run(&["get", "no", hostname]) {
            Ok(_) => Ok(true),
            Err(ProbeError::Command { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn pod_phases(&self) -> Result<Vec<String>, ProbeError> {
        let output = self.run(&[
            "get",
            "po",
            "-n",
            POD_NAMESPACE,
            "-l",
            POD_SELECTOR,
            "-o",
            "jsonpath={.items[*].status.phase}",
        ])?;
        let mut phases: Vec<String> = output.split_whitespace().map(str::to_string).collect();
        phases.sort();
        phases.dedup();
        Ok(phases)
    }

    fn first_ready_master_ip(&self) -> Result<Option<String>, ProbeError> {
        let output = self.run(&[
            "get",
            "no",
            "-l",
            MASTER_SELECTOR,
            "--sort-by=.metadata.creationTimestamp",
            "-o",
            "json",
        ])?;
        parse_first_ready_ip(&output)
    }
}

/// Interpret the job's `.status.succeeded`; empty means not yet.
pub fn parse_succeeded_count(output: &str) -> Result<bool, ProbeError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }
    trimmed
        .parse::<u32>()
        .map(|succeeded| succeeded >= 1)
        .map_err(|e| ProbeError::parse(INSTALL_JOB, format!("{}: {:?}", e, trimmed)))
}

/// Internal IP of the first node in the list whose Ready condition is True.
pub fn parse_first_ready_ip(json: &str) -> Result<Option<String>, ProbeError> {
    let doc: Value =
        serde_json::from_str(json).map_err(|e| ProbeError::parse("node list", e.to_string()))?;
    let items = doc["items"].as_array().cloned().unwrap_or_default();

    for node in &items {
        let ready = node["status"]["conditions"]
            .as_array()
            .is_some_and(|conditions| {
                conditions
                    .iter()
                    .any(|c| c["type"] == "Ready" && c["status"] == "True")
            });
        if !ready {
            continue;
        }
        let ip = node["status"]["addresses"].as_array().and_then(|addresses| {
            addresses
                .iter()
                .find(|a| a["type"] == "InternalIP")
                .and_then(|a| a["address"].as_str())
                .map(str::to_string)
        });
        if ip.is_some() {
            return Ok(ip);
        }
    }
    Ok(None)
}
