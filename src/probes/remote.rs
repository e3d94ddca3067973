//! Network probes: management address reachability and SSH key import.

use super::RemoteProbe;
use crate::error::ProbeError;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "harvester-console";

/// Key type prefixes accepted in an authorized_keys listing
const KEY_PREFIXES: [&str; 4] = ["ssh-", "ecdsa-", "sk-", "rsa-"];

/// Blocking HTTP probes
#[derive(Debug, Default, Clone)]
pub struct HttpRemote;

impl HttpRemote {
    pub fn new() -> Self {
        Self
    }

    /// The management endpoint normally serves a self-signed certificate
    fn insecure_client(&self) -> Result<Client, ProbeError> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| ProbeError::Http(e.to_string()))
    }

    fn client(&self) -> Result<Client, ProbeError> {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProbeError::Http(e.to_string()))
    }
}

fn parse_url(raw: &str) -> Result<url::Url, ProbeError> {
    let parsed = url::Url::parse(raw).map_err(|e| ProbeError::Http(format!("{}: {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ProbeError::Http(format!(
            "{}: unsupported scheme {:?}",
            raw, other
        ))),
    }
}

impl RemoteProbe for HttpRemote {
    fn ping(&self, url: &str) -> Result<(), ProbeError> {
        let url = parse_url(url)?;
        debug!("Pinging {}", url);
        let response = self
            .insecure_client()?
            .get(url.clone())
            .send()
            .map_err(|e| ProbeError::Http(e.to_string()))?;
        if response.status().is_success() {
            info!("{} is reachable", url);
            Ok(())
        } else {
            Err(ProbeError::Http(format!(
                "{} returned {}",
                url,
                response.status()
            )))
        }
    }

    fn fetch_ssh_keys(&self, url: &str) -> Result<Vec<String>, ProbeError> {
        let parsed = parse_url(url)?;
        let response = self
            .client()?
            .get(parsed)
            .send()
            .map_err(|e| ProbeError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ProbeError::Http(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        let body = response
            .text()
            .map_err(|e| ProbeError::Http(e.to_string()))?;
        parse_authorized_keys(url, &body)
    }
}

/// Split an authorized_keys style body into individual keys.
///
/// Lines that do not start with a known key type are skipped, so an error
/// page served with a success status yields no keys rather than garbage.
pub fn parse_authorized_keys(url: &str, body: &str) -> Result<Vec<String>, ProbeError> {
    let mut keys = Vec::new();
    for line in body.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !KEY_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            warn!("Skipping line from {} that is not a public key: {:.32}", url, line);
            continue;
        }
        keys.push(line.to_string());
    }
    if keys.is_empty() {
        return Err(ProbeError::other(format!("no SSH public keys found at {}", url)));
    }
    Ok(keys)
}
