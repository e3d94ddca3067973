//! Local machine probes: disks, interfaces, routes, hostname.
//!
//! Interface and route data come straight from the kernel (`getifaddrs`,
//! `/proc/net/route`); only disk listing shells out to `lsblk`.

use super::{NetworkInterface, SystemProbe, run_command};
use crate::error::ProbeError;
use crate::types::SelectOption;
use nix::ifaddrs::getifaddrs;
use nix::net::if_::InterfaceFlags;
use std::fs;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::PathBuf;

const PROC_NET_ROUTE: &str = "/proc/net/route";

/// Probes backed by the running host
#[derive(Debug, Clone)]
pub struct HostSystem {
    system_config_file: PathBuf,
}

impl HostSystem {
    pub fn new(system_config_file: impl Into<PathBuf>) -> Self {
        Self {
            system_config_file: system_config_file.into(),
        }
    }
}

impl SystemProbe for HostSystem {
    fn list_disks(&self) -> Result<Vec<SelectOption>, ProbeError> {
        let output = run_command("lsblk", &["-r", "-n", "-o", "NAME,SIZE,TYPE"], &[])?;
        Ok(parse_lsblk_disks(&output))
    }

    fn list_interfaces(&self) -> Result<Vec<NetworkInterface>, ProbeError> {
        let addrs = getifaddrs().map_err(|e| ProbeError::other(format!("getifaddrs: {}", e)))?;
        let mut interfaces: Vec<NetworkInterface> = Vec::new();

        for ifaddr in addrs {
            if ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK) {
                continue;
            }
            let index = match interfaces
                .iter()
                .position(|i| i.name == ifaddr.interface_name)
            {
                Some(index) => index,
                None => {
                    interfaces.push(NetworkInterface {
                        name: ifaddr.interface_name.clone(),
                        addresses: Vec::new(),
                    });
                    interfaces.len() - 1
                }
            };

            let ip = ifaddr
                .address
                .as_ref()
                .and_then(|a| a.as_sockaddr_in())
                .map(|sin| *SocketAddrV4::from(*sin).ip());
            let mask = ifaddr
                .netmask
                .as_ref()
                .and_then(|a| a.as_sockaddr_in())
                .map(|sin| *SocketAddrV4::from(*sin).ip());
            if let (Some(ip), Some(mask)) = (ip, mask) {
                let prefix = u32::from(mask).count_ones();
                interfaces[index]
                    .addresses
                    .push(format!("{}/{}", ip, prefix));
            }
        }

        Ok(interfaces)
    }

    fn default_gateway(&self, interface: &str) -> Result<Option<Ipv4Addr>, ProbeError> {
        let table = fs::read_to_string(PROC_NET_ROUTE)
            .map_err(|e| ProbeError::other(format!("{}: {}", PROC_NET_ROUTE, e)))?;
        parse_default_gateway(&table, interface)
    }

    fn interface_address(&self, interface: &str) -> Result<Option<Ipv4Addr>, ProbeError> {
        let interfaces = self.list_interfaces()?;
        Ok(interfaces
            .iter()
            .find(|i| i.name == interface)
            .and_then(|i| i.addresses.first())
            .and_then(|cidr| cidr.split('/').next())
            .and_then(|ip| ip.parse().ok()))
    }

    fn management_interface(&self) -> Result<Option<String>, ProbeError> {
        let content = fs::read_to_string(&self.system_config_file).map_err(|e| {
            ProbeError::other(format!("{}: {}", self.system_config_file.display(), e))
        })?;
        Ok(parse_flannel_iface(&content))
    }

    fn hostname(&self) -> Result<String, ProbeError> {
        nix::unistd::gethostname()
            .map_err(|e| ProbeError::other(format!("failed to get hostname: {}", e)))
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Pick whole disks out of `lsblk -r -n -o NAME,SIZE,TYPE` output.
pub fn parse_lsblk_disks(output: &str) -> Vec<SelectOption> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, size, "disk"] => Some(SelectOption::new(
                    format!("/dev/{}", name),
                    format!("{} {}", name, size),
                )),
                _ => None,
            }
        })
        .collect()
}

/// Find the default route's gateway for `interface` in `/proc/net/route`.
///
/// Addresses in that table are little-endian hex.
pub fn parse_default_gateway(table: &str, interface: &str) -> Result<Option<Ipv4Addr>, ProbeError> {
    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 || fields[0] != interface || fields[1] != "00000000" {
            continue;
        }
        let raw = u32::from_str_radix(fields[2], 16)
            .map_err(|e| ProbeError::parse(PROC_NET_ROUTE, e.to_string()))?;
        if raw == 0 {
            continue;
        }
        return Ok(Some(Ipv4Addr::from(raw.swap_bytes())));
    }
    Ok(None)
}

/// Find the value following `--flannel-iface` in the installed config.
pub fn parse_flannel_iface(content: &str) -> Option<String> {
    let mut items = content
        .lines()
        .map(|line| line.trim().trim_start_matches("- ").trim_matches('"').trim());

    while let Some(item) = items.next() {
        if let Some(value) = item.strip_prefix("--flannel-iface=") {
            return Some(value.to_string());
        }
        if item == "--flannel-iface" {
            return items.next().filter(|v| !v.is_empty()).map(str::to_string);
        }
    }
    None
}
