//! Input validators
//!
//! Pure functions used by the wizard's confirm handlers. None of them fail
//! with an error type: a rejected value comes back as `Err(String)` holding the
//! message the calling screen shows in its validator area.

use ipnet::Ipv4Net;
use regex::Regex;
use std::net::Ipv4Addr;
use std::sync::OnceLock;
use url::Url;

/// Maximum length of the name part of a qualified name
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
/// Maximum length of a DNS-1123 subdomain used as a name prefix
const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;

fn qualified_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("static regex is valid")
    })
}

fn dns1123_subdomain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
            .expect("static regex is valid")
    })
}

fn is_qualified_name(value: &str) -> bool {
    let parts: Vec<&str> = value.split('/').collect();
    let name = match parts.as_slice() {
        [name] => *name,
        [prefix, name] => {
            if prefix.is_empty()
                || prefix.len() > DNS1123_SUBDOMAIN_MAX_LENGTH
                || !dns1123_subdomain_regex().is_match(prefix)
            {
                return false;
            }
            *name
        }
        _ => return false,
    };

    !name.is_empty()
        && name.len() <= QUALIFIED_NAME_MAX_LENGTH
        && qualified_name_regex().is_match(name)
}

/// Validate a hostname with the qualified-name rules.
pub fn validate_hostname(hostname: &str) -> Result<String, String> {
    if is_qualified_name(hostname) {
        Ok(hostname.to_string())
    } else {
        Err(format!("{} is not a valid hostname", hostname))
    }
}

/// Result of parsing the static address input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidrAddress {
    /// Host address as typed, without the prefix length
    pub ip: Ipv4Addr,
    /// Netmask derived from the prefix length
    pub netmask: Ipv4Addr,
    /// Prefix length
    pub prefix_len: u8,
}

impl CidrAddress {
    /// Dotted-quad netmask, e.g. `255.255.255.0`
    pub fn netmask_string(&self) -> String {
        self.netmask.to_string()
    }
}

/// Parse `address/prefix` into the host address and its netmask.
pub fn parse_cidr(input: &str) -> Result<CidrAddress, String> {
    let net: Ipv4Net = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid CIDR address: {}", input))?;
    Ok(CidrAddress {
        ip: net.addr(),
        netmask: net.netmask(),
        prefix_len: net.prefix_len(),
    })
}

/// Check a gateway or DNS server literal.
pub fn validate_ip(input: &str) -> Result<Ipv4Addr, String> {
    input
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| format!("{} is not a valid IP address", input))
}

/// Check a comma separated DNS server list, returning the trimmed entries.
pub fn validate_dns_servers(input: &str) -> Result<Vec<String>, String> {
    input
        .split(',')
        .map(|server| validate_ip(server).map(|ip| ip.to_string()))
        .collect()
}

/// Check the password and its confirmation.
///
/// A mismatch is reported before emptiness, so two different empty-looking
/// inputs never read as "required".
pub fn validate_password_pair(password: &str, confirm: &str) -> Result<(), String> {
    if password != confirm {
        return Err("Password mismatching".to_string());
    }
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(())
}

/// Check that a mandatory text field is filled in.
pub fn require(value: &str, field: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(value.to_string())
    }
}

/// Port the join process uses when the address does not name one
pub const DEFAULT_SERVER_PORT: u16 = 6443;

/// Normalize the management address typed by the user into the server URL
/// the join process talks to: scheme `https`, port 6443 unless given.
///
/// Text that does not parse as a URL is returned with the scheme added; the
/// reachability check then reports it.
pub fn format_server_url(input: &str) -> String {
    let trimmed = input.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let Ok(mut url) = Url::parse(&with_scheme) else {
        return with_scheme.trim_end_matches('/').to_string();
    };
    if url.port().is_none() {
        // `Url` drops a port equal to the scheme default, so keep the text
        // as typed when the user spelled that port out.
        let spelled_default = match (url.host_str(), url.port_or_known_default()) {
            (Some(host), Some(port)) => with_scheme
                .to_ascii_lowercase()
                .contains(&format!("{}:{}", host, port)),
            _ => false,
        };
        if spelled_default {
            return with_scheme.trim_end_matches('/').to_string();
        }
        if url.set_port(Some(DEFAULT_SERVER_PORT)).is_err() {
            return with_scheme.trim_end_matches('/').to_string();
        }
    }
    url.as_str().trim_end_matches('/').to_string()
}
