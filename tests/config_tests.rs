//! Tests for the target configuration and console settings files
//!
//! These tests verify:
//! - A configuration built by the wizard survives a save/load cycle
//! - Saved configurations are checked with the wizard's rules
//! - Settings files override only the fields they name

use harvester_console::app::WizardState;
use harvester_console::config::InstallConfig;
use harvester_console::settings::ConsoleSettings;
use harvester_console::types::{InstallMode, NetworkMode};
use harvester_console::validation::parse_cidr;
use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tempfile::tempdir;

fn joined_static_config() -> InstallConfig {
    let mut wizard = WizardState::new("harvester-abcde");
    wizard.set_install_mode(InstallMode::Join);
    wizard.set_device("/dev/sda");
    wizard.set_server_url("10.0.0.1", "https://10.0.0.1:6443");
    wizard.set_token("cluster-token");
    wizard.set_password("secret", "$6$salt$hash");
    wizard.set_ssh_keys("https://github.com/admin.keys", vec!["ssh-rsa AAAA admin".to_string()]);
    wizard.select_interface("eth0", Some("10.0.0.5/24"));
    wizard.set_network_mode(NetworkMode::Static);
    wizard.set_hostname("node2");
    wizard.set_static_address("10.0.0.5/24", &parse_cidr("10.0.0.5/24").unwrap());
    wizard.set_gateway(Ipv4Addr::new(10, 0, 0, 1));
    wizard.set_dns_servers("1.1.1.1", vec!["1.1.1.1".to_string()]);
    wizard.set_proxy("http://proxy:3128");
    wizard.set_cloud_init_url("https://example.com/cloud-init.yaml");
    wizard.config.clone()
}

// =============================================================================
// Target configuration
// =============================================================================

#[test]
fn test_wizard_configuration_survives_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("install.json");
    let config = joined_static_config();

    config.save_to_file(&path).unwrap();
    let loaded = InstallConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded, config);
    loaded.validate().unwrap();
    assert_eq!(
        loaded.runcmd,
        vec!["/sbin/configure-network-manual eth0 10.0.0.5 255.255.255.0 10.0.0.1 1.1.1.1"]
    );
    assert_eq!(loaded.proxy(), Some("http://proxy:3128"));
}

#[test]
fn test_saved_json_never_holds_clear_text_password() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("install.json");
    joined_static_config().save_to_file(&path).unwrap();

    let json = fs::read_to_string(&path).unwrap();
    assert!(json.contains("$6$salt$hash"));
    assert!(!json.contains("\"secret\""));
    assert!(json.contains("\"install_mode\": \"join\""));
}

#[test]
fn test_validate_rejects_incomplete_configurations() {
    let mut config = joined_static_config();
    config.server_url = None;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("management address"));

    let mut config = joined_static_config();
    config.hostname = "bad_host!".to_string();
    assert!(config.validate().is_err());

    let mut config = joined_static_config();
    config.dns_nameservers = vec!["1.1.1".to_string()];
    assert!(config.validate().is_err());

    assert!(InstallConfig::default().validate().is_err());
}

#[test]
fn test_load_reports_malformed_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = InstallConfig::load_from_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse install configuration JSON"));
}

// =============================================================================
// Console settings
// =============================================================================

#[test]
fn test_settings_file_overrides_named_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "node_port": 8443, "dry_run": true }"#).unwrap();

    let settings = ConsoleSettings::load(Some(&path)).unwrap();
    assert_eq!(settings.node_port, 8443);
    assert!(settings.dry_run);
    assert_eq!(settings.admin_user, "rancher");
    assert_eq!(settings.shadow_file, PathBuf::from("/etc/shadow"));
}

#[test]
fn test_settings_without_file_are_defaults() {
    assert_eq!(ConsoleSettings::load(None).unwrap(), ConsoleSettings::default());
}

#[test]
fn test_settings_reject_zero_interval() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, r#"{ "poll_interval_secs": 0 }"#).unwrap();
    assert!(ConsoleSettings::load(Some(&path)).is_err());
}
