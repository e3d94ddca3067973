//! Tests for the install wizard flow
//!
//! These tests drive a console with key actions against scripted probes and
//! verify:
//! - Step order for create and join installs
//! - Field validation and the inline validator areas
//! - Focus movement inside multi-screen steps
//! - Background checks: success, failure and superseded results
//! - The final confirmation, both ways

mod common;

use common::*;
use harvester_console::components::KeyAction;
use harvester_console::config::InstallConfig;
use harvester_console::error::ProbeError;
use harvester_console::types::{InstallMode, NetworkMode};
use harvester_console::ui::view::SpinnerState;
use harvester_console::settings::ConsoleSettings;
use harvester_console::{Console, ScreenId};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::tempdir;

fn spinner(console: &harvester_console::Console) -> SpinnerState {
    console
        .registry()
        .get(ScreenId::Spinner)
        .unwrap()
        .spinner_state()
        .cloned()
        .unwrap_or_default()
}

// =============================================================================
// First steps
// =============================================================================

#[test]
fn test_back_on_first_step_stays() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::AskCreate));
}

#[test]
fn test_create_mode_goes_from_disk_to_token() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());

    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Disk));
    assert_eq!(value(&console, ScreenId::Disk), "/dev/sda");
    assert!(!console.registry().is_visible(ScreenId::AskCreate));

    press(&mut console, KeyAction::Next);
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Token));
    assert_eq!(console.wizard().config.install.device, "/dev/nvme0n1");
    assert_eq!(
        text(&console, ScreenId::Note),
        "Note: The token is used for adding other nodes to the cluster"
    );
}

#[test]
fn test_entering_a_step_lists_disks_once() {
    let dir = tempdir().unwrap();
    let system = ScriptedSystem::default();
    let listings = Arc::clone(&system.disk_listings);
    let mut scripted = probes();
    scripted.system = Arc::new(system);
    let mut console = install_console(scripted, dir.path());

    press(&mut console, KeyAction::Confirm); // create
    assert_eq!(console.focused(), Some(ScreenId::Disk));
    assert_eq!(listings.load(Ordering::SeqCst), 1);

    press(&mut console, KeyAction::Back);
    press(&mut console, KeyAction::Confirm);
    assert_eq!(listings.load(Ordering::SeqCst), 2);
}

#[test]
fn test_empty_token_is_reported_then_cleared() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    press(&mut console, KeyAction::Confirm);
    press(&mut console, KeyAction::Confirm);

    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Token));
    assert_eq!(text(&console, ScreenId::Validator), "Cluster token is required");
    assert!(console.registry().is_visible(ScreenId::Validator));

    type_text(&mut console, "abc");
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Password));
    assert_eq!(text(&console, ScreenId::Validator), "");
    assert_eq!(console.wizard().config.token, "abc");
}

#[test]
fn test_previous_values_are_offered_again() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    press(&mut console, KeyAction::Confirm);
    press(&mut console, KeyAction::Confirm);
    type_text(&mut console, "first-token");
    press(&mut console, KeyAction::Confirm);

    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::Token));
    assert_eq!(value(&console, ScreenId::Token), "first-token");
}

// =============================================================================
// Password pair
// =============================================================================

fn walk_to_password(console: &mut harvester_console::Console) {
    press(console, KeyAction::Confirm);
    press(console, KeyAction::Confirm);
    type_text(console, "token");
    press(console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Password));
}

#[test]
fn test_password_mismatch() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_password(&mut console);

    type_text(&mut console, "one");
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::PasswordConfirm));
    type_text(&mut console, "two");
    press(&mut console, KeyAction::Confirm);

    assert_eq!(console.focused(), Some(ScreenId::PasswordConfirm));
    assert_eq!(text(&console, ScreenId::Validator), "Password mismatching");
    assert!(console.wizard().config.password.is_empty());
}

#[test]
fn test_empty_password_is_required() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_password(&mut console);

    press(&mut console, KeyAction::Confirm);
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::PasswordConfirm));
    assert_eq!(text(&console, ScreenId::Validator), "Password is required");
}

#[test]
fn test_only_the_hash_reaches_the_configuration() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_password(&mut console);

    type_text(&mut console, "abc123");
    press(&mut console, KeyAction::Confirm);
    type_text(&mut console, "abc123");
    press(&mut console, KeyAction::Confirm);

    assert_eq!(console.focused(), Some(ScreenId::SshKey));
    assert_eq!(console.wizard().config.password, "$6$salt$321cba");
}

#[test]
fn test_moving_past_the_chain_edges() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_password(&mut console);
    assert_eq!(
        console.focus_chain(),
        &[ScreenId::Password, ScreenId::PasswordConfirm]
    );

    press(&mut console, KeyAction::Next);
    assert_eq!(console.focused(), Some(ScreenId::PasswordConfirm));

    // Down on the last screen acts as Enter
    press(&mut console, KeyAction::Next);
    assert_eq!(text(&console, ScreenId::Validator), "Password is required");

    press(&mut console, KeyAction::Previous);
    assert_eq!(console.focused(), Some(ScreenId::Password));

    // Up on the first screen acts as Esc
    press(&mut console, KeyAction::Previous);
    assert_eq!(console.focused(), Some(ScreenId::Token));
    assert!(!console.registry().is_visible(ScreenId::PasswordConfirm));
}

// =============================================================================
// Join mode and background checks
// =============================================================================

fn walk_to_server_url(console: &mut harvester_console::Console) {
    press(console, KeyAction::Next); // join
    press(console, KeyAction::Confirm);
    press(console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::ServerUrl));
}

#[test]
fn test_join_checks_management_address() {
    let dir = tempdir().unwrap();
    let remote = ScriptedRemote {
        delay: Duration::from_millis(50),
        ..Default::default()
    };
    let mut console = install_console(probes_with(remote, ScriptedCluster::default()), dir.path());
    walk_to_server_url(&mut console);
    assert_eq!(console.wizard().install_mode(), InstallMode::Join);

    type_text(&mut console, "192.168.1.100");
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.pending_tasks(), 1);
    assert_eq!(
        spinner(&console),
        SpinnerState::Running {
            message: "Checking \"https://192.168.1.100:6443/ping\"...".to_string()
        }
    );

    // Keys are ignored until the check reports back
    press(&mut console, KeyAction::Input('x'));
    assert_eq!(value(&console, ScreenId::ServerUrl), "192.168.1.100");

    finish_tasks(&mut console);
    assert_eq!(console.focused(), Some(ScreenId::Token));
    assert!(!console.registry().is_visible(ScreenId::Spinner));
    assert_eq!(
        console.wizard().config.server_url.as_deref(),
        Some("https://192.168.1.100:6443")
    );
    // No cluster token note when joining
    assert_eq!(text(&console, ScreenId::Note), "");
}

#[test]
fn test_unreachable_management_address() {
    let dir = tempdir().unwrap();
    let remote = ScriptedRemote {
        ping: Err(ProbeError::Http("connection refused".to_string())),
        ..Default::default()
    };
    let mut console = install_console(probes_with(remote, ScriptedCluster::default()), dir.path());
    walk_to_server_url(&mut console);

    type_text(&mut console, "10.0.0.9");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);

    assert_eq!(console.focused(), Some(ScreenId::ServerUrl));
    assert_eq!(value(&console, ScreenId::ServerUrl), "10.0.0.9");
    assert_eq!(
        spinner(&console),
        SpinnerState::Failed {
            message: "connection refused".to_string()
        }
    );
    assert!(console.wizard().config.server_url.is_none());

    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::Disk));
    assert!(!console.registry().is_visible(ScreenId::Spinner));
}

#[test]
fn test_superseded_result_is_discarded() {
    let dir = tempdir().unwrap();
    let remote = ScriptedRemote {
        delay: Duration::from_millis(100),
        ..Default::default()
    };
    let mut console = install_console(probes_with(remote, ScriptedCluster::default()), dir.path());
    walk_to_server_url(&mut console);

    type_text(&mut console, "192.168.1.100");
    press(&mut console, KeyAction::Confirm);
    console.registry_mut().hide(ScreenId::ServerUrl).unwrap();
    finish_tasks(&mut console);

    assert!(console.wizard().config.server_url.is_none());
    assert_eq!(console.focused(), Some(ScreenId::ServerUrl));
    assert!(!console.registry().is_visible(ScreenId::Spinner));
    assert_eq!(console.pending_tasks(), 0);
}

#[test]
fn test_failed_recheck_clears_management_address() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_server_url(&mut console);
    type_text(&mut console, "192.168.1.100");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);
    assert_eq!(console.focused(), Some(ScreenId::Token));

    press(&mut console, KeyAction::Back);
    assert_eq!(value(&console, ScreenId::ServerUrl), "192.168.1.100");
    type_text(&mut console, "unreachable.example.com");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);

    assert_eq!(console.focused(), Some(ScreenId::ServerUrl));
    assert!(console.wizard().config.server_url.is_none());
    assert!(console.wizard().data.server_url.is_none());
    assert_eq!(value(&console, ScreenId::ServerUrl), "unreachable.example.com");

    // Leaving and coming back offers nothing stale
    press(&mut console, KeyAction::Back);
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::ServerUrl));
    assert_eq!(value(&console, ScreenId::ServerUrl), "");
}

#[test]
fn test_switching_to_create_drops_management_address() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_server_url(&mut console);
    type_text(&mut console, "https://cluster.example.com:8443");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);
    assert_eq!(
        console.wizard().config.server_url.as_deref(),
        Some("https://cluster.example.com:8443")
    );

    press(&mut console, KeyAction::Back); // token -> server url
    press(&mut console, KeyAction::Back); // -> disk
    press(&mut console, KeyAction::Back); // -> install mode
    assert_eq!(console.focused(), Some(ScreenId::AskCreate));
    assert_eq!(value(&console, ScreenId::AskCreate), "join");

    press(&mut console, KeyAction::Previous);
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.wizard().install_mode(), InstallMode::Create);
    assert!(console.wizard().config.server_url.is_none());
    assert!(console.wizard().data.server_url.is_none());
}

#[test]
fn test_ssh_keys_are_imported() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_password(&mut console);
    type_text(&mut console, "pw");
    press(&mut console, KeyAction::Confirm);
    type_text(&mut console, "pw");
    press(&mut console, KeyAction::Confirm);

    type_text(&mut console, "https://github.com/admin.keys");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);

    assert_eq!(console.focused(), Some(ScreenId::Network));
    assert_eq!(
        console.wizard().config.ssh_authorized_keys,
        vec!["ssh-ed25519 AAAAC3Nza admin@example"]
    );
}

#[test]
fn test_ssh_key_fetch_failure_keeps_the_screen() {
    let dir = tempdir().unwrap();
    let remote = ScriptedRemote {
        keys: Err(ProbeError::Http("404 Not Found".to_string())),
        ..Default::default()
    };
    let mut console = install_console(probes_with(remote, ScriptedCluster::default()), dir.path());
    walk_to_password(&mut console);
    type_text(&mut console, "pw");
    press(&mut console, KeyAction::Confirm);
    type_text(&mut console, "pw");
    press(&mut console, KeyAction::Confirm);

    type_text(&mut console, "https://example.com/missing.keys");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);

    assert_eq!(console.focused(), Some(ScreenId::SshKey));
    assert!(console.wizard().config.ssh_authorized_keys.is_empty());
    assert_eq!(
        spinner(&console),
        SpinnerState::Failed {
            message: "404 Not Found".to_string()
        }
    );
}

#[test]
fn test_failed_refetch_clears_imported_keys() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_password(&mut console);
    type_text(&mut console, "pw");
    press(&mut console, KeyAction::Confirm);
    type_text(&mut console, "pw");
    press(&mut console, KeyAction::Confirm);
    type_text(&mut console, "https://github.com/admin.keys");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);
    assert_eq!(console.focused(), Some(ScreenId::Network));
    assert_eq!(console.wizard().config.ssh_authorized_keys.len(), 1);

    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::SshKey));
    assert_eq!(value(&console, ScreenId::SshKey), "https://github.com/admin.keys");

    type_text(&mut console, "https://example.com/missing.keys");
    press(&mut console, KeyAction::Confirm);
    finish_tasks(&mut console);

    assert_eq!(console.focused(), Some(ScreenId::SshKey));
    assert!(console.wizard().config.ssh_authorized_keys.is_empty());
    assert!(console.wizard().data.ssh_key_url.is_none());
    assert_eq!(
        spinner(&console),
        SpinnerState::Failed {
            message: "404 Not Found".to_string()
        }
    );
}

// =============================================================================
// Network group
// =============================================================================

fn choose_static(console: &mut harvester_console::Console) {
    press(console, KeyAction::Confirm); // eth0
    assert_eq!(console.focused(), Some(ScreenId::AskNetworkMode));
    press(console, KeyAction::Next);
    press(console, KeyAction::Confirm);
    assert_eq!(console.wizard().network_mode(), NetworkMode::Static);
    assert_eq!(console.focused(), Some(ScreenId::HostName));
}

#[test]
fn test_dhcp_goes_straight_to_proxy() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_network(&mut console);

    press(&mut console, KeyAction::Confirm);
    assert_eq!(
        console.focus_chain(),
        &[ScreenId::AskNetworkMode, ScreenId::HostName]
    );
    press(&mut console, KeyAction::Confirm); // dhcp
    assert_eq!(console.focused(), Some(ScreenId::HostName));
    assert!(value(&console, ScreenId::HostName).starts_with("harvester-"));

    type_text(&mut console, "node-a");
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Proxy));
    assert_eq!(console.wizard().config.hostname, "node-a");
    assert!(console.wizard().static_fields_consistent());
    assert_eq!(
        console.wizard().config.extra_k3s_args,
        vec!["--flannel-iface", "eth0"]
    );
}

#[test]
fn test_invalid_hostname_keeps_focus() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_network(&mut console);
    press(&mut console, KeyAction::Confirm);
    press(&mut console, KeyAction::Confirm);

    type_text(&mut console, "bad_host!");
    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::HostName));
    assert_eq!(
        text(&console, ScreenId::NetworkValidator),
        "bad_host! is not a valid hostname"
    );

    press(&mut console, KeyAction::Previous);
    assert_eq!(console.focused(), Some(ScreenId::HostName));
}

#[test]
fn test_static_fields_prefilled_from_interface() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_network(&mut console);
    choose_static(&mut console);
    assert_eq!(console.focus_chain().len(), 5);

    press(&mut console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Address));
    assert_eq!(value(&console, ScreenId::Address), "192.168.1.50/24");
    press(&mut console, KeyAction::Confirm);
    assert_eq!(value(&console, ScreenId::Gateway), "192.168.1.1");
    press(&mut console, KeyAction::Confirm);
    assert_eq!(value(&console, ScreenId::DnsServers), "8.8.8.8");
    type_text(&mut console, "8.8.8.8, 1.1.1.1");
    press(&mut console, KeyAction::Confirm);

    assert_eq!(console.focused(), Some(ScreenId::Proxy));
    let wizard = console.wizard();
    assert!(wizard.static_fields_consistent());
    assert_eq!(wizard.data.netmask.as_deref(), Some("255.255.255.0"));
    assert_eq!(wizard.config.dns_nameservers, vec!["8.8.8.8", "1.1.1.1"]);
    assert_eq!(wizard.config.runcmd.len(), 1);
}

#[test]
fn test_invalid_address_blocks_focus_change() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_network(&mut console);
    choose_static(&mut console);
    press(&mut console, KeyAction::Confirm);

    type_text(&mut console, "192.168.1.300/24");
    press(&mut console, KeyAction::Next);
    assert_eq!(console.focused(), Some(ScreenId::Address));
    assert_eq!(
        text(&console, ScreenId::NetworkValidator),
        "invalid CIDR address: 192.168.1.300/24"
    );

    type_text(&mut console, "10.1.2.3/16");
    press(&mut console, KeyAction::Next);
    assert_eq!(console.focused(), Some(ScreenId::Gateway));
    assert!(!console.registry().is_visible(ScreenId::NetworkValidator));
}

#[test]
fn test_leaving_static_clears_stale_values() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_network(&mut console);
    choose_static(&mut console);
    for _ in 0..4 {
        press(&mut console, KeyAction::Confirm);
    }
    assert_eq!(console.focused(), Some(ScreenId::Proxy));
    assert!(!console.wizard().config.runcmd.is_empty());

    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::HostName));
    press(&mut console, KeyAction::Previous);
    assert_eq!(console.focused(), Some(ScreenId::AskNetworkMode));
    assert_eq!(value(&console, ScreenId::AskNetworkMode), "static");
    press(&mut console, KeyAction::Previous);
    press(&mut console, KeyAction::Confirm);
    press(&mut console, KeyAction::Confirm);

    assert_eq!(console.focused(), Some(ScreenId::Proxy));
    let wizard = console.wizard();
    assert_eq!(wizard.network_mode(), NetworkMode::Dhcp);
    assert!(wizard.static_fields_consistent());
    assert!(wizard.data.gateway.is_none());
    assert!(wizard.config.runcmd.is_empty());
    assert!(wizard.config.dns_nameservers.is_empty());
}

#[test]
fn test_back_from_network_group() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_network(&mut console);
    choose_static(&mut console);

    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::Network));
    for id in [ScreenId::AskNetworkMode, ScreenId::HostName, ScreenId::Address] {
        assert!(!console.registry().is_visible(id), "{} still visible", id);
    }
}

// =============================================================================
// Proxy, cloud-init and confirmation
// =============================================================================

fn walk_to_confirm(console: &mut harvester_console::Console, proxy: &str) {
    walk_to_network(console);
    press(console, KeyAction::Confirm);
    press(console, KeyAction::Confirm);
    type_text(console, "node-a");
    press(console, KeyAction::Confirm);
    type_text(console, proxy);
    press(console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::CloudInit));
    press(console, KeyAction::Confirm);
    assert_eq!(console.focused(), Some(ScreenId::Confirm));
}

#[test]
fn test_summary_lists_the_answers() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_confirm(&mut console, "http://proxy.local:3128");

    let summary = text(&console, ScreenId::Confirm);
    assert!(summary.contains("install mode: create"));
    assert!(summary.contains("proxy address: http://proxy.local:3128"));
    assert!(summary.contains("hostname: node-a"));
    assert!(summary.contains("install device: /dev/sda"));
    assert!(summary.contains("Continue?"));
    assert_eq!(
        console.wizard().config.environment.get("https_proxy").map(String::as_str),
        Some("http://proxy.local:3128")
    );
}

#[test]
fn test_confirm_writes_configuration_and_runs_installer() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_confirm(&mut console, "");

    press(&mut console, KeyAction::Confirm); // yes
    assert_eq!(console.focused(), Some(ScreenId::Install));
    assert!(console.registry().is_visible(ScreenId::Install));
    assert!(console.wizard().data.password.is_none());

    let path = dir.path().join("install.json");
    let saved = InstallConfig::load_from_file(&path).unwrap();
    saved.validate().unwrap();
    assert_eq!(saved.hostname, "node-a");
    assert!(saved.environment.is_empty());
    assert_eq!(saved.password, "$6$salt$dr0wss4p");

    assert!(console.wait_for_update(Duration::from_secs(1)));
    assert!(console.wait_for_update(Duration::from_secs(1)));
    let output = text(&console, ScreenId::Install);
    assert!(output.starts_with("Dry run: harvester-installer "));
    assert!(output.ends_with("Dry run complete, nothing was installed"));
}

#[test]
fn test_unwritable_configuration_keeps_the_confirmation() {
    let dir = tempdir().unwrap();
    let not_a_dir = dir.path().join("plain-file");
    fs::write(&not_a_dir, "").unwrap();
    let settings = ConsoleSettings {
        install_config_path: not_a_dir.join("install.json"),
        ..settings_in(dir.path())
    };
    let mut console = Console::install(probes(), settings).unwrap();
    walk_to_confirm(&mut console, "");

    press(&mut console, KeyAction::Confirm); // yes
    assert_eq!(console.focused(), Some(ScreenId::Confirm));
    assert!(!console.registry().is_visible(ScreenId::Install));
    assert!(console.registry().is_visible(ScreenId::Validator));
    assert!(text(&console, ScreenId::Validator).starts_with("Failed to write install configuration"));
    assert_eq!(console.wizard().data.password.as_deref(), Some("p4ssw0rd"));
    assert_eq!(console.pending_tasks(), 0);

    // The user can still go back and change answers
    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::CloudInit));
}

#[test]
fn test_declining_halts_the_wizard() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_confirm(&mut console, "");

    press(&mut console, KeyAction::Next); // no
    press(&mut console, KeyAction::Confirm);

    assert_eq!(console.focused(), None);
    assert!(!console.registry().is_visible(ScreenId::Confirm));
    assert_eq!(
        text(&console, ScreenId::Note),
        "Installation halted. Rebooting system in 0 seconds"
    );
    assert!(!dir.path().join("install.json").exists());

    // Nothing is focused, so keys do nothing
    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), None);
}

#[test]
fn test_back_from_proxy_returns_to_hostname() {
    let dir = tempdir().unwrap();
    let mut console = install_console(probes(), dir.path());
    walk_to_network(&mut console);
    press(&mut console, KeyAction::Confirm);
    press(&mut console, KeyAction::Confirm);
    type_text(&mut console, "node-b");
    press(&mut console, KeyAction::Confirm);

    press(&mut console, KeyAction::Back);
    assert_eq!(console.focused(), Some(ScreenId::HostName));
    assert_eq!(value(&console, ScreenId::HostName), "node-b");
    assert_eq!(value(&console, ScreenId::AskNetworkMode), "dhcp");
}
