//! Management network: interface choice, then the address group.
//!
//! The address group is one step made of several screens shown together.
//! In dhcp mode it is network mode and hostname; static mode adds address,
//! gateway and DNS servers below them. Every field validates before focus
//! may leave it, so reaching the proxy step in static mode implies every
//! static field holds a validated value.

use super::panels::FORM_SLOT;
use super::{ScreenId, selected};
use crate::app::{DEFAULT_DNS_SERVERS, Step, Transition};
use crate::components::keybindings::KeyAction;
use crate::error::Result;
use crate::probes::NetworkInterface;
use crate::types::{NetworkMode, SelectOption};
use crate::ui::view::{Anchor, Placement, Tone, View};
use crate::ui::{Context, Screen, ScreenRegistry};
use crate::validation::{parse_cidr, validate_dns_servers, validate_hostname, validate_ip};
use tracing::{debug, warn};

/// Everything closed when the address group is left
const NETWORK_GROUP: [ScreenId; 6] = [
    ScreenId::AskNetworkMode,
    ScreenId::HostName,
    ScreenId::Address,
    ScreenId::Gateway,
    ScreenId::DnsServers,
    ScreenId::NetworkValidator,
];

const fn group_slot(row: i32) -> Placement {
    Placement::new(Anchor::Form, row, 3)
}

pub fn register(registry: &mut ScreenRegistry) -> Result<()> {
    registry.register(
        View::select(ScreenId::Network, FORM_SLOT),
        Some(Box::new(Network::default())),
    )?;
    registry.register(
        View::select(ScreenId::AskNetworkMode, Placement::new(Anchor::Form, 0, 4)),
        Some(Box::new(AskNetworkMode)),
    )?;
    registry.register(
        View::input(ScreenId::HostName, "HostName", false, group_slot(4)),
        Some(Box::new(HostName)),
    )?;
    registry.register(
        View::input(ScreenId::Address, "IPv4 Address", false, group_slot(7)),
        Some(Box::new(Address)),
    )?;
    registry.register(
        View::input(ScreenId::Gateway, "Gateway", false, group_slot(10)),
        Some(Box::new(Gateway)),
    )?;
    registry.register(
        View::input(ScreenId::DnsServers, "DNS Servers", false, group_slot(13)),
        Some(Box::new(DnsServers)),
    )?;
    registry.register_panel(
        View::panel(ScreenId::NetworkValidator, Placement::new(Anchor::Form, 16, 2))
            .with_tone(Tone::Error)
            .with_wrap(),
    )?;
    Ok(())
}

/// Screens of the address group for `mode`, focus on network mode
pub fn network_step(mode: NetworkMode) -> Step {
    match mode {
        NetworkMode::Dhcp => Step::chain([ScreenId::AskNetworkMode, ScreenId::HostName]),
        NetworkMode::Static => Step::chain([
            ScreenId::AskNetworkMode,
            ScreenId::HostName,
            ScreenId::Address,
            ScreenId::Gateway,
            ScreenId::DnsServers,
        ]),
    }
}

fn leave_group_back() -> Transition {
    Transition::back(NETWORK_GROUP, Step::one(ScreenId::Network))
}

/// Validate the focused field, reporting problems in the group's validator.
fn check<T>(ctx: &mut Context<'_>, result: std::result::Result<T, String>) -> Result<Option<T>> {
    match result {
        Ok(value) => {
            ctx.registry.hide(ScreenId::NetworkValidator)?;
            Ok(Some(value))
        }
        Err(msg) => {
            ctx.report(ScreenId::NetworkValidator, msg)?;
            Ok(None)
        }
    }
}

/// Shared key handling of the address group inputs.
///
/// Up and Down only move once the field is valid; Enter moves to the next
/// field, or runs `confirm` on the last one.
fn field_key(
    action: KeyAction,
    ctx: &mut Context<'_>,
    validate: fn(&mut Context<'_>) -> Result<bool>,
    confirm: fn(&Context<'_>) -> Transition,
) -> Result<Transition> {
    match action {
        KeyAction::Back => Ok(leave_group_back()),
        KeyAction::Previous | KeyAction::Next => {
            if validate(ctx)? {
                Ok(Transition::Unhandled)
            } else {
                Ok(Transition::Stay)
            }
        }
        KeyAction::Confirm => {
            if validate(ctx)? {
                Ok(confirm(ctx))
            } else {
                Ok(Transition::Stay)
            }
        }
        _ => Ok(Transition::Unhandled),
    }
}

fn to_proxy(_ctx: &Context<'_>) -> Transition {
    Transition::advance(NETWORK_GROUP, Step::one(ScreenId::Proxy))
}

fn focus_next(_ctx: &Context<'_>) -> Transition {
    Transition::FocusNext
}

#[derive(Default)]
struct Network {
    interfaces: Vec<NetworkInterface>,
}

impl Screen for Network {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.interfaces = ctx.probes.system.list_interfaces()?;
        let options: Vec<SelectOption> = self.interfaces.iter().map(|i| i.option()).collect();
        ctx.set_options(ScreenId::Network, options)?;
        if let Some(interface) = ctx.wizard.data.interface.clone() {
            ctx.set_default(ScreenId::Network, interface)?;
        }
        ctx.set_text(ScreenId::Title, "Select interface for the management network")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let name = ctx.value(ScreenId::Network)?;
                let Some(interface) = self.interfaces.iter().find(|i| i.name == name) else {
                    ctx.report(ScreenId::Validator, "No network interface found")?;
                    return Ok(Transition::Stay);
                };
                ctx.wizard
                    .select_interface(&name, interface.addresses.first().map(String::as_str));
                match ctx.probes.system.default_gateway(&name) {
                    Ok(gateway) => ctx.wizard.set_gateway_hint(gateway),
                    Err(e) => warn!("Failed to read default gateway of {}: {}", name, e),
                }
                let mode = ctx.wizard.network_mode();
                Ok(Transition::advance([ScreenId::Network], network_step(mode)))
            }
            KeyAction::Back => Ok(Transition::back(
                [ScreenId::Network],
                Step::one(ScreenId::SshKey),
            )),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct AskNetworkMode;

impl Screen for AskNetworkMode {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.set_options(
            ScreenId::AskNetworkMode,
            SelectOption::from_enum::<NetworkMode, _>(|m| m.to_string()),
        )?;
        let mode = ctx.wizard.network_mode().to_string();
        ctx.set_default(ScreenId::AskNetworkMode, mode)?;
        ctx.set_text(ScreenId::Title, "Choose network mode")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let mode: NetworkMode = selected(ctx, ScreenId::AskNetworkMode)?;
                debug!("Network mode set to {}", mode);
                ctx.wizard.set_network_mode(mode);
                Ok(Transition::advance(
                    NETWORK_GROUP,
                    network_step(mode).focus_on(ScreenId::HostName),
                ))
            }
            KeyAction::Back => Ok(leave_group_back()),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct HostName;

impl HostName {
    fn validate(ctx: &mut Context<'_>) -> Result<bool> {
        let input = ctx.value(ScreenId::HostName)?;
        let Some(hostname) = check(ctx, validate_hostname(input.trim()))? else {
            return Ok(false);
        };
        ctx.wizard.set_hostname(&hostname);
        Ok(true)
    }

    fn confirm(ctx: &Context<'_>) -> Transition {
        if ctx.wizard.network_mode().is_static() {
            Transition::FocusNext
        } else {
            to_proxy(ctx)
        }
    }
}

impl Screen for HostName {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let hostname = ctx
            .wizard
            .data
            .hostname
            .clone()
            .unwrap_or_else(|| ctx.wizard.default_hostname().to_string());
        ctx.set_default(ScreenId::HostName, hostname)?;
        ctx.set_text(ScreenId::Title, "Configure HostName (FQDN)")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        field_key(action, ctx, Self::validate, Self::confirm)
    }
}

struct Address;

impl Address {
    fn validate(ctx: &mut Context<'_>) -> Result<bool> {
        let input = ctx.value(ScreenId::Address)?;
        let Some(cidr) = check(ctx, parse_cidr(&input))? else {
            return Ok(false);
        };
        ctx.wizard.set_static_address(&input, &cidr);
        Ok(true)
    }
}

impl Screen for Address {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let address = ctx
            .wizard
            .data
            .address
            .clone()
            .or_else(|| ctx.wizard.hints.address.clone())
            .unwrap_or_default();
        ctx.set_default(ScreenId::Address, address)?;
        ctx.set_text(ScreenId::Title, "Configure IPv4 Address (CIDR)")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        field_key(action, ctx, Self::validate, focus_next)
    }
}

struct Gateway;

impl Gateway {
    fn validate(ctx: &mut Context<'_>) -> Result<bool> {
        let input = ctx.value(ScreenId::Gateway)?;
        let Some(gateway) = check(ctx, validate_ip(&input))? else {
            return Ok(false);
        };
        ctx.wizard.set_gateway(gateway);
        Ok(true)
    }
}

impl Screen for Gateway {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let gateway = ctx
            .wizard
            .data
            .gateway
            .clone()
            .or_else(|| ctx.wizard.hints.gateway.clone())
            .unwrap_or_default();
        ctx.set_default(ScreenId::Gateway, gateway)?;
        ctx.set_text(ScreenId::Title, "Configure Gateway")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        field_key(action, ctx, Self::validate, focus_next)
    }
}

struct DnsServers;

impl DnsServers {
    fn validate(ctx: &mut Context<'_>) -> Result<bool> {
        let input = ctx.value(ScreenId::DnsServers)?;
        let Some(servers) = check(ctx, validate_dns_servers(&input))? else {
            return Ok(false);
        };
        ctx.wizard.set_dns_servers(input.trim(), servers);
        Ok(true)
    }
}

impl Screen for DnsServers {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let servers = ctx
            .wizard
            .data
            .dns_servers
            .clone()
            .unwrap_or_else(|| DEFAULT_DNS_SERVERS.to_string());
        ctx.set_default(ScreenId::DnsServers, servers)?;
        ctx.set_text(ScreenId::Title, "Configure DNS Servers")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        field_key(action, ctx, Self::validate, to_proxy)
    }
}
