//! Wizard steps up to the network section: install mode, target disk,
//! management address, cluster token, password and SSH keys.

use super::panels::FORM_SLOT;
use super::{ScreenId, selected};
use crate::app::{BackgroundTask, ConsoleMode, Step, Transition};
use crate::components::keybindings::KeyAction;
use crate::error::Result;
use crate::types::{InstallMode, SelectOption};
use crate::ui::view::{Anchor, Placement, View};
use crate::ui::{Context, Screen, ScreenRegistry};
use crate::validation::{format_server_url, require, validate_password_pair};
use tracing::debug;

const SERVER_URL_NOTE: &str =
    "Note: Input the management address of an existing Harvester cluster, e.g. 192.168.1.100. Port 6443 is used unless one is given.";
const CLUSTER_TOKEN_NOTE: &str =
    "Note: The token is used for adding other nodes to the cluster";
const SSH_KEY_NOTE: &str = "For example: https://github.com/<username>.keys";

const PASSWORD_PAIR: [ScreenId; 2] = [ScreenId::Password, ScreenId::PasswordConfirm];

pub fn register(registry: &mut ScreenRegistry) -> Result<()> {
    registry.register(
        View::select(ScreenId::AskCreate, FORM_SLOT),
        Some(Box::new(AskCreate)),
    )?;
    registry.register(View::select(ScreenId::Disk, FORM_SLOT), Some(Box::new(Disk)))?;
    registry.register(
        View::input(ScreenId::ServerUrl, "Management address", false, FORM_SLOT),
        Some(Box::new(ServerUrl)),
    )?;
    registry.register(
        View::input(ScreenId::Token, "Cluster token", false, FORM_SLOT),
        Some(Box::new(Token)),
    )?;
    registry.register(
        View::input(ScreenId::Password, "Password", true, FORM_SLOT),
        Some(Box::new(Password)),
    )?;
    registry.register(
        View::input(
            ScreenId::PasswordConfirm,
            "Confirm password",
            true,
            Placement::new(Anchor::Form, 3, 3),
        ),
        Some(Box::new(PasswordConfirm)),
    )?;
    registry.register(
        View::input(ScreenId::SshKey, "HTTP URL", false, FORM_SLOT),
        Some(Box::new(SshKey)),
    )?;
    Ok(())
}

fn password_step() -> Step {
    Step::chain(PASSWORD_PAIR)
}

struct AskCreate;

impl Screen for AskCreate {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.set_text(ScreenId::Footer, "")?;
        ctx.set_options(
            ScreenId::AskCreate,
            SelectOption::from_enum::<InstallMode, _>(|m| m.description().to_string()),
        )?;
        if let Some(mode) = ctx.wizard.data.install_mode {
            ctx.set_default(ScreenId::AskCreate, mode.to_string())?;
        }
        ctx.set_text(ScreenId::Title, "Choose installation mode")
    }

    fn post_close(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let hint = ctx
            .keys
            .hint(ConsoleMode::Install, KeyAction::Back)
            .unwrap_or_default();
        ctx.set_text(ScreenId::Footer, hint)
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let mode: InstallMode = selected(ctx, ScreenId::AskCreate)?;
                ctx.wizard.set_install_mode(mode);
                Ok(Transition::advance([ScreenId::AskCreate], Step::one(ScreenId::Disk)))
            }
            // First step: nothing to go back to
            KeyAction::Back => Ok(Transition::Stay),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct Disk;

impl Screen for Disk {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let disks = ctx.probes.system.list_disks()?;
        debug!("Found {} candidate disks", disks.len());
        ctx.set_options(ScreenId::Disk, disks)?;
        if let Some(device) = ctx.wizard.data.device.clone() {
            ctx.set_default(ScreenId::Disk, device)?;
        }
        ctx.set_text(
            ScreenId::Title,
            "Choose installation target. Device will be formatted",
        )
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let device = ctx.value(ScreenId::Disk)?;
                if device.is_empty() {
                    ctx.report(ScreenId::Validator, "No installation target found")?;
                    return Ok(Transition::Stay);
                }
                ctx.wizard.set_device(&device);
                let next = match ctx.wizard.install_mode() {
                    InstallMode::Create => ScreenId::Token,
                    InstallMode::Join => ScreenId::ServerUrl,
                };
                Ok(Transition::advance([ScreenId::Disk], Step::one(next)))
            }
            KeyAction::Back => Ok(Transition::back(
                [ScreenId::Disk],
                Step::one(ScreenId::AskCreate),
            )),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct ServerUrl;

impl Screen for ServerUrl {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let url = ctx.wizard.data.server_url.clone().unwrap_or_default();
        ctx.set_default(ScreenId::ServerUrl, url)?;
        ctx.set_text(ScreenId::Title, "Configure management address")?;
        ctx.set_text(ScreenId::Note, SERVER_URL_NOTE)
    }

    fn post_close(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.set_text(ScreenId::Note, "")?;
        ctx.registry.hide(ScreenId::Spinner)
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let raw = ctx.value(ScreenId::ServerUrl)?.trim().to_string();
                if let Err(msg) = require(&raw, "Management address") {
                    ctx.report(ScreenId::Validator, msg)?;
                    return Ok(Transition::Stay);
                }
                let formatted = format_server_url(&raw);
                let ping_url = format!("{}/ping", formatted);
                let remote = ctx.probes.remote.clone();

                Ok(Transition::Run(BackgroundTask::new(
                    ScreenId::ServerUrl,
                    format!("Checking {:?}...", ping_url),
                    move || remote.ping(&ping_url),
                    move |(), ctx: &mut Context<'_>| {
                        ctx.wizard.set_server_url(&raw, &formatted);
                        Ok(Transition::advance(
                            [ScreenId::ServerUrl],
                            Step::one(ScreenId::Token),
                        ))
                    },
                    |_err, ctx: &mut Context<'_>| {
                        ctx.wizard.clear_server_url();
                        Ok(Transition::redisplay(ScreenId::ServerUrl))
                    },
                )))
            }
            KeyAction::Back => Ok(Transition::back(
                [ScreenId::ServerUrl],
                Step::one(ScreenId::Disk),
            )),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct Token;

impl Screen for Token {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        if let Some(token) = ctx.wizard.data.token.clone() {
            ctx.set_default(ScreenId::Token, token)?;
        }
        let note = match ctx.wizard.install_mode() {
            InstallMode::Create => CLUSTER_TOKEN_NOTE,
            InstallMode::Join => "",
        };
        ctx.set_text(ScreenId::Note, note)?;
        ctx.set_text(ScreenId::Title, "Configure cluster token")
    }

    fn post_close(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.set_text(ScreenId::Note, "")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let token = ctx.value(ScreenId::Token)?;
                if let Err(msg) = require(&token, "Cluster token") {
                    ctx.report(ScreenId::Validator, msg)?;
                    return Ok(Transition::Stay);
                }
                ctx.wizard.set_token(&token);
                Ok(Transition::advance([ScreenId::Token], password_step()))
            }
            KeyAction::Back => {
                let previous = match ctx.wizard.install_mode() {
                    InstallMode::Create => ScreenId::Disk,
                    InstallMode::Join => ScreenId::ServerUrl,
                };
                Ok(Transition::back([ScreenId::Token], Step::one(previous)))
            }
            _ => Ok(Transition::Unhandled),
        }
    }
}

fn password_pre_show(id: ScreenId, ctx: &mut Context<'_>) -> Result<()> {
    if let Some(password) = ctx.wizard.data.password.clone() {
        ctx.set_default(id, password)?;
    }
    ctx.set_text(ScreenId::Note, "")?;
    ctx.set_text(ScreenId::Title, "Configure the password to access the node")
}

fn password_back() -> Transition {
    Transition::back(PASSWORD_PAIR, Step::one(ScreenId::Token))
}

struct Password;

impl Screen for Password {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        password_pre_show(ScreenId::Password, ctx)
    }

    fn on_key(&mut self, action: KeyAction, _ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => Ok(Transition::FocusNext),
            KeyAction::Back => Ok(password_back()),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct PasswordConfirm;

impl Screen for PasswordConfirm {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        password_pre_show(ScreenId::PasswordConfirm, ctx)
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let password = ctx.value(ScreenId::Password)?;
                let confirm = ctx.value(ScreenId::PasswordConfirm)?;
                if let Err(msg) = validate_password_pair(&password, &confirm) {
                    ctx.report(ScreenId::Validator, msg)?;
                    return Ok(Transition::Stay);
                }
                let hash = ctx.probes.hasher.hash(&password)?;
                ctx.wizard.set_password(&password, &hash);
                Ok(Transition::advance(PASSWORD_PAIR, Step::one(ScreenId::SshKey)))
            }
            KeyAction::Back => Ok(password_back()),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct SshKey;

impl Screen for SshKey {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let url = ctx.wizard.data.ssh_key_url.clone().unwrap_or_default();
        ctx.set_default(ScreenId::SshKey, url)?;
        ctx.set_text(ScreenId::Title, "Optional: import SSH keys")?;
        ctx.set_text(ScreenId::Note, SSH_KEY_NOTE)
    }

    fn post_close(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.set_text(ScreenId::Note, "")?;
        ctx.registry.hide(ScreenId::Spinner)
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let url = ctx.value(ScreenId::SshKey)?.trim().to_string();
                if url.is_empty() {
                    ctx.wizard.clear_ssh_keys();
                    return Ok(Transition::advance(
                        [ScreenId::SshKey],
                        Step::one(ScreenId::Network),
                    ));
                }

                let remote = ctx.probes.remote.clone();
                let fetch_url = url.clone();
                Ok(Transition::Run(BackgroundTask::new(
                    ScreenId::SshKey,
                    format!("Checking {:?}...", url),
                    move || remote.fetch_ssh_keys(&fetch_url),
                    move |keys: Vec<String>, ctx: &mut Context<'_>| {
                        debug!("Imported {} SSH public keys", keys.len());
                        ctx.wizard.set_ssh_keys(&url, keys);
                        Ok(Transition::advance(
                            [ScreenId::SshKey],
                            Step::one(ScreenId::Network),
                        ))
                    },
                    |_err, ctx: &mut Context<'_>| {
                        ctx.wizard.clear_ssh_keys();
                        Ok(Transition::redisplay(ScreenId::SshKey))
                    },
                )))
            }
            KeyAction::Back => Ok(Transition::back([ScreenId::SshKey], password_step())),
            _ => Ok(Transition::Unhandled),
        }
    }
}
