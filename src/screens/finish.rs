//! Last wizard steps: proxy, cloud-init and the final confirmation.

use super::network::network_step;
use super::panels::FORM_SLOT;
use super::{ScreenId, selected};
use crate::app::{Step, Transition};
use crate::components::keybindings::KeyAction;
use crate::error::Result;
use crate::installer;
use crate::types::{ConfirmChoice, SelectOption};
use crate::ui::view::View;
use crate::ui::{Context, Screen, ScreenRegistry};
use tracing::{error, info};

const PROXY_NOTE: &str =
    "HTTP proxy used by the installed system, e.g. http://proxy.example.com:3128. Leave empty for none.";
const CONFIRM_QUESTION: &str =
    "\n\nYour disk will be formatted and Harvester will be installed with \nthe above configuration. Continue?\n";

pub fn register(registry: &mut ScreenRegistry) -> Result<()> {
    registry.register(
        View::input(ScreenId::Proxy, "Proxy address", false, FORM_SLOT),
        Some(Box::new(Proxy)),
    )?;
    registry.register(
        View::input(ScreenId::CloudInit, "HTTP URL", false, FORM_SLOT),
        Some(Box::new(CloudInit)),
    )?;
    registry.register(
        View::select(ScreenId::Confirm, FORM_SLOT),
        Some(Box::new(Confirm)),
    )?;
    Ok(())
}

struct Proxy;

impl Screen for Proxy {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        if let Some(proxy) = ctx.wizard.data.proxy.clone() {
            ctx.set_default(ScreenId::Proxy, proxy)?;
        }
        ctx.set_text(ScreenId::Title, "Optional: configure proxy")?;
        ctx.set_text(ScreenId::Note, PROXY_NOTE)
    }

    fn post_close(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.set_text(ScreenId::Note, "")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let proxy = ctx.value(ScreenId::Proxy)?;
                ctx.wizard.set_proxy(&proxy);
                Ok(Transition::advance(
                    [ScreenId::Proxy],
                    Step::one(ScreenId::CloudInit),
                ))
            }
            KeyAction::Back => {
                let mode = ctx.wizard.network_mode();
                Ok(Transition::back(
                    [ScreenId::Proxy],
                    network_step(mode).focus_on(ScreenId::HostName),
                ))
            }
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct CloudInit;

impl Screen for CloudInit {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        if let Some(url) = ctx.wizard.data.cloud_init_url.clone() {
            ctx.set_default(ScreenId::CloudInit, url)?;
        }
        ctx.set_text(ScreenId::Title, "Optional: configure cloud-init")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let url = ctx.value(ScreenId::CloudInit)?;
                ctx.wizard.set_cloud_init_url(&url);

                let summary = if ctx.wizard.config.install.silent {
                    String::new()
                } else {
                    format!("{}{}", ctx.wizard.summary(), CONFIRM_QUESTION)
                };
                ctx.set_text(ScreenId::Confirm, summary)?;
                Ok(Transition::advance(
                    [ScreenId::CloudInit],
                    Step::one(ScreenId::Confirm),
                ))
            }
            KeyAction::Back => Ok(Transition::back(
                [ScreenId::CloudInit],
                Step::one(ScreenId::Proxy),
            )),
            _ => Ok(Transition::Unhandled),
        }
    }
}

struct Confirm;

impl Screen for Confirm {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.set_options(
            ScreenId::Confirm,
            SelectOption::from_enum::<ConfirmChoice, _>(|c| c.label().to_string()),
        )?;
        ctx.set_text(ScreenId::Title, "Confirm installation options")
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => match selected(ctx, ScreenId::Confirm)? {
                ConfirmChoice::Yes => start_install(ctx),
                ConfirmChoice::No => {
                    info!("Installation declined by user");
                    ctx.set_text(ScreenId::Title, "")?;
                    ctx.set_text(ScreenId::Footer, "")?;
                    ctx.report(
                        ScreenId::Note,
                        format!(
                            "Installation halted. Rebooting system in {} seconds",
                            ctx.settings.reboot_delay_secs
                        ),
                    )?;
                    installer::schedule_reboot(ctx.settings)?;
                    Ok(Transition::halt([ScreenId::Confirm]))
                }
            },
            KeyAction::Back => Ok(Transition::back(
                [ScreenId::Confirm],
                Step::one(ScreenId::CloudInit),
            )),
            _ => Ok(Transition::Unhandled),
        }
    }
}

/// Write the target configuration and start the installer. Any failure
/// leaves the user on the confirmation with the answers intact.
fn start_install(ctx: &mut Context<'_>) -> Result<Transition> {
    let path = ctx.settings.install_config_path.clone();
    if let Err(e) = ctx.wizard.config.save_to_file(&path) {
        error!("{:#}", e);
        ctx.report(ScreenId::Validator, format!("{:#}", e))?;
        return Ok(Transition::Stay);
    }
    info!("Install configuration written to {:?}", path);

    if let Err(e) = installer::spawn_installer(ctx.settings, &path, ctx.updates.clone()) {
        error!("{}", e);
        ctx.report(ScreenId::Validator, e.to_string())?;
        return Ok(Transition::Stay);
    }

    ctx.wizard.zero_sensitive_data();
    Ok(Transition::advance(
        [ScreenId::Confirm],
        Step::one(ScreenId::Install),
    ))
}
