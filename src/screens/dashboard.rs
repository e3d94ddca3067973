//! Dashboard screens: logo, management URL, status line and the credential
//! prompt guarding the shell.

use super::ScreenId;
use super::panels::FOOTER_SLOT;
use crate::app::{Step, Transition};
use crate::components::keybindings::KeyAction;
use crate::error::Result;
use crate::probes::{PasswordHasher, shadow_hash};
use crate::settings::ConsoleSettings;
use crate::ui::view::{Anchor, Placement, Tone, View};
use crate::ui::{Context, Screen, ScreenRegistry};
use std::fs;
use tracing::{info, warn};

const LOGO: &str = "
██╗░░██╗░█████╗░██████╗░██╗░░░██╗███████╗░██████╗████████╗███████╗██████╗░
██║░░██║██╔══██╗██╔══██╗██║░░░██║██╔════╝██╔════╝╚══██╔══╝██╔════╝██╔══██╗
███████║███████║█████╔╝╚██╗░░██╔╝█████╗░░╚█████╗░░░░██║░░░█████╗░░██████╔╝
██╔══██║██╔══██║██╔══██╗░╚████╔╝░██╔══╝░░░╚═══██╗░░░██║░░░██╔══╝░░██╔══██╗
██║░░██║██║░░██║██║░░██║░░╚██╔╝░░███████╗██████╔╝░░░██║░░░███████╗██║░░██║
╚═╝░░╚═╝╚═╝░░╚═╝╚═╝░░╚═╝░░░╚═╝░░░╚══════╝╚═════╝░░░░╚═╝░░░╚══════╝╚═╝░░╚═╝";
const LOGO_WIDTH: usize = 74;

pub const STATUS_PREFIX: &str = "Current status: ";
pub const URL_PREFIX: &str = "Harvester management URL: ";

pub fn register(registry: &mut ScreenRegistry) -> Result<()> {
    registry.register_panel(
        View::panel(ScreenId::Logo, Placement::new(Anchor::Banner, 1, 8)).with_text(&logo_text()),
    )?;
    registry.register_panel(
        View::panel(ScreenId::Url, Placement::new(Anchor::Banner, 10, 4)).with_wrap(),
    )?;
    registry.register_panel(
        View::panel(ScreenId::Status, Placement::new(Anchor::Banner, 14, 4))
            .with_tone(Tone::Ansi)
            .with_wrap()
            .with_text(STATUS_PREFIX),
    )?;
    registry.register_panel(View::panel(ScreenId::DashboardFooter, FOOTER_SLOT))?;
    registry.register_panel(
        View::panel(
            ScreenId::AdminPasswordFrame,
            Placement::new(Anchor::Prompt, 10, 7),
        )
        .with_frame(""),
    )?;
    registry.register(
        View::input(
            ScreenId::AdminPassword,
            "Input password: ",
            true,
            Placement::new(Anchor::PromptInner, 11, 3),
        ),
        Some(Box::new(AdminPassword)),
    )?;
    registry.register_panel(
        View::panel(
            ScreenId::AdminValidator,
            Placement::new(Anchor::PromptInner, 14, 2),
        )
        .with_tone(Tone::Error),
    )?;
    Ok(())
}

/// Logo followed by a right-aligned version line
fn logo_text() -> String {
    let version = format!("version: {}", env!("CARGO_PKG_VERSION"));
    format!("{}\n{:>width$}", LOGO, version, width = LOGO_WIDTH)
}

/// `Current status: \n\n<status>`
pub fn status_text(rendered: &str) -> String {
    format!("{}\n\n{}", STATUS_PREFIX, rendered)
}

/// `Harvester management URL: \n\n<url>`
pub fn url_text(url: &str) -> String {
    format!("{}\n\n{}", URL_PREFIX, url)
}

/// Step showing the shell credential prompt
pub fn open_shell_prompt() -> Transition {
    Transition::advance(Vec::new(), Step::one(ScreenId::AdminPassword))
}

/// Check `password` against the admin user's shadow entry.
///
/// Any failure to read or compare counts as a mismatch.
pub fn verify_admin_password(
    settings: &ConsoleSettings,
    hasher: &dyn PasswordHasher,
    password: &str,
) -> bool {
    let shadow = match fs::read_to_string(&settings.shadow_file) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {:?}: {}", settings.shadow_file, e);
            return false;
        }
    };
    let Some(hash) = shadow_hash(&shadow, &settings.admin_user) else {
        warn!("No shadow entry for {}", settings.admin_user);
        return false;
    };
    match hasher.verify(password, &hash) {
        Ok(matched) => matched,
        Err(e) => {
            warn!("Password verification failed: {}", e);
            false
        }
    }
}

struct AdminPassword;

impl Screen for AdminPassword {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.registry.reveal(ScreenId::AdminPasswordFrame)
    }

    fn post_close(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        ctx.registry.hide(ScreenId::AdminPasswordFrame)?;
        ctx.registry.hide(ScreenId::AdminValidator)
    }

    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition> {
        match action {
            KeyAction::Confirm => {
                let password = ctx.value(ScreenId::AdminPassword)?;
                if verify_admin_password(ctx.settings, ctx.probes.hasher.as_ref(), &password) {
                    info!("Admin credential accepted, switching to shell");
                    return Ok(Transition::Shell);
                }
                ctx.report(ScreenId::AdminValidator, "Invalid credential")?;
                Ok(Transition::Stay)
            }
            KeyAction::Back => Ok(Transition::halt([ScreenId::AdminPassword])),
            _ => Ok(Transition::Stay),
        }
    }
}
