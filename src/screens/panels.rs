//! Support panels shared by every wizard step, and the install output panel.

use super::ScreenId;
use crate::app::Transition;
use crate::components::keybindings::KeyAction;
use crate::error::Result;
use crate::ui::view::{Anchor, Placement, Tone, View};
use crate::ui::{Context, Screen, ScreenRegistry};

pub const TITLE_SLOT: Placement = Placement::new(Anchor::Form, -3, 3);
/// Single input or select in the middle of the form
pub const FORM_SLOT: Placement = Placement::new(Anchor::Form, 0, 3);
pub const NOTE_SLOT: Placement = Placement::new(Anchor::Note, 3, 2);
pub const VALIDATOR_SLOT: Placement = Placement::new(Anchor::Form, 5, 2);
pub const SPINNER_SLOT: Placement = Placement::new(Anchor::Form, 7, 2);
pub const FOOTER_SLOT: Placement = Placement::new(Anchor::Footer, 0, 2);
const INSTALL_SLOT: Placement = Placement::new(Anchor::Install, 0, 0);

pub fn register(registry: &mut ScreenRegistry) -> Result<()> {
    registry.register_panel(View::panel(ScreenId::Title, TITLE_SLOT))?;
    registry.register_panel(View::panel(ScreenId::Note, NOTE_SLOT).with_wrap())?;
    registry.register_panel(
        View::panel(ScreenId::Validator, VALIDATOR_SLOT)
            .with_tone(Tone::Error)
            .with_wrap(),
    )?;
    registry.register_panel(View::panel(ScreenId::Footer, FOOTER_SLOT))?;
    registry.register_panel(View::spinner(ScreenId::Spinner, SPINNER_SLOT))?;
    registry.register(
        View::panel(ScreenId::Install, INSTALL_SLOT).with_frame(" Installing Harvester "),
        Some(Box::new(InstallPanel)),
    )?;
    Ok(())
}

/// Output of the running installer; takes over the whole form
struct InstallPanel;

impl Screen for InstallPanel {
    fn pre_show(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        if ctx.registry.is_visible(ScreenId::Install) {
            return Ok(());
        }
        ctx.set_text(ScreenId::Footer, "")?;
        ctx.set_text(ScreenId::Note, "")?;
        ctx.set_text(ScreenId::Title, "")
    }

    fn on_key(&mut self, _action: KeyAction, _ctx: &mut Context<'_>) -> Result<Transition> {
        Ok(Transition::Stay)
    }
}
