//! Screen registry
//!
//! Owns every view and its behaviour for the lifetime of the process. Views
//! are created once, registered under their `ScreenId`, and then only shown
//! and closed.

use crate::app::{Session, Transition, UiEvent, WizardState};
use crate::components::keybindings::{KeyAction, KeybindingContext};
use crate::error::{ConsoleError, Result};
use crate::probes::Probes;
use crate::screens::ScreenId;
use crate::settings::ConsoleSettings;
use crate::types::SelectOption;
use crate::ui::view::View;
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use tracing::debug;

/// Behaviour attached to a view.
///
/// Hooks run on the render thread only. Anything slow belongs in a
/// `Transition::Run` task.
pub trait Screen {
    /// Runs before the view becomes visible, and again when focus returns
    /// to it. Sets defaults, titles and notes.
    fn pre_show(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs after the view is hidden
    fn post_close(&mut self, _ctx: &mut Context<'_>) -> Result<()> {
        Ok(())
    }

    /// Handle a navigation key while this view has focus
    fn on_key(&mut self, action: KeyAction, ctx: &mut Context<'_>) -> Result<Transition>;
}

/// Everything a screen hook may touch
pub struct Context<'a> {
    pub registry: &'a mut ScreenRegistry,
    pub wizard: &'a mut WizardState,
    pub probes: &'a Probes,
    pub settings: &'a ConsoleSettings,
    pub keys: &'a KeybindingContext,
    pub updates: &'a Sender<UiEvent>,
}

impl Context<'_> {
    /// Current text of an input, or value of a select
    pub fn value(&self, id: ScreenId) -> Result<String> {
        Ok(self.registry.get(id)?.data().unwrap_or_default())
    }

    pub fn set_text(&mut self, id: ScreenId, text: impl Into<String>) -> Result<()> {
        self.registry.set_text(id, text)
    }

    /// Put a message in a panel and make sure it is visible
    pub fn report(&mut self, id: ScreenId, message: impl Into<String>) -> Result<()> {
        self.registry.set_text(id, message)?;
        self.registry.reveal(id)
    }

    pub fn set_default(&mut self, id: ScreenId, value: impl Into<String>) -> Result<()> {
        self.registry.get_mut(id)?.default_value = Some(value.into());
        Ok(())
    }

    pub fn set_options(&mut self, id: ScreenId, options: Vec<SelectOption>) -> Result<()> {
        self.registry.get_mut(id)?.set_options(options);
        Ok(())
    }
}

struct Entry {
    view: View,
    behavior: Option<Box<dyn Screen>>,
}

/// Named repository of screens
#[derive(Default)]
pub struct ScreenRegistry {
    entries: HashMap<ScreenId, Entry>,
    /// Registration order doubles as drawing order
    order: Vec<ScreenId>,
    dirty: bool,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a screen. Registering the same id twice is an error.
    pub fn register(&mut self, view: View, behavior: Option<Box<dyn Screen>>) -> Result<()> {
        let id = view.id;
        if self.entries.contains_key(&id) {
            return Err(ConsoleError::DuplicateScreen(id));
        }
        self.entries.insert(id, Entry { view, behavior });
        self.order.push(id);
        Ok(())
    }

    /// Store a view without behaviour
    pub fn register_panel(&mut self, view: View) -> Result<()> {
        self.register(view, None)
    }

    pub fn get(&self, id: ScreenId) -> Result<&View> {
        self.entries
            .get(&id)
            .map(|e| &e.view)
            .ok_or(ConsoleError::ScreenNotFound(id))
    }

    pub fn get_mut(&mut self, id: ScreenId) -> Result<&mut View> {
        self.dirty = true;
        self.entries
            .get_mut(&id)
            .map(|e| &mut e.view)
            .ok_or(ConsoleError::ScreenNotFound(id))
    }

    pub fn is_visible(&self, id: ScreenId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.view.visible)
    }

    /// Visible views in drawing order
    pub fn visible_views(&self) -> impl Iterator<Item = &View> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(|e| &e.view)
            .filter(|v| v.visible)
    }

    /// Run `pre_show`, then mark visible. A view going from closed to
    /// shown has its buffer reset from its default value.
    pub fn show(&mut self, id: ScreenId, session: &mut Session) -> Result<()> {
        let was_visible = self.get(id)?.visible;
        self.with_behavior(id, session, |screen, ctx| screen.pre_show(ctx))?;

        let view = self.get_mut(id)?;
        if !was_visible {
            view.apply_default();
        }
        view.visible = true;
        debug!("Showing screen {}", id);
        Ok(())
    }

    /// Run `post_close` on a visible view, then hide it
    pub fn close(&mut self, id: ScreenId, session: &mut Session) -> Result<()> {
        if !self.get(id)?.visible {
            return Ok(());
        }
        self.get_mut(id)?.visible = false;
        self.with_behavior(id, session, |screen, ctx| screen.post_close(ctx))?;
        debug!("Closed screen {}", id);
        Ok(())
    }

    /// Hand a navigation key to the screen's behaviour
    pub fn dispatch(
        &mut self,
        id: ScreenId,
        action: KeyAction,
        session: &mut Session,
    ) -> Result<Transition> {
        Ok(self
            .with_behavior(id, session, |screen, ctx| screen.on_key(action, ctx))?
            .unwrap_or(Transition::Unhandled))
    }

    /// Run a callback with a context borrowing this registry and the session
    pub fn with_context<R>(
        &mut self,
        session: &mut Session,
        f: impl FnOnce(&mut Context<'_>) -> R,
    ) -> R {
        let mut ctx = Context {
            registry: self,
            wizard: &mut session.wizard,
            probes: &session.probes,
            settings: &session.settings,
            keys: &session.keys,
            updates: &session.updates,
        };
        f(&mut ctx)
    }

    /// The behaviour is taken out of its slot while it runs so it can be
    /// handed a context that borrows the registry mutably.
    fn with_behavior<R>(
        &mut self,
        id: ScreenId,
        session: &mut Session,
        f: impl FnOnce(&mut dyn Screen, &mut Context<'_>) -> Result<R>,
    ) -> Result<Option<R>> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(ConsoleError::ScreenNotFound(id))?;
        let Some(mut behavior) = entry.behavior.take() else {
            return Ok(None);
        };

        let result = self.with_context(session, |ctx| f(behavior.as_mut(), ctx));

        if let Some(entry) = self.entries.get_mut(&id) {
            entry.behavior = Some(behavior);
        }
        result.map(Some)
    }

    pub fn set_text(&mut self, id: ScreenId, text: impl Into<String>) -> Result<()> {
        self.get_mut(id)?.text = text.into();
        Ok(())
    }

    /// Make a view visible without running hooks
    pub fn reveal(&mut self, id: ScreenId) -> Result<()> {
        self.get_mut(id)?.visible = true;
        Ok(())
    }

    /// Hide a view without running hooks
    pub fn hide(&mut self, id: ScreenId) -> Result<()> {
        self.get_mut(id)?.visible = false;
        Ok(())
    }

    /// Force a redraw, e.g. after the terminal was handed to another program
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether anything changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
