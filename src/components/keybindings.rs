//! Keybinding system for context-aware keyboard shortcuts
//!
//! Maps crossterm key events to console actions. The install wizard and the
//! dashboard bind different keys; text editing keys are handled the same way
//! everywhere.

use crate::app::ConsoleMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Actions that can be triggered by keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Enter: accept the focused screen
    Confirm,
    /// Esc: return to the previous step
    Back,
    /// Up: previous screen of the step, or previous list entry
    Previous,
    /// Down: next screen of the step, or next list entry
    Next,
    /// Leave the dashboard for a shell
    ToShell,
    Quit,
    /// Printable character typed into an input
    Input(char),
    /// Backspace in an input
    Erase,
}

impl KeyAction {
    /// Whether this is a navigation action a screen may handle
    pub fn is_navigation(self) -> bool {
        matches!(self, Self::Confirm | Self::Back | Self::Previous | Self::Next)
    }
}

/// A keybinding definition
#[derive(Debug, Clone)]
pub struct Keybinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub action: KeyAction,
    pub display: String,
    pub description: String,
}

impl Keybinding {
    /// Create a new keybinding with no modifiers
    pub fn new(key: KeyCode, action: KeyAction, display: &str, description: &str) -> Self {
        Self {
            key,
            modifiers: KeyModifiers::NONE,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    /// Create a keybinding with modifiers
    pub fn with_modifiers(
        key: KeyCode,
        modifiers: KeyModifiers,
        action: KeyAction,
        display: &str,
        description: &str,
    ) -> Self {
        Self {
            key,
            modifiers,
            action,
            display: display.to_string(),
            description: description.to_string(),
        }
    }

    fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && event.modifiers.contains(self.modifiers)
    }
}

/// Context-aware keybinding registry
pub struct KeybindingContext {
    /// Mode-specific keybindings
    mode_bindings: HashMap<ConsoleMode, Vec<Keybinding>>,
    /// Global keybindings (available in all modes)
    global_bindings: Vec<Keybinding>,
}

impl Default for KeybindingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeybindingContext {
    /// Create a new keybinding context with default bindings
    pub fn new() -> Self {
        let mut ctx = Self {
            mode_bindings: HashMap::new(),
            global_bindings: Vec::new(),
        };
        ctx.register_defaults();
        ctx
    }

    fn register_defaults(&mut self) {
        self.global_bindings = vec![Keybinding::with_modifiers(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyAction::Quit,
            "Ctrl+C",
            "quit",
        )];

        let form_bindings = vec![
            Keybinding::new(KeyCode::Enter, KeyAction::Confirm, "Enter", "confirm"),
            Keybinding::new(KeyCode::Esc, KeyAction::Back, "ESC", "go back to previous section"),
            Keybinding::new(KeyCode::Up, KeyAction::Previous, "Up", "previous field"),
            Keybinding::new(KeyCode::Down, KeyAction::Next, "Down", "next field"),
        ];

        self.mode_bindings
            .insert(ConsoleMode::Install, form_bindings.clone());

        let mut dashboard = form_bindings;
        dashboard.push(Keybinding::new(
            KeyCode::F(12),
            KeyAction::ToShell,
            "F12",
            "switch between Harvester console and Shell",
        ));
        self.mode_bindings.insert(ConsoleMode::Dashboard, dashboard);
    }

    /// Get keybindings for a specific mode (includes global bindings)
    pub fn get_bindings(&self, mode: ConsoleMode) -> Vec<&Keybinding> {
        let mut bindings: Vec<&Keybinding> = self.global_bindings.iter().collect();
        if let Some(mode_bindings) = self.mode_bindings.get(&mode) {
            bindings.extend(mode_bindings.iter());
        }
        bindings
    }

    /// Map a key event to an action. Unbound printable keys become text input.
    pub fn resolve(&self, mode: ConsoleMode, event: &KeyEvent) -> Option<KeyAction> {
        if let Some(binding) = self
            .get_bindings(mode)
            .into_iter()
            .find(|b| b.matches(event))
        {
            return Some(binding.action);
        }

        match event.code {
            KeyCode::Backspace => Some(KeyAction::Erase),
            KeyCode::Char(c)
                if !event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(KeyAction::Input(c))
            }
            _ => None,
        }
    }

    /// Footer hint for a bound action, e.g. `<Use ESC to go back to previous section>`
    pub fn hint(&self, mode: ConsoleMode, action: KeyAction) -> Option<String> {
        self.get_bindings(mode)
            .into_iter()
            .find(|b| b.action == action)
            .map(|b| format!("<Use {} to {}>", b.display, b.description))
    }
}
