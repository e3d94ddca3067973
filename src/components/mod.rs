//! Reusable input components

pub mod keybindings;

pub use keybindings::{KeyAction, Keybinding, KeybindingContext};
