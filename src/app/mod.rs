//! Application module
//!
//! Contains the console controller, wizard state and the render loop.
//!
//! # Module Structure
//! - `state` - Wizard answers, target configuration and the session context
//! - `navigation` - Steps, transitions and the focus chain
//! - `tasks` - Background probes and the update channel messages
//! - `console` - Applies keys and updates to the screens
//! - Main module - App struct and event loop

mod console;
mod navigation;
mod state;
mod tasks;

#[cfg(test)]
pub(crate) mod testing;

pub use console::{Console, ConsoleMode, ExitReason};
pub use navigation::{FocusMove, Navigator, Step, Transition};
pub use state::{
    DEFAULT_DNS_SERVERS, InstallData, NetworkHints, Session, WizardState, random_hostname,
};
pub use tasks::{BackgroundTask, PendingTask, TaskId, TaskOutcome, TaskRunner, TaskValue, UiEvent};

use crate::error::Result;
use crate::ui;
use crossterm::event::{Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::time::Duration;
use tracing::info;

/// Render loop around a console
pub struct App {
    console: Console,
}

impl App {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Run the main loop until the console asks to exit.
    ///
    /// Handler errors are shown in the console; only terminal errors end
    /// the loop early.
    pub fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ) -> Result<ExitReason> {
        info!("Starting main application loop");
        let mut redraw = true;

        loop {
            // Apply probe results, status lines and installer output
            if self.console.pump() > 0 {
                redraw = true;
            }

            if let Some(reason) = self.console.exit_reason() {
                info!("Leaving main loop: {:?}", reason);
                return Ok(reason);
            }

            // The spinner animates while a task runs
            if redraw || self.console.take_dirty() || self.console.pending_tasks() > 0 {
                terminal.draw(|f| ui::render(f, self.console.registry(), self.console.focused()))?;
                redraw = false;
            }

            // Handle input events
            if crossterm::event::poll(Duration::from_millis(50))? {
                match crossterm::event::read()? {
                    Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                        if let Err(e) = self.console.handle_key(key_event) {
                            self.console.report_error(&e);
                        }
                        redraw = true;
                    }
                    Event::Resize(_, _) => redraw = true,
                    _ => {}
                }
            }
        }
    }
}
