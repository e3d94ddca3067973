//! Console controller
//!
//! Owns the screen registry, the focus chain, the session and the update
//! channel. Key events and channel messages are both applied here, one at
//! a time, on the render thread.

use crate::app::navigation::{FocusMove, Navigator, Step, Transition};
use crate::app::state::{Session, WizardState};
use crate::app::tasks::{BackgroundTask, TaskRunner, UiEvent};
use crate::components::keybindings::KeyAction;
use crate::error::{ConsoleError, Result};
use crate::probes::Probes;
use crate::screens::{self, ScreenId, dashboard};
use crate::settings::ConsoleSettings;
use crate::status::{self, NodeRole, PollerHandle};
use crate::ui::ScreenRegistry;
use crate::ui::view::SpinnerState;
use crossterm::event::KeyEvent;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lines kept in the install output panel
const MAX_INSTALL_LINES: usize = 500;

/// Which screen set the console drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleMode {
    Install,
    Dashboard,
}

/// Why the console stopped handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// The admin credential was accepted; run a shell, then resume
    Shell,
}

pub struct Console {
    registry: ScreenRegistry,
    navigator: Navigator,
    session: Session,
    tasks: TaskRunner,
    updates: Receiver<UiEvent>,
    mode: ConsoleMode,
    exit: Option<ExitReason>,
    pollers: Vec<PollerHandle>,
}

impl Console {
    fn new(probes: Probes, settings: ConsoleSettings, mode: ConsoleMode) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            registry: ScreenRegistry::new(),
            navigator: Navigator::new(),
            session: Session::new(probes, settings, tx),
            tasks: TaskRunner::new(),
            updates: rx,
            mode,
            exit: None,
            pollers: Vec::new(),
        }
    }

    /// Console running the installation wizard, first step shown
    pub fn install(probes: Probes, settings: ConsoleSettings) -> Result<Self> {
        let mut console = Self::new(probes, settings, ConsoleMode::Install);
        screens::build_install_screens(&mut console.registry)?;
        for id in screens::INSTALL_PANELS {
            console.registry.reveal(id)?;
        }
        console.apply(Transition::advance(Vec::new(), screens::install_entry()))?;
        info!("Install wizard ready");
        Ok(console)
    }

    /// Console showing the dashboard; starts the status and URL pollers
    pub fn dashboard(probes: Probes, settings: ConsoleSettings, role: NodeRole) -> Result<Self> {
        let mut console = Self::new(probes, settings, ConsoleMode::Dashboard);
        screens::build_dashboard_screens(&mut console.registry)?;
        for id in screens::DASHBOARD_PANELS {
            console.registry.reveal(id)?;
        }
        let hint = console
            .session
            .keys
            .hint(ConsoleMode::Dashboard, KeyAction::ToShell)
            .unwrap_or_default();
        console.registry.set_text(ScreenId::DashboardFooter, hint)?;

        let tx = console.session.updates.clone();
        console.pollers.push(status::spawn_status_poller(
            &console.session.probes,
            &console.session.settings,
            role,
            tx.clone(),
        )?);
        console.pollers.push(status::spawn_url_poller(
            &console.session.probes,
            &console.session.settings,
            tx,
        )?);
        info!("Dashboard ready ({:?})", role);
        Ok(console)
    }

    pub fn mode(&self) -> ConsoleMode {
        self.mode
    }

    pub fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    /// Direct view access, e.g. to type into an input from tests
    pub fn registry_mut(&mut self) -> &mut ScreenRegistry {
        &mut self.registry
    }

    pub fn wizard(&self) -> &WizardState {
        &self.session.wizard
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.session.settings
    }

    /// Screen receiving keys
    pub fn focused(&self) -> Option<ScreenId> {
        self.navigator.focused()
    }

    pub fn focus_chain(&self) -> &[ScreenId] {
        self.navigator.chain()
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.pending_count()
    }

    /// Whether anything visible changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        self.registry.take_dirty()
    }

    /// Translate a terminal key event and handle it
    pub fn handle_key(&mut self, event: KeyEvent) -> Result<()> {
        match self.session.keys.resolve(self.mode, &event) {
            Some(action) => self.handle_action(action),
            None => Ok(()),
        }
    }

    /// Handle one key action against the focused screen
    pub fn handle_action(&mut self, action: KeyAction) -> Result<()> {
        match action {
            KeyAction::Quit => {
                info!("Quit requested");
                self.exit = Some(ExitReason::Quit);
                return Ok(());
            }
            KeyAction::ToShell => {
                if self.mode == ConsoleMode::Dashboard
                    && !self.registry.is_visible(ScreenId::AdminPassword)
                {
                    self.apply(dashboard::open_shell_prompt())?;
                }
                return Ok(());
            }
            _ => {}
        }

        if self.navigator.is_locked() {
            debug!("Ignoring {:?} while a task is running", action);
            return Ok(());
        }
        let Some(focused) = self.navigator.focused() else {
            return Ok(());
        };

        let is_select = self.registry.get(focused)?.is_select();
        match action {
            KeyAction::Input(c) => {
                self.registry.get_mut(focused)?.input_char(c);
                return Ok(());
            }
            KeyAction::Erase => {
                self.registry.get_mut(focused)?.erase();
                return Ok(());
            }
            KeyAction::Previous | KeyAction::Next if is_select => {
                self.registry
                    .get_mut(focused)?
                    .move_cursor(action == KeyAction::Next);
                return Ok(());
            }
            _ => {}
        }

        let transition = self.registry.dispatch(focused, action, &mut self.session)?;
        if matches!(transition, Transition::Unhandled) {
            self.fallback(action)
        } else {
            self.apply(transition)
        }
    }

    /// Generic focus movement for keys the screen left alone. Moving past
    /// either end of the chain acts as confirm or back on the focused screen.
    fn fallback(&mut self, action: KeyAction) -> Result<()> {
        let (movement, edge_action) = match action {
            KeyAction::Next => (self.navigator.focus_next(), KeyAction::Confirm),
            KeyAction::Previous => (self.navigator.focus_previous(), KeyAction::Back),
            _ => return Ok(()),
        };
        match movement {
            FocusMove::Moved(id) => self.refocus(id),
            FocusMove::PastEnd | FocusMove::BeforeStart => {
                let Some(focused) = self.navigator.focused() else {
                    return Ok(());
                };
                let transition = self
                    .registry
                    .dispatch(focused, edge_action, &mut self.session)?;
                self.apply(transition)
            }
            FocusMove::Idle => Ok(()),
        }
    }

    /// Carry out what a handler asked for
    pub fn apply(&mut self, transition: Transition) -> Result<()> {
        debug!("Applying {:?}", transition);
        match transition {
            Transition::Unhandled | Transition::Stay => Ok(()),
            Transition::Advance { close, step } | Transition::Back { close, step } => {
                self.show_next(close, step)
            }
            Transition::FocusNext => match self.navigator.focus_next() {
                FocusMove::Moved(id) => self.refocus(id),
                _ => Ok(()),
            },
            Transition::FocusPrevious => match self.navigator.focus_previous() {
                FocusMove::Moved(id) => self.refocus(id),
                _ => Ok(()),
            },
            Transition::Run(task) => self.start_task(task),
            Transition::Halt { close } => {
                for id in close {
                    self.registry.close(id, &mut self.session)?;
                }
                self.navigator.clear();
                Ok(())
            }
            Transition::Shell => {
                self.exit = Some(ExitReason::Shell);
                Ok(())
            }
            Transition::Quit => {
                self.exit = Some(ExitReason::Quit);
                Ok(())
            }
        }
    }

    /// Close `close`, show every screen of `step` in order and make it the
    /// focus chain. The focused screen is shown last so its title wins.
    fn show_next(&mut self, close: Vec<ScreenId>, step: Step) -> Result<()> {
        self.clear_validators()?;
        for id in close {
            self.registry.close(id, &mut self.session)?;
        }
        let screens = step.screens.clone();
        self.navigator.set_step(step);
        let focused = self.navigator.focused();
        for id in screens.into_iter().filter(|id| Some(*id) != focused) {
            self.registry.show(id, &mut self.session)?;
        }
        match focused {
            Some(id) => self.registry.show(id, &mut self.session),
            None => Ok(()),
        }
    }

    /// Re-run `pre_show` on a screen that just received focus
    fn refocus(&mut self, id: ScreenId) -> Result<()> {
        self.registry.show(id, &mut self.session)
    }

    fn clear_validators(&mut self) -> Result<()> {
        for id in [ScreenId::Validator, ScreenId::NetworkValidator] {
            if self.registry.get(id).is_ok() {
                self.registry.set_text(id, "")?;
            }
        }
        Ok(())
    }

    fn start_task(&mut self, task: BackgroundTask) -> Result<()> {
        let description = task.description.clone();
        if self.tasks.start(task, &self.session.updates)?.is_none() {
            return Ok(());
        }
        let spinner = self.registry.get_mut(ScreenId::Spinner)?;
        spinner.set_spinner(SpinnerState::Running {
            message: description,
        });
        spinner.visible = true;
        self.navigator.lock(ScreenId::Spinner);
        Ok(())
    }

    /// Apply every queued update without blocking; returns how many ran
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.updates.try_recv() {
            self.dispatch_update(event);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for one update and apply it
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        match self.updates.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch_update(event);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn dispatch_update(&mut self, event: UiEvent) {
        debug!("Update {:?}", event);
        if let Err(e) = self.handle_update(event) {
            self.report_error(&e);
        }
    }

    fn handle_update(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::TaskFinished { id, outcome } => {
                let Some(pending) = self.tasks.take(id) else {
                    return Ok(());
                };
                self.navigator.unlock();

                if !self.registry.is_visible(pending.origin) {
                    debug!(
                        "Discarding result of task {} for {}: screen no longer shown",
                        id, pending.origin
                    );
                    self.reset_spinner()?;
                    return Ok(());
                }

                match &outcome {
                    Ok(_) => self.reset_spinner()?,
                    Err(e) => {
                        warn!("{} failed: {}", pending.description, e);
                        self.registry
                            .get_mut(ScreenId::Spinner)?
                            .set_spinner(SpinnerState::Failed {
                                message: e.to_string(),
                            });
                    }
                }
                let transition = self
                    .registry
                    .with_context(&mut self.session, |ctx| pending.complete(outcome, ctx))?;
                self.apply(transition)
            }
            UiEvent::Status(rendered) => self
                .registry
                .set_text(ScreenId::Status, dashboard::status_text(&rendered)),
            UiEvent::ManagementUrl(url) => self
                .registry
                .set_text(ScreenId::Url, dashboard::url_text(&url)),
            UiEvent::InstallOutput(line) => self.append_install_line(&line),
            UiEvent::InstallFinished { success, message } => {
                if success {
                    info!("{}", message);
                } else {
                    error!("{}", message);
                }
                self.append_install_line(&message)
            }
        }
    }

    fn reset_spinner(&mut self) -> Result<()> {
        let spinner = self.registry.get_mut(ScreenId::Spinner)?;
        spinner.set_spinner(SpinnerState::Idle);
        spinner.visible = false;
        Ok(())
    }

    fn append_install_line(&mut self, line: &str) -> Result<()> {
        let view = self.registry.get_mut(ScreenId::Install)?;
        if !view.text.is_empty() {
            view.text.push('\n');
        }
        view.text.push_str(line);

        let count = view.text.lines().count();
        if count > MAX_INSTALL_LINES {
            let kept: Vec<&str> = view.text.lines().skip(count - MAX_INSTALL_LINES).collect();
            view.text = kept.join("\n");
        }
        Ok(())
    }

    /// Log an unexpected handler error and show it in the inline error area
    pub fn report_error(&mut self, err: &ConsoleError) {
        error!("Console error: {}", err);
        let target = match self.mode {
            ConsoleMode::Install => ScreenId::Validator,
            ConsoleMode::Dashboard => ScreenId::AdminValidator,
        };
        let shown = self
            .registry
            .set_text(target, err.to_string())
            .and_then(|()| self.registry.reveal(target));
        if let Err(e) = shown {
            error!("Failed to display error: {}", e);
        }
    }

    /// Come back from the shell: dashboard visible, prompt closed
    pub fn resume(&mut self) -> Result<()> {
        self.exit = None;
        self.apply(Transition::halt([ScreenId::AdminPassword]))?;
        self.registry.mark_dirty();
        Ok(())
    }

    /// Stop the dashboard pollers
    pub fn stop_pollers(&mut self) {
        for poller in &mut self.pollers {
            poller.cancel();
        }
    }
}
