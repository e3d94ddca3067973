//! Navigation controller
//!
//! Every screen change funnels through `Console::apply`. A step is an
//! ordered list of screens shown together; Up/Down walk focus along that
//! list. The navigator knows nothing about the wizard: screens decide where
//! to go by returning a `Transition`.

use crate::app::tasks::BackgroundTask;
use crate::screens::ScreenId;

/// Screens shown together, and which of them takes focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub screens: Vec<ScreenId>,
    pub focus: usize,
}

impl Step {
    pub fn one(id: ScreenId) -> Self {
        Self {
            screens: vec![id],
            focus: 0,
        }
    }

    /// Several screens, focus on the first
    pub fn chain(screens: impl Into<Vec<ScreenId>>) -> Self {
        Self {
            screens: screens.into(),
            focus: 0,
        }
    }

    /// Move initial focus to `id` if it is part of the step
    pub fn focus_on(mut self, id: ScreenId) -> Self {
        if let Some(index) = self.screens.iter().position(|s| *s == id) {
            self.focus = index;
        }
        self
    }
}

/// What a key handler asks the controller to do
pub enum Transition {
    /// The handler did not consume the key; generic focus movement applies
    Unhandled,
    /// Consumed; nothing to navigate
    Stay,
    /// Close screens, then show the next step
    Advance { close: Vec<ScreenId>, step: Step },
    /// Close screens, then show the previous step
    Back { close: Vec<ScreenId>, step: Step },
    FocusNext,
    FocusPrevious,
    /// Start a background probe
    Run(BackgroundTask),
    /// Close screens and leave nothing focused
    Halt { close: Vec<ScreenId> },
    /// Leave the console and start a shell
    Shell,
    Quit,
}

impl Transition {
    pub fn advance(close: impl Into<Vec<ScreenId>>, step: Step) -> Self {
        Self::Advance {
            close: close.into(),
            step,
        }
    }

    pub fn back(close: impl Into<Vec<ScreenId>>, step: Step) -> Self {
        Self::Back {
            close: close.into(),
            step,
        }
    }

    pub fn halt(close: impl Into<Vec<ScreenId>>) -> Self {
        Self::Halt {
            close: close.into(),
        }
    }

    /// Show a screen again without closing anything, e.g. after a failed probe
    pub fn redisplay(id: ScreenId) -> Self {
        Self::advance(Vec::new(), Step::one(id))
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unhandled => write!(f, "Unhandled"),
            Self::Stay => write!(f, "Stay"),
            Self::Advance { close, step } => write!(f, "Advance({:?} -> {:?})", close, step),
            Self::Back { close, step } => write!(f, "Back({:?} -> {:?})", close, step),
            Self::FocusNext => write!(f, "FocusNext"),
            Self::FocusPrevious => write!(f, "FocusPrevious"),
            Self::Run(task) => write!(f, "Run({:?})", task),
            Self::Halt { close } => write!(f, "Halt({:?})", close),
            Self::Shell => write!(f, "Shell"),
            Self::Quit => write!(f, "Quit"),
        }
    }
}

/// Result of walking focus along the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    Moved(ScreenId),
    /// Next pressed on the last screen
    PastEnd,
    /// Previous pressed on the first screen
    BeforeStart,
    /// Nothing is focused
    Idle,
}

/// Focus chain over the current step
#[derive(Debug, Default)]
pub struct Navigator {
    chain: Vec<ScreenId>,
    focus: usize,
    /// Screen holding focus while a background task runs
    locked_by: Option<ScreenId>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt `step` as the focus chain. The caller has already shown its screens.
    pub fn set_step(&mut self, step: Step) {
        self.focus = step.focus.min(step.screens.len().saturating_sub(1));
        self.chain = step.screens;
    }

    /// Screen that receives keys
    pub fn focused(&self) -> Option<ScreenId> {
        self.locked_by
            .or_else(|| self.chain.get(self.focus).copied())
    }

    pub fn chain(&self) -> &[ScreenId] {
        &self.chain
    }

    pub fn focus_next(&mut self) -> FocusMove {
        if self.chain.is_empty() || self.locked_by.is_some() {
            return FocusMove::Idle;
        }
        if self.focus + 1 < self.chain.len() {
            self.focus += 1;
            FocusMove::Moved(self.chain[self.focus])
        } else {
            FocusMove::PastEnd
        }
    }

    pub fn focus_previous(&mut self) -> FocusMove {
        if self.chain.is_empty() || self.locked_by.is_some() {
            return FocusMove::Idle;
        }
        if self.focus > 0 {
            self.focus -= 1;
            FocusMove::Moved(self.chain[self.focus])
        } else {
            FocusMove::BeforeStart
        }
    }

    /// Route every key to `id` until `unlock`
    pub fn lock(&mut self, id: ScreenId) {
        self.locked_by = Some(id);
    }

    pub fn unlock(&mut self) {
        self.locked_by = None;
    }

    pub fn is_locked(&self) -> bool {
        self.locked_by.is_some()
    }

    /// Drop the chain; no screen has focus afterwards
    pub fn clear(&mut self) {
        self.chain.clear();
        self.focus = 0;
        self.locked_by = None;
    }
}
