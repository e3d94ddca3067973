//! View data for a single screen: what it shows and where.
//!
//! A `View` is the rectangle-and-buffer half of a screen. Its behaviour lives
//! in the `Screen` implementation registered next to it.

use crate::screens::ScreenId;
use crate::types::SelectOption;
use ratatui::layout::Rect;

/// Reference point a placement is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Middle half of the screen, rows counted from a quarter of the height
    Form,
    /// Like `Form` but extends to the right edge
    Note,
    /// Last two rows, full width
    Footer,
    /// 80 columns centred, rows counted from the top
    Banner,
    /// Large framed region for installer output
    Install,
    /// 70 columns centred, rows counted from the top
    Prompt,
    /// 60 columns centred inside a prompt frame
    PromptInner,
}

/// Where a view sits, resolved against the frame size on every draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub anchor: Anchor,
    pub row: i32,
    pub height: u16,
}

impl Placement {
    pub const fn new(anchor: Anchor, row: i32, height: u16) -> Self {
        Self { anchor, row, height }
    }

    /// Resolve to a rectangle inside `area`
    pub fn resolve(&self, area: Rect) -> Rect {
        let (w, h) = (i32::from(area.width), i32::from(area.height));
        let centred = |width: i32| ((w / 2 - width / 2).max(0), width.min(w));

        let (x, y, width, height) = match self.anchor {
            Anchor::Form => (w / 4, h / 4 + self.row, w / 2, i32::from(self.height)),
            Anchor::Note => (w / 4, h / 4 + self.row, w - w / 4, i32::from(self.height)),
            Anchor::Footer => (0, h - 2, w, 2),
            Anchor::Banner => {
                let (x, width) = centred(80);
                (x, self.row, width, i32::from(self.height))
            }
            Anchor::Install => (w / 8, h / 8, w / 8 * 6, h / 8 * 6),
            Anchor::Prompt => {
                let (x, width) = centred(70);
                (x, self.row, width, i32::from(self.height))
            }
            Anchor::PromptInner => {
                let (x, width) = centred(60);
                (x, self.row, width, i32::from(self.height))
            }
        };

        let x = x.clamp(0, w);
        let y = y.clamp(0, h);
        let width = width.clamp(0, w - x);
        let height = height.clamp(0, h - y);
        Rect::new(
            area.x + x as u16,
            area.y + y as u16,
            width as u16,
            height as u16,
        )
    }
}

/// Text colouring of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Normal,
    /// Inline validation errors
    Error,
    /// Text that may carry ANSI colour sequences (status lines)
    Ansi,
}

/// Progress of the background task shown in the spinner view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpinnerState {
    #[default]
    Idle,
    Running { message: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    /// Static text
    Panel,
    /// Single-line text input
    Input {
        label: String,
        value: String,
        secret: bool,
    },
    /// Single-select list
    Select {
        options: Vec<SelectOption>,
        cursor: usize,
    },
    Spinner(SpinnerState),
}

#[derive(Debug, Clone)]
pub struct View {
    pub id: ScreenId,
    pub kind: ViewKind,
    /// Panel text, or the text shown above a select list
    pub text: String,
    pub visible: bool,
    pub placement: Placement,
    pub tone: Tone,
    /// Frame title; `None` draws no frame for panels
    pub frame_title: Option<String>,
    pub wrap: bool,
    /// Value applied when the view goes from closed to shown
    pub default_value: Option<String>,
}

impl View {
    fn new(id: ScreenId, kind: ViewKind, placement: Placement) -> Self {
        Self {
            id,
            kind,
            text: String::new(),
            visible: false,
            placement,
            tone: Tone::Normal,
            frame_title: None,
            wrap: false,
            default_value: None,
        }
    }

    pub fn panel(id: ScreenId, placement: Placement) -> Self {
        Self::new(id, ViewKind::Panel, placement)
    }

    pub fn input(id: ScreenId, label: &str, secret: bool, placement: Placement) -> Self {
        Self::new(
            id,
            ViewKind::Input {
                label: label.to_string(),
                value: String::new(),
                secret,
            },
            placement,
        )
    }

    pub fn select(id: ScreenId, placement: Placement) -> Self {
        Self::new(
            id,
            ViewKind::Select {
                options: Vec::new(),
                cursor: 0,
            },
            placement,
        )
    }

    pub fn spinner(id: ScreenId, placement: Placement) -> Self {
        Self::new(id, ViewKind::Spinner(SpinnerState::Idle), placement)
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_frame(mut self, title: &str) -> Self {
        self.frame_title = Some(title.to_string());
        self
    }

    pub fn with_wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Whether key presses are routed to this view
    pub fn is_interactive(&self) -> bool {
        matches!(self.kind, ViewKind::Input { .. } | ViewKind::Select { .. })
    }

    pub fn is_select(&self) -> bool {
        matches!(self.kind, ViewKind::Select { .. })
    }

    /// Current input text, or the value of the highlighted option
    pub fn data(&self) -> Option<String> {
        match &self.kind {
            ViewKind::Input { value, .. } => Some(value.clone()),
            ViewKind::Select { options, cursor } => options.get(*cursor).map(|o| o.value.clone()),
            ViewKind::Panel => Some(self.text.clone()),
            ViewKind::Spinner(_) => None,
        }
    }

    pub fn set_options(&mut self, new_options: Vec<SelectOption>) {
        if let ViewKind::Select { options, cursor } = &mut self.kind {
            *options = new_options;
            if *cursor >= options.len() {
                *cursor = 0;
            }
        }
    }

    /// Reset the buffer from `default_value`
    pub fn apply_default(&mut self) {
        let default = self.default_value.clone().unwrap_or_default();
        match &mut self.kind {
            ViewKind::Input { value, .. } => *value = default,
            ViewKind::Select { options, cursor } => {
                *cursor = options
                    .iter()
                    .position(|o| o.value == default)
                    .unwrap_or(0);
            }
            ViewKind::Panel | ViewKind::Spinner(_) => {}
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let ViewKind::Input { value, .. } = &mut self.kind {
            value.push(c);
        }
    }

    pub fn erase(&mut self) {
        if let ViewKind::Input { value, .. } = &mut self.kind {
            value.pop();
        }
    }

    /// Move the select cursor; returns false for non-select views
    pub fn move_cursor(&mut self, down: bool) -> bool {
        match &mut self.kind {
            ViewKind::Select { options, cursor } => {
                if down {
                    if *cursor + 1 < options.len() {
                        *cursor += 1;
                    }
                } else {
                    *cursor = cursor.saturating_sub(1);
                }
                true
            }
            _ => false,
        }
    }

    /// Overwrite the input buffer (tests and programmatic prefill)
    pub fn set_value(&mut self, new_value: &str) {
        if let ViewKind::Input { value, .. } = &mut self.kind {
            *value = new_value.to_string();
        }
    }

    pub fn spinner_state(&self) -> Option<&SpinnerState> {
        match &self.kind {
            ViewKind::Spinner(state) => Some(state),
            _ => None,
        }
    }

    pub fn set_spinner(&mut self, state: SpinnerState) {
        if let ViewKind::Spinner(current) = &mut self.kind {
            *current = state;
        }
    }
}
