//! Centralized theme and styling for the console
//!
//! Single source of truth for the colors and styles the renderer uses, plus
//! the ANSI handling of the dashboard status line.
//!
//! # Usage
//! ```rust
//! use harvester_console::theme::{Styles, ansi_lines, wrap_color, AnsiColor};
//!
//! let status = wrap_color("Running", AnsiColor::Green);
//! let lines = ansi_lines(&status);
//! assert_eq!(lines.len(), 1);
//! let _ = Styles::error();
//! ```

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the console
pub struct Colors;

impl Colors {
    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    /// Primary accent color - used for borders and titles
    pub const PRIMARY: Color = Color::Cyan;

    /// Error/danger feedback
    pub const ERROR: Color = Color::Red;

    /// Warning/caution feedback
    pub const WARNING: Color = Color::Yellow;

    /// Active border color
    pub const BORDER_ACTIVE: Color = Color::Cyan;

    /// Inactive/unfocused border color
    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    /// Selected item highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Selected item text (for contrast on yellow bg)
    pub const SELECTED_FG: Color = Color::Black;

    /// Unselected list item
    pub const UNSELECTED: Color = Color::Gray;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    /// Muted text, used for the footer hints
    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Step title (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    /// Selected/highlighted list entry
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn unselected() -> Style {
        Style::default().fg(Colors::UNSELECTED)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }
}

// =============================================================================
// ANSI STATUS COLORS
// =============================================================================

/// The eight base terminal colors, numbered as in SGR `3x`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl AnsiColor {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            7 => Self::White,
            _ => return None,
        })
    }

    fn color(self) -> Color {
        match self {
            Self::Black => Color::Black,
            Self::Red => Color::Red,
            Self::Green => Color::Green,
            Self::Yellow => Color::Yellow,
            Self::Blue => Color::Blue,
            Self::Magenta => Color::Magenta,
            Self::Cyan => Color::Cyan,
            Self::White => Color::White,
        }
    }
}

/// Foreground color plus reverse video, reset at the end
pub fn wrap_color(text: &str, color: AnsiColor) -> String {
    format!("\x1b[3{};7m{}\x1b[0m", color as u8, text)
}

fn apply_sgr(style: Style, params: &str) -> Style {
    let mut style = style;
    let codes = params.split(';').map(|p| p.parse::<u8>().unwrap_or(0));
    for code in codes {
        style = match code {
            0 => Style::default(),
            1 => style.add_modifier(Modifier::BOLD),
            7 => style.add_modifier(Modifier::REVERSED),
            27 => style.remove_modifier(Modifier::REVERSED),
            30..=37 => match AnsiColor::from_code(code - 30) {
                Some(c) => style.fg(c.color()),
                None => style,
            },
            39 => style.fg(Color::Reset),
            40..=47 => match AnsiColor::from_code(code - 40) {
                Some(c) => style.bg(c.color()),
                None => style,
            },
            49 => style.bg(Color::Reset),
            _ => style,
        };
    }
    style
}

/// Decode text carrying SGR escape sequences into styled lines.
///
/// Styles carry over line breaks; unsupported sequences are dropped.
pub fn ansi_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut style = Style::default();
    let mut chars = text.chars().peekable();

    let flush = |current: &mut String, spans: &mut Vec<Span<'static>>, style: Style| {
        if !current.is_empty() {
            spans.push(Span::styled(std::mem::take(current), style));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '\x1b' if chars.peek() == Some(&'[') => {
                chars.next();
                let mut params = String::new();
                let mut terminator = None;
                for p in chars.by_ref() {
                    if p.is_ascii_alphabetic() {
                        terminator = Some(p);
                        break;
                    }
                    params.push(p);
                }
                if terminator == Some('m') {
                    flush(&mut current, &mut spans, style);
                    style = apply_sgr(style, &params);
                }
            }
            '\n' => {
                flush(&mut current, &mut spans, style);
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut spans, style);
    lines.push(Line::from(spans));
    lines
}
