//! User interface rendering module
//!
//! - `view` - view data: kind, buffer, placement
//! - `registry` - screen registry and the `Screen` behaviour trait
//!
//! Rendering itself is a single pass over the visible views in registration
//! order; every view clears its rectangle first so later views draw on top.

mod registry;
pub mod view;

pub use registry::{Context, Screen, ScreenRegistry};

use crate::screens::ScreenId;
use crate::theme::{Styles, ansi_lines};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::time::{SystemTime, UNIX_EPOCH};
use view::{SpinnerState, Tone, View, ViewKind};

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Draw every visible view
pub fn render(f: &mut Frame, registry: &ScreenRegistry, focused: Option<ScreenId>) {
    let area = f.area();
    for view in registry.visible_views() {
        let mut rect = view.placement.resolve(area);
        if let ViewKind::Select { options, .. } = &view.kind {
            // Lists grow to fit their text and options
            let needed = (view.text.lines().count() + options.len() + 2) as u16;
            rect.height = rect.height.max(needed).min(area.bottom().saturating_sub(rect.y));
        }
        if rect.width == 0 || rect.height == 0 {
            continue;
        }

        f.render_widget(Clear, rect);
        let is_focused = focused == Some(view.id);
        match &view.kind {
            ViewKind::Panel => render_panel(f, view, rect),
            ViewKind::Input {
                label,
                value,
                secret,
            } => render_input(f, rect, label, value, *secret, is_focused),
            ViewKind::Select { options, cursor } => {
                let items: Vec<ListItem> = options
                    .iter()
                    .map(|o| ListItem::new(o.text.clone()))
                    .collect();
                render_select(f, view, rect, items, *cursor, is_focused)
            }
            ViewKind::Spinner(state) => render_spinner(f, rect, state),
        }
    }
}

fn panel_style(view: &View) -> Style {
    match (view.id, view.tone) {
        (_, Tone::Error) => Styles::error(),
        (ScreenId::Title, _) => Styles::title(),
        (ScreenId::Footer | ScreenId::DashboardFooter, _) => Styles::text_muted(),
        _ => Styles::text(),
    }
}

fn render_panel(f: &mut Frame, view: &View, rect: Rect) {
    let lines: Vec<Line> = match view.tone {
        Tone::Ansi => ansi_lines(&view.text),
        _ => view
            .text
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect(),
    };
    let line_count = lines.len() as u16;

    let mut paragraph = Paragraph::new(lines).style(panel_style(view));
    let mut inner_height = rect.height;
    if let Some(title) = &view.frame_title {
        paragraph = paragraph.block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(title.clone()),
        );
        inner_height = inner_height.saturating_sub(2);
    }
    if view.wrap {
        paragraph = paragraph.wrap(Wrap { trim: false });
    } else if line_count > inner_height {
        // Keep the newest output in view
        paragraph = paragraph.scroll((line_count - inner_height, 0));
    }
    f.render_widget(paragraph, rect);
}

fn render_input(f: &mut Frame, rect: Rect, label: &str, value: &str, secret: bool, focused: bool) {
    let shown = if secret {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let border = if focused {
        Styles::border_active()
    } else {
        Styles::border_inactive()
    };
    let input = Paragraph::new(shown.clone()).style(Styles::text()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(label.to_string()),
    );
    f.render_widget(input, rect);

    if focused {
        let max_x = rect.right().saturating_sub(2);
        let x = (rect.x + 1 + shown.chars().count() as u16).min(max_x);
        f.set_cursor_position((x, rect.y + 1));
    }
}

fn render_select(
    f: &mut Frame,
    view: &View,
    rect: Rect,
    items: Vec<ListItem>,
    cursor: usize,
    focused: bool,
) {
    let border = if focused {
        Styles::border_active()
    } else {
        Styles::border_inactive()
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let text_lines = view.text.lines().count() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(text_lines), Constraint::Min(0)])
        .split(inner);

    if text_lines > 0 {
        f.render_widget(Paragraph::new(view.text.clone()).style(Styles::text()), chunks[0]);
    }

    let highlight = if focused {
        Styles::selected()
    } else {
        Styles::unselected()
    };
    let list = List::new(items)
        .style(Styles::unselected())
        .highlight_style(highlight)
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(cursor));
    f.render_stateful_widget(list, chunks[1], &mut state);
}

fn render_spinner(f: &mut Frame, rect: Rect, state: &SpinnerState) {
    let line = match state {
        SpinnerState::Idle => return,
        SpinnerState::Running { message } => {
            let tick = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() / 100)
                .unwrap_or(0);
            let frame = SPINNER_FRAMES[(tick % SPINNER_FRAMES.len() as u128) as usize];
            Line::from(vec![
                Span::styled(format!("{} ", frame), Styles::warning()),
                Span::styled(message.clone(), Styles::text()),
            ])
        }
        SpinnerState::Failed { message } => Line::from(Span::styled(message.clone(), Styles::error())),
    };
    f.render_widget(Paragraph::new(line).wrap(Wrap { trim: false }), rect);
}
