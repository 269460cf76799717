pub mod status_row;
pub mod title_bar;
pub mod tree_pane;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::App;

/// Main render function: title bar, tree, status row
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(1),    // tree
            Constraint::Length(1), // status row
        ])
        .split(area);

    title_bar::render_title_bar(frame, app, chunks[0]);
    tree_pane::render_tree_pane(frame, app, chunks[1]);
    status_row::render_status_row(frame, app, chunks[2]);
}

/// Cut `text` to `max` display columns, ending in `…` when shortened.
pub(super) fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
