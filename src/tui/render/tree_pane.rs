use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::truncate_to_width;
use crate::tui::app::App;
use crate::view::RowInfo;

fn marker(row: &RowInfo<'_>) -> &'static str {
    match (row.is_expandable, row.is_open) {
        (true, true) => "▾ ",
        (true, false) => "▸ ",
        (false, _) => "· ",
    }
}

/// Render the visible rows, scrolled so the selection stays in view
pub fn render_tree_pane(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let view = app.session.view();
    let count = view.visible_row_count();
    let height = area.height as usize;
    let width = area.width as usize;

    if count == 0 {
        let message = if app.session.is_filtering() {
            format!("no matches for \"{}\"", app.session.filter_text().trim())
        } else {
            "nothing to show".to_string()
        };
        let line = Line::from(Span::styled(
            truncate_to_width(&message, width),
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let selected = app.session.selected_row();
    let offset = {
        let mut vp = app.viewport.borrow_mut();
        vp.height = height;
        if let Some(row) = vp.reveal.take() {
            vp.scroll_to(row);
        }
        if let Some(row) = selected {
            vp.scroll_to(row);
        }
        vp.offset = vp.offset.min(count.saturating_sub(height));
        vp.offset
    };

    let mut lines = Vec::with_capacity(height);
    for i in offset..(offset + height).min(count) {
        let Some(row) = view.row(i) else {
            break;
        };
        let is_selected = selected == Some(i);
        let indent = "  ".repeat(row.depth);
        let prefix_width = indent.len() + 2;
        let label = truncate_to_width(row.label, width.saturating_sub(prefix_width));

        let mut style = Style::default().fg(app.theme.text).bg(bg);
        if row.properties.contains(&"advanced") {
            style = style.fg(app.theme.advanced);
        }
        if row.is_container {
            style = style.add_modifier(Modifier::BOLD);
        }
        if is_selected {
            style = style.fg(app.theme.text_bright).bg(app.theme.selection_bg);
        }

        let mut spans = vec![
            Span::styled(indent, style),
            Span::styled(marker(&row), style.fg(app.theme.dim)),
            Span::styled(label, style),
        ];
        if is_selected {
            let used: usize = spans.iter().map(|s| s.width()).sum();
            if used < width {
                spans.push(Span::styled(" ".repeat(width - used), style));
            }
        }
        lines.push(Line::from(spans));
    }
    frame.render_widget(Paragraph::new(lines), area);
}
