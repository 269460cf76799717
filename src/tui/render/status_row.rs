use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, Mode};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (mut spans, hint) = match app.mode {
        Mode::Navigate => {
            if app.session.is_filtering() {
                let spans = vec![Span::styled(
                    format!("/{}", app.session.filter_text()),
                    Style::default().fg(app.theme.dim).bg(bg),
                )];
                (spans, "Esc clear  / edit".to_string())
            } else {
                let advanced = if app.session.view().show_advanced() {
                    "a hide advanced"
                } else {
                    "a show advanced"
                };
                (
                    Vec::new(),
                    format!("/ filter  ⏎ toggle  {}  q quit", advanced),
                )
            }
        }
        Mode::Filter => {
            // Filter prompt: /text▌
            let mut spans = vec![
                Span::styled(
                    format!("/{}", app.filter_input),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
            ];
            if app.session.has_pending() {
                spans.push(Span::styled(
                    "  indexing…",
                    Style::default().fg(app.theme.yellow).bg(bg),
                ));
            }
            let rows = app.session.view().visible_row_count();
            (spans, format!("{} rows  Enter keep  Esc clear", rows))
        }
    };

    let content_width: usize = spans.iter().map(|s| s.content.width()).sum();
    let hint_width = hint.width();
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn status(app: &App) -> String {
        render_to_string(TERM_W, 1, |frame, area| render_status_row(frame, app, area))
    }

    #[test]
    fn navigate_hints() {
        let app = ready_app();
        let output = status(&app);
        assert!(output.trim_start().starts_with("/ filter"));
        assert!(output.ends_with("a show advanced  q quit"));
    }

    #[test]
    fn filter_prompt_with_row_count() {
        let mut app = ready_app();
        app.mode = Mode::Filter;
        app.filter_input = "font".into();
        app.set_filter("font");
        let output = status(&app);
        assert!(output.starts_with("/font▌"));
        assert!(output.ends_with("3 rows  Enter keep  Esc clear"));
    }

    #[test]
    fn deferred_filter_shows_indexing() {
        let mut app = sample_app();
        app.start_index();
        app.mode = Mode::Filter;
        app.filter_input = "font".into();
        app.set_filter("font");
        assert!(status(&app).contains("indexing…"));
    }

    #[test]
    fn active_filter_in_navigate_mode() {
        let mut app = ready_app();
        app.set_filter("show");
        let output = status(&app);
        assert!(output.starts_with("/show"));
        assert!(output.ends_with("Esc clear  / edit"));
    }
}
