use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::app::App;

/// Tree name on the left, index status on the right
pub fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let title = format!(" {}", app.title);
    let status = match app.session.index() {
        Some(index) => format!(
            "{} nodes · {} words",
            app.session.view().store().len(),
            index.len()
        ),
        None => format!("{}…", app.session.builder().phase()),
    };

    let mut spans = vec![Span::styled(
        title.clone(),
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    let used = title.width() + status.width();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        spans.push(Span::styled(status, Style::default().fg(app.theme.dim).bg(bg)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_build_phase_until_ready() {
        let mut app = sample_app();
        app.start_index();
        let output = render_to_string(40, 1, |frame, area| render_title_bar(frame, &app, area));
        assert!(output.ends_with("loading documents…"), "{output}");

        app.tick();
        let output = render_to_string(40, 1, |frame, area| render_title_bar(frame, &app, area));
        assert_eq!(output, format!(" Preferences{}4 nodes · 7 words", " ".repeat(11)));
    }
}
