use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

/// Filter prompt: every edit re-runs the query
pub(super) fn handle_filter(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.filter_input.clear();
            app.set_filter("");
            app.mode = Mode::Navigate;
        }
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
        }
        KeyCode::Backspace => {
            app.filter_input.pop();
            let text = app.filter_input.clone();
            app.set_filter(&text);
        }
        KeyCode::Up => {
            app.session.move_selection(-1);
        }
        KeyCode::Down => {
            app.session.move_selection(1);
        }
        KeyCode::Char(c) => {
            app.filter_input.push(c);
            let text = app.filter_input.clone();
            app.set_filter(&text);
        }
        _ => {}
    }
}
