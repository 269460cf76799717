mod filter;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use filter::handle_filter;
use navigate::handle_navigate;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Filter => handle_filter(app, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::ready_app;
    use crossterm::event::KeyEventKind;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(
            app,
            KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: crossterm::event::KeyEventState::NONE,
            },
        );
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn labels(app: &App) -> Vec<String> {
        let view = app.session.view();
        (0..view.visible_row_count())
            .filter_map(|i| view.row(i))
            .map(|r| r.label.to_string())
            .collect()
    }

    #[test]
    fn slash_filters_live() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.mode, Mode::Filter);
        type_str(&mut app, "sho");
        assert_eq!(labels(&app), vec!["Editor", "Show Whitespace"]);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(labels(&app), vec!["Editor"]);
    }

    #[test]
    fn enter_keeps_filter_and_esc_clears_it() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "font");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(labels(&app), vec!["Editor", "Fonts", "Default Font Size"]);

        // Toggling is ignored while filtered
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session.view().visible_row_count(), 3);

        press(&mut app, KeyCode::Esc);
        assert_eq!(labels(&app), vec!["Editor"]);
        assert!(app.filter_input.is_empty());
    }

    #[test]
    fn navigation_moves_and_toggles() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(labels(&app), vec!["Editor", "Show Whitespace", "Fonts"]);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.session.selected_row(), Some(2));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(labels(&app).len(), 4);

        // h on a leaf jumps to its parent
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.session.selected_row(), Some(2));
        // h on an open container closes it
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(labels(&app).len(), 3);

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.session.selected_row(), Some(0));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn a_toggles_advanced_items() {
        let mut app = ready_app();
        assert!(!app.session.view().show_advanced());
        press(&mut app, KeyCode::Char('a'));
        assert!(app.session.view().show_advanced());
    }
}
