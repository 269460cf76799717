use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};
use crate::view::RowList;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => {
            app.filter_input = app.session.filter_text().to_string();
            app.mode = Mode::Filter;
        }
        KeyCode::Esc => {
            app.filter_input.clear();
            app.set_filter("");
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.session.move_selection(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.session.move_selection(-1);
        }
        KeyCode::PageDown => {
            let page = app.viewport.borrow().height.max(1) as isize;
            app.session.move_selection(page);
        }
        KeyCode::PageUp => {
            let page = app.viewport.borrow().height.max(1) as isize;
            app.session.move_selection(-page);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.session.select_row(0);
        }
        KeyCode::Char('G') | KeyCode::End => {
            let last = app.session.view().visible_row_count().saturating_sub(1);
            app.session.select_row(last);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(row) = app.session.selected_row() {
                app.session.toggle_open(row);
            }
        }
        KeyCode::Char('l') | KeyCode::Right => open_selected(app),
        KeyCode::Char('h') | KeyCode::Left => close_or_parent(app),
        KeyCode::Char('a') => {
            let show = !app.session.view().show_advanced();
            app.session.set_show_advanced(show);
        }
        KeyCode::Char('r') => app.reindex(),
        _ => {}
    }
}

fn open_selected(app: &mut App) {
    let Some(row) = app.session.selected_row() else {
        return;
    };
    if app
        .session
        .view()
        .row(row)
        .is_some_and(|r| r.is_expandable && !r.is_open)
    {
        app.session.toggle_open(row);
    }
}

fn close_or_parent(app: &mut App) {
    let Some(row) = app.session.selected_row() else {
        return;
    };
    let is_open_container = app
        .session
        .view()
        .row(row)
        .is_some_and(|r| r.is_expandable && r.is_open);
    if is_open_container && !app.session.is_filtering() {
        app.session.toggle_open(row);
    } else if let Some(parent) = app.session.view().parent_index(row, RowList::Visible) {
        app.session.select_row(parent);
    }
}
