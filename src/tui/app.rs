use std::cell::RefCell;
use std::io;
use std::ops::Range;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, warn};

use super::input;
use super::render;
use super::theme::Theme;
use crate::cli::handlers::{load_definition_from, open_session};
use crate::cli::logging;
use crate::index::DocumentSource;
use crate::io::{FsDocumentSource, JsonStateStore};
use crate::session::{FilterStatus, IndexSession};
use crate::view::RowObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing into the filter prompt
    Filter,
}

/// Scroll position of the tree pane, kept in step with row changes
#[derive(Debug, Default)]
pub struct Viewport {
    pub offset: usize,
    pub height: usize,
    /// Row the session asked to bring into view
    pub reveal: Option<usize>,
}

impl Viewport {
    /// Adjust `offset` so `row` is inside the pane
    pub fn scroll_to(&mut self, row: usize) {
        if row < self.offset {
            self.offset = row;
        } else if self.height > 0 && row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
    }
}

/// Feeds row notifications into the shared [`Viewport`]
pub struct ViewportObserver(pub Rc<RefCell<Viewport>>);

impl RowObserver for ViewportObserver {
    fn rows_inserted(&mut self, at: usize, count: usize) {
        let mut vp = self.0.borrow_mut();
        if at < vp.offset {
            vp.offset += count;
        }
    }

    fn rows_removed(&mut self, at: usize, count: usize) {
        let mut vp = self.0.borrow_mut();
        if at < vp.offset {
            vp.offset -= count.min(vp.offset - at);
        }
    }

    fn rows_invalidated(&mut self, _range: Range<usize>) {}

    fn ensure_visible(&mut self, row: usize) {
        self.0.borrow_mut().reveal = Some(row);
    }
}

/// Main application state
pub struct App {
    pub session: IndexSession,
    pub title: String,
    pub mode: Mode,
    pub filter_input: String,
    pub viewport: Rc<RefCell<Viewport>>,
    pub theme: Theme,
    pub should_quit: bool,
    pool: LocalPool,
    source: Rc<dyn DocumentSource>,
}

impl App {
    pub fn new(mut session: IndexSession, title: &str, source: Rc<dyn DocumentSource>) -> Self {
        let viewport = Rc::new(RefCell::new(Viewport::default()));
        session.set_observer(Box::new(ViewportObserver(Rc::clone(&viewport))));
        App {
            session,
            title: title.to_string(),
            mode: Mode::Navigate,
            filter_input: String::new(),
            viewport,
            theme: Theme::default(),
            should_quit: false,
            pool: LocalPool::new(),
            source,
        }
    }

    /// Start building the index on the local pool.
    pub fn start_index(&mut self) {
        let build = self.session.start_index(Rc::clone(&self.source));
        if let Err(e) = self.pool.spawner().spawn_local(async move {
            if let Err(e) = build.await {
                debug!(error = %e, "index build ended");
            }
        }) {
            warn!(error = %e, "could not start index build");
        }
    }

    /// Rebuild the index from scratch (documents may have changed).
    pub fn reindex(&mut self) {
        let build = self.session.reindex(Rc::clone(&self.source));
        if let Err(e) = self.pool.spawner().spawn_local(async move {
            if let Err(e) = build.await {
                debug!(error = %e, "index rebuild ended");
            }
        }) {
            warn!(error = %e, "could not start index build");
        }
        let text = self.session.filter_text().to_string();
        self.session.set_filter_text(&text);
    }

    /// Drive pending fetches and apply a deferred filter once ready.
    pub fn tick(&mut self) {
        self.pool.run_until_stalled();
        if let Some(status) = self.session.flush_pending() {
            debug!(?status, "applied deferred filter");
        }
    }

    pub fn set_filter(&mut self, text: &str) -> FilterStatus {
        self.session.set_filter_text(text)
    }

    /// Restore open/selection/filter from the previous session
    pub fn restore(&mut self, state: &JsonStateStore) {
        if let Some(id) = state
            .state
            .selected
            .as_deref()
            .and_then(|key| self.session.view().store().find(key))
        {
            self.session.reveal(id);
        }
        if let Some(filter) = state.state.last_filter.as_deref().filter(|f| !f.is_empty()) {
            self.filter_input = filter.to_string();
            self.set_filter(filter);
        }
    }

    /// Write open states, filter and selection to the state store
    pub fn save(&self, state: &mut JsonStateStore) {
        self.session.persist_open_state(state);
        let filter = self.session.filter_text().trim();
        state.state.last_filter = (!filter.is_empty()).then(|| filter.to_string());
        state.state.selected = self
            .session
            .selected()
            .map(|id| self.session.view().store().get(id).key.clone());
        if let Err(e) = state.save() {
            warn!(path = %state.path().display(), error = %e, "could not save state");
        }
    }
}

pub fn run(dir: Option<&str>, advanced: bool) -> Result<(), Box<dyn std::error::Error>> {
    let def = load_definition_from(dir)?;
    logging::init_file(&def.root);
    let (session, mut state) = open_session(&def, advanced)?;
    let source: Rc<dyn DocumentSource> = Rc::new(FsDocumentSource::new(&def.root));

    let mut app = App::new(session, &def.file.tree.name, source);
    app.start_index();
    app.restore(&state);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    app.save(&mut state);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.tick();
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::sample_app as app;
    use tempfile::TempDir;

    #[test]
    fn filter_typed_before_index_applies_on_tick() {
        let mut app = app();
        app.start_index();
        assert_eq!(app.set_filter("font"), FilterStatus::Deferred);
        app.tick();
        assert!(app.session.is_ready());
        assert_eq!(app.session.view().visible_row_count(), 3);
    }

    #[test]
    fn reindex_rebuilds_and_keeps_the_filter() {
        let mut app = app();
        app.start_index();
        app.tick();
        let first = app.session.index().unwrap();
        app.set_filter("size");

        app.reindex();
        assert!(!app.session.is_ready());
        assert!(app.session.has_pending());
        app.tick();

        let second = app.session.index().unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(app.session.builder().generation(), 1);
        assert!(app.session.is_filtering());
        assert_eq!(app.session.view().visible_row_count(), 3);
    }

    #[test]
    fn viewport_follows_removed_rows() {
        let vp = Rc::new(RefCell::new(Viewport {
            offset: 5,
            height: 3,
            reveal: None,
        }));
        let mut obs = ViewportObserver(Rc::clone(&vp));
        obs.rows_removed(2, 10);
        assert_eq!(vp.borrow().offset, 2);
        obs.rows_inserted(0, 4);
        assert_eq!(vp.borrow().offset, 6);
        obs.ensure_visible(1);
        assert_eq!(vp.borrow().reveal, Some(1));

        let mut vp = vp.borrow_mut();
        vp.scroll_to(1);
        assert_eq!(vp.offset, 1);
        vp.scroll_to(7);
        assert_eq!(vp.offset, 5);
    }

    #[test]
    fn save_and_restore_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".state.json");
        let mut app = app();
        app.start_index();
        app.tick();
        let d = app.session.view().store().find("d").unwrap();
        app.session.reveal(d);
        app.set_filter("size");

        let mut state = JsonStateStore::load(&path);
        app.save(&mut state);

        let state = JsonStateStore::load(&path);
        assert_eq!(state.state.last_filter.as_deref(), Some("size"));
        assert_eq!(state.state.selected.as_deref(), Some("d"));
        assert_eq!(state.state.open.get("c"), Some(&true));

        let mut restored = crate::tui::render::test_helpers::sample_app();
        restored.start_index();
        restored.restore(&state);
        restored.tick();
        assert_eq!(restored.filter_input, "size");
        assert_eq!(restored.session.selected(), Some(d));
        assert!(restored.session.is_filtering());
    }
}
