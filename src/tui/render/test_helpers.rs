use std::rc::Rc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::MemoryDocumentSource;
use crate::io::state::MemoryStateStore;
use crate::model::{NodeDecl, Settings};
use crate::session::IndexSession;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Editor -> [Show Whitespace, Fonts -> [Default Font Size]], all closed,
/// index not started.
pub fn sample_app() -> App {
    let decls = vec![
        NodeDecl::container("a", "Editor", "a", None),
        NodeDecl::leaf("b", "Show Whitespace", Some("a")),
        NodeDecl::container("c", "Fonts", "c", Some("a")),
        NodeDecl::leaf("d", "Default Font Size", Some("c")),
    ];
    let session =
        IndexSession::new(&decls, &MemoryStateStore::new(), &Settings::default()).unwrap();
    App::new(session, "Preferences", Rc::new(MemoryDocumentSource::new()))
}

/// [`sample_app`] with its index built
pub fn ready_app() -> App {
    let mut app = sample_app();
    app.start_index();
    app.tick();
    app
}
