mod check;
pub use check::cmd_check;

use std::path::PathBuf;
use std::rc::Rc;

use futures::executor::block_on;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::index::WordIndex;
use crate::io::{
    DeclError, Definition, FsDocumentSource, JsonStateStore, discover_definition, load_definition,
};
use crate::ops::{QueryOutcome, find_prefix_start};
use crate::session::IndexSession;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let dir = cli.dir.as_deref();
    let advanced = cli.advanced;

    match cli.command {
        None => {
            eprintln!("No command given. Run `pft` without arguments in a terminal for the UI.");
            Ok(())
        }
        Some(cmd) => match cmd {
            Commands::Tree(args) => cmd_tree(dir, advanced, args, json),
            Commands::Search(args) => cmd_search(dir, advanced, args, json),
            Commands::Words(args) => cmd_words(dir, advanced, args, json),
            Commands::Check => cmd_check(dir, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Find and load the definition starting from `-C` or the current directory.
pub fn load_definition_from(dir: Option<&str>) -> Result<Definition, Box<dyn std::error::Error>> {
    let start = match dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir().map_err(DeclError::IoError)?,
    };
    let root: PathBuf = discover_definition(&start)?;
    Ok(load_definition(&root)?)
}

/// Build a session from a definition, with persisted open state applied.
pub fn open_session(
    def: &Definition,
    advanced: bool,
) -> Result<(IndexSession, JsonStateStore), Box<dyn std::error::Error>> {
    let state = JsonStateStore::load(def.state_path());
    let mut settings = def.file.settings.clone();
    settings.show_advanced |= advanced;
    let session =
        IndexSession::new(&def.file.nodes, &state, &settings).map_err(DeclError::from)?;
    Ok((session, state))
}

fn build_index(
    def: &Definition,
    session: &IndexSession,
) -> Result<Rc<WordIndex>, Box<dyn std::error::Error>> {
    let source = Rc::new(FsDocumentSource::new(&def.root));
    Ok(block_on(session.start_index(source))?)
}

fn expand_all(session: &mut IndexSession) {
    let mut row = 0;
    while let Some(info) = session.view().row(row) {
        if info.is_expandable && !info.is_open {
            session.toggle_open(row);
        }
        row += 1;
    }
}

fn print_rows(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_tree(
    dir: Option<&str>,
    advanced: bool,
    args: TreeArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let def = load_definition_from(dir)?;
    let (mut session, _) = open_session(&def, advanced)?;
    if args.expand_all {
        expand_all(&mut session);
    }

    if json {
        let out = TreeJson {
            name: def.file.tree.name.clone(),
            rows: rows_to_json(session.view()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", def.file.tree.name);
        print_rows(&format_rows(session.view()));
    }
    Ok(())
}

fn cmd_search(
    dir: Option<&str>,
    advanced: bool,
    args: SearchArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let def = load_definition_from(dir)?;
    let (mut session, _) = open_session(&def, advanced)?;
    build_index(&def, &session)?;

    let query = args.terms.join(" ");
    let hits = match session.query(&query)? {
        QueryOutcome::NoFilter => Vec::new(),
        QueryOutcome::Hits(hits) => hits.into_iter().collect(),
    };
    session.set_filter_text(&query);

    if json {
        let store = session.view().store();
        let out = SearchJson {
            query: query.clone(),
            hits: hits.iter().map(|&id| store.get(id).key.clone()).collect(),
            rows: rows_to_json(session.view()),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if session.view().visible_row_count() == 0 {
        println!("no matches for \"{}\"", query);
    } else {
        print_rows(&format_rows(session.view()));
        println!();
        println!(
            "{} matching node{}",
            hits.len(),
            if hits.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn cmd_words(
    dir: Option<&str>,
    advanced: bool,
    args: WordsArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let def = load_definition_from(dir)?;
    let (session, _) = open_session(&def, advanced)?;
    let index = build_index(&def, &session)?;

    let all = index.words();
    let words: &[String] = match args.prefix.as_deref().map(str::to_lowercase) {
        None => all,
        Some(prefix) => match find_prefix_start(all, &prefix) {
            Some(start) => {
                let len = all[start..]
                    .iter()
                    .take_while(|w| w.starts_with(&prefix))
                    .count();
                &all[start..start + len]
            }
            None => &[],
        },
    };
    let out = words_to_json(&index, session.view().store(), words);

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for word in &out {
            println!("{}", format_word(word));
        }
    }
    Ok(())
}
