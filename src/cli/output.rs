use serde::Serialize;

use crate::index::WordIndex;
use crate::model::NodeStore;
use crate::view::{RowInfo, TreeView};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct RowJson {
    pub key: String,
    pub label: String,
    pub depth: usize,
    pub container: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
}

#[derive(Serialize)]
pub struct TreeJson {
    pub name: String,
    pub rows: Vec<RowJson>,
}

#[derive(Serialize)]
pub struct SearchJson {
    pub query: String,
    /// Keys of the nodes matching every term
    pub hits: Vec<String>,
    pub rows: Vec<RowJson>,
}

#[derive(Serialize)]
pub struct WordJson {
    pub word: String,
    pub nodes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

pub fn row_to_json(row: &RowInfo<'_>) -> RowJson {
    RowJson {
        key: row.key.to_string(),
        label: row.label.to_string(),
        depth: row.depth,
        container: row.is_container,
        open: row.is_container.then_some(row.is_open),
    }
}

pub fn rows_to_json(view: &TreeView) -> Vec<RowJson> {
    (0..view.visible_row_count())
        .filter_map(|i| view.row(i))
        .map(|row| row_to_json(&row))
        .collect()
}

/// Each word with the keys of the nodes it was found in
pub fn words_to_json(index: &WordIndex, store: &NodeStore, words: &[String]) -> Vec<WordJson> {
    words
        .iter()
        .map(|word| WordJson {
            word: word.clone(),
            nodes: index
                .nodes_for(word)
                .map(|ids| ids.iter().map(|&id| store.get(id).key.clone()).collect())
                .unwrap_or_default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

fn row_marker(row: &RowInfo<'_>) -> char {
    match (row.is_expandable, row.is_open) {
        (true, true) => '▾',
        (true, false) => '▸',
        (false, _) => '·',
    }
}

/// One tree row: two spaces per level, a marker, the label
pub fn format_row(row: &RowInfo<'_>) -> String {
    format!("{}{} {}", "  ".repeat(row.depth), row_marker(row), row.label)
}

pub fn format_rows(view: &TreeView) -> Vec<String> {
    (0..view.visible_row_count())
        .filter_map(|i| view.row(i))
        .map(|row| format_row(&row))
        .collect()
}

pub fn format_word(word: &WordJson) -> String {
    format!("{}  {}", word.word, word.nodes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::state::{MemoryStateStore, OpenStateStore};
    use crate::model::NodeDecl;

    fn view() -> TreeView {
        let decls = vec![
            NodeDecl::container("editor", "Editor", "a", None),
            NodeDecl::leaf("whitespace", "Show Whitespace", Some("a")),
            NodeDecl::container("fonts", "Fonts", "c", Some("a")),
            NodeDecl::leaf("font-size", "Default Font Size", Some("c")),
        ];
        let mut states = MemoryStateStore::new();
        states.set("editor", true);
        TreeView::new(NodeStore::build(&decls).unwrap(), &states, false)
    }

    #[test]
    fn formats_rows_with_markers() {
        assert_eq!(
            format_rows(&view()),
            vec!["▾ Editor", "  · Show Whitespace", "  ▸ Fonts"]
        );
    }

    #[test]
    fn json_rows_omit_open_for_leaves() {
        let json = serde_json::to_value(rows_to_json(&view())).unwrap();
        assert_eq!(json[0]["open"], true);
        assert_eq!(json[1].get("open"), None);
        assert_eq!(json[2]["container"], true);
        assert_eq!(json[2]["depth"], 1);
    }

    #[test]
    fn words_carry_node_keys() {
        let view = view();
        let index = WordIndex::from_phrases(
            view.store()
                .iter()
                .map(|n| (n.id, n.label.as_str()))
                .collect::<Vec<_>>(),
        );
        let words = words_to_json(&index, view.store(), &["font".to_string()]);
        assert_eq!(words[0].nodes, vec!["font-size"]);
        assert_eq!(format_word(&words[0]), "font  font-size");
    }
}
