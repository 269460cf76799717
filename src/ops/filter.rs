use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::{NodeId, OpenState};
use crate::view::{RowList, TreeView};

/// Applies hit sets to a [`TreeView`] and undoes them.
///
/// The open state of every container is captured on the first filter after
/// an unfiltered state, so that removing the filter drops the opens it
/// forced on ancestors.
#[derive(Debug, Default)]
pub struct FilterController {
    snapshot: Option<Vec<(NodeId, OpenState)>>,
    hits: Option<BTreeSet<NodeId>>,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.hits.is_some()
    }

    /// Show only `hits` and their ancestors, with every such ancestor open.
    pub fn apply_filter(
        &mut self,
        view: &mut TreeView,
        hits: &BTreeSet<NodeId>,
        selection: &mut Option<NodeId>,
    ) {
        if self.snapshot.is_none() {
            self.snapshot = Some(
                view.store()
                    .iter()
                    .filter(|n| n.is_container())
                    .map(|n| (n.id, n.open))
                    .collect(),
            );
        }

        let total = view.total_rows().to_vec();
        let mut total_row = vec![0; total.len()];
        for (row, id) in total.iter().enumerate() {
            total_row[id.index()] = row;
        }

        for node in view.store_mut().iter_mut() {
            node.filtered_out = true;
        }

        let show_advanced = view.show_advanced();
        let mut shown = 0;
        for &hit in hits {
            if hit.index() >= total.len() || view.store().is_hidden(hit, show_advanced) {
                continue;
            }
            shown += 1;
            view.store_mut().get_mut(hit).filtered_out = false;

            let mut row = total_row[hit.index()];
            while let Some(parent_row) = view.parent_index(row, RowList::Total) {
                let parent = view.store_mut().get_mut(total[parent_row]);
                let already_shown = !parent.filtered_out;
                parent.filtered_out = false;
                parent.open = OpenState::Open;
                // Its own chain was handled when it was first un-filtered
                if already_shown {
                    break;
                }
                row = parent_row;
            }
        }
        debug!(hits = hits.len(), shown, "applying filter");

        self.hits = Some(hits.clone());
        view.set_filtering(true);
        view.rebuild_visible();
        restore_selection(view, selection);
    }

    /// Re-run the active hit set, e.g. after the advanced setting changed.
    pub fn reapply(&mut self, view: &mut TreeView, selection: &mut Option<NodeId>) {
        if let Some(hits) = self.hits.clone() {
            self.apply_filter(view, &hits, selection);
        }
    }

    /// Return to the unfiltered tree as it was before the first filter.
    pub fn remove_filter(&mut self, view: &mut TreeView, selection: &mut Option<NodeId>) {
        if let Some(snapshot) = self.snapshot.take() {
            let store = view.store_mut();
            for (id, open) in snapshot {
                store.get_mut(id).open = open;
            }
        }
        for node in view.store_mut().iter_mut() {
            node.filtered_out = false;
        }
        self.hits = None;
        view.set_filtering(false);
        view.rebuild_visible();
        restore_selection(view, selection);
    }

    /// Open states as the user left them, ignoring opens forced by a filter.
    pub fn persistable_open_states(&self, view: &TreeView) -> BTreeMap<String, bool> {
        match &self.snapshot {
            Some(snapshot) => snapshot
                .iter()
                .map(|&(id, open)| (view.store().get(id).key.clone(), open.is_open()))
                .collect(),
            None => view.open_states(),
        }
    }
}

/// Keep the selected node if it is still visible, else fall back to row 0.
fn restore_selection(view: &mut TreeView, selection: &mut Option<NodeId>) {
    let row = match selection.and_then(|id| view.row_of(id)) {
        Some(row) => Some(row),
        None => {
            *selection = view.visible_rows().first().copied();
            selection.map(|_| 0)
        }
    };
    if let Some(row) = row {
        view.ensure_visible(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::state::MemoryStateStore;
    use crate::model::{NodeDecl, NodeStore};
    use crate::view::{RecordingObserver, RowEvent};

    fn decls() -> Vec<NodeDecl> {
        vec![
            NodeDecl::container("editor", "Editor", "a", None),
            NodeDecl::leaf("whitespace", "Show Whitespace", Some("a")),
            NodeDecl::container("fonts", "Fonts", "c", Some("a")),
            NodeDecl::leaf("font-size", "Default Font Size", Some("c")),
            NodeDecl::container("keys", "Keys", "k", None),
            NodeDecl::leaf("bindings", "Bindings", Some("k")),
            NodeDecl::leaf("emacs", "Emacs Bindings", Some("k")),
        ]
    }

    fn view_of(decls: &[NodeDecl]) -> TreeView {
        TreeView::new(NodeStore::build(decls).unwrap(), &MemoryStateStore::new(), false)
    }

    fn ids(view: &TreeView, keys: &[&str]) -> BTreeSet<NodeId> {
        keys.iter().map(|k| view.store().find(k).unwrap()).collect()
    }

    fn keys(view: &TreeView) -> Vec<&str> {
        view.visible_rows()
            .iter()
            .map(|&id| view.store().get(id).key.as_str())
            .collect()
    }

    fn assert_ancestors_shown(view: &TreeView) {
        for &id in view.visible_rows() {
            for ancestor in view.store().ancestors(id) {
                assert!(view.row_of(ancestor).is_some(), "{ancestor} missing");
                assert!(view.store().get(ancestor).is_open(), "{ancestor} closed");
            }
        }
    }

    #[test]
    fn hits_bring_their_ancestors_open() {
        let mut view = view_of(&decls());
        let mut filter = FilterController::new();
        let mut selection = None;

        let hits = ids(&view, &["whitespace"]);
        filter.apply_filter(&mut view, &hits, &mut selection);
        assert_eq!(keys(&view), vec!["editor", "whitespace"]);
        assert!(filter.is_active());
        assert_ancestors_shown(&view);

        let hits = ids(&view, &["font-size", "fonts"]);
        filter.apply_filter(&mut view, &hits, &mut selection);
        assert_eq!(keys(&view), vec!["editor", "fonts", "font-size"]);
        assert_ancestors_shown(&view);
    }

    #[test]
    fn sibling_hits_share_an_ancestor() {
        let mut view = view_of(&decls());
        let mut filter = FilterController::new();
        let hits = ids(&view, &["bindings", "emacs", "whitespace"]);
        filter.apply_filter(&mut view, &hits, &mut None);
        assert_eq!(
            keys(&view),
            vec!["editor", "whitespace", "keys", "bindings", "emacs"]
        );
        assert_ancestors_shown(&view);
    }

    #[test]
    fn empty_hit_set_filters_everything() {
        let mut view = view_of(&decls());
        let mut filter = FilterController::new();
        let mut selection = view.store().find("editor");
        filter.apply_filter(&mut view, &BTreeSet::new(), &mut selection);
        assert_eq!(view.visible_row_count(), 0);
        assert_eq!(selection, None);
    }

    #[test]
    fn remove_filter_matches_a_never_filtered_tree() {
        let mut decls = decls();
        decls[4].open_by_default = true;
        let pristine = view_of(&decls);

        let mut view = view_of(&decls);
        let mut filter = FilterController::new();
        let mut selection = None;
        for query in [
            vec!["font-size"],
            vec!["whitespace", "emacs"],
            vec![],
            vec!["fonts"],
        ] {
            let hits = ids(&view, &query);
            filter.apply_filter(&mut view, &hits, &mut selection);
        }
        filter.remove_filter(&mut view, &mut selection);
        assert_eq!(view.visible_rows(), pristine.visible_rows());
        assert!(!filter.is_active());

        let hits = ids(&view, &["bindings"]);
        filter.apply_filter(&mut view, &hits, &mut selection);
        filter.remove_filter(&mut view, &mut selection);
        filter.remove_filter(&mut view, &mut selection);
        assert_eq!(view.visible_rows(), pristine.visible_rows());
        assert_eq!(view.open_states(), pristine.open_states());
    }

    #[test]
    fn selection_survives_when_still_visible() {
        let mut view = view_of(&decls());
        let recorder = RecordingObserver::new();
        view.set_observer(Box::new(recorder.clone()));
        let mut filter = FilterController::new();

        let size = view.store().find("font-size").unwrap();
        let mut selection = Some(size);
        let hits = ids(&view, &["font-size", "whitespace"]);
        filter.apply_filter(&mut view, &hits, &mut selection);
        assert_eq!(selection, Some(size));
        // editor, whitespace, fonts, font-size
        assert_eq!(recorder.take().last(), Some(&RowEvent::EnsureVisible(3)));

        let hits = ids(&view, &["whitespace"]);
        filter.apply_filter(&mut view, &hits, &mut selection);
        assert_eq!(selection, view.store().find("editor"));
    }

    #[test]
    fn rebuild_notifications() {
        let mut view = view_of(&decls());
        let recorder = RecordingObserver::new();
        view.set_observer(Box::new(recorder.clone()));
        let mut filter = FilterController::new();
        let hits = ids(&view, &["font-size"]);
        filter.apply_filter(&mut view, &hits, &mut None);
        assert_eq!(
            recorder.take(),
            vec![
                RowEvent::Removed { at: 0, count: 2 },
                RowEvent::Inserted { at: 0, count: 3 },
                RowEvent::Invalidated(0..3),
                RowEvent::EnsureVisible(0),
            ]
        );
    }

    #[test]
    fn hidden_hits_are_ignored() {
        let mut decls = decls();
        decls[2].advanced = true;
        let mut view = view_of(&decls);
        let mut filter = FilterController::new();
        let mut selection = None;
        let hits = ids(&view, &["font-size", "bindings"]);
        filter.apply_filter(&mut view, &hits, &mut selection);
        assert_eq!(keys(&view), vec!["keys", "bindings"]);

        view.set_show_advanced(true);
        filter.reapply(&mut view, &mut selection);
        assert_eq!(
            keys(&view),
            vec!["editor", "fonts", "font-size", "keys", "bindings"]
        );
    }

    #[test]
    fn persistable_states_ignore_forced_opens() {
        let mut view = view_of(&decls());
        let mut filter = FilterController::new();
        let hits = ids(&view, &["font-size"]);
        filter.apply_filter(&mut view, &hits, &mut None);
        assert_eq!(view.open_states()["fonts"], true);
        let states = filter.persistable_open_states(&view);
        assert_eq!(states["editor"], false);
        assert_eq!(states["fonts"], false);
    }
}
