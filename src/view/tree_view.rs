use std::collections::BTreeMap;

use tracing::debug;

use super::rows::{NullObserver, RowInfo, RowList, RowObserver};
use crate::io::state::OpenStateStore;
use crate::model::{NodeId, NodeStore, OpenState};

/// The row model: Total Rows come from the store's depth-first order,
/// Visible Rows are derived from open state, filter flags and the
/// advanced setting.
pub struct TreeView {
    store: NodeStore,
    visible: Vec<NodeId>,
    show_advanced: bool,
    filtering: bool,
    observer: Box<dyn RowObserver>,
}

impl TreeView {
    /// Containers take their persisted open state when the store has one,
    /// otherwise their declared default.
    pub fn new(mut store: NodeStore, open_states: &dyn OpenStateStore, show_advanced: bool) -> Self {
        for node in store.iter_mut() {
            if !node.is_container() {
                continue;
            }
            let open = open_states.get(&node.key).unwrap_or(node.open_by_default);
            node.open = OpenState::from_bool(open);
        }
        let mut view = TreeView {
            store,
            visible: Vec::new(),
            show_advanced,
            filtering: false,
            observer: Box::new(NullObserver),
        };
        view.visible = view.derive_visible();
        view
    }

    pub fn set_observer(&mut self, observer: Box<dyn RowObserver>) {
        self.observer = observer;
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    pub fn show_advanced(&self) -> bool {
        self.show_advanced
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub(crate) fn set_filtering(&mut self, filtering: bool) {
        self.filtering = filtering;
    }

    pub fn total_rows(&self) -> &[NodeId] {
        self.store.total_order()
    }

    pub fn visible_rows(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn visible_row_count(&self) -> usize {
        self.visible.len()
    }

    /// Visible row index of a node
    pub fn row_of(&self, id: NodeId) -> Option<usize> {
        self.visible.iter().position(|&v| v == id)
    }

    fn hidden_here(&self, id: NodeId) -> bool {
        !self.show_advanced && self.store.get(id).advanced
    }

    pub fn is_expandable(&self, id: NodeId) -> bool {
        self.store.get(id).is_container()
            && self.store.displayable_children(id, self.show_advanced) > 0
    }

    /// Walk Total Rows once, skipping the subtree of anything filtered out,
    /// hidden, or closed.
    fn derive_visible(&self) -> Vec<NodeId> {
        let mut rows = Vec::new();
        let mut skip_below: Option<usize> = None;
        for &id in self.store.total_order() {
            let node = self.store.get(id);
            if let Some(depth) = skip_below {
                if node.depth > depth {
                    continue;
                }
                skip_below = None;
            }
            if (self.filtering && node.filtered_out) || self.hidden_here(id) {
                skip_below = Some(node.depth);
                continue;
            }
            rows.push(id);
            if node.is_container() && !node.is_open() {
                skip_below = Some(node.depth);
            }
        }
        rows
    }

    /// Replace Visible Rows wholesale and tell the observer.
    pub fn rebuild_visible(&mut self) {
        let old = self.visible.len();
        self.visible = self.derive_visible();
        let new = self.visible.len();
        debug!(old, new, filtering = self.filtering, "rebuilt visible rows");
        if old > 0 {
            self.observer.rows_removed(0, old);
        }
        if new > 0 {
            self.observer.rows_inserted(0, new);
        }
        self.observer.rows_invalidated(0..new);
    }

    /// Expanded, displayable descendants of `id` in display order.
    fn expanded_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.store.get(id).children() {
            if self.hidden_here(child) {
                continue;
            }
            out.push(child);
            if self.store.get(child).is_open() {
                self.expanded_descendants(child, out);
            }
        }
    }

    /// Open or close the container at a visible row. Returns the change in
    /// visible row count; 0 when nothing happened.
    pub fn toggle_open(&mut self, row: usize) -> isize {
        if self.filtering {
            return 0;
        }
        let Some(&id) = self.visible.get(row) else {
            return 0;
        };
        if !self.is_expandable(id) {
            return 0;
        }

        let node = self.store.get(id);
        let depth = node.depth;
        let delta = if node.is_open() {
            let start = row + 1;
            let end = self.visible[start..]
                .iter()
                .position(|&v| self.store.get(v).depth <= depth)
                .map_or(self.visible.len(), |p| start + p);
            self.visible.drain(start..end);
            self.store.get_mut(id).open = OpenState::Closed;
            let removed = end - start;
            if removed > 0 {
                self.observer.rows_removed(start, removed);
            }
            -(removed as isize)
        } else {
            self.store.get_mut(id).open = OpenState::Open;
            let mut rows = Vec::new();
            self.expanded_descendants(id, &mut rows);
            let inserted = rows.len();
            self.visible.splice(row + 1..row + 1, rows);
            if inserted > 0 {
                self.observer.rows_inserted(row + 1, inserted);
            }
            inserted as isize
        };
        self.observer.rows_invalidated(row..row + 1);
        delta
    }

    /// Nearest preceding row, in the chosen list, one level shallower.
    pub fn parent_index(&self, row: usize, list: RowList) -> Option<usize> {
        let rows = match list {
            RowList::Total => self.store.total_order(),
            RowList::Visible => &self.visible,
        };
        let depth = self.store.get(*rows.get(row)?).depth;
        let parent_depth = depth.checked_sub(1)?;
        rows[..row]
            .iter()
            .rposition(|&r| self.store.get(r).depth == parent_depth)
    }

    /// Visible row of `id`, opening every closed ancestor if needed.
    ///
    /// Returns `None` without changing anything when the node cannot be
    /// shown: hidden as advanced, or filtered out while a filter is active.
    pub fn find_row_containing_id(&mut self, id: NodeId) -> Option<usize> {
        if let Some(row) = self.row_of(id) {
            return Some(row);
        }
        if self.filtering || self.store.is_hidden(id, self.show_advanced) {
            return None;
        }

        let mut chain: Vec<NodeId> = self.store.ancestors(id).collect();
        chain.reverse();
        for ancestor in chain {
            if self.store.get(ancestor).is_open() {
                continue;
            }
            // Every shallower ancestor is open by now, so this one is visible
            let row = self.row_of(ancestor)?;
            self.toggle_open(row);
        }
        self.row_of(id)
    }

    /// Flip advanced visibility and re-derive Visible Rows.
    pub fn set_show_advanced(&mut self, show: bool) {
        if self.show_advanced == show {
            return;
        }
        self.show_advanced = show;
        self.rebuild_visible();
    }

    pub fn ensure_visible(&mut self, row: usize) {
        self.observer.ensure_visible(row);
    }

    pub fn row(&self, i: usize) -> Option<RowInfo<'_>> {
        let id = *self.visible.get(i)?;
        let node = self.store.get(id);
        let is_expandable = self.is_expandable(id);
        let mut properties = Vec::new();
        if node.is_container() {
            properties.push("container");
            properties.push(if node.is_open() { "open" } else { "closed" });
            if !is_expandable {
                properties.push("empty");
            }
        }
        if node.advanced {
            properties.push("advanced");
        }
        Some(RowInfo {
            id,
            key: &node.key,
            label: &node.label,
            depth: node.depth,
            is_container: node.is_container(),
            is_open: node.is_open(),
            is_expandable,
            properties,
        })
    }

    /// Current open state of every container, by key
    pub fn open_states(&self) -> BTreeMap<String, bool> {
        self.store
            .iter()
            .filter(|n| n.is_container())
            .map(|n| (n.key.clone(), n.is_open()))
            .collect()
    }
}
