use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::index::{BuildFuture, DocumentSource, IndexBuilder, IndexInput, WordIndex};
use crate::io::state::OpenStateStore;
use crate::model::{NodeDecl, NodeId, NodeStore, Settings, StructuralError};
use crate::ops::{FilterController, QueryError, QueryOutcome, query};
use crate::view::{RowObserver, TreeView};

/// What [`IndexSession::set_filter_text`] did with the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStatus {
    /// A hit set was applied
    Applied { hits: usize },
    /// Blank text: filtering was removed
    Removed,
    /// The index is still building; the text is applied by `flush_pending`
    Deferred,
}

/// Everything belonging to one loaded tree: rows, index, filter and
/// selection.
pub struct IndexSession {
    view: TreeView,
    builder: IndexBuilder,
    filter: FilterController,
    selection: Option<NodeId>,
    filter_text: String,
    query_generation: u64,
    pending: Option<(u64, String)>,
}

impl IndexSession {
    pub fn new(
        decls: &[NodeDecl],
        open_states: &dyn OpenStateStore,
        settings: &Settings,
    ) -> Result<Self, StructuralError> {
        let store = NodeStore::build(decls)?;
        let view = TreeView::new(store, open_states, settings.show_advanced);
        let selection = view.visible_rows().first().copied();
        debug!(
            nodes = view.store().len(),
            visible = view.visible_row_count(),
            "session created"
        );
        Ok(IndexSession {
            view,
            builder: IndexBuilder::new(),
            filter: FilterController::new(),
            selection,
            filter_text: String::new(),
            query_generation: 0,
            pending: None,
        })
    }

    pub fn view(&self) -> &TreeView {
        &self.view
    }

    pub fn set_observer(&mut self, observer: Box<dyn RowObserver>) {
        self.view.set_observer(observer);
    }

    pub fn builder(&self) -> &IndexBuilder {
        &self.builder
    }

    /// Start (or join) the index build for this tree.
    pub fn start_index(&self, source: Rc<dyn DocumentSource>) -> BuildFuture {
        self.builder
            .build(IndexInput::from_store(self.view.store()), source)
    }

    /// Throw away the current index and build a new one.
    pub fn reindex(&self, source: Rc<dyn DocumentSource>) -> BuildFuture {
        self.builder.invalidate();
        self.start_index(source)
    }

    pub fn is_ready(&self) -> bool {
        self.builder.index().is_some()
    }

    pub fn index(&self) -> Option<Rc<WordIndex>> {
        self.builder.index()
    }

    /// Run a query without touching the view.
    pub fn query(&self, raw: &str) -> Result<QueryOutcome, QueryError> {
        let index = self.builder.index().ok_or(QueryError::NotReady)?;
        Ok(query(&index, raw))
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn is_filtering(&self) -> bool {
        self.filter.is_active()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Filter the tree by `raw`. Before the index is ready the text is kept
    /// and the latest one wins.
    pub fn set_filter_text(&mut self, raw: &str) -> FilterStatus {
        self.query_generation += 1;
        self.filter_text = raw.to_string();
        match self.builder.index() {
            Some(index) => {
                self.pending = None;
                self.apply_query(&index, raw)
            }
            None => {
                debug!(generation = self.query_generation, "index not ready, deferring filter");
                self.pending = Some((self.query_generation, raw.to_string()));
                FilterStatus::Deferred
            }
        }
    }

    /// Apply a deferred filter once the index is ready.
    pub fn flush_pending(&mut self) -> Option<FilterStatus> {
        let index = self.builder.index()?;
        let (generation, raw) = self.pending.take()?;
        if generation != self.query_generation {
            return None;
        }
        Some(self.apply_query(&index, &raw))
    }

    fn apply_query(&mut self, index: &WordIndex, raw: &str) -> FilterStatus {
        match query(index, raw) {
            QueryOutcome::NoFilter => {
                if self.filter.is_active() {
                    self.filter.remove_filter(&mut self.view, &mut self.selection);
                }
                FilterStatus::Removed
            }
            QueryOutcome::Hits(hits) => {
                self.filter
                    .apply_filter(&mut self.view, &hits, &mut self.selection);
                FilterStatus::Applied { hits: hits.len() }
            }
        }
    }

    pub fn toggle_open(&mut self, row: usize) -> isize {
        self.view.toggle_open(row)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selection.and_then(|id| self.view.row_of(id))
    }

    /// Select the node at a visible row.
    pub fn select_row(&mut self, row: usize) -> Option<NodeId> {
        let id = *self.view.visible_rows().get(row)?;
        self.selection = Some(id);
        self.view.ensure_visible(row);
        Some(id)
    }

    /// Select a node that is currently visible.
    pub fn select_node(&mut self, id: NodeId) -> bool {
        match self.view.row_of(id) {
            Some(row) => {
                self.select_row(row);
                true
            }
            None => false,
        }
    }

    /// Move the selection by `delta` rows, clamped to the visible list.
    pub fn move_selection(&mut self, delta: isize) -> Option<NodeId> {
        let count = self.view.visible_row_count();
        if count == 0 {
            return None;
        }
        let current = self.selected_row().unwrap_or(0) as isize;
        let row = (current + delta).clamp(0, count as isize - 1) as usize;
        self.select_row(row)
    }

    /// Open the path to `id` and select it.
    pub fn reveal(&mut self, id: NodeId) -> Option<usize> {
        let row = self.view.find_row_containing_id(id)?;
        self.select_row(row);
        Some(row)
    }

    pub fn set_show_advanced(&mut self, show: bool) {
        self.view.set_show_advanced(show);
        if self.filter.is_active() {
            self.filter.reapply(&mut self.view, &mut self.selection);
        } else if self.selected_row().is_none() {
            self.selection = self.view.visible_rows().first().copied();
        }
    }

    /// Open states as the user left them, without filter-forced opens
    pub fn open_states(&self) -> BTreeMap<String, bool> {
        self.filter.persistable_open_states(&self.view)
    }

    pub fn persist_open_state(&self, store: &mut dyn OpenStateStore) {
        for (key, open) in self.open_states() {
            store.set(&key, open);
        }
    }
}
