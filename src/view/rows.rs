use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use crate::model::NodeId;

/// Which row list an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowList {
    Total,
    Visible,
}

/// What the renderer needs to paint one visible row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInfo<'a> {
    pub id: NodeId,
    pub key: &'a str,
    pub label: &'a str,
    pub depth: usize,
    pub is_container: bool,
    pub is_open: bool,
    /// Container with at least one displayable child
    pub is_expandable: bool,
    pub properties: Vec<&'static str>,
}

/// Receives row-count and content change notifications.
pub trait RowObserver {
    fn rows_inserted(&mut self, at: usize, count: usize);
    fn rows_removed(&mut self, at: usize, count: usize);
    fn rows_invalidated(&mut self, range: Range<usize>);
    /// Scroll `row` into view
    fn ensure_visible(&mut self, _row: usize) {}
}

/// Observer that drops every notification
#[derive(Debug, Default)]
pub struct NullObserver;

impl RowObserver for NullObserver {
    fn rows_inserted(&mut self, _at: usize, _count: usize) {}
    fn rows_removed(&mut self, _at: usize, _count: usize) {}
    fn rows_invalidated(&mut self, _range: Range<usize>) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    Inserted { at: usize, count: usize },
    Removed { at: usize, count: usize },
    Invalidated(Range<usize>),
    EnsureVisible(usize),
}

/// Observer that records events into a shared log
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<RowEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<RowEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl RowObserver for RecordingObserver {
    fn rows_inserted(&mut self, at: usize, count: usize) {
        self.events
            .borrow_mut()
            .push(RowEvent::Inserted { at, count });
    }

    fn rows_removed(&mut self, at: usize, count: usize) {
        self.events.borrow_mut().push(RowEvent::Removed { at, count });
    }

    fn rows_invalidated(&mut self, range: Range<usize>) {
        self.events.borrow_mut().push(RowEvent::Invalidated(range));
    }

    fn ensure_visible(&mut self, row: usize) {
        self.events.borrow_mut().push(RowEvent::EnsureVisible(row));
    }
}
