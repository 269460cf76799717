use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};
use tracing::{debug, warn};

use crate::model::{IdInterner, NodeId, NodeStore};
use crate::parse::{parse_document, resolve_reference, tokenize};

use super::word_index::{WordAccumulator, WordIndex};

/// Future returned by a [`DocumentSource`]
pub type FetchFuture = LocalBoxFuture<'static, Result<String, FetchError>>;

/// Shared, cloneable handle to a (possibly in-flight) build
pub type BuildFuture = Shared<LocalBoxFuture<'static, Result<Rc<WordIndex>, BuildError>>>;

/// Supplies raw panel document text by URL
pub trait DocumentSource {
    fn fetch(&self, url: &str) -> FetchFuture;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("document '{0}' not found")]
    NotFound(String),
    #[error("could not read document '{url}': {message}")]
    Read { url: String, message: String },
    #[error("document '{0}' is outside the definition directory")]
    OutsideRoot(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("index build (generation {0}) was superseded")]
    Superseded(u64),
}

/// Build state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    LoadingPrimary,
    LoadingOverlays,
    Ready,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPhase::Idle => write!(f, "idle"),
            BuildPhase::LoadingPrimary => write!(f, "loading documents"),
            BuildPhase::LoadingOverlays => write!(f, "loading overlays"),
            BuildPhase::Ready => write!(f, "ready"),
        }
    }
}

/// Searchable text declared directly on a node
#[derive(Debug, Clone)]
pub struct IndexInput {
    pub node: NodeId,
    pub label: String,
    pub document: Option<String>,
}

impl IndexInput {
    /// One input per node, in total-row order
    pub fn from_store(store: &NodeStore) -> Vec<IndexInput> {
        store
            .total_order()
            .iter()
            .map(|&id| {
                let node = store.get(id);
                IndexInput {
                    node: id,
                    label: node.label.clone(),
                    document: node.document.clone(),
                }
            })
            .collect()
    }
}

/// A document the build had to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub url: String,
    pub reason: String,
}

/// Summary of the last completed build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub documents: usize,
    pub overlays: usize,
    pub words: usize,
    pub skipped: Vec<SkippedDocument>,
}

struct BuilderState {
    phase: BuildPhase,
    generation: u64,
    in_flight: Option<BuildFuture>,
    index: Option<Rc<WordIndex>>,
    report: BuildReport,
}

/// Builds the word index once per generation.
///
/// Repeated [`IndexBuilder::build`] calls while a build is running return the
/// same shared future; calls after completion resolve immediately.
#[derive(Clone)]
pub struct IndexBuilder {
    state: Rc<RefCell<BuilderState>>,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        IndexBuilder {
            state: Rc::new(RefCell::new(BuilderState {
                phase: BuildPhase::Idle,
                generation: 0,
                in_flight: None,
                index: None,
                report: BuildReport::default(),
            })),
        }
    }

    pub fn build(&self, inputs: Vec<IndexInput>, source: Rc<dyn DocumentSource>) -> BuildFuture {
        let mut state = self.state.borrow_mut();
        if let Some(index) = &state.index {
            return future::ready(Ok(Rc::clone(index))).boxed_local().shared();
        }
        if let Some(in_flight) = &state.in_flight {
            debug!(generation = state.generation, "coalescing index build");
            return in_flight.clone();
        }

        let generation = state.generation;
        debug!(generation, nodes = inputs.len(), "index build started");
        state.phase = BuildPhase::LoadingPrimary;
        let build = run_build(Rc::downgrade(&self.state), generation, inputs, source)
            .boxed_local()
            .shared();
        state.in_flight = Some(build.clone());
        build
    }

    /// Drop the current index and start a new generation. Builds started
    /// before this call will not publish their result.
    pub fn invalidate(&self) {
        let mut state = self.state.borrow_mut();
        state.generation += 1;
        state.phase = BuildPhase::Idle;
        state.in_flight = None;
        state.index = None;
        state.report = BuildReport::default();
    }

    pub fn phase(&self) -> BuildPhase {
        self.state.borrow().phase
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// The finished index, if the current generation is ready
    pub fn index(&self) -> Option<Rc<WordIndex>> {
        self.state.borrow().index.clone()
    }

    pub fn report(&self) -> BuildReport {
        self.state.borrow().report.clone()
    }
}

fn is_current(state: &Weak<RefCell<BuilderState>>, generation: u64) -> bool {
    state
        .upgrade()
        .is_some_and(|s| s.borrow().generation == generation)
}

fn set_phase(state: &Weak<RefCell<BuilderState>>, phase: BuildPhase) {
    if let Some(state) = state.upgrade() {
        state.borrow_mut().phase = phase;
    }
}

/// Overlay documents discovered during the build, keyed by dense doc id
#[derive(Default)]
struct OverlayQueue {
    docs: IdInterner,
    referrers: Vec<Vec<NodeId>>,
    /// Words of processed overlays, replayed for late referrers
    words: Vec<Option<Vec<String>>>,
    /// Overlays referenced from each overlay
    nested: Vec<Vec<u32>>,
    pending: VecDeque<u32>,
}

impl OverlayQueue {
    /// Queue `url` once and attribute it to `nodes`
    fn add(&mut self, url: &str, nodes: &[NodeId], acc: &mut WordAccumulator) -> u32 {
        let doc = self.docs.intern(url);
        if doc as usize == self.referrers.len() {
            self.referrers.push(Vec::new());
            self.words.push(None);
            self.nested.push(Vec::new());
            self.pending.push_back(doc);
        }
        self.attribute(doc, nodes, acc);
        doc
    }

    fn attribute(&mut self, doc: u32, nodes: &[NodeId], acc: &mut WordAccumulator) {
        let d = doc as usize;
        let fresh: Vec<NodeId> = nodes
            .iter()
            .copied()
            .filter(|n| !self.referrers[d].contains(n))
            .collect();
        if fresh.is_empty() {
            return;
        }
        self.referrers[d].extend(&fresh);
        if let Some(words) = &self.words[d] {
            for word in words {
                for &node in &fresh {
                    acc.add_word(word, node);
                }
            }
            for child in self.nested[d].clone() {
                self.attribute(child, &fresh, acc);
            }
        }
    }
}

fn queue_references(
    base: &str,
    references: &[String],
    nodes: &[NodeId],
    queue: &mut OverlayQueue,
    acc: &mut WordAccumulator,
    report: &mut BuildReport,
) -> Vec<u32> {
    let mut queued = Vec::new();
    for reference in references {
        match resolve_reference(base, reference) {
            Ok(url) => queued.push(queue.add(&url, nodes, acc)),
            Err(e) => {
                warn!(document = base, error = %e, "skipping malformed overlay reference");
                report.skipped.push(SkippedDocument {
                    url: reference.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    queued
}

async fn run_build(
    state: Weak<RefCell<BuilderState>>,
    generation: u64,
    inputs: Vec<IndexInput>,
    source: Rc<dyn DocumentSource>,
) -> Result<Rc<WordIndex>, BuildError> {
    let mut acc = WordAccumulator::new();
    let mut queue = OverlayQueue::default();
    let mut report = BuildReport::default();

    for input in &inputs {
        acc.add_phrase(&input.label, input.node);
        let Some(declared) = input.document.as_deref() else {
            continue;
        };
        // Declared documents are held to the same root as overlays
        let url = match resolve_reference("", declared) {
            Ok(url) => url,
            Err(e) => {
                warn!(document = declared, error = %e, "skipping malformed document path");
                report.skipped.push(SkippedDocument {
                    url: declared.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let url = url.as_str();
        let fetched = source.fetch(url).await;
        if !is_current(&state, generation) {
            return Err(BuildError::Superseded(generation));
        }
        match fetched {
            Ok(text) => {
                report.documents += 1;
                let doc = parse_document(&text);
                for phrase in &doc.phrases {
                    acc.add_phrase(phrase, input.node);
                }
                queue_references(
                    url,
                    &doc.references,
                    &[input.node],
                    &mut queue,
                    &mut acc,
                    &mut report,
                );
            }
            Err(e) => {
                warn!(document = url, error = %e, "skipping document");
                report.skipped.push(SkippedDocument {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    set_phase(&state, BuildPhase::LoadingOverlays);
    debug!(generation, queued = queue.pending.len(), "loading overlays");

    while let Some(doc) = queue.pending.pop_front() {
        let url = queue.docs.key(doc).unwrap_or_default().to_string();
        let fetched = source.fetch(&url).await;
        if !is_current(&state, generation) {
            return Err(BuildError::Superseded(generation));
        }
        let text = match fetched {
            Ok(text) => text,
            Err(e) => {
                warn!(overlay = %url, error = %e, "skipping overlay");
                report.skipped.push(SkippedDocument {
                    url,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        report.overlays += 1;

        let parsed = parse_document(&text);
        let words: Vec<String> = parsed.phrases.iter().flat_map(|p| tokenize(p)).collect();
        let referrers = queue.referrers[doc as usize].clone();
        for word in &words {
            for &node in &referrers {
                acc.add_word(word, node);
            }
        }
        queue.words[doc as usize] = Some(words);
        let nested = queue_references(
            &url,
            &parsed.references,
            &referrers,
            &mut queue,
            &mut acc,
            &mut report,
        );
        queue.nested[doc as usize] = nested;
    }

    let index = Rc::new(acc.finish());
    report.words = index.len();

    let Some(state) = state.upgrade() else {
        return Err(BuildError::Superseded(generation));
    };
    let mut state = state.borrow_mut();
    if state.generation != generation {
        return Err(BuildError::Superseded(generation));
    }
    debug!(
        generation,
        words = report.words,
        documents = report.documents,
        overlays = report.overlays,
        skipped = report.skipped.len(),
        "index build finished"
    );
    state.phase = BuildPhase::Ready;
    state.index = Some(Rc::clone(&index));
    state.in_flight = None;
    state.report = report;
    Ok(index)
}
