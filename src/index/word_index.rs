use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::model::NodeId;
use crate::parse::tokenize;

/// Append-only word → node accumulator used while a build is in progress.
/// Words stay in discovery order until [`WordAccumulator::finish`].
#[derive(Debug, Default)]
pub struct WordAccumulator {
    entries: IndexMap<String, BTreeSet<NodeId>>,
}

impl WordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_word(&mut self, word: &str, node: NodeId) {
        match self.entries.get_mut(word) {
            Some(nodes) => {
                nodes.insert(node);
            }
            None => {
                self.entries.insert(word.to_string(), BTreeSet::from([node]));
            }
        }
    }

    /// Tokenize `phrase` and attribute every word to `node`
    pub fn add_phrase(&mut self, phrase: &str, node: NodeId) {
        for word in tokenize(phrase) {
            self.add_word(&word, node);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort the word list (once) and freeze the index
    pub fn finish(self) -> WordIndex {
        let mut words: Vec<String> = self.entries.keys().cloned().collect();
        words.sort_unstable();
        WordIndex {
            entries: self.entries,
            words,
        }
    }
}

/// Read-only inverted index with its lexicographically sorted word list
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    entries: IndexMap<String, BTreeSet<NodeId>>,
    words: Vec<String>,
}

impl WordIndex {
    /// Index `(node, phrase)` pairs directly, without documents
    pub fn from_phrases<'a>(phrases: impl IntoIterator<Item = (NodeId, &'a str)>) -> Self {
        let mut acc = WordAccumulator::new();
        for (node, phrase) in phrases {
            acc.add_phrase(phrase, node);
        }
        acc.finish()
    }

    /// Sorted, de-duplicated words
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn nodes_for(&self, word: &str) -> Option<&BTreeSet<NodeId>> {
        self.entries.get(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
