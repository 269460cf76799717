use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use futures::future::{self, FutureExt};

use crate::index::{DocumentSource, FetchError, FetchFuture};

/// Reads panel documents from files under the definition directory.
/// Document URLs are `/`-separated paths relative to `root`.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsDocumentSource { root: root.into() }
    }
}

impl DocumentSource for FsDocumentSource {
    fn fetch(&self, url: &str) -> FetchFuture {
        if url.split('/').any(|part| part == "..") {
            return future::ready(Err(FetchError::OutsideRoot(url.to_string()))).boxed_local();
        }
        let path = url
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part));
        let url = url.to_string();
        async move {
            fs::read_to_string(&path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => FetchError::NotFound(url),
                _ => FetchError::Read {
                    url,
                    message: e.to_string(),
                },
            })
        }
        .boxed_local()
    }
}

/// Documents held in memory. Counts fetches per URL.
#[derive(Debug, Default)]
pub struct MemoryDocumentSource {
    docs: HashMap<String, String>,
    fetches: RefCell<HashMap<String, usize>>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut source = Self::new();
        for (url, text) in pairs {
            source.insert(url, text);
        }
        source
    }

    pub fn insert(&mut self, url: &str, text: &str) {
        self.docs.insert(url.to_string(), text.to_string());
    }

    /// Number of times `url` was fetched
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches.borrow().get(url).copied().unwrap_or(0)
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn fetch(&self, url: &str) -> FetchFuture {
        *self.fetches.borrow_mut().entry(url.to_string()).or_default() += 1;
        let result = self
            .docs
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()));
        future::ready(result).boxed_local()
    }
}
