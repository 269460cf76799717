pub mod document;
pub mod tokenize;

pub use document::{ParsedDocument, ReferenceError, parse_document, resolve_reference};
pub use tokenize::{query_terms, tokenize};
