pub mod decl_io;
pub mod document_source;
pub mod state;

pub use decl_io::{DEFINITION_FILE, DeclError, Definition, discover_definition, load_definition};
pub use document_source::{FsDocumentSource, MemoryDocumentSource};
pub use state::{JsonStateStore, MemoryStateStore, OpenStateStore, UiState};
