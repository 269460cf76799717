pub mod builder;
pub mod word_index;

pub use builder::{
    BuildError, BuildFuture, BuildPhase, BuildReport, DocumentSource, FetchError, FetchFuture,
    IndexBuilder, IndexInput, SkippedDocument,
};
pub use word_index::{WordAccumulator, WordIndex};
