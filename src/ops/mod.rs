pub mod check;
pub mod filter;
pub mod query;

pub use filter::FilterController;
pub use query::{QueryError, QueryOutcome, find_prefix_start, hits_for_prefix, query};
