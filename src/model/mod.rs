pub mod config;
pub mod interner;
pub mod node;
pub mod store;

pub use config::*;
pub use interner::*;
pub use node::*;
pub use store::*;
