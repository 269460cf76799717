pub mod cli;
pub mod index;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
pub mod session;
pub mod tui;
pub mod view;

pub use session::{FilterStatus, IndexSession};
