pub mod rows;
pub mod tree_view;

pub use rows::*;
pub use tree_view::*;
