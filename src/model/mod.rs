pub mod association;
pub mod common;
pub mod insect;
pub mod query;
pub mod tree;
pub mod views;

pub use association::*;
pub use common::*;
pub use insect::*;
pub use query::*;
pub use tree::*;
pub use views::*;
