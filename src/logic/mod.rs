pub mod associate;
pub mod entities;
pub mod error;
pub mod listing;
pub mod validate;

pub use associate::*;
pub use entities::*;
pub use error::*;
pub use listing::*;
pub use validate::*;
