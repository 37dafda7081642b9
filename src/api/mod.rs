pub mod association_handlers;
pub mod envelope;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use association_handlers::*;
pub use envelope::*;
pub use extractors::*;
pub use handlers::*;
pub use routes::*;
