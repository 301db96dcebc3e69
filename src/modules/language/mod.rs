pub mod controller;
pub mod router;

pub use router::{init_language_api_router, init_language_router};
