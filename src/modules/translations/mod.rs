pub mod controller;
pub mod router;
pub mod service;

pub use router::init_translations_router;
pub use service::{Catalogue, TranslationService, interpolate};
