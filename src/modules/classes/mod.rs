//! Classes and their sections.

pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_classes_router, init_sections_router};
