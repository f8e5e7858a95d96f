//! Error types

mod cache;
mod field;
mod save;
mod service;

pub use cache::*;
pub use field::*;
pub use save::*;
pub use service::*;
