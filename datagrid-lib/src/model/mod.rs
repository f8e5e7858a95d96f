//! Grid data model

mod column;
mod metadata;
mod row;
mod value;

pub use column::*;
pub use metadata::*;
pub use row::*;
pub use value::*;
