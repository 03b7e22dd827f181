//! Live schema introspection through `information_schema`

mod introspector;
mod metadata;

pub use introspector::*;
pub use metadata::*;
