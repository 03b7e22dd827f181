//! Configuration for an export run

pub mod defaults;
mod settings;

pub use settings::*;
