//! Code generation module

mod code_generator;
mod context;
mod materializer;
mod naming;
mod templates;
mod type_mapper;

pub use code_generator::*;
pub use context::*;
pub use materializer::*;
pub use naming::*;
pub use templates::*;
pub use type_mapper::*;
