//! Spec file loading.

mod parser;

pub use parser::{ParsedSpec, SpecParser};
