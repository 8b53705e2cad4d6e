//! Length quantities and height-change directives.
//!
//! Heights in a spec are unit strings (`1.7m`, `5ft 10in`, `4mi`). They are
//! parsed once into [`Quantity`] and only compared, added and scaled after
//! that.

mod diff;
mod quantity;

pub use diff::Diff;
pub use quantity::{Quantity, UnitSystem};
