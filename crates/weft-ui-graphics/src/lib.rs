//! Pure math/data for drawing & units in Weft
//!
//! This crate contains geometry primitives, color definitions, brushes,
//! and typography value types that are used throughout the Weft framework.

mod brush;
mod color;
mod geometry;
mod typography;

pub use brush::*;
pub use color::*;
pub use geometry::*;
pub use typography::*;

pub mod prelude {
    pub use crate::brush::Brush;
    pub use crate::color::Color;
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::typography::{FontStyle, FontWeight, TypefaceStyle};
}
