//! Layout contracts & policies for Weft

mod constraints;
mod measure;

pub use constraints::*;
pub use measure::*;

pub mod prelude {
    pub use crate::constraints::LayoutConstraints;
    pub use crate::measure::{MeasureMode, MeasureResult};
}
