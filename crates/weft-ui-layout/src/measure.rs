//! Measurement modes and results

use weft_ui_graphics::Size;

/// How a constraint dimension binds during measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MeasureMode {
    /// The dimension is fixed to the given value.
    Exact,
    /// The dimension may be anything up to the given value.
    AtMost,
    /// The dimension is unconstrained; the given value is ignored.
    #[default]
    Undefined,
}

impl MeasureMode {
    /// Returns true if the mode provides an upper bound.
    #[inline]
    pub fn is_bounded(self) -> bool {
        !matches!(self, MeasureMode::Undefined)
    }
}

/// Outcome of measuring a node: its size plus the baseline of its first
/// line, used by the owning node for baseline alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeasureResult {
    pub size: Size,
    pub baseline: f32,
}

impl MeasureResult {
    pub fn new(width: f32, height: f32, baseline: f32) -> Self {
        Self {
            size: Size::new(width, height),
            baseline,
        }
    }

    pub const ZERO: MeasureResult = MeasureResult {
        size: Size::ZERO,
        baseline: 0.0,
    };
}
