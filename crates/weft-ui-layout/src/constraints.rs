//! Layout constraints passed into text measurement

use crate::measure::MeasureMode;

/// Constraints used during text layout measurement.
///
/// Unlike box constraints this carries the measure mode explicitly: an
/// `Undefined` dimension means the stored value must be ignored. The
/// feature flags are part of the layout cache key, so the whole struct is
/// hashable (float dimensions hash via their bit patterns).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutConstraints {
    pub width: f32,
    pub height: f32,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    /// Allows the single-measurement fast path for plain runs.
    pub enable_fast_path: bool,
    /// Recolors an ellipsized tail to the base run color.
    pub tail_color_convert: bool,
    /// Selects the refactored baseline/line-height behavior; the legacy
    /// behavior differs only in the nowrap line-height offset handling.
    pub use_refactored_baseline: bool,
}

impl LayoutConstraints {
    pub fn exact(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            width_mode: MeasureMode::Exact,
            height_mode: MeasureMode::Exact,
            ..Self::default()
        }
    }

    pub fn at_most(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            width_mode: MeasureMode::AtMost,
            height_mode: MeasureMode::AtMost,
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has_bounded_width(&self) -> bool {
        self.width_mode.is_bounded()
    }

    #[inline]
    pub fn has_bounded_height(&self) -> bool {
        self.height_mode.is_bounded()
    }

    /// Creates new constraints with the given width bound and mode.
    pub fn with_width(self, width: f32, mode: MeasureMode) -> Self {
        Self {
            width,
            width_mode: mode,
            ..self
        }
    }

    /// Clamps a measured size into these constraints. Negative inputs clamp
    /// to zero rather than failing.
    pub fn constrain(&self, width: f32, height: f32) -> (f32, f32) {
        let w = match self.width_mode {
            MeasureMode::Exact => self.width,
            MeasureMode::AtMost => width.clamp(0.0, self.width),
            MeasureMode::Undefined => width.max(0.0),
        };
        let h = match self.height_mode {
            MeasureMode::Exact => self.height,
            MeasureMode::AtMost => height.clamp(0.0, self.height),
            MeasureMode::Undefined => height.max(0.0),
        };
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_constrain_overrides_measured_size() {
        let c = LayoutConstraints::exact(100.0, 50.0);
        assert_eq!(c.constrain(70.0, 80.0), (100.0, 50.0));
    }

    #[test]
    fn at_most_clamps_and_zeroes_negatives() {
        let c = LayoutConstraints::at_most(100.0, 50.0);
        assert_eq!(c.constrain(130.0, -4.0), (100.0, 0.0));
    }

    #[test]
    fn unbounded_passes_measured_size_through() {
        let c = LayoutConstraints::unbounded();
        assert_eq!(c.constrain(130.0, 260.0), (130.0, 260.0));
        assert!(!c.has_bounded_width());
    }
}
