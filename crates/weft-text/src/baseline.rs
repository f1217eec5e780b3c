//! Vertical-align math for inline runs.
//!
//! Metric sign convention follows platform text stacks: ascent is negative
//! (distance above the baseline), descent positive.

use crate::style::VerticalAlign;

/// Line-wide font metrics aggregated across every inline run that needs
/// vertical-align math.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineMetrics {
    /// Most negative ascent seen (tallest run above the baseline).
    pub min_ascent: f32,
    /// Largest descent seen (deepest run below the baseline).
    pub max_descent: f32,
    /// Largest x-height seen.
    pub max_x_height: f32,
    /// Tallest line box among contributing runs.
    pub line_height: f32,
}

impl Default for BaselineMetrics {
    fn default() -> Self {
        Self {
            min_ascent: 0.0,
            max_descent: 0.0,
            max_x_height: 0.0,
            line_height: 0.0,
        }
    }
}

impl BaselineMetrics {
    /// Folds one run's metrics into the aggregate.
    pub fn merge(&mut self, ascent: f32, descent: f32, x_height: f32, line_height: f32) {
        self.min_ascent = self.min_ascent.min(ascent);
        self.max_descent = self.max_descent.max(descent);
        self.max_x_height = self.max_x_height.max(x_height);
        self.line_height = self.line_height.max(line_height);
    }
}

/// Maps a vertical-align mode to the baseline shift a run should apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineShiftCalculator {
    pub metrics: BaselineMetrics,
}

impl BaselineShiftCalculator {
    pub fn new(metrics: BaselineMetrics) -> Self {
        Self { metrics }
    }

    /// Computes the raw shift for a mode. Positive shifts move the run up.
    pub fn shift(&self, mode: VerticalAlign, value: f32, own_ascent: f32, own_descent: f32) -> f32 {
        let m = &self.metrics;
        match mode {
            VerticalAlign::Length => value,
            VerticalAlign::Percent => value * m.line_height / 100.0,
            VerticalAlign::Middle => (own_descent + own_ascent + m.max_x_height) * 0.5,
            VerticalAlign::Top | VerticalAlign::TextTop => own_ascent - m.min_ascent,
            VerticalAlign::Bottom | VerticalAlign::TextBottom => own_descent - m.max_descent,
            VerticalAlign::Sub => -0.1 * (own_descent - own_ascent),
            VerticalAlign::Super => 0.1 * (own_descent - own_ascent),
            VerticalAlign::Center => {
                (-m.min_ascent - m.max_descent + own_ascent + own_descent) * 0.5
            }
            VerticalAlign::Default | VerticalAlign::Baseline => 0.0,
        }
    }

    /// Adjusted ascent for a run: the shift folded back into its own ascent,
    /// ready to merge into line metrics.
    pub fn adjusted_ascent(
        &self,
        mode: VerticalAlign,
        value: f32,
        own_ascent: f32,
        own_descent: f32,
    ) -> f32 {
        -self.shift(mode, value, own_ascent, own_descent) + own_ascent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> BaselineMetrics {
        BaselineMetrics {
            min_ascent: -10.0,
            max_descent: 4.0,
            max_x_height: 6.0,
            line_height: 14.0,
        }
    }

    #[test]
    fn middle_of_own_metrics_is_zero_shift() {
        let calc = BaselineShiftCalculator::new(metrics());
        let shift = calc.shift(VerticalAlign::Middle, 0.0, -10.0, 4.0);
        assert_eq!(shift, 0.0);
        assert_eq!(calc.adjusted_ascent(VerticalAlign::Middle, 0.0, -10.0, 4.0), -10.0);
    }

    #[test]
    fn top_aligns_against_tallest_ascent() {
        let calc = BaselineShiftCalculator::new(metrics());
        // A shorter run (ascent -8) sits 2px below the line top.
        assert_eq!(calc.shift(VerticalAlign::Top, 0.0, -8.0, 3.0), 2.0);
    }

    #[test]
    fn percent_scales_line_height() {
        let calc = BaselineShiftCalculator::new(metrics());
        assert_eq!(calc.shift(VerticalAlign::Percent, 50.0, -8.0, 3.0), 7.0);
    }

    #[test]
    fn sub_and_super_mirror() {
        let calc = BaselineShiftCalculator::new(metrics());
        let sub = calc.shift(VerticalAlign::Sub, 0.0, -10.0, 4.0);
        let sup = calc.shift(VerticalAlign::Super, 0.0, -10.0, 4.0);
        assert_eq!(sub, -sup);
        assert!((sup - 1.4).abs() < 1e-6);
    }

    #[test]
    fn unknown_modes_do_not_shift() {
        let calc = BaselineShiftCalculator::new(metrics());
        assert_eq!(calc.shift(VerticalAlign::Default, 5.0, -10.0, 4.0), 0.0);
        assert_eq!(calc.shift(VerticalAlign::Baseline, 5.0, -10.0, 4.0), 0.0);
    }

    #[test]
    fn merge_keeps_extremes() {
        let mut m = BaselineMetrics::default();
        m.merge(-10.0, 4.0, 6.0, 14.0);
        m.merge(-7.0, 5.0, 5.0, 12.0);
        assert_eq!(m.min_ascent, -10.0);
        assert_eq!(m.max_descent, 5.0);
        assert_eq!(m.max_x_height, 6.0);
        assert_eq!(m.line_height, 14.0);
    }
}
