//! Inline image/view measurement and placement.
//!
//! Placeholders are measured once per layout pass through
//! [`InlineMeasurer`]; after shaping, [`align`] turns line metrics plus the
//! measured geometry into final rectangles for each inline child.

use rustc_hash::FxHashMap;
use weft_ui_graphics::Rect;
use weft_ui_layout::{LayoutConstraints, MeasureResult};

use crate::annotated::AnnotationKind;
use crate::baseline::{BaselineMetrics, BaselineShiftCalculator};
use crate::result::LayoutResult;
use crate::style::VerticalAlign;

/// External collaborator measuring one inline child.
pub trait InlineMeasurer {
    /// Returns (width, height, baseline) for the placeholder named `id`.
    fn measure_inline(&mut self, id: u64, constraints: &LayoutConstraints) -> MeasureResult;
}

/// Measured geometry per placeholder id, written back each pass.
pub type PlaceholderGeometry = FxHashMap<u64, MeasureResult>;

/// Final rectangle of one inline child after alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlinePlacement {
    pub id: u64,
    pub rect: Rect,
    /// The child fell into truncated content and must not be displayed.
    pub truncated: bool,
}

/// Positions every inline placeholder of `result` against its line.
/// Placeholders past the visible content are reported truncated; ids in
/// `force_truncated` (suffix-owned or tail-discarded children) always are.
pub fn align(
    result: &LayoutResult,
    geometry: &PlaceholderGeometry,
    force_truncated: &[u64],
) -> Vec<InlinePlacement> {
    let mut out = Vec::new();
    for (range, id, _) in result.text.placeholders() {
        if force_truncated.contains(&id) {
            out.push(InlinePlacement {
                id,
                rect: Rect::default(),
                truncated: true,
            });
            continue;
        }
        let measured = geometry.get(&id).copied().unwrap_or_default();
        let line = result
            .shaped
            .lines
            .iter()
            .find(|l| l.start <= range.start && range.start < l.end.max(l.start + 1));
        let placement = match line {
            Some(line) if range.start < line.ellipsis_start || line.ellipsis_count == 0 => {
                let caret = line
                    .carets
                    .iter()
                    .find(|c| c.byte_offset == range.start)
                    .copied();
                match caret {
                    Some(caret) => {
                        let metrics = BaselineMetrics {
                            min_ascent: line.ascent,
                            max_descent: line.descent,
                            max_x_height: line.x_height,
                            line_height: line.height(),
                        };
                        let calc = BaselineShiftCalculator::new(metrics);
                        let (mode, value) = vertical_align_of(result, &range);
                        let height = measured.size.height;
                        let shift = calc.shift(mode, value, -height, 0.0);
                        let x = line.left + caret.x + result.translate_offset.x;
                        let y = line.baseline - height - shift + result.translate_offset.y;
                        InlinePlacement {
                            id,
                            rect: Rect {
                                x,
                                y,
                                width: measured.size.width,
                                height,
                            },
                            truncated: false,
                        }
                    }
                    None => InlinePlacement {
                        id,
                        rect: Rect::default(),
                        truncated: true,
                    },
                }
            }
            _ => InlinePlacement {
                id,
                rect: Rect::default(),
                truncated: true,
            },
        };
        out.push(placement);
    }
    out
}

fn vertical_align_of(
    result: &LayoutResult,
    range: &std::ops::Range<usize>,
) -> (VerticalAlign, f32) {
    let mut found = (VerticalAlign::Default, 0.0);
    for a in result.text.annotations() {
        if let AnnotationKind::BaselineShift { mode, value } = a.kind {
            if a.range.start <= range.start && range.end <= a.range.end {
                found = (mode, value);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ui_graphics::Size;

    struct FixedMeasurer(Size);

    impl InlineMeasurer for FixedMeasurer {
        fn measure_inline(&mut self, _id: u64, _c: &LayoutConstraints) -> MeasureResult {
            MeasureResult::new(self.0.width, self.0.height, 0.0)
        }
    }

    #[test]
    fn fixed_measurer_reports_size() {
        let mut m = FixedMeasurer(Size::new(10.0, 8.0));
        let r = m.measure_inline(1, &LayoutConstraints::unbounded());
        assert_eq!(r.size, Size::new(10.0, 8.0));
    }
}
