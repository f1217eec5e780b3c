//! Layout output shared between the engine, cache and truncation pass.

use weft_ui_graphics::{Point, Size};

use crate::annotated::AnnotatedText;
use crate::shaper::ShapedText;

/// Per-line summary exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    pub start: usize,
    pub end: usize,
    pub ellipsis_count: usize,
}

/// Result of one `measure` call. Owned read-only once produced; the cache
/// shares it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// Final buffer the geometry refers to. May differ from the input when
    /// fix-ups rebuilt it (directional marks, tail recoloring, truncation).
    pub text: AnnotatedText,
    pub shaped: ShapedText,
    /// Measured size after constraint clamping.
    pub size: Size,
    /// Baseline of the first line.
    pub baseline: f32,
    /// Offset the owner applies when the aligned content box is narrower or
    /// shorter than the measured box.
    pub translate_offset: Point,
    /// Font size the auto-size search settled on (the style size when
    /// auto-size is off).
    pub auto_font_size: f32,
    /// Widest visible line, alignment-adjusted, italic correction included.
    pub max_line_width: f32,
    /// False when the result closes over per-node state and must not enter
    /// the shared cache.
    pub cacheable: bool,
}

impl LayoutResult {
    /// Zero-size result for degenerate inputs; never touches the shaper.
    pub fn empty(text: AnnotatedText) -> Self {
        Self {
            text,
            shaped: ShapedText::default(),
            size: Size::ZERO,
            baseline: 0.0,
            translate_offset: Point::ZERO,
            auto_font_size: 0.0,
            max_line_width: 0.0,
            cacheable: true,
        }
    }

    pub fn line_count(&self) -> usize {
        self.shaped.line_count()
    }

    pub fn lines(&self) -> impl Iterator<Item = LineInfo> + '_ {
        self.shaped.lines.iter().map(|l| LineInfo {
            start: l.start,
            end: l.end,
            ellipsis_count: l.ellipsis_count,
        })
    }

    /// Whether visible lines cover less than the full buffer.
    pub fn is_truncated(&self) -> bool {
        self.shaped.is_truncated(self.text.len())
    }
}
