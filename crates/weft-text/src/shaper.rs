//! The shaping seam: line breaking and glyph measurement behind a trait.
//!
//! [`TextShaper`] is the opaque primitive the layout engine drives. The
//! crate ships two implementations: [`GlyphShaper`], backed by real font
//! data through [`crate::typeface::Typeface`], and [`MonospacedShaper`],
//! a fixed-advance model for deterministic tests.

use std::sync::Arc;

use unicode_bidi::{BidiInfo, Level};

use crate::annotated::{AnnotatedText, AnnotationKind, ELLIPSIS, LTR_MARK, RTL_MARK};
use crate::decode::{WORD_JOINER, ZERO_WIDTH_SPACE};
use crate::style::BreakStrategy;
use crate::typeface::Typeface;

/// Wrap width standing in for "unbounded" when a dimension is unmeasured.
pub const UNBOUNDED_WIDTH: f32 = i16::MAX as f32;

/// Flattened paint state for one shape call.
#[derive(Debug, Clone, Default)]
pub struct TextPaint {
    pub font_size: f32,
    pub letter_spacing: f32,
    pub typeface: Option<Arc<Typeface>>,
    /// Forces every line box to this height when set.
    pub line_height: Option<f32>,
    pub include_font_padding: bool,
}

/// Vertical metrics at one font size; ascent is negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub x_height: f32,
    pub line_gap: f32,
}

impl FontMetrics {
    pub fn line_height(&self) -> f32 {
        -self.ascent + self.descent
    }

    /// Synthetic metrics used while a typeface is unresolved.
    pub fn fallback(font_size: f32) -> Self {
        Self {
            ascent: -0.8 * font_size,
            descent: 0.2 * font_size,
            x_height: 0.5 * font_size,
            line_gap: 0.0,
        }
    }
}

/// Alignment after direction resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvedAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone)]
pub struct ShapeRequest<'a> {
    pub text: &'a AnnotatedText,
    pub paint: &'a TextPaint,
    /// Wrap width; [`UNBOUNDED_WIDTH`] when unconstrained.
    pub width: f32,
    /// Visible line clamp; lines past it are dropped.
    pub max_lines: Option<usize>,
    /// Ellipsize the last visible line when content continues past it.
    pub ellipsize: bool,
    /// Width budget for the ellipsized line when it differs from `width`.
    pub ellipsize_width: Option<f32>,
    pub align: ResolvedAlign,
    pub rtl: bool,
    /// Extra pixels between line boxes.
    pub line_spacing: f32,
    pub break_strategy: BreakStrategy,
    pub first_line_indent: f32,
    /// Measured inline boxes by byte offset, sorted. Each replaces the glyph
    /// advance of its placeholder character and widens its line box.
    pub inline_boxes: Vec<InlineBox>,
}

impl<'a> ShapeRequest<'a> {
    pub fn new(text: &'a AnnotatedText, paint: &'a TextPaint) -> Self {
        Self {
            text,
            paint,
            width: UNBOUNDED_WIDTH,
            max_lines: None,
            ellipsize: false,
            ellipsize_width: None,
            align: ResolvedAlign::Left,
            rtl: false,
            line_spacing: 0.0,
            break_strategy: BreakStrategy::Simple,
            first_line_indent: 0.0,
            inline_boxes: Vec::new(),
        }
    }
}

/// Fixed-size box occupying one placeholder character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InlineBox {
    pub byte_offset: usize,
    pub advance: f32,
    /// Extent above the baseline; negative, like font ascent.
    pub ascent: f32,
    pub descent: f32,
}

/// Leading edge of one character within its line, relative to the line's
/// visual start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretPosition {
    pub byte_offset: usize,
    pub x: f32,
    pub advance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedLine {
    /// Byte range of the line's logical content; `end` spans through elided
    /// text when the line is ellipsized.
    pub start: usize,
    pub end: usize,
    /// Byte offset where elision begins; equals `end` when none.
    pub ellipsis_start: usize,
    /// Characters replaced by the ellipsis glyph.
    pub ellipsis_count: usize,
    /// Advance extent of visible content, ellipsis glyph included.
    pub width: f32,
    /// Alignment offset of the line box within the layout width.
    pub left: f32,
    pub top: f32,
    pub bottom: f32,
    pub baseline: f32,
    pub ascent: f32,
    pub descent: f32,
    pub x_height: f32,
    pub rtl: bool,
    /// One entry per visible character, in logical order.
    pub carets: Vec<CaretPosition>,
}

impl ShapedLine {
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapedText {
    pub lines: Vec<ShapedLine>,
    /// Lines the full content produced before the visibility clamp.
    pub source_line_count: usize,
    /// Layout width the shape ran against.
    pub width: f32,
    pub height: f32,
}

impl ShapedText {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether shaped output covers less than the full buffer.
    pub fn is_truncated(&self, buffer_len: usize) -> bool {
        match self.lines.last() {
            None => buffer_len > 0,
            Some(last) => {
                self.source_line_count > self.lines.len()
                    || last.ellipsis_count > 0
                    || last.end < buffer_len
            }
        }
    }

    pub fn first_baseline(&self) -> f32 {
        self.lines.first().map_or(0.0, |l| l.baseline)
    }

    /// Max advance extent across visible lines.
    pub fn max_line_width(&self) -> f32 {
        self.lines.iter().fold(0.0, |acc, l| acc.max(l.width))
    }
}

/// Opaque shaping primitive: text + paint + policy in, line geometry out.
pub trait TextShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> ShapedText;
}

/// Whether the paragraph base direction is right-to-left, from the first
/// strong directional character.
pub fn paragraph_is_rtl(text: &str) -> bool {
    let info = BidiInfo::new(text, None);
    info.paragraphs
        .first()
        .map_or(false, |p| p.level.is_rtl())
}

/// Whether `text` contains characters of mixed embedding levels, which
/// rules out the single-measurement layout path.
pub fn has_mixed_direction(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let info = BidiInfo::new(text, None);
    let mut levels = info.levels.iter();
    let first: Level = match levels.next() {
        Some(l) => *l,
        None => return false,
    };
    levels.any(|l| *l != first)
}

fn is_zero_width(c: char) -> bool {
    matches!(c, ZERO_WIDTH_SPACE | WORD_JOINER | LTR_MARK | RTL_MARK | '\r')
}

/// Shared greedy line breaker. `advance` reports the advance of one char at
/// its byte offset; `metrics` reports vertical metrics for a byte range.
pub(crate) fn break_lines(
    request: &ShapeRequest<'_>,
    base_advance: &dyn Fn(usize, char) -> f32,
    metrics: &dyn Fn(usize, usize) -> FontMetrics,
) -> ShapedText {
    let boxes = &request.inline_boxes;
    let advance = &|byte: usize, c: char| -> f32 {
        match boxes.binary_search_by_key(&byte, |b| b.byte_offset) {
            Ok(i) => boxes[i].advance,
            Err(_) => base_advance(byte, c),
        }
    };
    let text = request.text.text();
    let wrap_width = if request.width > 0.0 {
        request.width
    } else {
        UNBOUNDED_WIDTH
    };

    // Pass 1: logical break into (start, end) ranges.
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut line_start = 0usize;
    let mut pending_width = 0.0f32;
    let mut last_break: Option<(usize, f32)> = None; // (byte after break, width up to it)
    let mut budget = wrap_width - request.first_line_indent;
    let mut prev_char: Option<char> = None;

    for (i, c) in text.char_indices() {
        if c == '\n' {
            ranges.push((line_start, i));
            line_start = i + 1;
            pending_width = 0.0;
            last_break = None;
            budget = wrap_width;
            prev_char = None;
            continue;
        }
        let adv = if is_zero_width(c) { 0.0 } else { advance(i, c) };
        if pending_width + adv > budget && i > line_start {
            let joined = prev_char == Some(WORD_JOINER) || c == WORD_JOINER;
            match last_break {
                Some((break_at, _)) if break_at > line_start => {
                    ranges.push((line_start, break_at));
                    line_start = break_at;
                }
                _ if !joined => {
                    // Emergency break inside an unbreakable word.
                    ranges.push((line_start, i));
                    line_start = i;
                }
                _ => {}
            }
            budget = wrap_width;
            pending_width = width_between(text, line_start, i, advance);
            last_break = None;
        }
        pending_width += adv;
        if c.is_whitespace() || c == ZERO_WIDTH_SPACE {
            last_break = Some((i + c.len_utf8(), pending_width));
        }
        prev_char = Some(c);
    }
    ranges.push((line_start, text.len()));

    let source_line_count = ranges.len();
    let visible = request.max_lines.unwrap_or(usize::MAX).max(1);
    let clamp = ranges.len() > visible;
    if clamp {
        ranges.truncate(visible);
    }

    // Pass 2: geometry per kept line.
    let mut lines: Vec<ShapedLine> = Vec::with_capacity(ranges.len());
    let mut top = 0.0f32;
    let rtl = request.rtl || paragraph_is_rtl(text);
    for (index, (start, end)) in ranges.iter().copied().enumerate() {
        let last_visible = index + 1 == ranges.len();
        let mut logical_end = end;
        let mut ellipsis_start = end;
        let mut ellipsis_count = 0usize;
        let mut carets = collect_carets(text, start, end, advance);
        let mut width: f32 = carets.last().map_or(0.0, |c| c.x + c.advance);

        if last_visible && clamp && request.ellipsize {
            // The ellipsized line logically owns the rest of the paragraph.
            logical_end = paragraph_end(text, start);
            let target = request.ellipsize_width.unwrap_or(wrap_width).max(0.0);
            let dots = advance(start, ELLIPSIS);
            while let Some(c) = carets.last() {
                if c.x + c.advance + dots <= target || carets.len() == 1 {
                    break;
                }
                carets.pop();
            }
            let kept_end = carets.last().map_or(start, |c| next_char_boundary(text, c.byte_offset));
            ellipsis_start = kept_end;
            ellipsis_count = text[kept_end..logical_end].chars().count();
            width = carets.last().map_or(0.0, |c| c.x + c.advance) + dots;
        }

        let mut m = metrics(start, logical_end.min(end).max(start));
        // A box taller than the surrounding glyphs stretches the line.
        for b in boxes.iter().filter(|b| b.byte_offset >= start && b.byte_offset < end) {
            m.ascent = m.ascent.min(b.ascent);
            m.descent = m.descent.max(b.descent);
        }
        let natural = m.line_height();
        let box_height = request.paint.line_height.unwrap_or(natural)
            + if request.paint.include_font_padding {
                m.line_gap
            } else {
                0.0
            };
        let pad = (box_height - natural) * 0.5;
        let baseline = top + pad - m.ascent;
        let indent = if index == 0 { request.first_line_indent } else { 0.0 };
        let extent = width + indent;
        let box_width = if wrap_width >= UNBOUNDED_WIDTH { extent } else { wrap_width };
        let left = match request.align {
            ResolvedAlign::Left => indent,
            ResolvedAlign::Center => (box_width - extent).max(0.0) * 0.5 + indent,
            ResolvedAlign::Right => (box_width - extent).max(0.0) + indent,
        };
        let bottom = top + box_height;
        lines.push(ShapedLine {
            start,
            end: logical_end,
            ellipsis_start,
            ellipsis_count,
            width,
            left,
            top,
            bottom,
            baseline,
            ascent: m.ascent,
            descent: m.descent,
            x_height: m.x_height,
            rtl,
            carets,
        });
        top = bottom + request.line_spacing;
    }

    let height = lines.last().map_or(0.0, |l| l.bottom);
    ShapedText {
        lines,
        source_line_count,
        width: wrap_width,
        height,
    }
}

fn width_between(text: &str, start: usize, end: usize, advance: &dyn Fn(usize, char) -> f32) -> f32 {
    text[start..end]
        .char_indices()
        .map(|(i, c)| {
            if is_zero_width(c) {
                0.0
            } else {
                advance(start + i, c)
            }
        })
        .sum()
}

fn collect_carets(
    text: &str,
    start: usize,
    end: usize,
    advance: &dyn Fn(usize, char) -> f32,
) -> Vec<CaretPosition> {
    let mut x = 0.0f32;
    let mut out = Vec::new();
    for (i, c) in text[start..end].char_indices() {
        let adv = if is_zero_width(c) { 0.0 } else { advance(start + i, c) };
        out.push(CaretPosition {
            byte_offset: start + i,
            x,
            advance: adv,
        });
        x += adv;
    }
    out
}

fn paragraph_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}

fn next_char_boundary(text: &str, i: usize) -> usize {
    let mut j = i + 1;
    while j < text.len() && !text.is_char_boundary(j) {
        j += 1;
    }
    j.min(text.len())
}

/// Shaper backed by resolved [`Typeface`] data; falls back to synthetic
/// metrics while a face is unresolved. Per-range size and spacing
/// annotations are honored with later annotations winning.
#[derive(Debug, Default)]
pub struct GlyphShaper;

impl GlyphShaper {
    pub fn new() -> Self {
        Self
    }

    fn effective_size(text: &AnnotatedText, byte: usize, base: f32) -> f32 {
        let mut size = base;
        for a in text.annotations() {
            if let AnnotationKind::FontSize(s) = a.kind {
                if a.range.contains(&byte) {
                    size = s;
                }
            }
        }
        size
    }

    fn effective_spacing(text: &AnnotatedText, byte: usize, base: f32) -> f32 {
        let mut spacing = base;
        for a in text.annotations() {
            if let AnnotationKind::LetterSpacing(s) = a.kind {
                if a.range.contains(&byte) {
                    spacing = s;
                }
            }
        }
        spacing
    }
}

impl TextShaper for GlyphShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> ShapedText {
        let paint = request.paint;
        let text = request.text;
        let advance = |byte: usize, c: char| -> f32 {
            let size = Self::effective_size(text, byte, paint.font_size);
            let spacing = Self::effective_spacing(text, byte, paint.letter_spacing);
            match &paint.typeface {
                Some(face) => face.advance(c, size) + spacing,
                None => size * 0.5 + spacing,
            }
        };
        let metrics = |start: usize, end: usize| -> FontMetrics {
            // The tallest size present in the range dictates the line box.
            let mut size = paint.font_size;
            if start < end {
                for (i, _) in text.text()[start..end].char_indices() {
                    size = size.max(Self::effective_size(text, start + i, paint.font_size));
                }
            }
            match &paint.typeface {
                Some(face) => face.metrics(size),
                None => FontMetrics::fallback(size),
            }
        };
        break_lines(request, &advance, &metrics)
    }
}

/// Fixed-advance shaper: every glyph is `font_size * 0.5` wide. Keeps
/// layout tests independent of font data.
#[derive(Debug, Clone, Copy)]
pub struct MonospacedShaper {
    pub advance_ratio: f32,
}

impl Default for MonospacedShaper {
    fn default() -> Self {
        Self { advance_ratio: 0.5 }
    }
}

impl TextShaper for MonospacedShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> ShapedText {
        let paint = request.paint;
        let text = request.text;
        let advance = |byte: usize, _c: char| -> f32 {
            let size = GlyphShaper::effective_size(text, byte, paint.font_size);
            let spacing = GlyphShaper::effective_spacing(text, byte, paint.letter_spacing);
            size * self.advance_ratio + spacing
        };
        let metrics = |start: usize, end: usize| -> FontMetrics {
            let mut size = paint.font_size;
            if start < end {
                for (i, _) in text.text()[start..end].char_indices() {
                    size = size.max(GlyphShaper::effective_size(text, start + i, paint.font_size));
                }
            }
            FontMetrics::fallback(size)
        };
        break_lines(request, &advance, &metrics)
    }
}
