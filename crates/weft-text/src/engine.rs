//! The layout engine: annotated text + style + constraints in, line
//! geometry out.
//!
//! `measure` is synchronous, never panics, and always terminates: every
//! fix-up and search below is a bounded loop (ellipsis fix-ups re-shape a
//! fixed number of times, the auto-size walk is bounded by its candidate
//! list, character stripping by the buffer length).

use std::sync::Arc;

use weft_ui_graphics::{Point, Size};
use weft_ui_layout::LayoutConstraints;

use crate::annotated::{AnnotatedText, ELLIPSIS, LTR_MARK, RTL_MARK};
use crate::cache::{LayoutCache, LayoutKey};
use crate::inline::{InlineMeasurer, PlaceholderGeometry};
use crate::result::LayoutResult;
use crate::shaper::{
    paragraph_is_rtl, has_mixed_direction, InlineBox, ResolvedAlign, ShapeRequest, ShapedText,
    TextPaint, TextShaper, UNBOUNDED_WIDTH,
};
use crate::style::{
    BreakStrategy, Direction, TextAlign, TextOverflow, TextStyleAttributes, WordBreak,
};
use crate::typeface::TypefaceRegistry;

/// Italic glyphs overhang their advance; the correction is a fraction of
/// the first line's ascent.
pub const ITALIC_ADVANCE_RATIO: f32 = 0.2;

/// Optional emoji preprocessing capability, resolved at configuration time.
pub trait EmojiProcessor: Send + Sync {
    /// Returns a rewritten buffer when the input needs emoji substitution.
    fn preprocess(&self, text: &str) -> Option<String>;
}

/// Drives the shaper through the full measurement pipeline.
pub struct LayoutEngine<'a> {
    shaper: &'a dyn TextShaper,
    typefaces: Option<&'a TypefaceRegistry>,
    emoji: Option<&'a dyn EmojiProcessor>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(shaper: &'a dyn TextShaper) -> Self {
        Self {
            shaper,
            typefaces: None,
            emoji: None,
        }
    }

    pub fn with_typefaces(mut self, registry: &'a TypefaceRegistry) -> Self {
        self.typefaces = Some(registry);
        self
    }

    pub fn with_emoji(mut self, emoji: &'a dyn EmojiProcessor) -> Self {
        self.emoji = Some(emoji);
        self
    }

    /// Measures inline children once each, writing geometry back by id.
    pub fn measure_placeholders(
        &self,
        text: &AnnotatedText,
        constraints: &LayoutConstraints,
        measurer: &mut dyn InlineMeasurer,
    ) -> PlaceholderGeometry {
        let mut geometry = PlaceholderGeometry::default();
        for (_, id, _) in text.placeholders() {
            geometry
                .entry(id)
                .or_insert_with(|| measurer.measure_inline(id, constraints));
        }
        geometry
    }

    /// Measures content with no inline children (or with their widths
    /// unknown and treated as zero).
    pub fn measure(
        &self,
        text: &AnnotatedText,
        style: &TextStyleAttributes,
        constraints: &LayoutConstraints,
    ) -> LayoutResult {
        self.measure_with_placeholders(text, style, constraints, &PlaceholderGeometry::default())
    }

    /// Cache-aware measure: returns the memoized result for an equal
    /// (content, style, constraints) triple, otherwise measures and stores.
    pub fn measure_cached(
        &self,
        cache: &LayoutCache,
        text: &AnnotatedText,
        style: &TextStyleAttributes,
        constraints: &LayoutConstraints,
    ) -> Arc<LayoutResult> {
        let key = LayoutKey::new(text, style, constraints);
        if let Some(hit) = cache.get(&key) {
            return hit;
        }
        let result = Arc::new(self.measure(text, style, constraints));
        cache.put(key, result.clone());
        result
    }

    pub fn measure_with_placeholders(
        &self,
        text: &AnnotatedText,
        style: &TextStyleAttributes,
        constraints: &LayoutConstraints,
        geometry: &PlaceholderGeometry,
    ) -> LayoutResult {
        // Degenerate exits: nothing to shape, or a zero-size box.
        let zero_box = constraints.has_bounded_width()
            && constraints.has_bounded_height()
            && constraints.width <= 0.0
            && constraints.height <= 0.0;
        if text.is_empty() || zero_box {
            let mut empty = LayoutResult::empty(text.clone());
            empty.cacheable = !text.has_identity_annotations();
            return empty;
        }

        let mut working = text.clone();

        // Hard content clip, with the ellipsis kept on the correct visual
        // side via a directional mark.
        if let Some(max_chars) = style.max_text_length {
            if working.char_count() > max_chars {
                let rtl_source = paragraph_is_rtl(working.text());
                working = working.clipped_chars(max_chars);
                let mark = if rtl_source { RTL_MARK } else { LTR_MARK };
                let mut tail = String::new();
                tail.push(mark);
                tail.push(ELLIPSIS);
                working = working.with_appended(&tail);
            }
        }

        if let Some(emoji) = self.emoji {
            if let Some(rewritten) = emoji.preprocess(working.text()) {
                working =
                    AnnotatedText::with_annotations(rewritten, working.annotations().to_vec());
            }
        }

        let single_line = style.is_single_line();
        let mut width = if constraints.has_bounded_width() {
            constraints.width.max(0.0)
        } else {
            UNBOUNDED_WIDTH
        };
        let wants_ellipsis = style.text_overflow == TextOverflow::Ellipsis;

        // no-wrap collapses to the first paragraph; width only stays
        // bounded when an ellipsis must be placed.
        if single_line {
            if let Some(newline) = working.text().find('\n') {
                working = working.clipped(newline);
            }
            if !wants_ellipsis {
                width = UNBOUNDED_WIDTH;
            }
        }

        if working.is_empty() {
            let mut empty = LayoutResult::empty(working);
            empty.cacheable = !text.has_identity_annotations();
            return empty;
        }

        let rtl = match style.direction {
            Direction::Ltr => false,
            Direction::Rtl => true,
            Direction::Neutral => paragraph_is_rtl(working.text()),
        };
        let align = resolve_align(style.text_align, rtl);

        let max_lines = if single_line {
            Some(1)
        } else {
            style.max_line_count.map(|n| n.max(1) as usize)
        };
        let ellipsize = wants_ellipsis && max_lines.is_some();

        let mut overrides: Vec<InlineBox> = working
            .placeholders()
            .map(|(range, id, _)| {
                let size = geometry.get(&id).map_or(Size::ZERO, |m| m.size);
                InlineBox {
                    byte_offset: range.start,
                    advance: size.width,
                    ascent: -size.height,
                    descent: 0.0,
                }
            })
            .collect();
        overrides.sort_by_key(|b| b.byte_offset);

        // Only shapes that cannot need a fix-up pass may short-circuit:
        // nowrap, single-line ellipsis, or unbounded width.
        let boring_shape =
            single_line || (ellipsize && max_lines == Some(1)) || !constraints.has_bounded_width();
        let fast_path = constraints.enable_fast_path
            && boring_shape
            && working.annotations().is_empty()
            && !has_mixed_direction(working.text())
            && align == ResolvedAlign::Left
            && style.auto_size.is_none();

        let base_size = working
            .max_font_size()
            .map_or(style.font_size, |s| s.max(style.font_size));

        let ctx = ShapeContext {
            engine: self,
            style,
            constraints,
            width,
            align,
            rtl,
            max_lines,
            ellipsize,
            overrides,
            single_line,
            fast_path,
        };

        let (shaped, shaped_text, chosen_size) = if let Some(auto) = &style.auto_size {
            if constraints.has_bounded_width() {
                ctx.auto_size_search(&working, base_size, &auto.candidates())
            } else {
                let (shaped, final_text) = ctx.shape_pass(&working, base_size);
                (shaped, final_text, base_size)
            }
        } else {
            let (shaped, final_text) = ctx.shape_pass(&working, base_size);
            (shaped, final_text, base_size)
        };

        self.finish(shaped, shaped_text, style, constraints, chosen_size, &ctx, text)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        shaped: ShapedText,
        final_text: AnnotatedText,
        style: &TextStyleAttributes,
        constraints: &LayoutConstraints,
        font_size: f32,
        ctx: &ShapeContext<'_, '_>,
        source: &AnnotatedText,
    ) -> LayoutResult {
        let max_line_width = max_line_width(&shaped, style, &final_text);

        // Legacy nowrap handling keeps the natural line box and reports the
        // line-height delta as a translate offset instead.
        let mut translate = Point::ZERO;
        let mut height = shaped.height;
        if !constraints.use_refactored_baseline && ctx.single_line {
            if let Some(line_height) = style.line_height {
                if line_height > height {
                    translate.y = (line_height - height) * 0.5;
                    height = line_height;
                }
            }
        }

        let (w, h) = constraints.constrain(max_line_width, height);
        // Aligned lines were positioned inside the shaping width; when the
        // reported box is narrower the drawn content shifts left with it.
        if shaped.width < UNBOUNDED_WIDTH && w < shaped.width {
            translate.x = match ctx.align {
                ResolvedAlign::Left => 0.0,
                ResolvedAlign::Center => (w - shaped.width) * 0.5,
                ResolvedAlign::Right => w - shaped.width,
            };
        }
        let baseline = shaped.first_baseline() + translate.y;
        let cacheable = !source.has_identity_annotations();
        LayoutResult {
            text: final_text,
            shaped,
            size: Size::new(w, h),
            baseline,
            translate_offset: translate,
            auto_font_size: font_size,
            max_line_width,
            cacheable,
        }
    }
}

/// Per-measure shaping state shared by trials and fix-ups.
struct ShapeContext<'e, 'a> {
    engine: &'e LayoutEngine<'a>,
    style: &'e TextStyleAttributes,
    constraints: &'e LayoutConstraints,
    width: f32,
    align: ResolvedAlign,
    rtl: bool,
    max_lines: Option<usize>,
    ellipsize: bool,
    overrides: Vec<InlineBox>,
    single_line: bool,
    fast_path: bool,
}

impl ShapeContext<'_, '_> {
    fn paint(&self, font_size: f32) -> TextPaint {
        let style = self.style;
        let typeface = match (&style.font_family, self.engine.typefaces) {
            (Some(family), Some(registry)) => {
                let face = registry.resolve(family, style.font_weight, style.font_style);
                if face.is_none() {
                    log::warn!("typeface '{family}' unresolved, using default metrics");
                }
                face
            }
            _ => None,
        };
        // Legacy single-line styling applies line-height as an offset after
        // shaping rather than as a line-box override.
        let line_height = if !self.constraints.use_refactored_baseline && self.single_line {
            None
        } else {
            style.line_height
        };
        TextPaint {
            font_size,
            letter_spacing: style.letter_spacing.unwrap_or(0.0),
            typeface,
            line_height,
            include_font_padding: style.include_font_padding,
        }
    }

    fn request<'t>(&'t self, text: &'t AnnotatedText, paint: &'t TextPaint) -> ShapeRequest<'t> {
        ShapeRequest {
            text,
            paint,
            width: self.width,
            max_lines: self.max_lines,
            ellipsize: self.ellipsize,
            ellipsize_width: None,
            align: self.align,
            rtl: self.rtl,
            line_spacing: self.style.line_spacing,
            break_strategy: break_strategy_for(self.style),
            first_line_indent: self.style.text_indent.unwrap_or(0.0),
            inline_boxes: self.overrides.clone(),
        }
    }

    /// One full shape including fix-ups and the height-overflow clamp.
    /// Returns the geometry and the buffer it refers to, which differs from
    /// `text` when a fix-up rebuilt the tail.
    fn shape_pass(&self, text: &AnnotatedText, font_size: f32) -> (ShapedText, AnnotatedText) {
        let paint = self.paint(font_size);
        let request = self.request(text, &paint);
        let shaped = self.engine.shaper.shape(&request);
        if self.fast_path {
            return (shaped, text.clone());
        }
        let (shaped, final_text) = self.fix_ellipsis(text, &paint, shaped);
        self.clamp_height_overflow(text, &paint, shaped, final_text)
    }

    fn fix_ellipsis(
        &self,
        text: &AnnotatedText,
        paint: &TextPaint,
        mut shaped: ShapedText,
    ) -> (ShapedText, AnnotatedText) {
        let ellipsized = shaped.lines.last().map_or(false, |l| l.ellipsis_count > 0);
        if !ellipsized {
            return (shaped, text.clone());
        }

        // (a) never ellipsize immediately after an inline placeholder; pull
        // the boundary one position earlier so the mark replaces it.
        let prev = shaped.lines.last().and_then(|l| {
            l.carets
                .iter()
                .rev()
                .find(|c| c.byte_offset < l.ellipsis_start)
                .copied()
        });
        if let Some(prev) = prev {
            if text.placeholder_at(prev.byte_offset).is_some() {
                let mut request = self.request(text, paint);
                request.ellipsize_width = Some(prev.x.max(1.0));
                shaped = self.engine.shaper.shape(&request);
            }
        }

        // (b) an ellipsized line measuring wider than its box re-shapes
        // against a tightened budget.
        let last_width = shaped.lines.last().map_or(0.0, |l| l.width);
        if self.width < UNBOUNDED_WIDTH && last_width > self.width {
            let mut request = self.request(text, paint);
            request.ellipsize_width = Some(self.width.floor() * 2.0 - last_width);
            shaped = self.engine.shaper.shape(&request);
        }

        // (c) rebuild the kept prefix when a directional mark must sit
        // before the ellipsis or the tail is recolored.
        let needs_rebuild = self.rtl || self.constraints.tail_color_convert;
        let still_ellipsized = shaped.lines.last().map_or(false, |l| l.ellipsis_count > 0);
        if needs_rebuild && still_ellipsized {
            return self.rebuild_ellipsized_tail(text, paint, &shaped);
        }
        (shaped, text.clone())
    }

    fn rebuild_ellipsized_tail(
        &self,
        text: &AnnotatedText,
        paint: &TextPaint,
        shaped: &ShapedText,
    ) -> (ShapedText, AnnotatedText) {
        let target_lines = shaped.line_count();
        let Some(last) = shaped.lines.last() else {
            return (shaped.clone(), text.clone());
        };
        let source_lines = shaped.source_line_count;
        let elided_end = last.end;
        let mark = if self.rtl { RTL_MARK } else { LTR_MARK };
        let mut cut = last.ellipsis_start;
        // Strip one char at a time if the rebuilt buffer gains a line.
        loop {
            let mut rebuilt = text.clipped(cut);
            let from = rebuilt.len();
            let mut tail = String::new();
            tail.push(mark);
            tail.push(ELLIPSIS);
            rebuilt = rebuilt.with_appended(&tail);
            if self.constraints.tail_color_convert {
                let base = self.style.color.unwrap_or(crate::assemble::DEFAULT_INK);
                rebuilt = rebuilt.with_tail_color(from, base);
            }
            let mut reshaped = {
                let mut req = self.request(text, paint);
                req.ellipsize = false;
                self.engine.shaper.shape(&ShapeRequest {
                    text: &rebuilt,
                    ..req
                })
            };
            let done = reshaped.source_line_count <= target_lines || cut <= last.start;
            if done {
                // The rebuilt buffer carries the elision it replaced, so
                // downstream truncation checks still see it.
                reshaped.source_line_count = reshaped.source_line_count.max(source_lines);
                if let Some(new_last) = reshaped.lines.last_mut() {
                    new_last.ellipsis_start = cut.min(new_last.end);
                    new_last.ellipsis_count =
                        text.text()[cut.min(elided_end)..elided_end].chars().count();
                }
                return (reshaped, rebuilt);
            }
            cut = prev_char_boundary(text.text(), cut);
        }
    }

    fn clamp_height_overflow(
        &self,
        text: &AnnotatedText,
        paint: &TextPaint,
        shaped: ShapedText,
        final_text: AnnotatedText,
    ) -> (ShapedText, AnnotatedText) {
        if !self.constraints.has_bounded_height()
            || shaped.line_count() <= 1
            || shaped.height <= self.constraints.height
            || self.style.text_overflow != TextOverflow::Ellipsis
        {
            return (shaped, final_text);
        }
        let budget = self.constraints.height;
        let mut fit = 0usize;
        for (i, line) in shaped.lines.iter().enumerate() {
            if line.bottom <= budget {
                fit = i + 1;
            }
        }
        if fit == 0 || fit == shaped.line_count() {
            return (shaped, final_text);
        }
        let mut request = self.request(text, paint);
        request.max_lines = Some(fit);
        request.ellipsize = true;
        let reshaped = self.engine.shaper.shape(&request);
        self.fix_ellipsis(text, paint, reshaped)
    }

    /// Shrinks or grows through `candidates` until content stops (or
    /// starts) overflowing; at most one trial per candidate.
    fn auto_size_search(
        &self,
        text: &AnnotatedText,
        base_size: f32,
        candidates: &[f32],
    ) -> (ShapedText, AnnotatedText, f32) {
        if candidates.is_empty() {
            let (shaped, final_text) = self.shape_pass(text, base_size);
            return (shaped, final_text, base_size);
        }
        let mut idx = candidates
            .iter()
            .rposition(|s| *s <= base_size)
            .unwrap_or(0);

        let trial = |i: usize| -> (ShapedText, AnnotatedText) {
            let size = candidates[i];
            let scaled = if base_size > 0.0 && size != base_size {
                text.with_scaled_font_sizes(size / base_size)
            } else {
                text.clone()
            };
            self.shape_pass(&scaled, size)
        };

        let (mut shaped, mut scaled) = trial(idx);
        if self.overflows(&shaped, &scaled) {
            // A fixed line height taller than the box overflows at every
            // candidate size; shrinking untruncated text gains nothing.
            let line_height_pinned = self.constraints.has_bounded_height()
                && self
                    .style
                    .line_height
                    .map_or(false, |lh| lh > self.constraints.height)
                && !shaped.is_truncated(scaled.len());
            if line_height_pinned {
                return (shaped, scaled, candidates[idx]);
            }
            while idx > 0 && self.overflows(&shaped, &scaled) {
                idx -= 1;
                let (s, t) = trial(idx);
                shaped = s;
                scaled = t;
            }
        } else {
            while idx + 1 < candidates.len() {
                let (s, t) = trial(idx + 1);
                if self.overflows(&s, &t) {
                    break;
                }
                idx += 1;
                shaped = s;
                scaled = t;
            }
        }
        (shaped, scaled, candidates[idx])
    }

    fn overflows(&self, shaped: &ShapedText, text: &AnnotatedText) -> bool {
        (self.constraints.has_bounded_height() && shaped.height > self.constraints.height)
            || (self.constraints.has_bounded_width()
                && shaped.max_line_width() > self.constraints.width)
            || shaped.is_truncated(text.len())
    }
}

fn resolve_align(align: TextAlign, rtl: bool) -> ResolvedAlign {
    match align {
        TextAlign::Start => {
            if rtl {
                ResolvedAlign::Right
            } else {
                ResolvedAlign::Left
            }
        }
        TextAlign::End => {
            if rtl {
                ResolvedAlign::Left
            } else {
                ResolvedAlign::Right
            }
        }
        TextAlign::Left => ResolvedAlign::Left,
        TextAlign::Right => ResolvedAlign::Right,
        TextAlign::Center => ResolvedAlign::Center,
    }
}

fn break_strategy_for(style: &TextStyleAttributes) -> BreakStrategy {
    if style.hyphens {
        return BreakStrategy::HighQuality;
    }
    match style.word_break {
        WordBreak::Normal => BreakStrategy::Balanced,
        WordBreak::BreakAll | WordBreak::KeepAll => BreakStrategy::HighQuality,
        WordBreak::Default => style.break_strategy,
    }
}

/// Widest visible line, alignment offset included, plus the italic
/// overhang correction.
fn max_line_width(shaped: &ShapedText, style: &TextStyleAttributes, text: &AnnotatedText) -> f32 {
    let mut max = 0.0f32;
    for line in &shaped.lines {
        max = max.max(line.left + line.width);
    }
    let italic = style.font_style.is_italic() || text.has_italic();
    if italic {
        if let Some(first) = shaped.lines.first() {
            max += -first.ascent * ITALIC_ADVANCE_RATIO;
        }
    }
    max
}

fn prev_char_boundary(text: &str, i: usize) -> usize {
    let mut j = i.saturating_sub(1);
    while j > 0 && !text.is_char_boundary(j) {
        j -= 1;
    }
    j
}
