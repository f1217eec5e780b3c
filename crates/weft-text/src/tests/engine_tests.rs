use std::cell::Cell;

use weft_ui_layout::{LayoutConstraints, MeasureMode};

use crate::annotated::{AnnotatedText, AnnotationKind, PlaceholderKind, ELLIPSIS};
use crate::cache::LayoutCache;
use crate::engine::LayoutEngine;
use crate::shaper::{MonospacedShaper, ShapeRequest, ShapedText, TextShaper};
use crate::style::{AutoSizeConfig, TextAlign, TextOverflow, TextStyleAttributes, WhiteSpace};

/// Wraps the fixed-advance shaper and counts shape invocations.
struct CountingShaper {
    inner: MonospacedShaper,
    calls: Cell<usize>,
}

impl CountingShaper {
    fn new() -> Self {
        Self {
            inner: MonospacedShaper::default(),
            calls: Cell::new(0),
        }
    }
}

impl TextShaper for CountingShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> ShapedText {
        self.calls.set(self.calls.get() + 1);
        self.inner.shape(request)
    }
}

fn style(font_size: f32) -> TextStyleAttributes {
    TextStyleAttributes {
        font_size,
        ..TextStyleAttributes::default()
    }
}

#[test]
fn cached_geometry_matches_direct_measure() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let cache = LayoutCache::new();
    let text = AnnotatedText::new("memoize me please");
    let style = style(12.0);
    let constraints = LayoutConstraints::at_most(60.0, 100.0);

    let direct = engine.measure(&text, &style, &constraints);
    let first = engine.measure_cached(&cache, &text, &style, &constraints);
    let second = engine.measure_cached(&cache, &text, &style, &constraints);

    assert_eq!(*first, direct);
    assert_eq!(*second, direct);
    assert_eq!(cache.len(), 1);
}

#[test]
fn max_line_count_one_always_yields_one_line() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(10.0);
    s.max_line_count = Some(1);
    s.text_overflow = TextOverflow::Ellipsis;
    let text = AnnotatedText::new("one two three four five");
    let constraints = LayoutConstraints::at_most(50.0, 100.0);

    let result = engine.measure(&text, &s, &constraints);
    assert_eq!(result.line_count(), 1);
    let line = result.lines().next().unwrap();
    assert!(line.ellipsis_count > 0);

    // The same content in a wide box needs no ellipsis.
    let wide = engine.measure(&text, &s, &LayoutConstraints::at_most(1000.0, 100.0));
    assert_eq!(wide.line_count(), 1);
    assert_eq!(wide.lines().next().unwrap().ellipsis_count, 0);
}

#[test]
fn hello_world_ellipsized_at_forty_pixels() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(14.0); // 7px per glyph
    s.max_line_count = Some(1);
    s.text_overflow = TextOverflow::Ellipsis;
    let text = AnnotatedText::new("Hello World");
    let constraints = LayoutConstraints {
        width: 40.0,
        height: 100.0,
        width_mode: MeasureMode::AtMost,
        height_mode: MeasureMode::AtMost,
        tail_color_convert: true,
        ..LayoutConstraints::default()
    };

    let result = engine.measure(&text, &s, &constraints);
    assert_eq!(result.line_count(), 1);
    // 4 glyphs + ellipsis fit 40px; the rebuilt buffer ends in the glyph.
    assert!(result.text.text().ends_with(ELLIPSIS));
    let kept = 4;
    assert_eq!(result.lines().next().unwrap().ellipsis_count, 11 - kept);
}

#[test]
fn auto_size_converges_with_bounded_trials() {
    let shaper = CountingShaper::new();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(30.0);
    s.max_line_count = Some(1);
    s.auto_size = Some(AutoSizeConfig::Range {
        min: 10.0,
        max: 30.0,
        step: 2.0,
    });
    let text = AnnotatedText::new("abcdefgh");
    let constraints = LayoutConstraints::at_most(100.0, 1000.0);

    let result = engine.measure(&text, &s, &constraints);
    // 8 glyphs at half-size advance: 96px at 24, 104px at 26.
    assert_eq!(result.auto_font_size, 24.0);
    assert_eq!(result.line_count(), 1);
    assert!(shaper.calls.get() <= 10);
}

#[test]
fn fast_path_refused_for_bounded_multi_line_content() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(10.0);
    s.text_overflow = TextOverflow::Ellipsis;
    let text = AnnotatedText::new("aa\nbb\ncc\ndd");
    let slow = LayoutConstraints::at_most(100.0, 25.0);
    let fast = LayoutConstraints {
        enable_fast_path: true,
        ..slow
    };

    // Four 10px lines in a 25px box clamp to two either way; the
    // single-measurement shortcut must not skip the height fix-up.
    let a = engine.measure(&text, &s, &slow);
    let b = engine.measure(&text, &s, &fast);
    assert_eq!(a.line_count(), 2);
    assert!(a.is_truncated());
    assert_eq!(b.line_count(), 2);
    assert!(b.is_truncated());
}

#[test]
fn auto_size_keeps_size_when_line_height_overflows_box() {
    let shaper = CountingShaper::new();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(30.0);
    s.line_height = Some(50.0);
    s.auto_size = Some(AutoSizeConfig::Range {
        min: 10.0,
        max: 30.0,
        step: 2.0,
    });
    let text = AnnotatedText::new("ab");
    let constraints = LayoutConstraints::at_most(100.0, 40.0);

    // The 50px line box overflows 40px at any font size; shrinking
    // untruncated text would only make it unreadable.
    let result = engine.measure(&text, &s, &constraints);
    assert_eq!(result.auto_font_size, 30.0);
    assert!(shaper.calls.get() <= 2);
}

#[test]
fn nowrap_clips_at_first_hard_break() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(10.0);
    s.white_space = WhiteSpace::NoWrap;
    let text = AnnotatedText::new("ab\ncd");

    let result = engine.measure(&text, &s, &LayoutConstraints::at_most(12.0, 100.0));
    assert_eq!(result.text.text(), "ab");
    assert_eq!(result.line_count(), 1);
    // Width relaxed: no ellipsis requested, so nothing is cut.
    assert!(!result.is_truncated());
}

#[test]
fn degenerate_inputs_skip_the_shaper() {
    let shaper = CountingShaper::new();
    let engine = LayoutEngine::new(&shaper);
    let s = style(10.0);

    let empty = engine.measure(&AnnotatedText::default(), &s, &LayoutConstraints::unbounded());
    assert_eq!(empty.size.width, 0.0);

    let zero_box = engine.measure(
        &AnnotatedText::new("content"),
        &s,
        &LayoutConstraints::exact(0.0, 0.0),
    );
    assert_eq!(zero_box.size.height, 0.0);
    assert_eq!(shaper.calls.get(), 0);
}

#[test]
fn placeholder_content_never_enters_the_cache() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let cache = LayoutCache::new();
    let mut text = AnnotatedText::new("xIy");
    text.push_annotation(
        1..2,
        AnnotationKind::InlinePlaceholder {
            id: 9,
            kind: PlaceholderKind::Image,
        },
    );
    let s = style(10.0);
    let constraints = LayoutConstraints::at_most(100.0, 100.0);

    let result = engine.measure_cached(&cache, &text, &s, &constraints);
    assert!(!result.cacheable);
    assert!(cache.is_empty());
}

#[test]
fn legacy_nowrap_line_height_becomes_translate_offset() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(10.0);
    s.white_space = WhiteSpace::NoWrap;
    s.line_height = Some(30.0);
    let text = AnnotatedText::new("hi");

    let legacy = engine.measure(&text, &s, &LayoutConstraints::unbounded());
    assert_eq!(legacy.size.height, 30.0);
    assert_eq!(legacy.translate_offset.y, 10.0);
    assert_eq!(legacy.baseline, 18.0);

    let refactored_constraints = LayoutConstraints {
        use_refactored_baseline: true,
        ..LayoutConstraints::unbounded()
    };
    let refactored = engine.measure(&text, &s, &refactored_constraints);
    assert_eq!(refactored.size.height, 30.0);
    assert_eq!(refactored.translate_offset.y, 0.0);
    // The line box itself is tall; the baseline sits centered within it.
    assert_eq!(refactored.baseline, 18.0);
}

#[test]
fn start_alignment_follows_rtl_content() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(10.0);
    s.text_align = TextAlign::Start;
    let text = AnnotatedText::new("שלום");

    let result = engine.measure(&text, &s, &LayoutConstraints::exact(40.0, 20.0));
    // 4 glyphs at 5px each, right-aligned in a 40px box.
    assert_eq!(result.shaped.lines[0].left, 20.0);
    assert!(result.shaped.lines[0].rtl);
}

#[test]
fn italic_annotation_widens_max_width() {
    use weft_ui_graphics::{FontStyle, FontWeight};

    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let s = style(10.0);
    let plain = AnnotatedText::new("abcd");
    let mut italic = AnnotatedText::new("abcd");
    italic.push_annotation(
        0..4,
        AnnotationKind::FontFace {
            family: None,
            weight: FontWeight::NORMAL,
            style: FontStyle::Italic,
        },
    );
    let constraints = LayoutConstraints::unbounded();

    let base = engine.measure(&plain, &s, &constraints).max_line_width;
    let widened = engine.measure(&italic, &s, &constraints).max_line_width;
    // Correction is 0.2 of the 8px ascent.
    assert!((widened - base - 1.6).abs() < 1e-4);
}

#[test]
fn centered_content_in_at_most_box_shifts_back() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(10.0);
    s.text_align = TextAlign::Center;
    let text = AnnotatedText::new("ab");

    let result = engine.measure(&text, &s, &LayoutConstraints::at_most(40.0, 100.0));
    // 10px of content centered in a 40px shaping box: the alignment
    // offset (15px) is part of the measured width, and the shift keeps
    // the glyphs centered inside the narrower reported box.
    assert_eq!(result.shaped.lines[0].left, 15.0);
    assert_eq!(result.size.width, 25.0);
    assert_eq!(result.translate_offset.x, -7.5);
}

#[test]
fn max_text_length_clips_with_ellipsis() {
    let shaper = MonospacedShaper::default();
    let engine = LayoutEngine::new(&shaper);
    let mut s = style(10.0);
    s.max_text_length = Some(3);
    let text = AnnotatedText::new("abcdef");

    let result = engine.measure(&text, &s, &LayoutConstraints::unbounded());
    assert!(result.text.text().starts_with("abc"));
    assert!(result.text.text().ends_with(ELLIPSIS));
}
