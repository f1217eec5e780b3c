//! Resolved text styling.
//!
//! [`TextStyleAttributes`] is the flattened style a text node carries into
//! measurement: every inheritable property already cascaded, every length
//! already in device pixels. It is hashable so it can participate in layout
//! cache keys; floats are compared and hashed bit-for-bit.

use std::hash::{Hash, Hasher};

use weft_ui_graphics::{Brush, Point};
use weft_ui_graphics::{FontStyle, FontWeight};

/// Fallback font size in device pixels when no style provides one.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Sentinel for "no color set"; callers fall back to the run's text color.
pub const COLOR_UNSET: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    /// Collapse to a single line; text past the first hard break is dropped.
    NoWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextOverflow {
    #[default]
    Clip,
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    #[default]
    Start,
    End,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Resolve from the first strong directional character.
    #[default]
    Neutral,
    Ltr,
    Rtl,
}

/// Line-breaking aggressiveness inside words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WordBreak {
    #[default]
    Default,
    Normal,
    /// Break is allowed between any two characters.
    BreakAll,
    /// CJK sequences are kept unbroken.
    KeepAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BreakStrategy {
    #[default]
    Simple,
    HighQuality,
    Balanced,
}

/// Vertical alignment of a run or inline box against its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlign {
    #[default]
    Default,
    Baseline,
    Top,
    Bottom,
    Middle,
    TextTop,
    TextBottom,
    Sub,
    Super,
    /// Shift by `value` percent of the font size.
    Percent,
    /// Centered in the tallest line box.
    Center,
    /// Shift by `value` device pixels.
    Length,
}

impl VerticalAlign {
    /// Alignments that force the slow layout path and full baseline metrics.
    pub fn requires_baseline_metrics(self) -> bool {
        !matches!(self, VerticalAlign::Default | VerticalAlign::Baseline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    pub offset: Point,
    pub blur_radius: f32,
    pub color: u32,
}

/// Outline stroke painted behind glyph fills. A `COLOR_UNSET` color falls
/// back to the effective text color of the enclosing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f32,
    pub color: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecorationStyle {
    #[default]
    Solid,
    Double,
    Dotted,
    Dashed,
    Wavy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub underline: bool,
    pub line_through: bool,
    pub style: DecorationStyle,
    pub color: u32,
}

/// Drawing ratios for decoration lines, tuned against web rendering. All
/// take the font size in device pixels.
impl Decoration {
    pub fn line_width(font_size: f32) -> f32 {
        font_size / 3.0
    }

    pub fn stroke_width(font_size: f32) -> f32 {
        Self::line_width(font_size) / 5.0
    }

    /// Offset below the baseline at which the underline is drawn.
    pub fn underline_offset(font_size: f32) -> f32 {
        Self::line_width(font_size) / 3.0
    }

    /// Rise above the baseline for the line-through stroke.
    pub fn line_through_rise(font_size: f32) -> f32 {
        font_size / 15.0 * 4.0
    }

    pub fn dot_spacing(font_size: f32) -> f32 {
        font_size / 4.0
    }

    pub fn dash_width(font_size: f32) -> f32 {
        font_size / 7.0
    }

    pub fn dash_gap(font_size: f32) -> f32 {
        font_size / 20.0
    }

    pub fn wave_length(font_size: f32) -> f32 {
        font_size / 2.0
    }

    pub fn wave_amplitude(font_size: f32) -> f32 {
        font_size / 3.0
    }
}

/// Automatic font-size search space: either an explicit preset list or a
/// `[min, max]` range walked at `step` granularity.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoSizeConfig {
    /// Candidate sizes, ascending, duplicates removed.
    Presets(Vec<f32>),
    Range { min: f32, max: f32, step: f32 },
}

impl AutoSizeConfig {
    /// All candidate sizes in ascending order.
    pub fn candidates(&self) -> Vec<f32> {
        match self {
            AutoSizeConfig::Presets(sizes) => {
                let mut out = sizes.clone();
                out.retain(|s| *s > 0.0);
                out.sort_by(|a, b| a.total_cmp(b));
                out.dedup_by(|a, b| a.to_bits() == b.to_bits());
                out
            }
            AutoSizeConfig::Range { min, max, step } => {
                let step = if *step > 0.0 { *step } else { 1.0 };
                let mut out = Vec::new();
                let mut size = *min;
                while size <= *max + f32::EPSILON {
                    out.push(size);
                    size += step;
                }
                out
            }
        }
    }
}

/// Fully cascaded style for one text node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyleAttributes {
    pub font_size: f32,
    /// ARGB; `None` inherits the framework default ink.
    pub color: Option<u32>,
    /// Gradient fill painted through the glyph alpha; overrides `color`.
    pub gradient: Option<Brush>,
    pub white_space: WhiteSpace,
    pub max_line_count: Option<u32>,
    /// Hard clip of the source text, in characters, applied before shaping.
    pub max_text_length: Option<usize>,
    pub text_overflow: TextOverflow,
    pub font_style: FontStyle,
    pub font_weight: FontWeight,
    pub font_family: Option<String>,
    pub line_height: Option<f32>,
    pub line_spacing: f32,
    pub letter_spacing: Option<f32>,
    pub text_align: TextAlign,
    pub direction: Direction,
    pub vertical_align: VerticalAlign,
    pub vertical_align_value: f32,
    pub word_break: WordBreak,
    pub break_strategy: BreakStrategy,
    /// Automatic hyphenation; forces the high-quality break strategy.
    pub hyphens: bool,
    pub include_font_padding: bool,
    pub auto_size: Option<AutoSizeConfig>,
    pub text_indent: Option<f32>,
    pub shadow: Option<ShadowStyle>,
    pub decoration: Option<Decoration>,
    pub stroke: Option<Stroke>,
}

impl Default for TextStyleAttributes {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
            color: None,
            gradient: None,
            white_space: WhiteSpace::default(),
            max_line_count: None,
            max_text_length: None,
            text_overflow: TextOverflow::default(),
            font_style: FontStyle::default(),
            font_weight: FontWeight::default(),
            font_family: None,
            line_height: None,
            line_spacing: 0.0,
            letter_spacing: None,
            text_align: TextAlign::default(),
            direction: Direction::default(),
            vertical_align: VerticalAlign::default(),
            vertical_align_value: 0.0,
            word_break: WordBreak::default(),
            break_strategy: BreakStrategy::default(),
            hyphens: false,
            include_font_padding: true,
            auto_size: None,
            text_indent: None,
            shadow: None,
            decoration: None,
            stroke: None,
        }
    }
}

impl TextStyleAttributes {
    /// Single-line styles skip wrapping entirely.
    pub fn is_single_line(&self) -> bool {
        self.white_space == WhiteSpace::NoWrap
    }

    pub fn is_auto_size(&self) -> bool {
        self.auto_size.is_some()
    }

    /// Feed every field into `h` with floats taken bit-for-bit, so two
    /// styles hash equal exactly when they compare equal.
    pub fn fingerprint<H: Hasher>(&self, h: &mut H) {
        hash_f32(h, self.font_size);
        self.color.hash(h);
        hash_opt_brush(h, self.gradient.as_ref());
        self.white_space.hash(h);
        self.max_line_count.hash(h);
        self.max_text_length.hash(h);
        self.text_overflow.hash(h);
        self.font_style.hash(h);
        self.font_weight.hash(h);
        self.font_family.hash(h);
        hash_opt_f32(h, self.line_height);
        hash_f32(h, self.line_spacing);
        hash_opt_f32(h, self.letter_spacing);
        self.text_align.hash(h);
        self.direction.hash(h);
        self.vertical_align.hash(h);
        hash_f32(h, self.vertical_align_value);
        self.word_break.hash(h);
        self.break_strategy.hash(h);
        self.hyphens.hash(h);
        self.include_font_padding.hash(h);
        match &self.auto_size {
            None => h.write_u8(0),
            Some(AutoSizeConfig::Presets(sizes)) => {
                h.write_u8(1);
                for s in sizes {
                    hash_f32(h, *s);
                }
            }
            Some(AutoSizeConfig::Range { min, max, step }) => {
                h.write_u8(2);
                hash_f32(h, *min);
                hash_f32(h, *max);
                hash_f32(h, *step);
            }
        }
        hash_opt_f32(h, self.text_indent);
        match &self.shadow {
            None => h.write_u8(0),
            Some(s) => {
                h.write_u8(1);
                hash_f32(h, s.offset.x);
                hash_f32(h, s.offset.y);
                hash_f32(h, s.blur_radius);
                s.color.hash(h);
            }
        }
        match &self.decoration {
            None => h.write_u8(0),
            Some(d) => {
                h.write_u8(1);
                d.underline.hash(h);
                d.line_through.hash(h);
                d.style.hash(h);
                d.color.hash(h);
            }
        }
        match &self.stroke {
            None => h.write_u8(0),
            Some(s) => {
                h.write_u8(1);
                hash_f32(h, s.width);
                s.color.hash(h);
            }
        }
    }
}

pub(crate) fn hash_f32<H: Hasher>(h: &mut H, v: f32) {
    h.write_u32(v.to_bits());
}

pub(crate) fn hash_opt_f32<H: Hasher>(h: &mut H, v: Option<f32>) {
    match v {
        None => h.write_u8(0),
        Some(v) => {
            h.write_u8(1);
            hash_f32(h, v);
        }
    }
}

pub(crate) fn hash_opt_brush<H: Hasher>(h: &mut H, brush: Option<&Brush>) {
    match brush {
        None => h.write_u8(0),
        Some(b) => b.fingerprint(h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHasher;

    fn hash_of(style: &TextStyleAttributes) -> u64 {
        let mut h = FxHasher::default();
        style.fingerprint(&mut h);
        h.finish()
    }

    #[test]
    fn equal_styles_fingerprint_equal() {
        let a = TextStyleAttributes::default();
        let b = TextStyleAttributes::default();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn font_size_changes_fingerprint() {
        let a = TextStyleAttributes::default();
        let b = TextStyleAttributes {
            font_size: 15.0,
            ..TextStyleAttributes::default()
        };
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn range_auto_size_walks_step() {
        let cfg = AutoSizeConfig::Range {
            min: 10.0,
            max: 30.0,
            step: 2.0,
        };
        let sizes = cfg.candidates();
        assert_eq!(sizes.first().copied(), Some(10.0));
        assert_eq!(sizes.last().copied(), Some(30.0));
        assert_eq!(sizes.len(), 11);
    }

    #[test]
    fn presets_sorted_and_deduped() {
        let cfg = AutoSizeConfig::Presets(vec![18.0, 12.0, 18.0, -1.0]);
        assert_eq!(cfg.candidates(), vec![12.0, 18.0]);
    }
}
