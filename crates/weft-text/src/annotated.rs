//! Annotated text: an immutable buffer plus ordered style annotations.
//!
//! Annotation order matters: the list is applied front to back with later
//! entries winning, so inner-run annotations (pushed after their ancestors'
//! broader ones) and post-processing entries such as tail recoloring
//! override what came before.

use std::hash::{Hash, Hasher};
use std::ops::Range;

use weft_ui_graphics::{Brush, FontStyle, FontWeight};

use crate::style::{hash_f32, hash_opt_brush, Decoration, ShadowStyle, VerticalAlign};

/// Placeholder character standing in for an inline image.
pub const IMAGE_PLACEHOLDER: char = 'I';
/// Placeholder character standing in for an inline view.
pub const VIEW_PLACEHOLDER: char = 'B';
/// HORIZONTAL ELLIPSIS, appended by truncation passes.
pub const ELLIPSIS: char = '\u{2026}';
/// LEFT-TO-RIGHT MARK.
pub const LTR_MARK: char = '\u{200E}';
/// RIGHT-TO-LEFT MARK.
pub const RTL_MARK: char = '\u{200F}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Image,
    View,
}

impl PlaceholderKind {
    pub fn placeholder_char(self) -> char {
        match self {
            PlaceholderKind::Image => IMAGE_PLACEHOLDER,
            PlaceholderKind::View => VIEW_PLACEHOLDER,
        }
    }
}

/// One style or behavior attribute over a byte range of the buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationKind {
    /// ARGB foreground color.
    Color(u32),
    /// Outline stroke behind the glyph fill.
    Stroke { width: f32, color: u32 },
    Gradient(Brush),
    Decoration(Decoration),
    Shadow(ShadowStyle),
    /// Absolute font size in device pixels.
    FontSize(f32),
    FontFace {
        family: Option<String>,
        weight: FontWeight,
        style: FontStyle,
    },
    LetterSpacing(f32),
    LineHeight(f32),
    BaselineShift { mode: VerticalAlign, value: f32 },
    /// Inline image/view stand-in; `id` names the owning node.
    InlinePlaceholder { id: u64, kind: PlaceholderKind },
    /// ARGB selection highlight behind the range.
    SelectionBackground(u32),
    /// Identity-bound interactive region (tap/gesture target).
    NodeEvent { node: u64 },
}

impl AnnotationKind {
    /// Annotations that close over per-node identity and make a layout
    /// unsafe to share through the cache.
    pub fn is_identity_bound(&self) -> bool {
        matches!(
            self,
            AnnotationKind::InlinePlaceholder { .. } | AnnotationKind::NodeEvent { .. }
        )
    }

    fn fingerprint<H: Hasher>(&self, h: &mut H) {
        match self {
            AnnotationKind::Color(c) => {
                h.write_u8(0);
                c.hash(h);
            }
            AnnotationKind::Stroke { width, color } => {
                h.write_u8(1);
                hash_f32(h, *width);
                color.hash(h);
            }
            AnnotationKind::Gradient(b) => {
                h.write_u8(2);
                hash_opt_brush(h, Some(b));
            }
            AnnotationKind::Decoration(d) => {
                h.write_u8(3);
                d.underline.hash(h);
                d.line_through.hash(h);
                d.style.hash(h);
                d.color.hash(h);
            }
            AnnotationKind::Shadow(s) => {
                h.write_u8(4);
                hash_f32(h, s.offset.x);
                hash_f32(h, s.offset.y);
                hash_f32(h, s.blur_radius);
                s.color.hash(h);
            }
            AnnotationKind::FontSize(s) => {
                h.write_u8(5);
                hash_f32(h, *s);
            }
            AnnotationKind::FontFace {
                family,
                weight,
                style,
            } => {
                h.write_u8(6);
                family.hash(h);
                weight.hash(h);
                style.hash(h);
            }
            AnnotationKind::LetterSpacing(v) => {
                h.write_u8(7);
                hash_f32(h, *v);
            }
            AnnotationKind::LineHeight(v) => {
                h.write_u8(8);
                hash_f32(h, *v);
            }
            AnnotationKind::BaselineShift { mode, value } => {
                h.write_u8(9);
                mode.hash(h);
                hash_f32(h, *value);
            }
            AnnotationKind::InlinePlaceholder { id, kind } => {
                h.write_u8(10);
                id.hash(h);
                kind.hash(h);
            }
            AnnotationKind::SelectionBackground(c) => {
                h.write_u8(11);
                c.hash(h);
            }
            AnnotationKind::NodeEvent { node } => {
                h.write_u8(12);
                node.hash(h);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub range: Range<usize>,
    pub kind: AnnotationKind,
}

/// Immutable text buffer plus its ordered annotation list. Editing
/// operations produce new values; ranges are byte offsets and always lie
/// on `char` boundaries within the buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotatedText {
    text: String,
    annotations: Vec<Annotation>,
}

impl AnnotatedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotations(text: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        let text = text.into();
        let mut out = Self {
            text,
            annotations: Vec::new(),
        };
        for a in annotations {
            out.push_annotation(a.range, a.kind);
        }
        out
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Appends an annotation, clamping its range into the buffer and onto
    /// char boundaries. Empty ranges are dropped.
    pub fn push_annotation(&mut self, range: Range<usize>, kind: AnnotationKind) {
        let start = floor_boundary(&self.text, range.start.min(self.text.len()));
        let end = floor_boundary(&self.text, range.end.min(self.text.len()));
        if start < end {
            self.annotations.push(Annotation {
                range: start..end,
                kind,
            });
        }
    }

    pub fn has_placeholders(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a.kind, AnnotationKind::InlinePlaceholder { .. }))
    }

    /// True when caching this buffer's layout could leak per-node state.
    pub fn has_identity_annotations(&self) -> bool {
        self.annotations.iter().any(|a| a.kind.is_identity_bound())
    }

    pub fn placeholders(&self) -> impl Iterator<Item = (Range<usize>, u64, PlaceholderKind)> + '_ {
        self.annotations.iter().filter_map(|a| match a.kind {
            AnnotationKind::InlinePlaceholder { id, kind } => Some((a.range.clone(), id, kind)),
            _ => None,
        })
    }

    /// Whether `byte` is inside an inline placeholder's range.
    pub fn placeholder_at(&self, byte: usize) -> Option<u64> {
        self.placeholders()
            .find(|(r, _, _)| r.contains(&byte))
            .map(|(_, id, _)| id)
    }

    /// Any annotation requests an italic face.
    pub fn has_italic(&self) -> bool {
        self.annotations.iter().any(|a| {
            matches!(
                a.kind,
                AnnotationKind::FontFace { style, .. } if style.is_italic()
            )
        })
    }

    /// Largest absolute-size annotation, the basis of auto-size trials.
    pub fn max_font_size(&self) -> Option<f32> {
        self.annotations
            .iter()
            .filter_map(|a| match a.kind {
                AnnotationKind::FontSize(s) => Some(s),
                _ => None,
            })
            .fold(None, |acc, s| Some(acc.map_or(s, |m: f32| m.max(s))))
    }

    /// True when any annotation in the list requires baseline aggregation.
    pub fn needs_baseline_metrics(&self) -> bool {
        self.annotations.iter().any(|a| {
            matches!(
                a.kind,
                AnnotationKind::BaselineShift { mode, .. } if mode.requires_baseline_metrics()
            )
        })
    }

    /// Prefix of the buffer up to `end` bytes, annotation ranges clamped,
    /// emptied annotations dropped.
    pub fn clipped(&self, end: usize) -> AnnotatedText {
        let end = floor_boundary(&self.text, end.min(self.text.len()));
        let mut out = AnnotatedText::new(&self.text[..end]);
        for a in &self.annotations {
            if a.range.start < end {
                out.push_annotation(a.range.start..a.range.end.min(end), a.kind.clone());
            }
        }
        out
    }

    /// Prefix of the buffer holding at most `max_chars` characters.
    pub fn clipped_chars(&self, max_chars: usize) -> AnnotatedText {
        let end = self
            .text
            .char_indices()
            .nth(max_chars)
            .map_or(self.text.len(), |(i, _)| i);
        self.clipped(end)
    }

    /// New value with `suffix` characters appended; existing annotations do
    /// not stretch over the appended tail.
    pub fn with_appended(&self, suffix: &str) -> AnnotatedText {
        let mut out = self.clone();
        out.text.push_str(suffix);
        out
    }

    /// New value with a recoloring annotation over `from..len`.
    pub fn with_tail_color(&self, from: usize, color: u32) -> AnnotatedText {
        let mut out = self.clone();
        out.push_annotation(from..out.text.len(), AnnotationKind::Color(color));
        out
    }

    /// Concatenation for truncation splices: `self` followed by `other`,
    /// with `other`'s annotations shifted past `self`.
    pub fn concat(&self, other: &AnnotatedText) -> AnnotatedText {
        let offset = self.text.len();
        let mut out = self.clone();
        out.text.push_str(&other.text);
        for a in &other.annotations {
            out.annotations.push(Annotation {
                range: a.range.start + offset..a.range.end + offset,
                kind: a.kind.clone(),
            });
        }
        out
    }

    /// New value with every absolute-size annotation scaled by `ratio`,
    /// used by auto-size trials.
    pub fn with_scaled_font_sizes(&self, ratio: f32) -> AnnotatedText {
        let mut out = self.clone();
        for a in &mut out.annotations {
            if let AnnotationKind::FontSize(s) = &mut a.kind {
                *s *= ratio;
            }
        }
        out
    }

    /// Feeds content and annotations into `h`, consistent with `==`.
    pub fn fingerprint<H: Hasher>(&self, h: &mut H) {
        self.text.hash(h);
        h.write_usize(self.annotations.len());
        for a in &self.annotations {
            h.write_usize(a.range.start);
            h.write_usize(a.range.end);
            a.kind.fingerprint(h);
        }
    }
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
