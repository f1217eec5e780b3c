//! Rich text layout for Weft: style-run assembly, line breaking and
//! measurement, ellipsis and truncation, and bounded memoization of layout
//! results.
//!
//! The pipeline: a [`node::TextRunNode`] tree is flattened by the
//! [`assemble::SpanAssembler`] into an [`annotated::AnnotatedText`], which
//! the [`engine::LayoutEngine`] measures against
//! [`weft_ui_layout::LayoutConstraints`] through a pluggable
//! [`shaper::TextShaper`]. Overflowing results can be reworked by
//! [`truncation::truncate`], and equal (content, style, constraints)
//! triples are memoized in a [`cache::LayoutCache`].

pub mod annotated;
pub mod assemble;
pub mod baseline;
pub mod cache;
pub mod decode;
pub mod engine;
pub mod event;
pub mod inline;
pub mod node;
pub mod result;
pub mod shaper;
pub mod style;
pub mod truncation;
pub mod typeface;

#[cfg(test)]
mod tests;

pub use annotated::{AnnotatedText, Annotation, AnnotationKind, PlaceholderKind};
pub use assemble::{AssembledText, SpanAssembler};
pub use baseline::{BaselineMetrics, BaselineShiftCalculator};
pub use cache::{LayoutCache, LayoutKey, DEFAULT_CACHE_CAPACITY};
pub use engine::{EmojiProcessor, LayoutEngine};
pub use event::TextLayoutEvent;
pub use inline::{align, InlineMeasurer, InlinePlacement, PlaceholderGeometry};
pub use node::{RunStyle, TextRunNode};
pub use result::{LayoutResult, LineInfo};
pub use shaper::{
    GlyphShaper, MonospacedShaper, ShapeRequest, ShapedLine, ShapedText, TextPaint, TextShaper,
};
pub use style::TextStyleAttributes;
pub use truncation::{truncate, TruncationOutcome};
pub use typeface::{Typeface, TypefaceObserver, TypefaceProvider, TypefaceRegistry};

pub mod prelude {
    pub use crate::annotated::AnnotatedText;
    pub use crate::assemble::SpanAssembler;
    pub use crate::cache::LayoutCache;
    pub use crate::engine::LayoutEngine;
    pub use crate::node::{RunStyle, TextRunNode};
    pub use crate::result::LayoutResult;
    pub use crate::shaper::{GlyphShaper, TextShaper};
    pub use crate::style::TextStyleAttributes;
    pub use crate::typeface::TypefaceRegistry;
    pub use weft_ui_layout::prelude::*;
}
