//! The text-run tree handed to the assembler.

use weft_ui_graphics::{Brush, FontStyle, FontWeight};

use crate::style::{Decoration, ShadowStyle, Stroke, VerticalAlign};

/// Style deltas a nested run contributes on top of its ancestors. Unset
/// fields inherit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunStyle {
    pub color: Option<u32>,
    pub stroke: Option<Stroke>,
    pub gradient: Option<Brush>,
    pub decoration: Option<Decoration>,
    pub shadow: Option<ShadowStyle>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub letter_spacing: Option<f32>,
    pub line_height: Option<f32>,
    pub vertical_align: Option<(VerticalAlign, f32)>,
    /// Identity of the node receiving tap/gesture events for this run.
    pub event_target: Option<u64>,
}

impl RunStyle {
    pub fn colored(color: u32) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }
}

/// One node of the source text tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TextRunNode {
    /// Leaf text, decoded during assembly.
    RawRun(String),
    /// Styled container; its annotation covers everything its children emit.
    StyledRun {
        style: RunStyle,
        children: Vec<TextRunNode>,
    },
    /// Inline image, one placeholder character; `id` names the owner node.
    InlineImage { id: u64 },
    /// Inline platform view, one placeholder character.
    InlineView { id: u64 },
    /// Contributes no text; records a selection highlight on the enclosing
    /// run.
    Selection { color: u32 },
    /// Defines the suffix substituted for truncated tail content.
    TruncationMarker { children: Vec<TextRunNode> },
}

impl TextRunNode {
    pub fn raw(text: impl Into<String>) -> Self {
        TextRunNode::RawRun(text.into())
    }

    pub fn styled(style: RunStyle, children: Vec<TextRunNode>) -> Self {
        TextRunNode::StyledRun { style, children }
    }
}
