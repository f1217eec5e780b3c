//! Flattens a text-run tree into an [`AnnotatedText`].
//!
//! Traversal is depth-first. A styled run's own annotations are inserted at
//! the position the list had before its children were visited, so children
//! land after their ancestors and win on overlap.

use smallvec::SmallVec;

use crate::annotated::{Annotation, AnnotatedText, AnnotationKind, PlaceholderKind};
use crate::decode;
use crate::node::{RunStyle, TextRunNode};
use crate::style::TextStyleAttributes;

/// Framework default ink when neither the root style nor any ancestor sets
/// a color.
pub const DEFAULT_INK: u32 = 0xFF00_0000;

/// Assembler output: the flattened buffer plus derived flags the engine
/// consults before shaping.
#[derive(Debug, Clone, Default)]
pub struct AssembledText {
    pub text: AnnotatedText,
    /// Suffix content from a truncation marker child, if any.
    pub truncation_suffix: Option<AnnotatedText>,
    pub has_image_span: bool,
    pub has_inline_view_span: bool,
    /// Some annotation requests a vertical-align mode needing aggregated
    /// ascent/descent or x-height.
    pub needs_baseline_metrics: bool,
    /// Placeholder ids awaiting external measurement this pass.
    pub pending_measurements: Vec<u64>,
}

impl AssembledText {
    /// Single-style content with no inline children may take the
    /// single-measurement layout path.
    pub fn is_style_homogeneous(&self) -> bool {
        self.text.annotations().is_empty()
    }
}

/// Walks a run tree rooted at a node carrying `root_style`.
pub struct SpanAssembler<'a> {
    root_style: &'a TextStyleAttributes,
}

impl<'a> SpanAssembler<'a> {
    pub fn new(root_style: &'a TextStyleAttributes) -> Self {
        Self { root_style }
    }

    pub fn assemble(&self, children: &[TextRunNode]) -> AssembledText {
        let mut out = AssembledText::default();
        let mut buffer = String::new();
        let mut annotations: Vec<Annotation> = Vec::new();
        let base_color = self.root_style.color.unwrap_or(DEFAULT_INK);
        for child in children {
            if let TextRunNode::TruncationMarker { children } = child {
                out.truncation_suffix = Some(self.assemble_suffix(children, base_color));
                continue;
            }
            self.visit(child, base_color, &mut buffer, &mut annotations, &mut out);
        }
        out.text = AnnotatedText::with_annotations(buffer, annotations);
        out.needs_baseline_metrics = out.text.needs_baseline_metrics();
        out
    }

    fn assemble_suffix(&self, children: &[TextRunNode], base_color: u32) -> AnnotatedText {
        let mut sub = AssembledText::default();
        let mut buffer = String::new();
        let mut annotations = Vec::new();
        for child in children {
            self.visit(child, base_color, &mut buffer, &mut annotations, &mut sub);
        }
        AnnotatedText::with_annotations(buffer, annotations)
    }

    fn visit(
        &self,
        node: &TextRunNode,
        inherited_color: u32,
        buffer: &mut String,
        annotations: &mut Vec<Annotation>,
        out: &mut AssembledText,
    ) {
        match node {
            TextRunNode::RawRun(text) => {
                buffer.push_str(&decode::decode(text, self.root_style.word_break));
            }
            TextRunNode::InlineImage { id } => {
                self.push_placeholder(*id, PlaceholderKind::Image, buffer, annotations);
                out.has_image_span = true;
                out.pending_measurements.push(*id);
            }
            TextRunNode::InlineView { id } => {
                self.push_placeholder(*id, PlaceholderKind::View, buffer, annotations);
                out.has_inline_view_span = true;
                out.pending_measurements.push(*id);
            }
            TextRunNode::Selection { .. } => {
                // Only meaningful inside a styled run; handled by the parent.
            }
            TextRunNode::TruncationMarker { children } => {
                // Nested markers override an earlier sibling's suffix.
                out.truncation_suffix =
                    Some(self.assemble_suffix(children, inherited_color));
            }
            TextRunNode::StyledRun { style, children } => {
                let start = buffer.len();
                let insert_at = annotations.len();
                let own_color = style.color.unwrap_or(inherited_color);
                let mut selection = None;
                for child in children {
                    if let TextRunNode::Selection { color } = child {
                        selection = Some(*color);
                        continue;
                    }
                    self.visit(child, own_color, buffer, annotations, out);
                }
                let range = start..buffer.len();
                if range.is_empty() {
                    return;
                }
                let own = self.run_annotations(style, inherited_color);
                for (i, kind) in own.into_iter().enumerate() {
                    annotations.insert(
                        insert_at + i,
                        Annotation {
                            range: range.clone(),
                            kind,
                        },
                    );
                }
                if let Some(color) = selection {
                    annotations.push(Annotation {
                        range,
                        kind: AnnotationKind::SelectionBackground(color),
                    });
                }
            }
        }
    }

    fn push_placeholder(
        &self,
        id: u64,
        kind: PlaceholderKind,
        buffer: &mut String,
        annotations: &mut Vec<Annotation>,
    ) {
        let start = buffer.len();
        buffer.push(kind.placeholder_char());
        annotations.push(Annotation {
            range: start..buffer.len(),
            kind: AnnotationKind::InlinePlaceholder { id, kind },
        });
    }

    /// Annotations one styled run contributes over its children's range.
    fn run_annotations(
        &self,
        style: &RunStyle,
        inherited_color: u32,
    ) -> SmallVec<[AnnotationKind; 4]> {
        let mut out = SmallVec::new();
        if let Some(color) = style.color {
            out.push(AnnotationKind::Color(color));
        }
        if let Some(stroke) = &style.stroke {
            // A stroke without a color inherits the nearest resolved ink.
            let color = if stroke.color == crate::style::COLOR_UNSET {
                style.color.unwrap_or(inherited_color)
            } else {
                stroke.color
            };
            out.push(AnnotationKind::Stroke {
                width: stroke.width,
                color,
            });
        }
        if let Some(gradient) = &style.gradient {
            out.push(AnnotationKind::Gradient(gradient.clone()));
        }
        if let Some(decoration) = &style.decoration {
            out.push(AnnotationKind::Decoration(*decoration));
        }
        if let Some(shadow) = &style.shadow {
            out.push(AnnotationKind::Shadow(*shadow));
        }
        if let Some(size) = style.font_size {
            out.push(AnnotationKind::FontSize(size));
        }
        if style.font_family.is_some() || style.font_weight.is_some() || style.font_style.is_some()
        {
            out.push(AnnotationKind::FontFace {
                family: style.font_family.clone(),
                weight: style.font_weight.unwrap_or(self.root_style.font_weight),
                style: style.font_style.unwrap_or(self.root_style.font_style),
            });
        }
        if let Some(spacing) = style.letter_spacing {
            out.push(AnnotationKind::LetterSpacing(spacing));
        }
        if let Some(height) = style.line_height {
            out.push(AnnotationKind::LineHeight(height));
        }
        if let Some((mode, value)) = style.vertical_align {
            out.push(AnnotationKind::BaselineShift { mode, value });
        }
        if let Some(node) = style.event_target {
            out.push(AnnotationKind::NodeEvent { node });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Stroke, VerticalAlign};

    fn assemble(children: Vec<TextRunNode>) -> AssembledText {
        let style = TextStyleAttributes::default();
        SpanAssembler::new(&style).assemble(&children)
    }

    #[test]
    fn concatenates_raw_runs() {
        let out = assemble(vec![TextRunNode::raw("Hello "), TextRunNode::raw("World")]);
        assert_eq!(out.text.text(), "Hello World");
        assert!(out.is_style_homogeneous());
    }

    #[test]
    fn child_annotation_lands_after_parent() {
        let inner = TextRunNode::styled(RunStyle::colored(2), vec![TextRunNode::raw("in")]);
        let outer = TextRunNode::styled(
            RunStyle::colored(1),
            vec![TextRunNode::raw("a"), inner, TextRunNode::raw("b")],
        );
        let out = assemble(vec![outer]);
        let colors: Vec<_> = out
            .text
            .annotations()
            .iter()
            .filter_map(|a| match a.kind {
                AnnotationKind::Color(c) => Some((a.range.clone(), c)),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![(0..4, 1), (1..3, 2)]);
    }

    #[test]
    fn placeholders_register_pending_measurement() {
        let out = assemble(vec![
            TextRunNode::raw("a"),
            TextRunNode::InlineImage { id: 11 },
            TextRunNode::InlineView { id: 12 },
        ]);
        assert_eq!(out.text.text(), "aIB");
        assert!(out.has_image_span);
        assert!(out.has_inline_view_span);
        assert_eq!(out.pending_measurements, vec![11, 12]);
    }

    #[test]
    fn stroke_without_color_inherits_ancestor_ink() {
        let inner = TextRunNode::styled(
            RunStyle {
                stroke: Some(Stroke {
                    width: 2.0,
                    color: crate::style::COLOR_UNSET,
                }),
                ..RunStyle::default()
            },
            vec![TextRunNode::raw("x")],
        );
        let outer = TextRunNode::styled(RunStyle::colored(0xFF123456), vec![inner]);
        let out = assemble(vec![outer]);
        let stroke_color = out.text.annotations().iter().find_map(|a| match a.kind {
            AnnotationKind::Stroke { color, .. } => Some(color),
            _ => None,
        });
        assert_eq!(stroke_color, Some(0xFF123456));
    }

    #[test]
    fn selection_records_background_on_enclosing_run() {
        let run = TextRunNode::styled(
            RunStyle::default(),
            vec![
                TextRunNode::raw("sel"),
                TextRunNode::Selection { color: 0x6600FF00 },
            ],
        );
        let out = assemble(vec![run]);
        assert_eq!(out.text.text(), "sel");
        let range = out.text.annotations().iter().find_map(|a| match a.kind {
            AnnotationKind::SelectionBackground(_) => Some(a.range.clone()),
            _ => None,
        });
        assert_eq!(range, Some(0..3));
    }

    #[test]
    fn truncation_marker_becomes_suffix() {
        let out = assemble(vec![
            TextRunNode::raw("body"),
            TextRunNode::TruncationMarker {
                children: vec![TextRunNode::raw("…more")],
            },
        ]);
        assert_eq!(out.text.text(), "body");
        assert_eq!(out.truncation_suffix.as_ref().map(|s| s.text()), Some("…more"));
    }

    #[test]
    fn vertical_align_flags_baseline_aggregation() {
        let run = TextRunNode::styled(
            RunStyle {
                vertical_align: Some((VerticalAlign::Middle, 0.0)),
                ..RunStyle::default()
            },
            vec![TextRunNode::raw("x")],
        );
        let out = assemble(vec![run]);
        assert!(out.needs_baseline_metrics);
    }
}
