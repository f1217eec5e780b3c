//! Layout event payload handed to observability collaborators.

use weft_ui_graphics::Size;

use crate::result::{LayoutResult, LineInfo};

/// Snapshot of one finished layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayoutEvent {
    pub line_count: usize,
    pub lines: Vec<LineInfo>,
    pub size: Option<Size>,
}

impl TextLayoutEvent {
    pub fn from_result(result: &LayoutResult) -> Self {
        let mut lines: Vec<LineInfo> = result.lines().collect();
        // Clipped content is reported like ellipsized content: the last
        // line owns the invisible remainder.
        if result.is_truncated() {
            if let Some(last) = lines.last_mut() {
                if last.end < result.text.len() {
                    last.ellipsis_count +=
                        result.text.text()[last.end..].chars().count();
                    last.end = result.text.len();
                }
            }
        }
        Self {
            line_count: result.line_count(),
            lines,
            size: Some(result.size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotated::AnnotatedText;

    #[test]
    fn empty_result_emits_empty_payload() {
        let event = TextLayoutEvent::from_result(&LayoutResult::empty(AnnotatedText::default()));
        assert_eq!(event.line_count, 0);
        assert!(event.lines.is_empty());
        assert_eq!(event.size, Some(Size::ZERO));
    }

    #[test]
    fn clipped_remainder_reported_on_last_line() {
        use crate::engine::LayoutEngine;
        use crate::shaper::MonospacedShaper;
        use crate::style::TextStyleAttributes;
        use weft_ui_layout::LayoutConstraints;

        let shaper = MonospacedShaper::default();
        let engine = LayoutEngine::new(&shaper);
        let style = TextStyleAttributes {
            max_line_count: Some(2),
            ..TextStyleAttributes::default()
        };
        let text = AnnotatedText::new("a\nb\nc");
        let result = engine.measure(&text, &style, &LayoutConstraints::unbounded());
        let event = TextLayoutEvent::from_result(&result);
        assert_eq!(event.line_count, 2);
        let last = event.lines.last().unwrap();
        assert_eq!(last.end, 5);
        assert_eq!(last.ellipsis_count, 2);
    }
}
