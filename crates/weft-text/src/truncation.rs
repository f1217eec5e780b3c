//! Inline truncation: replaces an overflowing tail with a custom suffix.
//!
//! The cut search works on the primary layout's last visible line: per-char
//! caret positions are binary-searched for the boundary nearest the width
//! left over once the suffix is accounted for, then the splice is verified
//! by re-measuring and the cut retreats one character at a time if the
//! hybrid still overflows. The cut index only ever decreases within one
//! call.

use weft_ui_layout::{LayoutConstraints, MeasureMode};

use crate::annotated::AnnotatedText;
use crate::engine::LayoutEngine;
use crate::inline::PlaceholderGeometry;
use crate::result::LayoutResult;
use crate::style::TextStyleAttributes;

/// Outcome of a successful truncation pass.
#[derive(Debug, Clone)]
pub struct TruncationOutcome {
    /// Layout of `prefix[..cut] + suffix`.
    pub result: LayoutResult,
    /// The hybrid buffer the result refers to.
    pub text: AnnotatedText,
    /// Byte index into the primary buffer where content was cut.
    pub cut: usize,
    /// Characters of primary content the suffix replaced.
    pub ellipsis_count: usize,
    /// Placeholder ids that fell into discarded content or belong to the
    /// suffix; the measurement collaborator must hide them.
    pub truncated_placeholders: Vec<u64>,
}

/// Computes a hybrid layout for an overflowing primary result. Returns
/// `None` when truncation is not applicable or unsatisfiable, in which
/// case the primary layout's own ellipsis stands.
pub fn truncate(
    engine: &LayoutEngine<'_>,
    primary: &LayoutResult,
    source: &AnnotatedText,
    suffix: &AnnotatedText,
    style: &TextStyleAttributes,
    constraints: &LayoutConstraints,
    geometry: &PlaceholderGeometry,
) -> Option<TruncationOutcome> {
    if !primary.is_truncated() || suffix.is_empty() {
        return None;
    }
    let last = primary.shaped.lines.last()?;

    // The suffix must fit a single line on its own.
    let line_width = if constraints.has_bounded_width() {
        constraints.width
    } else {
        primary.shaped.width
    };
    let suffix_constraints = LayoutConstraints {
        width: line_width,
        height: 0.0,
        width_mode: MeasureMode::AtMost,
        height_mode: MeasureMode::Undefined,
        ..*constraints
    };
    let suffix_layout = engine.measure_with_placeholders(suffix, style, &suffix_constraints, geometry);
    if suffix_layout.line_count() > 1 || suffix_layout.is_truncated() {
        log::warn!("truncation suffix does not fit a single line, keeping plain ellipsis");
        return None;
    }
    let suffix_width = suffix_layout.max_line_width;
    let remaining = line_width - suffix_width;
    if remaining <= 0.0 {
        log::warn!("truncation suffix consumes the whole line, keeping plain ellipsis");
        return None;
    }

    // Candidate boundaries: caret positions of the last visible line,
    // already in visual-start order for both directions.
    let mut cut = if last.width <= remaining {
        last.ellipsis_start
    } else {
        let carets = &last.carets;
        let kept = carets.partition_point(|c| c.x + c.advance <= remaining);
        match kept {
            0 => last.start,
            n => {
                let c = carets[n - 1];
                next_boundary(source.text(), c.byte_offset)
            }
        }
    };
    cut = trim_trailing_whitespace(source.text(), last.start, cut);

    let target_lines = primary.line_count().max(1);
    let floor = last.start;
    // Bounded retry: each failed verify moves the cut strictly left.
    loop {
        let hybrid = source.clipped(cut).concat(suffix);
        let hybrid_layout =
            engine.measure_with_placeholders(&hybrid, style, constraints, geometry);
        let overflows =
            hybrid_layout.line_count() > target_lines || hybrid_layout.is_truncated();
        if !overflows || cut <= floor {
            let ellipsis_count = source.text()[cut.min(source.len())..].chars().count();
            let mut truncated: Vec<u64> = source
                .placeholders()
                .filter(|(range, _, _)| range.start >= cut)
                .map(|(_, id, _)| id)
                .collect();
            for (_, id, _) in suffix.placeholders() {
                truncated.push(id);
            }
            return Some(TruncationOutcome {
                result: hybrid_layout,
                text: hybrid,
                cut,
                ellipsis_count,
                truncated_placeholders: truncated,
            });
        }
        let next = trim_trailing_whitespace(
            source.text(),
            floor,
            prev_boundary(source.text(), cut),
        );
        if next >= cut {
            return None;
        }
        cut = next;
    }
}

/// Moves `cut` left past trailing whitespace, never before `floor`.
fn trim_trailing_whitespace(text: &str, floor: usize, mut cut: usize) -> usize {
    while cut > floor {
        let prev = prev_boundary(text, cut);
        match text[prev..cut].chars().next() {
            Some(c) if c.is_whitespace() => cut = prev,
            _ => break,
        }
    }
    cut
}

fn prev_boundary(text: &str, i: usize) -> usize {
    let mut j = i.saturating_sub(1);
    while j > 0 && !text.is_char_boundary(j) {
        j -= 1;
    }
    j
}

fn next_boundary(text: &str, i: usize) -> usize {
    let mut j = (i + 1).min(text.len());
    while j < text.len() && !text.is_char_boundary(j) {
        j += 1;
    }
    j
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_trim_stops_at_floor() {
        assert_eq!(trim_trailing_whitespace("ab   ", 0, 5), 2);
        assert_eq!(trim_trailing_whitespace("   ", 1, 3), 1);
        assert_eq!(trim_trailing_whitespace("abc", 0, 3), 3);
    }

    #[test]
    fn boundary_helpers_respect_utf8() {
        let s = "aé b";
        assert_eq!(prev_boundary(s, 3), 1);
        assert_eq!(next_boundary(s, 1), 3);
    }
}
