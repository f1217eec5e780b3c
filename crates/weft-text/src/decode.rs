//! Source text decoding ahead of shaping.
//!
//! Handles three concerns: HTML character references embedded in raw runs,
//! CSS hex escapes in generated content, and the invisible break-control
//! characters the `word-break` modes rely on (the shaper only breaks where
//! these characters permit).

use std::borrow::Cow;

use crate::style::WordBreak;

/// ZERO WIDTH SPACE: an invisible break opportunity.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';
/// WORD JOINER: suppresses a break between its neighbors.
pub const WORD_JOINER: char = '\u{2060}';

/// Decodes character references and applies word-break character insertion.
/// Returns the input untouched when nothing needs rewriting.
pub fn decode(text: &str, word_break: WordBreak) -> Cow<'_, str> {
    let needs_entities = text.contains('&');
    let needs_breaks = matches!(word_break, WordBreak::BreakAll | WordBreak::KeepAll);
    if !needs_entities && !needs_breaks {
        return Cow::Borrowed(text);
    }
    let decoded = if needs_entities {
        Cow::Owned(decode_entities(text))
    } else {
        Cow::Borrowed(text)
    };
    match word_break {
        WordBreak::BreakAll => Cow::Owned(insert_break_all(&decoded)),
        WordBreak::KeepAll => Cow::Owned(insert_keep_all(&decoded)),
        _ => decoded,
    }
}

/// Resolves `&#xHH;`, `&#DD;` and a small named-entity set. Unrecognized
/// references pass through verbatim.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match parse_entity(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_entity(s: &str) -> Option<(char, usize)> {
    let semi = s.find(';')?;
    if semi < 2 || semi > 10 {
        return None;
    }
    let body = &s[1..semi];
    let ch = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        char::from_u32(u32::from_str_radix(hex, 16).ok()?)?
    } else if let Some(dec) = body.strip_prefix('#') {
        char::from_u32(dec.parse().ok()?)?
    } else {
        named_entity(body)?
    };
    Some((ch, semi + 1))
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{A0}',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "middot" => '\u{B7}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{A9}',
        "reg" => '\u{AE}',
        "trade" => '\u{2122}',
        _ => return None,
    })
}

/// Resolves CSS `\XXXX` hex escapes in pseudo-element content strings.
pub fn decode_css_content(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut code = 0u32;
        let mut digits = 0;
        while digits < 6 {
            match chars.peek() {
                Some((_, d)) if d.is_ascii_hexdigit() => {
                    code = code * 16 + d.to_digit(16).unwrap_or(0);
                    digits += 1;
                    chars.next();
                }
                _ => break,
            }
        }
        if digits == 0 {
            // Escaped literal, e.g. "\\".
            if let Some((_, escaped)) = chars.next() {
                out.push(escaped);
            }
        } else {
            // A single space after the escape terminates it and is consumed.
            if let Some((_, ' ')) = chars.peek() {
                chars.next();
            }
            if let Some(ch) = char::from_u32(code) {
                out.push(ch);
            }
        }
    }
    out
}

/// `break-all`: a break opportunity after every character.
fn insert_break_all(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if chars.peek().is_some() && !c.is_whitespace() && c != ZERO_WIDTH_SPACE {
            out.push(ZERO_WIDTH_SPACE);
        }
    }
    out
}

/// `keep-all`: joins adjacent CJK characters so the shaper cannot split a
/// CJK sequence.
fn insert_keep_all(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut prev_cjk = false;
    for c in text.chars() {
        let cjk = is_cjk(c);
        if cjk && prev_cjk {
            out.push(WORD_JOINER);
        }
        out.push(c);
        prev_cjk = cjk;
    }
    out
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x2E80..=0x303F      // radicals, punctuation
        | 0x3040..=0x30FF    // kana
        | 0x3400..=0x4DBF    // ext A
        | 0x4E00..=0x9FFF    // unified ideographs
        | 0xAC00..=0xD7AF    // hangul syllables
        | 0xF900..=0xFAFF)   // compatibility ideographs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_borrows() {
        assert!(matches!(decode("hello", WordBreak::Default), Cow::Borrowed(_)));
    }

    #[test]
    fn numeric_and_named_entities() {
        assert_eq!(decode_entities("a&#x41;&#66;&amp;b"), "aAB&b");
        assert_eq!(decode_entities("1&nbsp;2"), "1\u{A0}2");
    }

    #[test]
    fn malformed_entities_pass_through() {
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn break_all_inserts_zero_width_spaces() {
        let out = decode("abc", WordBreak::BreakAll);
        assert_eq!(out.as_ref(), "a\u{200B}b\u{200B}c");
    }

    #[test]
    fn break_all_skips_whitespace() {
        let out = decode("a b", WordBreak::BreakAll);
        assert_eq!(out.as_ref(), "a\u{200B} b");
    }

    #[test]
    fn keep_all_joins_cjk_runs() {
        let out = decode("中文 ok", WordBreak::KeepAll);
        assert_eq!(out.as_ref(), "中\u{2060}文 ok");
    }

    #[test]
    fn css_hex_escapes() {
        assert_eq!(decode_css_content("\\2022 item"), "\u{2022}item");
        assert_eq!(decode_css_content("a\\\\b"), "a\\b");
    }
}
