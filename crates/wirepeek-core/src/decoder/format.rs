//! Line rendering for decoded fields.

use super::candidates::Candidate;
use std::fmt::Display;

/// Indentation applied to each line of a nested message
pub(crate) const NESTED_INDENT: &str = "  ";

/// Renders a field key as `"N"` or, with offsets, `"N @ O"`.
pub fn format_key(number: u64, offset: usize, show_offsets: bool) -> String {
    if show_offsets {
        format!("{} @ {}", number, offset)
    } else {
        number.to_string()
    }
}

/// Renders `"<key>: (<label>) <value>"`
pub(crate) fn field_line(key: &str, label: &str, value: impl Display) -> String {
    format!("{}: ({}) {}", key, label, value)
}

/// Primary line for a fixed-width field, given the winning reading if any
pub(crate) fn best_line(key: &str, best: Option<&Candidate>) -> String {
    match best {
        Some(candidate) => field_line(key, candidate.label, &candidate.text),
        None => format!("{}: (none)", key),
    }
}

/// Every reading of a fixed-width field, aligned under the key
pub(crate) fn candidate_lines<'a>(
    key: &'a str,
    candidates: &'a [Candidate],
) -> impl Iterator<Item = String> + 'a {
    let pad = " ".repeat(key.len());
    candidates
        .iter()
        .map(move |c| format!("{}  ({}) {}", pad, c.label, c.text))
}

/// Quoted, escaped string rendering
pub(crate) fn text_line(key: &str, text: &str) -> String {
    format!("{}: (string) {}", key, quote(text))
}

/// Double-quotes `text` using C-style escapes.
///
/// ASCII control bytes become `\a`..`\v` or `\xNN`; other control
/// characters become `\uNNNN`.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{b}' => out.push_str("\\v"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Lowercase hex rendering of raw bytes
pub(crate) fn bytes_line(key: &str, bytes: &[u8]) -> String {
    field_line(key, "bytes", hex::encode(bytes))
}

/// Wraps nested lines in `"<key>: {"` ... `"}"`, indenting each one
pub(crate) fn push_nested(key: &str, nested: Vec<String>, out: &mut Vec<String>) {
    out.reserve(nested.len() + 2);
    out.push(format!("{}: {{", key));
    out.extend(nested.into_iter().map(|line| format!("{}{}", NESTED_INDENT, line)));
    out.push("}".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::candidates::fixed32_candidates;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_key() {
        assert_eq!(format_key(7, 42, false), "7");
        assert_eq!(format_key(7, 42, true), "7 @ 42");
    }

    #[test]
    fn test_candidate_lines_align_under_key() {
        let candidates = fixed32_candidates(1.5f32.to_le_bytes());
        let lines: Vec<_> = candidate_lines("3 @ 10", &candidates).collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "        (floatle) 1.500000");
        assert!(lines.iter().all(|l| l.starts_with("        (")));
    }

    #[test]
    fn test_best_line_without_winner() {
        assert_eq!(best_line("4", None), "4: (none)");
    }

    #[test]
    fn test_text_and_bytes_lines() {
        assert_eq!(text_line("2", "say \"hi\"\n"), r#"2: (string) "say \"hi\"\n""#);
        assert_eq!(bytes_line("2", &[0xFF, 0x00, 0x1a]), "2: (bytes) ff001a");
    }

    #[test]
    fn test_text_line_control_escapes() {
        assert_eq!(text_line("1", "\u{1}"), r#"1: (string) "\x01""#);
        assert_eq!(text_line("1", "a\u{8}b\u{7}"), r#"1: (string) "a\bb\a""#);
        assert_eq!(text_line("1", "\u{7f}\u{1b}"), r#"1: (string) "\x7f\x1b""#);
        assert_eq!(text_line("1", "\u{85}"), r#"1: (string) "\u0085""#);
        assert_eq!(text_line("1", "tab\there\\"), r#"1: (string) "tab\there\\""#);
        assert_eq!(text_line("1", "héllo ✓"), r#"1: (string) "héllo ✓""#);
    }

    #[test]
    fn test_push_nested() {
        let mut out = vec!["1: (varint) 1".to_string()];
        push_nested(
            "2",
            vec!["1: (varint) 5".to_string(), "}".to_string()],
            &mut out,
        );
        assert_eq!(
            out,
            vec!["1: (varint) 1", "2: {", "  1: (varint) 5", "  }", "}"]
        );
    }
}
