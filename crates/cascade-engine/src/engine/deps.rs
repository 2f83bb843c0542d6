//! Reference extraction from formula strings.
//!
//! Finds every cell or range token (`A1`, `b12`, `A1..C4`) a formula mentions,
//! with or without a surrounding `REF(...)`. The result drives observer
//! wiring and cycle detection.
//!
//! - Tokens inside string literals are ignored
//! - A token directly followed by `(` is a function name, not a reference
//! - Tokens that do not name a real cell (row 0, overflowing column) are skipped

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::{Coordinates, Range};

/// Extract all ranges referenced by a formula, in order of appearance.
/// Single-cell references come back as one-cell ranges. Duplicates are kept.
pub fn referenced_ranges(formula: &str) -> Vec<Range> {
    let script = strip_string_literals(formula);
    cell_token_re()
        .captures_iter(&script)
        .filter(|caps| !is_function_name(&script, caps))
        .filter_map(|caps| token_range(&caps))
        .collect()
}

/// Matches `A1` or `A1..B2`. Group 1 is the first corner, group 2 the optional second.
pub(crate) fn cell_token_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z]+[0-9]+)(?:\.\.([A-Za-z]+[0-9]+))?\b")
            .expect("cell token regex must compile")
    })
}

/// True when the whole match is immediately followed by `(`.
pub(crate) fn is_function_name(script: &str, caps: &Captures) -> bool {
    let end = caps.get(0).map_or(0, |m| m.end());
    script[end..].starts_with('(')
}

fn token_range(caps: &Captures) -> Option<Range> {
    let start = Coordinates::parse(&caps[1])?;
    match caps.get(2) {
        Some(end) => Some(Range::spanning(start, Coordinates::parse(end.as_str())?)),
        None => Some(Range::cell(start)),
    }
}

/// Blank out the contents of double-quoted string literals, keeping byte
/// offsets and the quotes themselves.
pub(crate) fn strip_string_literals(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in script.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push_str(&" ".repeat(ch.len_utf8()));
                continue;
            }
            if ch == '\\' {
                escaped = true;
                out.push(' ');
                continue;
            }
            if ch == '"' {
                in_string = false;
                out.push('"');
            } else {
                out.push_str(&" ".repeat(ch.len_utf8()));
            }
        } else if ch == '"' {
            in_string = true;
            out.push('"');
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(formula: &str) -> Vec<String> {
        referenced_ranges(formula)
            .iter()
            .map(|r| r.to_string())
            .collect()
    }

    #[test]
    fn test_ref_wrapped_and_bare_tokens() {
        assert_eq!(ranges("REF(A1)"), vec!["A1"]);
        assert_eq!(ranges("REF(A1) + REF(A3..B4)"), vec!["A1", "A3..B4"]);
        assert_eq!(ranges("A1 + b2..c3"), vec!["A1", "B2..C3"]);
    }

    #[test]
    fn test_text_without_references() {
        assert!(ranges("").is_empty());
        assert!(ranges("10 + 20").is_empty());
        assert!(ranges("SUM(1, 2)").is_empty());
    }

    #[test]
    fn test_ignores_string_literals() {
        assert_eq!(ranges("\"A1\" + B2"), vec!["B2"]);
        assert_eq!(ranges("\"say \\\"C3\\\"\" + D4"), vec!["D4"]);
    }

    #[test]
    fn test_ignores_function_names_and_row_zero() {
        assert!(ranges("LOG10(5)").is_empty());
        assert!(ranges("A0").is_empty());
    }

    #[test]
    fn test_keeps_duplicates() {
        assert_eq!(ranges("A1 + A1"), vec!["A1", "A1"]);
    }

    #[test]
    fn test_strip_preserves_offsets() {
        let script = "\"é\" + A1";
        assert_eq!(strip_string_literals(script).len(), script.len());
    }
}
