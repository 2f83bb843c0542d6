//! Formula preprocessing and reference transformation.
//!
//! Before formulas can be evaluated by Rhai, cell references like `A1` must
//! be turned into function calls. This module handles:
//!
//! - **Preprocessing**: `A1` → `REF("A1")`, `A1..B2` and `REF(A1..B2)` →
//!   `REF("A1","B2")`, integer literals → float literals, and the operands of
//!   `SUM(...)` / `AVG(...)` packed into one array
//! - **Reference shifting**: adjusting references when rows/columns are
//!   inserted or deleted
//!
//! String literals are left untouched by every transformation here.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::Coordinates;
use super::deps::{cell_token_re, is_function_name};

/// Marker written in place of a reference whose row/column was deleted.
pub const DELETED_REFERENCE: &str = "#REF!";

/// Operation for shifting cell references in formulas. Indices are 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOperation {
    InsertRow(usize),
    DeleteRow(usize),
    InsertColumn(usize),
    DeleteColumn(usize),
}

/// Shift cell references in a formula when rows/cols are inserted/deleted.
/// Returns the updated formula string.
///
/// Rules (only the edited axis changes):
/// - Insert row at R: refs to row index >= R become index + 1
/// - Delete row at R: refs to row index > R become index - 1; index == R becomes `#REF!`
/// - Same logic for columns
///
/// Bare tokens and tokens inside `REF(...)` shift identically; each corner of
/// a range shifts on its own.
pub fn shift_formula_references(formula: &str, op: ShiftOperation) -> String {
    map_code_segments(formula, |seg| {
        single_token_re()
            .replace_all(seg, |caps: &Captures| {
                if is_function_name(seg, caps) {
                    return caps[0].to_string();
                }
                shift_single_ref(&caps[0], op)
            })
            .to_string()
    })
}

fn shift_single_ref(token: &str, op: ShiftOperation) -> String {
    let Some(cr) = Coordinates::parse(token) else {
        return token.to_string();
    };
    let (row, col) = (cr.row_index(), cr.col_index());

    // A reference already at the largest representable index stays put.
    let shifted = match op {
        ShiftOperation::InsertRow(at) if row >= at => {
            row.checked_add(1).and_then(|r| Coordinates::checked_from_indices(r, col))
        }
        ShiftOperation::InsertColumn(at) if col >= at => {
            col.checked_add(1).and_then(|c| Coordinates::checked_from_indices(row, c))
        }
        ShiftOperation::DeleteRow(at) | ShiftOperation::DeleteColumn(at)
            if op.axis_index(row, col) == at =>
        {
            return DELETED_REFERENCE.to_string();
        }
        ShiftOperation::DeleteRow(at) if row > at => Some(Coordinates::from_indices(row - 1, col)),
        ShiftOperation::DeleteColumn(at) if col > at => Some(Coordinates::from_indices(row, col - 1)),
        _ => None,
    };
    match shifted {
        Some(coords) => coords.to_string(),
        None => token.to_string(),
    }
}

impl ShiftOperation {
    /// The component of a (row, col) index pair on this operation's axis.
    fn axis_index(self, row: usize, col: usize) -> usize {
        match self {
            ShiftOperation::InsertRow(_) | ShiftOperation::DeleteRow(_) => row,
            ShiftOperation::InsertColumn(_) | ShiftOperation::DeleteColumn(_) => col,
        }
    }
}

/// Rewrite a formula into the script Rhai evaluates.
///
/// `A1` becomes `REF("A1")`, `A1..B2` and `REF(A1..B2)` become
/// `REF("A1","B2")`, and integer literals gain a `.0` so that arithmetic is
/// floating point throughout (`10/4` is 2.5). Finally the operands of every
/// `SUM`/`AVG` call are wrapped in `[...]`.
pub fn preprocess_formula(formula: &str) -> String {
    let with_refs = map_code_segments(formula, |seg| {
        reference_expr_re()
            .replace_all(seg, |caps: &Captures| {
                if caps.get(1).is_some() {
                    return ref_call(&caps[1], caps.get(2).map(|m| m.as_str()));
                }
                if is_function_name(seg, caps) {
                    return caps[0].to_string();
                }
                ref_call(&caps[3], caps.get(4).map(|m| m.as_str()))
            })
            .to_string()
    });

    let with_floats = map_code_segments(&with_refs, |seg| {
        integer_literal_re()
            .replace_all(seg, |caps: &Captures| {
                let literal = &caps[0];
                if literal.bytes().all(|b| b.is_ascii_digit()) {
                    format!("{}.0", literal)
                } else {
                    literal.to_string()
                }
            })
            .to_string()
    });

    pack_variadic_arguments(&with_floats)
}

/// Functions whose operands are passed to Rhai as a single array.
const VARIADIC_FUNCTIONS: [&str; 2] = ["SUM", "AVG"];

/// `SUM(a, b, c)` → `SUM([a, b, c])`, including nested calls. Parentheses
/// inside string literals are ignored.
fn pack_variadic_arguments(script: &str) -> String {
    let mut out = String::with_capacity(script.len() + 8);
    // One entry per open parenthesis: whether it opened a packed call.
    let mut open: Vec<bool> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in script.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '(' => {
                let packed = VARIADIC_FUNCTIONS.contains(&trailing_identifier(&out));
                open.push(packed);
                out.push_str(if packed { "([" } else { "(" });
            }
            ')' => {
                let packed = open.pop().unwrap_or(false);
                out.push_str(if packed { "])" } else { ")" });
            }
            _ => out.push(ch),
        }
    }
    out
}

/// The identifier immediately before the end of `text`, ignoring trailing
/// whitespace.
fn trailing_identifier(text: &str) -> &str {
    let text = text.trim_end();
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map_or(text.len(), |(i, _)| i);
    &text[start..]
}

fn ref_call(start: &str, end: Option<&str>) -> String {
    match end {
        Some(end) => format!("REF(\"{}\",\"{}\")", canonical(start), canonical(end)),
        None => format!("REF(\"{}\")", canonical(start)),
    }
}

fn canonical(token: &str) -> String {
    Coordinates::parse(token)
        .map(|c| c.to_string())
        .unwrap_or_else(|| token.to_ascii_uppercase())
}

/// Matches an explicit `REF(A1)` / `REF(A1..B2)` call (groups 1-2) or a bare
/// `A1` / `A1..B2` token (groups 3-4).
fn reference_expr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)\bREF\(\s*([A-Z]+[0-9]+)(?:\s*\.\.\s*([A-Z]+[0-9]+))?\s*\)|{}",
            cell_token_re().as_str()
        ))
        .expect("reference expression regex must compile")
    })
}

fn single_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Za-z]+[0-9]+\b").expect("cell regex must compile"))
}

fn integer_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?\b")
            .expect("number literal regex must compile")
    })
}

/// Apply `f` to every stretch of `script` outside double-quoted string
/// literals; literals are copied through verbatim.
fn map_code_segments(script: &str, mut f: impl FnMut(&str) -> String) -> String {
    let bytes = script.as_bytes();
    let mut out = String::with_capacity(script.len());
    let mut seg_start = 0;
    let mut in_string = false;
    let mut backslashes = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'\\' {
                backslashes += 1;
                i += 1;
                continue;
            }
            if b == b'"' && backslashes.is_multiple_of(2) {
                out.push_str(&script[seg_start..=i]);
                in_string = false;
                seg_start = i + 1;
            }
            backslashes = 0;
            i += 1;
            continue;
        }

        if b == b'"' {
            out.push_str(&f(&script[seg_start..i]));
            in_string = true;
            seg_start = i;
            backslashes = 0;
        }
        i += 1;
    }

    if seg_start < script.len() {
        if in_string {
            out.push_str(&script[seg_start..]);
        } else {
            out.push_str(&f(&script[seg_start..]));
        }
    }

    out
}
