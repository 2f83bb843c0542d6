//! Built-in spreadsheet functions.
//!
//! - `REF("A1")` / `REF("A1","B2")`: value of a cell, or a row-major array for a range
//! - `SUM(...)`: adds numbers or concatenates strings
//! - `AVG(...)`: arithmetic mean of numbers
//!
//! SUM and AVG take a single array: preprocessing packs the written operands
//! (`SUM(1, A1..B2)` becomes `SUM([1.0, REF("A1","B2")])`), so any number of
//! them is accepted. Nested arrays are flattened. References are resolved
//! before the script runs, so REF only reads from [`ResolvedRefs`].
//!
//! `+` between a string and a number shows the number the way a cell
//! displays it (`"a" + 1` is `a1`, not `a1.0`).

use crate::engine::format::{format_number, parse_number};
use crate::engine::{Coordinates, Range};
use rhai::{Array, Dynamic, Engine, EvalAltResult, ImmutableString, Position};

use std::collections::HashMap;
use std::sync::Arc;

/// Values of every range a formula mentions, keyed by range. Single cells are
/// stored as one-cell ranges.
#[derive(Debug, Default, Clone)]
pub struct ResolvedRefs {
    ranges: HashMap<Range, Array>,
}

impl ResolvedRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, range: Range, values: Array) {
        self.ranges.insert(range, values);
    }

    pub fn contains(&self, range: &Range) -> bool {
        self.ranges.contains_key(range)
    }

    pub fn range(&self, range: &Range) -> Option<&Array> {
        self.ranges.get(range)
    }

    pub fn cell(&self, coords: Coordinates) -> Option<&Dynamic> {
        self.ranges.get(&Range::cell(coords)).and_then(|values| values.first())
    }
}

/// Typed value of a cell as seen by formulas: numeric display strings become
/// floats, anything else stays a string.
pub fn cell_value(display: &str) -> Dynamic {
    match parse_number(display) {
        Some(n) => Dynamic::from(n),
        None => Dynamic::from(display.to_string()),
    }
}

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

fn parse_cell(name: &str) -> Result<Coordinates, Box<EvalAltResult>> {
    Coordinates::parse(name).ok_or_else(|| invalid_arg(&format!("REF: invalid cell reference {}", name)))
}

pub fn register_builtins(engine: &mut Engine, refs: Arc<ResolvedRefs>) {
    // REF("A1"): value of a single cell
    let cell_refs = refs.clone();
    engine.register_fn(
        "REF",
        move |name: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let coords = parse_cell(name)?;
            cell_refs
                .cell(coords)
                .cloned()
                .ok_or_else(|| invalid_arg(&format!("REF: {} is not a reference of this formula", coords)))
        },
    );

    // REF("A1","B2"): row-major array of the range's values
    let range_refs = refs;
    engine.register_fn(
        "REF",
        move |start: &str, end: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            let range = Range::spanning(parse_cell(start)?, parse_cell(end)?);
            range_refs
                .range(&range)
                .map(|values| Dynamic::from_array(values.clone()))
                .ok_or_else(|| invalid_arg(&format!("REF: {} is not a reference of this formula", range)))
        },
    );

    engine.register_fn("SUM", sum_values);
    engine.register_fn("AVG", average_values);

    // Registered `+` overloads only win over the built-in operators when
    // fast operators are off.
    engine.set_fast_operators(false);
    engine.register_fn("+", |text: ImmutableString, n: f64| -> String {
        format!("{}{}", text, format_number(n))
    });
    engine.register_fn("+", |n: f64, text: ImmutableString| -> String {
        format!("{}{}", format_number(n), text)
    });
}

fn flatten(values: Array, out: &mut Vec<Dynamic>) {
    for value in values {
        if value.is_array() {
            flatten(value.into_array().unwrap_or_default(), out);
        } else {
            out.push(value);
        }
    }
}

fn as_number(value: &Dynamic) -> Option<f64> {
    if let Ok(n) = value.as_float() {
        return Some(n);
    }
    value.as_int().ok().map(|n| n as f64)
}

enum Sum {
    Empty,
    Number(f64),
    Text(String),
}

/// The first operand decides the kind of the sum: strings concatenate,
/// numbers add. A numeric string still adds onto a number. Empty strings
/// (blank cells) are skipped.
fn sum_values(args: Array) -> Result<Dynamic, Box<EvalAltResult>> {
    let mut operands = Vec::with_capacity(args.len());
    flatten(args, &mut operands);

    let mut sum = Sum::Empty;
    for value in operands {
        sum = if let Some(n) = as_number(&value) {
            match sum {
                Sum::Empty => Sum::Number(n),
                Sum::Number(total) => Sum::Number(total + n),
                Sum::Text(_) => return Err(invalid_arg("SUM: cannot add string and number together")),
            }
        } else if value.is_string() {
            let text = value.into_string().unwrap_or_default();
            if text.is_empty() {
                continue;
            }
            match sum {
                Sum::Empty => Sum::Text(text),
                Sum::Text(mut joined) => {
                    joined.push_str(&text);
                    Sum::Text(joined)
                }
                Sum::Number(total) => match parse_number(&text) {
                    Some(n) => Sum::Number(total + n),
                    None => return Err(invalid_arg("SUM: cannot add string and number together")),
                },
            }
        } else {
            return Err(invalid_arg("SUM: can only add numbers or strings"));
        };
    }

    Ok(match sum {
        Sum::Empty => Dynamic::UNIT,
        Sum::Number(total) => Dynamic::from(total),
        Sum::Text(joined) => Dynamic::from(joined),
    })
}

fn average_values(args: Array) -> Result<Dynamic, Box<EvalAltResult>> {
    let mut operands = Vec::with_capacity(args.len());
    flatten(args, &mut operands);

    let mut total = 0.0;
    let mut count = 0usize;
    for value in operands {
        if let Some(n) = as_number(&value) {
            total += n;
            count += 1;
        } else if value.is_string() && value.clone().into_string().is_ok_and(|s| s.is_empty()) {
            continue;
        } else {
            return Err(invalid_arg("AVG: operands to AVG must be number"));
        }
    }

    if count == 0 {
        return Err(invalid_arg("AVG: nothing to average"));
    }
    Ok(Dynamic::from(total / count as f64))
}
