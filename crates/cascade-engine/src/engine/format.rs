use super::{Dynamic, FormulaError};

/// Prefix of every display value produced by a failing formula.
pub const ERROR_PREFIX: &str = "Error: ";

/// Render an evaluation outcome as a cell display value.
pub fn format_outcome(outcome: Result<Dynamic, FormulaError>) -> String {
    match outcome {
        Ok(value) => format_dynamic(&value),
        Err(err) => format!("{}{}", ERROR_PREFIX, err),
    }
}

/// Format a Dynamic value for display.
///
/// Numbers, and strings that read as numbers, are rounded to 3 decimals.
pub fn format_dynamic(value: &Dynamic) -> String {
    if value.is_unit() {
        String::new()
    } else if let Ok(n) = value.as_float() {
        format_number(n)
    } else if let Ok(n) = value.as_int() {
        n.to_string()
    } else if let Ok(b) = value.as_bool() {
        b.to_string()
    } else if value.is_string() {
        let s = value.clone().into_string().unwrap_or_default();
        match parse_number(&s) {
            Some(n) => format_number(n),
            None => s,
        }
    } else if value.is_array() {
        value
            .clone()
            .into_array()
            .unwrap_or_default()
            .iter()
            .map(format_dynamic)
            .collect::<Vec<_>>()
            .join(",")
    } else {
        value.to_string()
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "#NAN!".to_string();
    }
    if n.is_infinite() {
        return "#INF!".to_string();
    }
    let scaled = n * 1000.0;
    if !scaled.is_finite() {
        return n.to_string();
    }
    let rounded = scaled.round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Read a display string as a number. Only finite values count, so text like
/// `inf` or `NaN` stays text.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
