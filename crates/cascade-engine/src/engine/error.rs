//! Formula evaluation errors.
//!
//! None of these escape a cell: a failing formula displays `Error: <message>`.

use rhai::EvalAltResult;
use thiserror::Error;

use super::cell_ref::{Coordinates, Range};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    /// Parse or runtime failure reported by Rhai, including SUM/AVG type mismatches.
    #[error("{0}")]
    Script(String),

    /// A referenced cell could not be read.
    #[error("{0}")]
    Reference(String),

    #[error("formula refers to a deleted cell")]
    DeletedReference,

    #[error("circular reference through {0}")]
    CircularReference(Coordinates),

    #[error("range {range} has more than {limit} cells")]
    RangeTooLarge { range: Range, limit: usize },
}

impl From<Box<EvalAltResult>> for FormulaError {
    fn from(err: Box<EvalAltResult>) -> Self {
        // Built-ins raise plain string messages; show them without a position suffix.
        match *err {
            EvalAltResult::ErrorRuntime(ref value, _) if value.is_string() => {
                FormulaError::Script(value.to_string())
            }
            _ => FormulaError::Script(err.to_string()),
        }
    }
}
