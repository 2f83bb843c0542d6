//! Formula engine API.
//!
//! - [`Coordinates`], [`Range`] - A1 notation and rectangular ranges
//! - [`referenced_ranges`] - Ranges a formula depends on
//! - [`preprocess_formula`] - Rewrite formulas for Rhai evaluation
//! - [`shift_formula_references`] - Adjust references after structural edits
//! - [`FormulaEvaluator`] - Evaluate formulas against resolved cell values
//! - [`format_dynamic`] - Format values for display

mod cell_ref;
mod deps;
mod error;
mod eval;
pub(crate) mod format;
mod preprocess;

pub use cell_ref::{Coordinates, RANGE_SEPARATOR, Range, index_to_letters, letters_to_index};
pub use deps::referenced_ranges;
pub use error::FormulaError;
pub use eval::{DEFAULT_MAX_RANGE_CELLS, FormulaEvaluator, create_engine};
pub use format::{ERROR_PREFIX, format_dynamic, format_number, format_outcome, parse_number};
pub use preprocess::{DELETED_REFERENCE, ShiftOperation, preprocess_formula, shift_formula_references};

pub use rhai::Dynamic;
