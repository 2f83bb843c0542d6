//! Rhai engine creation and formula evaluation.
//!
//! Every referenced range is resolved up front through a caller-supplied
//! lookup, then the preprocessed formula runs on a fresh engine whose REF
//! reads only those resolved values.

use rhai::{Array, Engine};
use std::sync::Arc;

use super::deps::{referenced_ranges, strip_string_literals};
use super::preprocess::{DELETED_REFERENCE, preprocess_formula};
use super::{Coordinates, Dynamic, FormulaError};
use crate::builtins::{ResolvedRefs, cell_value, register_builtins};

/// Largest range a single reference may cover unless configured otherwise.
pub const DEFAULT_MAX_RANGE_CELLS: usize = 1_000_000;

/// Create a Rhai engine with built-ins registered over the given references.
pub fn create_engine(refs: Arc<ResolvedRefs>) -> Engine {
    let mut engine = Engine::new();
    register_builtins(&mut engine, refs);
    engine
}

/// Evaluates formula text. Stateless apart from its limits, so one instance
/// is shared by every sheet of a spreadsheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaEvaluator {
    max_range_cells: usize,
}

impl Default for FormulaEvaluator {
    fn default() -> Self {
        Self {
            max_range_cells: DEFAULT_MAX_RANGE_CELLS,
        }
    }
}

impl FormulaEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_range_cells(max_range_cells: usize) -> Self {
        Self { max_range_cells }
    }

    pub fn max_range_cells(&self) -> usize {
        self.max_range_cells
    }

    /// Evaluate `formula` (without the leading `=`).
    ///
    /// `resolve` returns the display value of a referenced cell; its errors
    /// abort evaluation.
    pub fn evaluate<F>(&self, formula: &str, mut resolve: F) -> Result<Dynamic, FormulaError>
    where
        F: FnMut(Coordinates) -> Result<String, FormulaError>,
    {
        if strip_string_literals(formula).contains(DELETED_REFERENCE) {
            return Err(FormulaError::DeletedReference);
        }

        let mut refs = ResolvedRefs::new();
        for range in referenced_ranges(formula) {
            if refs.contains(&range) {
                continue;
            }
            let count = range
                .cell_count()
                .filter(|count| *count <= self.max_range_cells)
                .ok_or(FormulaError::RangeTooLarge {
                    range,
                    limit: self.max_range_cells,
                })?;
            let mut values = Array::with_capacity(count);
            for coords in range.cells() {
                values.push(cell_value(&resolve(coords)?));
            }
            refs.insert(range, values);
        }

        let script = preprocess_formula(formula);
        tracing::trace!(formula, script = %script, "evaluating formula");
        let engine = create_engine(Arc::new(refs));
        engine.eval::<Dynamic>(&script).map_err(FormulaError::from)
    }

    /// Evaluate a formula that must not reference any cell.
    pub fn evaluate_detached(&self, formula: &str) -> Result<Dynamic, FormulaError> {
        self.evaluate(formula, |coords| {
            Err(FormulaError::Reference(format!(
                "{} cannot be read outside a sheet",
                coords
            )))
        })
    }
}
