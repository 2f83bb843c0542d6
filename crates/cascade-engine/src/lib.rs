//! cascade_engine - Formula language and Rhai integration.

pub mod builtins;
pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use std::collections::HashMap;

    /// Cells keyed by A1 name; values starting with `=` are formulas.
    struct Fixture {
        cells: HashMap<Coordinates, String>,
        evaluator: FormulaEvaluator,
    }

    impl Fixture {
        fn new(cells: &[(&str, &str)]) -> Self {
            Fixture {
                cells: cells
                    .iter()
                    .map(|(name, raw)| (Coordinates::parse(name).unwrap(), raw.to_string()))
                    .collect(),
                evaluator: FormulaEvaluator::new(),
            }
        }

        fn display(&self, coords: Coordinates) -> String {
            match self.cells.get(&coords) {
                None => String::new(),
                Some(raw) => match raw.strip_prefix('=') {
                    Some(formula) => self.eval(formula),
                    None => raw.clone(),
                },
            }
        }

        fn eval(&self, formula: &str) -> String {
            format_outcome(self.evaluator.evaluate(formula, |c| Ok(self.display(c))))
        }
    }

    #[test]
    fn test_arithmetic() {
        let fx = Fixture::new(&[]);
        assert_eq!(fx.eval("5 + 5"), "10");
        assert_eq!(fx.eval("10 / 4"), "2.5");
        assert_eq!(fx.eval("1 / 3"), "0.333");
        assert_eq!(fx.eval("2 ** 3"), "8");
        assert_eq!(fx.eval("\"Hello\""), "Hello");
    }

    #[test]
    fn test_ref_text_and_number() {
        let fx = Fixture::new(&[("A1", "hello"), ("B1", "5")]);
        assert_eq!(fx.eval("REF(B1)"), "5");
        assert_eq!(fx.eval("B1 * 2"), "10");
        assert_eq!(fx.eval("REF(A1)"), "hello");
    }

    #[test]
    fn test_ref_to_formula_cell() {
        let fx = Fixture::new(&[("A1", "=5+5"), ("B1", "5")]);
        assert_eq!(fx.eval("REF(A1)"), "10");
        assert_eq!(fx.eval("REF(A1) + B1"), "15");
    }

    #[test]
    fn test_ref_range_is_row_major() {
        let fx = Fixture::new(&[("A1", "=5+5"), ("B1", "5"), ("A2", "x"), ("B2", "y")]);
        assert_eq!(fx.eval("REF(A1..B1)"), "10,5");
        assert_eq!(fx.eval("A1..B2"), "10,5,x,y");
    }

    #[test]
    fn test_sum() {
        let fx = Fixture::new(&[]);
        assert_eq!(fx.eval("SUM(1, 2, 3, 4, 5)"), "15");
        assert_eq!(fx.eval("SUM(\"a\", \"b\")"), "ab");
        assert_eq!(fx.eval("SUM()"), "");
        let mixed = fx.eval("SUM(\"str\", 5)");
        assert!(mixed.starts_with(ERROR_PREFIX));
        assert!(mixed.contains("SUM: cannot add string and number together"));
    }

    #[test]
    fn test_avg() {
        let fx = Fixture::new(&[("A1", "=5+5"), ("B1", "5")]);
        assert_eq!(fx.eval("AVG(6, 10)"), "8");
        assert_eq!(fx.eval("AVG(A1..B1)"), "7.5");
        assert_eq!(fx.eval("AVG(REF(A1..B1), 10)"), "8.333");
        let text = fx.eval("AVG(6, \"x\")");
        assert!(text.starts_with(ERROR_PREFIX));
        assert!(text.contains("AVG: operands to AVG must be number"));
    }

    #[test]
    fn test_sum_and_avg_take_many_operands() {
        let fx = Fixture::new(&[("A1", "100"), ("B1", "x")]);
        let operands: Vec<String> = (1..=20).map(|n| n.to_string()).collect();
        assert_eq!(fx.eval(&format!("SUM({})", operands.join(", "))), "210");
        assert_eq!(fx.eval(&format!("AVG({})", operands[..13].join(", "))), "7");
        assert_eq!(
            fx.eval(&format!("SUM({}, A1)", operands[..13].join(", "))),
            "191"
        );
        let text = fx.eval(&format!("SUM({}, B1)", operands[..13].join(", ")));
        assert!(text.contains("SUM: cannot add string and number together"));
    }

    #[test]
    fn test_string_concatenation_shows_display_numbers() {
        let fx = Fixture::new(&[("A1", "5"), ("B1", "x")]);
        assert_eq!(fx.eval("\"a\" + 1"), "a1");
        assert_eq!(fx.eval("\"Total: \" + A1"), "Total: 5");
        assert_eq!(fx.eval("A1 + B1"), "5x");
        assert_eq!(fx.eval("\"v\" + 1 / 4"), "v0.25");
        assert_eq!(fx.eval("A1 + 1"), "6");
    }

    #[test]
    fn test_multi_letter_columns() {
        let fx = Fixture::new(&[("AA1", "6"), ("AB1", "7")]);
        assert_eq!(fx.eval("AA1"), "6");
        assert_eq!(fx.eval("REF(AB1)"), "7");
        assert_eq!(fx.eval("SUM(AA1..AB1)"), "13");
    }

    #[test]
    fn test_sum_over_blank_cells() {
        let fx = Fixture::new(&[("A1", "1"), ("A3", "2")]);
        assert_eq!(fx.eval("SUM(A1..A3)"), "3");
        assert_eq!(fx.eval("AVG(A1..A3)"), "1.5");
    }

    #[test]
    fn test_errors_are_displayed() {
        let fx = Fixture::new(&[]);
        assert!(fx.eval("1 +").starts_with(ERROR_PREFIX));
        assert!(fx.eval("NOPE(1)").starts_with(ERROR_PREFIX));
        assert_eq!(fx.eval("#REF! * 2"), "Error: formula refers to a deleted cell");
    }

    #[test]
    fn test_referenced_ranges_drive_evaluation() {
        let ranges: Vec<String> = referenced_ranges("SUM(A1..B2) + C3")
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(ranges, vec!["A1..B2", "C3"]);
    }

    #[test]
    fn test_shift_then_evaluate() {
        let fx = Fixture::new(&[("A2", "4")]);
        let shifted = shift_formula_references("A1 * 2", ShiftOperation::InsertRow(0));
        assert_eq!(shifted, "A2 * 2");
        assert_eq!(fx.eval(&shifted), "8");
    }
}
