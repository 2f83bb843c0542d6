//! Spreadsheet configuration.

use cascade_engine::engine::DEFAULT_MAX_RANGE_CELLS;
use serde::{Deserialize, Serialize};

/// Settings applied when a spreadsheet and its sheets are created.
/// Missing fields in a config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadsheetConfig {
    pub default_sheet_width: usize,
    pub default_sheet_height: usize,
    pub first_sheet_name: String,
    /// Ranges with more cells than this fail evaluation.
    pub max_range_cells: usize,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            default_sheet_width: 52,
            default_sheet_height: 100,
            first_sheet_name: "Sheet1".to_string(),
            max_range_cells: DEFAULT_MAX_RANGE_CELLS,
        }
    }
}
