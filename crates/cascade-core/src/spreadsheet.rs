//! A workbook: ordered sheets plus the active-sheet pointer.

use cascade_engine::engine::FormulaEvaluator;
use std::sync::Arc;

use crate::config::SpreadsheetConfig;
use crate::error::{CascadeError, Result};
use crate::sheet::Sheet;

#[derive(Debug)]
pub struct Spreadsheet {
    sheets: Vec<Sheet>,
    active_sheet_index: usize,
    config: SpreadsheetConfig,
    /// Shared by every sheet created here.
    evaluator: Arc<FormulaEvaluator>,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Spreadsheet::new(SpreadsheetConfig::default())
    }
}

impl Spreadsheet {
    /// A spreadsheet holding one empty sheet named by the config.
    pub fn new(config: SpreadsheetConfig) -> Spreadsheet {
        let evaluator = Arc::new(FormulaEvaluator::with_max_range_cells(config.max_range_cells));
        let mut spreadsheet = Spreadsheet {
            sheets: Vec::new(),
            active_sheet_index: 0,
            config,
            evaluator,
        };
        let first = spreadsheet.create_sheet(&spreadsheet.config.first_sheet_name);
        spreadsheet.add_sheet(first);
        spreadsheet
    }

    pub fn config(&self) -> &SpreadsheetConfig {
        &self.config
    }

    /// A new empty sheet with the configured default size. It is not added.
    pub fn create_sheet(&self, name: &str) -> Sheet {
        Sheet::with_evaluator(
            name,
            self.config.default_sheet_width,
            self.config.default_sheet_height,
            self.evaluator.clone(),
        )
    }

    /// Append a sheet and return its index.
    pub fn add_sheet(&mut self, sheet: Sheet) -> usize {
        tracing::debug!(sheet = sheet.name(), "adding sheet");
        self.sheets.push(sheet);
        self.sheets.len() - 1
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Result<&Sheet> {
        let len = self.sheets.len();
        self.sheets
            .get(index)
            .ok_or(CascadeError::SheetIndexOutOfRange { index, len })
    }

    pub fn sheet_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        let len = self.sheets.len();
        self.sheets
            .get_mut(index)
            .ok_or(CascadeError::SheetIndexOutOfRange { index, len })
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    /// Remove the first sheet with this name.
    pub fn delete_sheet(&mut self, name: &str) -> Result<Sheet> {
        let index = self
            .sheets
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| CascadeError::UnknownSheet(name.to_string()))?;
        self.delete_sheet_by_index(index)
    }

    /// Remove a sheet. The active index keeps pointing at the same sheet when
    /// it survives, otherwise at its neighbour.
    pub fn delete_sheet_by_index(&mut self, index: usize) -> Result<Sheet> {
        self.check_index(index)?;
        let removed = self.sheets.remove(index);
        if index < self.active_sheet_index {
            self.active_sheet_index -= 1;
        }
        self.active_sheet_index = self
            .active_sheet_index
            .min(self.sheets.len().saturating_sub(1));
        tracing::debug!(sheet = removed.name(), index, "deleted sheet");
        Ok(removed)
    }

    /// Move the sheet at `from` to position `to` and return the new order.
    /// The active sheet stays active.
    pub fn reorder_sheets(&mut self, from: usize, to: usize) -> Result<&[Sheet]> {
        self.check_index(from)?;
        self.check_index(to)?;
        let active = self.active_sheet_index;
        let sheet = self.sheets.remove(from);
        self.sheets.insert(to, sheet);

        self.active_sheet_index = if active == from {
            to
        } else if from < active && active <= to {
            active - 1
        } else if to <= active && active < from {
            active + 1
        } else {
            active
        };
        tracing::debug!(from, to, "reordered sheets");
        Ok(&self.sheets)
    }

    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet_index
    }

    pub fn set_active_sheet_index(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.active_sheet_index = index;
        Ok(())
    }

    /// Fails only when every sheet has been deleted.
    pub fn active_sheet(&self) -> Result<&Sheet> {
        self.sheet(self.active_sheet_index)
    }

    pub fn active_sheet_mut(&mut self) -> Result<&mut Sheet> {
        self.sheet_mut(self.active_sheet_index)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(CascadeError::SheetIndexOutOfRange {
                index,
                len: self.sheets.len(),
            });
        }
        Ok(())
    }
}
