//! Sheets: a named, row-major grid of cells plus its charts.
//!
//! Cells never hold pointers to each other. A formula's dependencies are
//! looked up by coordinates in the grid, and each cell records the
//! coordinates of the cells observing it.

mod cell;
mod ops;
mod range;

pub use cell::{Cell, CellContent, CellListener, ObserverId};
pub use ops::CellHandle;
pub use range::CellRangeView;

use cascade_engine::engine::{Coordinates, FormulaEvaluator, Range};
use std::sync::Arc;
use uuid::Uuid;

use crate::chart::{Chart, ChartData};
use crate::error::{CascadeError, Result};

pub struct Sheet {
    name: String,
    /// `cells[row_index][col_index]`; every row has `width` cells.
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
    charts: Vec<Chart>,
    active_cell: Option<Coordinates>,
    highlighted_range: Option<Range>,
    evaluator: Arc<FormulaEvaluator>,
}

impl std::fmt::Debug for Sheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sheet")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("charts", &self.charts.len())
            .finish()
    }
}

impl Sheet {
    /// An empty `width` x `height` sheet with its own evaluator.
    pub fn new(name: &str, width: usize, height: usize) -> Sheet {
        Sheet::with_evaluator(name, width, height, Arc::new(FormulaEvaluator::new()))
    }

    pub fn with_evaluator(
        name: &str,
        width: usize,
        height: usize,
        evaluator: Arc<FormulaEvaluator>,
    ) -> Sheet {
        let cells = (0..height)
            .map(|_| (0..width).map(|_| Cell::empty()).collect())
            .collect();
        Sheet {
            name: name.to_string(),
            cells,
            width,
            height,
            charts: Vec::new(),
            active_cell: None,
            highlighted_range: None,
            evaluator,
        }
    }

    /// Adopt detached cells. Short rows are padded with empty cells up to the
    /// longest row.
    pub fn from_cells(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();
        let cells = rows
            .into_iter()
            .map(|mut row| {
                row.resize_with(width, Cell::empty);
                row
            })
            .collect();
        let mut sheet = Sheet {
            name: name.to_string(),
            cells,
            width,
            height,
            charts: Vec::new(),
            active_cell: None,
            highlighted_range: None,
            evaluator: Arc::new(FormulaEvaluator::new()),
        };
        sheet.rebuild_observers();
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uniqueness among sibling sheets is up to the caller.
    pub fn rename(&mut self, name: &str) {
        tracing::debug!(from = %self.name, to = name, "renaming sheet");
        self.name = name.to_string();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn evaluator(&self) -> &FormulaEvaluator {
        &self.evaluator
    }

    /// The whole grid as a range, or None for a sheet without cells.
    pub fn bounds(&self) -> Option<Range> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(Range::new(
            Coordinates::new(1, 1),
            Coordinates::new(self.height, self.width),
        ))
    }

    pub fn contains(&self, coords: Coordinates) -> bool {
        coords.row() <= self.height && coords.col() <= self.width
    }

    pub fn contains_range(&self, range: &Range) -> bool {
        self.contains(range.bottom_right())
    }

    pub(crate) fn out_of_bounds(&self, target: impl ToString) -> CascadeError {
        CascadeError::OutOfBounds {
            target: target.to_string(),
            width: self.width,
            height: self.height,
        }
    }

    pub(crate) fn cell(&self, coords: Coordinates) -> Option<&Cell> {
        self.cells.get(coords.row_index())?.get(coords.col_index())
    }

    pub(crate) fn cell_mut(&mut self, coords: Coordinates) -> Option<&mut Cell> {
        self.cells.get_mut(coords.row_index())?.get_mut(coords.col_index())
    }

    /// Fails if either axis exceeds the grid.
    pub fn cell_at(&self, coords: Coordinates) -> Result<&Cell> {
        self.cell(coords).ok_or_else(|| self.out_of_bounds(coords))
    }

    /// Cells of a range in row-major order, skipping any outside the grid.
    pub(crate) fn cells_in(&self, range: &Range) -> impl Iterator<Item = Coordinates> + use<> {
        let (height, width) = (self.height, self.width);
        range
            .cells()
            .filter(move |c| c.row() <= height && c.col() <= width)
    }

    pub fn active_cell(&self) -> Option<Coordinates> {
        self.active_cell
    }

    pub fn set_active_cell(&mut self, coords: Option<Coordinates>) -> Result<()> {
        if let Some(c) = coords
            && !self.contains(c)
        {
            return Err(self.out_of_bounds(c));
        }
        self.active_cell = coords;
        Ok(())
    }

    pub fn highlighted_range(&self) -> Option<Range> {
        self.highlighted_range
    }

    pub fn set_highlighted_range(&mut self, range: Option<Range>) -> Result<()> {
        if let Some(r) = range
            && !self.contains_range(&r)
        {
            return Err(self.out_of_bounds(r));
        }
        self.highlighted_range = range;
        Ok(())
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn add_chart(&mut self, chart: Chart) {
        tracing::debug!(sheet = %self.name, chart = %chart.id(), "adding chart");
        self.charts.push(chart);
    }

    /// Remove the chart with this id, if present.
    pub fn delete_chart(&mut self, id: Uuid) -> Option<Chart> {
        let index = self.charts.iter().position(|c| c.id() == id)?;
        Some(self.charts.remove(index))
    }

    pub fn delete_chart_by_index(&mut self, index: usize) -> Result<Chart> {
        if index >= self.charts.len() {
            return Err(CascadeError::ChartIndexOutOfRange {
                index,
                len: self.charts.len(),
            });
        }
        Ok(self.charts.remove(index))
    }

    /// Series for rendering `chart` from this sheet's current values.
    pub fn chart_data(&self, chart: &Chart) -> Result<ChartData> {
        let x_labels = self.get_cell_range(chart.x_range())?.display_values();
        let y_values = self
            .get_cell_range(chart.y_range())?
            .display_values()
            .iter()
            .map(|v| cascade_engine::engine::parse_number(v))
            .collect();
        Ok(ChartData { x_labels, y_values })
    }

    /// Re-derive every cell-to-cell observer link from current contents.
    /// Listeners are kept.
    pub(crate) fn rebuild_observers(&mut self) {
        for row in &mut self.cells {
            for cell in row {
                cell.clear_cell_observers();
            }
        }
        let mut links = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let observer = Coordinates::from_indices(r, c);
                for range in cell.content().referenced_ranges() {
                    links.extend(self.cells_in(&range).map(|dep| (dep, observer)));
                }
            }
        }
        for (dep, observer) in links {
            if let Some(cell) = self.cell_mut(dep) {
                cell.add_cell_observer(observer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sheet_dimensions() {
        let sheet = Sheet::new("Sheet1", 3, 2);
        assert_eq!((sheet.width(), sheet.height()), (3, 2));
        assert!(sheet.cell_at(Coordinates::new(2, 3)).is_ok());
        assert!(matches!(
            sheet.cell_at(Coordinates::new(3, 1)),
            Err(CascadeError::OutOfBounds { .. })
        ));
        assert!(sheet.cell_at(Coordinates::new(1, 4)).is_err());
    }

    #[test]
    fn test_from_cells_pads_rows() {
        let rows = vec![
            vec![Cell::new("a").unwrap()],
            vec![Cell::new("b").unwrap(), Cell::new("c").unwrap()],
        ];
        let sheet = Sheet::from_cells("data", rows);
        assert_eq!((sheet.width(), sheet.height()), (2, 2));
        assert_eq!(sheet.cell_at(Coordinates::new(1, 2)).unwrap().raw_content(), "");
        assert_eq!(sheet.cell_at(Coordinates::new(2, 2)).unwrap().raw_content(), "c");
    }

    #[test]
    fn test_rename() {
        let mut sheet = Sheet::new("old", 1, 1);
        sheet.rename("new");
        assert_eq!(sheet.name(), "new");
    }

    #[test]
    fn test_active_cell_and_highlight() {
        let mut sheet = Sheet::new("s", 2, 2);
        sheet.set_active_cell(Some(Coordinates::new(2, 2))).unwrap();
        assert_eq!(sheet.active_cell(), Some(Coordinates::new(2, 2)));
        assert!(sheet.set_active_cell(Some(Coordinates::new(3, 1))).is_err());
        assert_eq!(sheet.active_cell(), Some(Coordinates::new(2, 2)));

        let range = Range::parse("A1..B2").unwrap();
        sheet.set_highlighted_range(Some(range)).unwrap();
        assert_eq!(sheet.highlighted_range(), Some(range));
        assert!(sheet.set_highlighted_range(Range::parse("A1..C1")).is_err());
        sheet.set_highlighted_range(None).unwrap();
        assert_eq!(sheet.highlighted_range(), None);
    }

    #[test]
    fn test_zero_sized_sheet() {
        let sheet = Sheet::new("empty", 0, 0);
        assert_eq!(sheet.bounds(), None);
        assert!(sheet.cell_at(Coordinates::new(1, 1)).is_err());
    }
}
