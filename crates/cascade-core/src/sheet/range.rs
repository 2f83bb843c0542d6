//! Read-only rectangular views over a sheet.

use cascade_engine::engine::{Coordinates, Range};

use super::{Cell, Sheet};
use crate::error::Result;

/// A window onto part of a sheet. Nothing is copied; display values are
/// computed when asked for.
#[derive(Clone, Copy, Debug)]
pub struct CellRangeView<'a> {
    sheet: &'a Sheet,
    range: Range,
}

impl Sheet {
    /// View over `range`. Fails if the range extends past the grid.
    pub fn get_cell_range(&self, range: Range) -> Result<CellRangeView<'_>> {
        if !self.contains_range(&range) {
            return Err(self.out_of_bounds(range));
        }
        Ok(CellRangeView { sheet: self, range })
    }

    /// Smallest view anchored at `A1` that covers every non-empty cell.
    /// An empty sheet gives the 1x1 view of `A1`.
    pub fn get_cell_range_with_data(&self) -> CellRangeView<'_> {
        let mut bottom = 1;
        let mut right = 1;
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.is_empty() {
                    bottom = bottom.max(r + 1);
                    right = right.max(c + 1);
                }
            }
        }
        CellRangeView {
            sheet: self,
            range: Range::new(Coordinates::new(1, 1), Coordinates::new(bottom, right)),
        }
    }
}

impl<'a> CellRangeView<'a> {
    pub fn range(&self) -> Range {
        self.range
    }

    pub fn width(&self) -> usize {
        self.range.width()
    }

    pub fn height(&self) -> usize {
        self.range.height()
    }

    /// Cell at 0-based offsets from the view's top-left corner.
    pub fn get(&self, row_offset: usize, col_offset: usize) -> Option<&'a Cell> {
        if row_offset >= self.height() || col_offset >= self.width() {
            return None;
        }
        let top_left = self.range.top_left();
        self.sheet.cell(Coordinates::from_indices(
            top_left.row_index() + row_offset,
            top_left.col_index() + col_offset,
        ))
    }

    /// A narrower view. Fails unless `range` lies inside this view.
    pub fn sub_range(&self, range: Range) -> Result<CellRangeView<'a>> {
        if !self.range.contains(range.top_left()) || !self.range.contains(range.bottom_right()) {
            return Err(self.sheet.out_of_bounds(range));
        }
        Ok(CellRangeView {
            sheet: self.sheet,
            range,
        })
    }

    /// Cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinates, &'a Cell)> + 'a {
        let sheet = self.sheet;
        self.range
            .cells()
            .filter_map(move |c| sheet.cell(c).map(|cell| (c, cell)))
    }

    pub fn rows(&self) -> Vec<Vec<&'a Cell>> {
        let top = self.range.top_left().row();
        let bottom = self.range.bottom_right().row();
        (top..=bottom)
            .map(|row| {
                self.iter()
                    .filter(|(c, _)| c.row() == row)
                    .map(|(_, cell)| cell)
                    .collect()
            })
            .collect()
    }

    /// Display values in row-major order.
    pub fn display_values(&self) -> Vec<String> {
        self.range
            .cells()
            .map(|c| self.sheet.display_guarded(c, &mut Vec::new()))
            .collect()
    }

    /// Display values as a grid, one inner vector per row.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        let width = self.width().max(1);
        self.display_values()
            .chunks(width)
            .map(<[String]>::to_vec)
            .collect()
    }

    pub fn raw_rows(&self) -> Vec<Vec<String>> {
        self.rows()
            .into_iter()
            .map(|row| row.into_iter().map(Cell::raw_content).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CascadeError;

    fn at(name: &str) -> Coordinates {
        Coordinates::parse(name).unwrap()
    }

    #[test]
    fn test_get_cell_range_bounds() {
        let sheet = Sheet::new("s", 3, 3);
        let view = sheet.get_cell_range(Range::parse("B2..C3").unwrap()).unwrap();
        assert_eq!((view.width(), view.height()), (2, 2));
        assert!(matches!(
            sheet.get_cell_range(Range::parse("B2..D3").unwrap()),
            Err(CascadeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_sub_range_must_fit() {
        let sheet = Sheet::new("s", 4, 4);
        let view = sheet.get_cell_range(Range::parse("A1..C3").unwrap()).unwrap();
        let inner = view.sub_range(Range::parse("B2..C3").unwrap()).unwrap();
        assert_eq!(inner.range().to_string(), "B2..C3");
        assert!(view.sub_range(Range::parse("B2..D4").unwrap()).is_err());
        assert!(inner.sub_range(Range::parse("A1").unwrap()).is_err());
    }

    #[test]
    fn test_offsets_and_rows() {
        let mut sheet = Sheet::new("s", 3, 3);
        sheet.set_content(at("B2"), "x").unwrap();
        sheet.set_content(at("C3"), "=B2").unwrap();
        let view = sheet.get_cell_range(Range::parse("B2..C3").unwrap()).unwrap();
        assert_eq!(view.get(0, 0).unwrap().raw_content(), "x");
        assert_eq!(view.get(1, 1).unwrap().raw_content(), "=B2");
        assert!(view.get(2, 0).is_none());
        assert_eq!(view.raw_rows(), vec![vec!["x", ""], vec!["", "=B2"]]);
        assert_eq!(view.display_rows(), vec![vec!["x", ""], vec!["", "x"]]);
        assert_eq!(view.iter().count(), 4);
    }

    #[test]
    fn test_range_with_data_on_empty_sheet() {
        let sheet = Sheet::new("s", 10, 10);
        let view = sheet.get_cell_range_with_data();
        assert_eq!((view.width(), view.height()), (1, 1));
        assert_eq!(view.range().to_string(), "A1");
    }

    #[test]
    fn test_range_with_data_covers_content() {
        let mut sheet = Sheet::new("s", 10, 10);
        sheet.set_content(Coordinates::from_indices(3, 5), "data").unwrap();
        let view = sheet.get_cell_range_with_data();
        assert_eq!((view.height(), view.width()), (4, 6));
        assert_eq!(view.range().top_left(), Coordinates::new(1, 1));

        sheet.clear_contents(Coordinates::from_indices(3, 5)).unwrap();
        assert_eq!(sheet.get_cell_range_with_data().width(), 1);
    }
}
