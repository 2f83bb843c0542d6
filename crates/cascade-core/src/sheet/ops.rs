use std::collections::{HashSet, VecDeque};

use cascade_engine::engine::{Coordinates, FormulaError, Range, ShiftOperation};

use super::Sheet;
use super::cell::{CellContent, ObserverId, ObserverKey};
use crate::error::{CascadeError, Result};

/// Dimension for row/column operations
#[derive(Copy, Clone, Debug)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    fn extent(self, sheet: &Sheet) -> usize {
        match self {
            Dimension::Row => sheet.height,
            Dimension::Column => sheet.width,
        }
    }

    fn label(self, index: usize) -> String {
        match self {
            Dimension::Row => format!("row {}", index + 1),
            Dimension::Column => format!("column {}", index + 1),
        }
    }

    fn insert_op(self, at: usize) -> ShiftOperation {
        match self {
            Dimension::Row => ShiftOperation::InsertRow(at),
            Dimension::Column => ShiftOperation::InsertColumn(at),
        }
    }

    fn delete_op(self, at: usize) -> ShiftOperation {
        match self {
            Dimension::Row => ShiftOperation::DeleteRow(at),
            Dimension::Column => ShiftOperation::DeleteColumn(at),
        }
    }
}

impl Sheet {
    pub fn raw_content(&self, coords: Coordinates) -> Result<String> {
        Ok(self.cell_at(coords)?.raw_content())
    }

    /// Display value of a cell. Formulas are evaluated on every call.
    pub fn display_content(&self, coords: Coordinates) -> Result<String> {
        self.cell_at(coords)?;
        Ok(self.display_guarded(coords, &mut Vec::new()))
    }

    /// Evaluate a cell while tracking the formulas being evaluated, so a
    /// reference loop ends in an error value instead of recursing.
    pub(crate) fn display_guarded(&self, coords: Coordinates, visiting: &mut Vec<Coordinates>) -> String {
        let Some(cell) = self.cell(coords) else {
            return String::new();
        };
        if matches!(cell.content(), CellContent::Text(_)) {
            return cell.raw_content();
        }
        visiting.push(coords);
        let display = cell
            .content()
            .display_value(&self.evaluator, |dep| self.resolve_display(dep, visiting));
        visiting.pop();
        display
    }

    fn resolve_display(
        &self,
        dep: Coordinates,
        visiting: &mut Vec<Coordinates>,
    ) -> std::result::Result<String, FormulaError> {
        if visiting.contains(&dep) {
            return Err(FormulaError::CircularReference(dep));
        }
        if !self.contains(dep) {
            return Err(FormulaError::Reference(format!("{} is outside the sheet", dep)));
        }
        Ok(self.display_guarded(dep, visiting))
    }

    /// Evaluate formula text as if it were stored in a cell of this sheet,
    /// without storing it.
    pub fn evaluate(&self, raw: &str) -> String {
        CellContent::parse(raw).display_value(&self.evaluator, |dep| {
            self.resolve_display(dep, &mut Vec::new())
        })
    }

    /// Replace a cell's content, rewire its dependencies and propagate the
    /// new value to everything observing it.
    ///
    /// Fails without changing anything if the new content references cells
    /// outside the grid or would make the cell depend on itself.
    pub fn set_content(&mut self, coords: Coordinates, raw: &str) -> Result<()> {
        self.cell_at(coords)?;
        let content = CellContent::parse(raw);
        let new_refs = content.referenced_ranges();

        if let Some(range) = new_refs.iter().find(|r| !self.contains_range(r)) {
            tracing::warn!(sheet = %self.name, cell = %coords, range = %range, "rejected edit: reference outside grid");
            return Err(self.out_of_bounds(range));
        }
        if self.creates_cycle(coords, &new_refs) {
            tracing::warn!(sheet = %self.name, cell = %coords, raw, "rejected edit: circular reference");
            return Err(CascadeError::CircularReference { cell: coords });
        }

        let old_refs = self.cell_at(coords)?.content().referenced_ranges();
        self.unlink(coords, &old_refs);
        if let Some(cell) = self.cell_mut(coords) {
            cell.replace_content(content);
        }
        self.link(coords, &new_refs);

        tracing::debug!(sheet = %self.name, cell = %coords, raw, "cell content set");
        self.broadcast(coords, &mut Vec::new());
        Ok(())
    }

    pub fn clear_contents(&mut self, coords: Coordinates) -> Result<()> {
        self.set_content(coords, "")
    }

    pub fn attach_observer(
        &mut self,
        coords: Coordinates,
        listener: impl FnMut(&str) + Send + 'static,
    ) -> Result<ObserverId> {
        let missing = self.out_of_bounds(coords);
        let cell = self.cell_mut(coords).ok_or(missing)?;
        Ok(cell.attach_observer(listener))
    }

    pub fn detach_observer(&mut self, coords: Coordinates, id: ObserverId) -> Result<bool> {
        let missing = self.out_of_bounds(coords);
        let cell = self.cell_mut(coords).ok_or(missing)?;
        Ok(cell.detach_observer(id))
    }

    /// Mutable access to one cell through the sheet.
    pub fn cell_mut_handle(&mut self, coords: Coordinates) -> Result<CellHandle<'_>> {
        self.cell_at(coords)?;
        Ok(CellHandle {
            sheet: self,
            coords,
        })
    }

    /// Breadth-first walk from the cells `refs` covers, following each
    /// visited cell's stored references. A cycle exists iff `start` is reached.
    fn creates_cycle(&self, start: Coordinates, refs: &[Range]) -> bool {
        let mut queue: VecDeque<Coordinates> =
            refs.iter().flat_map(|r| self.cells_in(r)).collect();
        let mut visited = HashSet::new();

        while let Some(coords) = queue.pop_front() {
            if coords == start {
                return true;
            }
            if !visited.insert(coords) {
                continue;
            }
            if let Some(cell) = self.cell(coords) {
                for range in cell.content().referenced_ranges() {
                    queue.extend(self.cells_in(&range));
                }
            }
        }
        false
    }

    fn link(&mut self, observer: Coordinates, refs: &[Range]) {
        let deps: Vec<Coordinates> = refs.iter().flat_map(|r| self.cells_in(r)).collect();
        for dep in deps {
            if let Some(cell) = self.cell_mut(dep) {
                cell.add_cell_observer(observer);
            }
        }
    }

    fn unlink(&mut self, observer: Coordinates, refs: &[Range]) {
        let deps: Vec<Coordinates> = refs.iter().flat_map(|r| self.cells_in(r)).collect();
        for dep in deps {
            if let Some(cell) = self.cell_mut(dep) {
                cell.remove_cell_observer(observer);
            }
        }
    }

    /// Notify every observer of `source`, in registration order, with its
    /// current display value. Cell observers recompute and notify their own
    /// observers depth-first. A cell already on `path` is not re-entered.
    fn broadcast(&mut self, source: Coordinates, path: &mut Vec<Coordinates>) {
        let Some(cell) = self.cell(source) else {
            return;
        };
        let keys = cell.observer_keys();
        if keys.is_empty() {
            return;
        }
        let display = self.display_guarded(source, &mut Vec::new());

        path.push(source);
        for key in keys {
            match key {
                ObserverKey::Listener(id) => {
                    if let Some(cell) = self.cell_mut(source) {
                        cell.notify_listener(id, &display);
                    }
                }
                ObserverKey::Cell(observer) => {
                    if path.contains(&observer) {
                        tracing::warn!(sheet = %self.name, from = %source, to = %observer, "propagation loop cut short");
                        continue;
                    }
                    tracing::trace!(sheet = %self.name, from = %source, to = %observer, "propagating update");
                    self.broadcast(observer, path);
                }
            }
        }
        path.pop();
    }

    /// Insert an empty row before 0-based `index` (`index == height` appends).
    pub fn add_row(&mut self, index: usize) -> Result<()> {
        self.insert_dimension(Dimension::Row, index)
    }

    pub fn add_column(&mut self, index: usize) -> Result<()> {
        self.insert_dimension(Dimension::Column, index)
    }

    /// Remove 0-based row `index` and its cells, listeners included.
    pub fn delete_row(&mut self, index: usize) -> Result<()> {
        self.delete_dimension(Dimension::Row, index)
    }

    pub fn delete_column(&mut self, index: usize) -> Result<()> {
        self.delete_dimension(Dimension::Column, index)
    }

    fn insert_dimension(&mut self, dim: Dimension, at: usize) -> Result<()> {
        if at > dim.extent(self) {
            return Err(self.out_of_bounds(dim.label(at)));
        }
        match dim {
            Dimension::Row => {
                let row = (0..self.width).map(|_| super::Cell::empty()).collect();
                self.cells.insert(at, row);
                self.height += 1;
            }
            Dimension::Column => {
                for row in &mut self.cells {
                    row.insert(at, super::Cell::empty());
                }
                self.width += 1;
            }
        }
        tracing::debug!(sheet = %self.name, ?dim, at, "inserted line");
        self.apply_shift(dim.insert_op(at));
        Ok(())
    }

    fn delete_dimension(&mut self, dim: Dimension, at: usize) -> Result<()> {
        if at >= dim.extent(self) {
            return Err(self.out_of_bounds(dim.label(at)));
        }
        match dim {
            Dimension::Row => {
                self.cells.remove(at);
                self.height -= 1;
            }
            Dimension::Column => {
                for row in &mut self.cells {
                    row.remove(at);
                }
                self.width -= 1;
            }
        }
        tracing::debug!(sheet = %self.name, ?dim, at, "deleted line");
        self.apply_shift(dim.delete_op(at));
        Ok(())
    }

    /// Rewrite every formula for a structural edit and rebuild observer
    /// links. No cycle check and no propagation.
    fn apply_shift(&mut self, op: ShiftOperation) {
        for row in &mut self.cells {
            for cell in row {
                let shifted = cell.content().shifted(op);
                cell.replace_content(shifted);
            }
        }
        self.rebuild_observers();

        if self.active_cell.is_some_and(|c| !self.contains(c)) {
            self.active_cell = None;
        }
        if self.highlighted_range.is_some_and(|r| !self.contains_range(&r)) {
            self.highlighted_range = None;
        }
    }
}

/// A cell borrowed through its sheet, so edits keep the sheet's observer
/// links consistent.
pub struct CellHandle<'a> {
    sheet: &'a mut Sheet,
    coords: Coordinates,
}

impl CellHandle<'_> {
    pub fn coords(&self) -> Coordinates {
        self.coords
    }

    pub fn raw_content(&self) -> String {
        self.sheet
            .cell(self.coords)
            .map(|c| c.raw_content())
            .unwrap_or_default()
    }

    pub fn display_content(&self) -> String {
        self.sheet.display_guarded(self.coords, &mut Vec::new())
    }

    pub fn set_content(&mut self, raw: &str) -> Result<()> {
        self.sheet.set_content(self.coords, raw)
    }

    pub fn clear_contents(&mut self) -> Result<()> {
        self.sheet.clear_contents(self.coords)
    }

    pub fn attach_observer(&mut self, listener: impl FnMut(&str) + Send + 'static) -> Result<ObserverId> {
        self.sheet.attach_observer(self.coords, listener)
    }

    pub fn detach_observer(&mut self, id: ObserverId) -> Result<bool> {
        self.sheet.detach_observer(self.coords, id)
    }
}
