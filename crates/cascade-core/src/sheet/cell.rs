//! Cells and their content.
//!
//! A [`Cell`] holds one [`CellContent`] and the ordered list of everything
//! observing it: other cells (by coordinates in the owning sheet) and
//! external listeners. Content is replaced wholesale on every edit.

use cascade_engine::engine::{
    Coordinates, FormulaError, FormulaEvaluator, Range, ShiftOperation, format_outcome,
    referenced_ranges, shift_formula_references,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CascadeError, Result};

/// Parsed raw text of a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    /// Formula text without the leading `=`.
    Formula(String),
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Text(String::new())
    }
}

impl CellContent {
    /// A leading `=` makes a formula; anything else is stored verbatim.
    pub fn parse(raw: &str) -> CellContent {
        match raw.strip_prefix('=') {
            Some(formula) => CellContent::Formula(formula.to_string()),
            None => CellContent::Text(raw.to_string()),
        }
    }

    pub fn raw_value(&self) -> String {
        match self {
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format!("={}", formula),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Text(text) if text.is_empty())
    }

    pub fn referenced_ranges(&self) -> Vec<Range> {
        match self {
            CellContent::Text(_) => Vec::new(),
            CellContent::Formula(formula) => referenced_ranges(formula),
        }
    }

    /// Display value, reading referenced cells through `resolve`.
    pub fn display_value<F>(&self, evaluator: &FormulaEvaluator, resolve: F) -> String
    where
        F: FnMut(Coordinates) -> std::result::Result<String, FormulaError>,
    {
        match self {
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format_outcome(evaluator.evaluate(formula, resolve)),
        }
    }

    /// Content after a row/column insert or delete. Text is unaffected.
    pub fn shifted(&self, op: ShiftOperation) -> CellContent {
        match self {
            CellContent::Text(_) => self.clone(),
            CellContent::Formula(formula) => {
                CellContent::Formula(shift_formula_references(formula, op))
            }
        }
    }
}

/// Identifies one listener registration on a cell.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    fn next() -> ObserverId {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ObserverId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// External subscriber, called with the cell's new display value.
pub type CellListener = Box<dyn FnMut(&str) + Send>;

pub(crate) enum Observer {
    /// A cell of the same sheet whose formula references this cell.
    Cell(Coordinates),
    Listener(ObserverId, CellListener),
}

/// What a notification pass visits, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ObserverKey {
    Cell(Coordinates),
    Listener(ObserverId),
}

#[derive(Default)]
pub struct Cell {
    content: CellContent,
    observers: Vec<Observer>,
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("content", &self.content)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Cell {
    /// A detached cell. Fails if `raw` references other cells, since there
    /// is no sheet to resolve them against.
    pub fn new(raw: &str) -> Result<Cell> {
        Ok(Cell {
            content: detached_content(raw)?,
            observers: Vec::new(),
        })
    }

    pub fn empty() -> Cell {
        Cell::default()
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn raw_content(&self) -> String {
        self.content.raw_value()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replace the content of a detached cell and notify its listeners.
    pub fn set_content(&mut self, raw: &str, evaluator: &FormulaEvaluator) -> Result<()> {
        self.content = detached_content(raw)?;
        let display = self.display_content(evaluator);
        for observer in &mut self.observers {
            if let Observer::Listener(_, listener) = observer {
                listener(&display);
            }
        }
        Ok(())
    }

    pub fn clear_contents(&mut self, evaluator: &FormulaEvaluator) -> Result<()> {
        self.set_content("", evaluator)
    }

    /// Display value of a detached cell.
    pub fn display_content(&self, evaluator: &FormulaEvaluator) -> String {
        match &self.content {
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format_outcome(evaluator.evaluate_detached(formula)),
        }
    }

    pub fn attach_observer(&mut self, listener: impl FnMut(&str) + Send + 'static) -> ObserverId {
        let id = ObserverId::next();
        self.observers.push(Observer::Listener(id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if `id` is not registered here.
    pub fn detach_observer(&mut self, id: ObserverId) -> bool {
        let position = self
            .observers
            .iter()
            .position(|o| matches!(o, Observer::Listener(existing, _) if *existing == id));
        match position {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Cells observing this one, in registration order. A cell appears once
    /// per reference it holds.
    pub fn observing_cells(&self) -> impl Iterator<Item = Coordinates> + '_ {
        self.observers.iter().filter_map(|o| match o {
            Observer::Cell(coords) => Some(*coords),
            Observer::Listener(..) => None,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.observers
            .iter()
            .filter(|o| matches!(o, Observer::Listener(..)))
            .count()
    }

    pub(crate) fn replace_content(&mut self, content: CellContent) -> CellContent {
        std::mem::replace(&mut self.content, content)
    }

    pub(crate) fn add_cell_observer(&mut self, coords: Coordinates) {
        self.observers.push(Observer::Cell(coords));
    }

    /// Remove one registration of `coords`.
    pub(crate) fn remove_cell_observer(&mut self, coords: Coordinates) {
        if let Some(index) = self
            .observers
            .iter()
            .position(|o| matches!(o, Observer::Cell(existing) if *existing == coords))
        {
            self.observers.remove(index);
        }
    }

    pub(crate) fn clear_cell_observers(&mut self) {
        self.observers.retain(|o| matches!(o, Observer::Listener(..)));
    }

    pub(crate) fn observer_keys(&self) -> Vec<ObserverKey> {
        self.observers
            .iter()
            .map(|o| match o {
                Observer::Cell(coords) => ObserverKey::Cell(*coords),
                Observer::Listener(id, _) => ObserverKey::Listener(*id),
            })
            .collect()
    }

    /// Call one listener. Returns false if it was detached meanwhile.
    pub(crate) fn notify_listener(&mut self, id: ObserverId, display: &str) -> bool {
        for observer in &mut self.observers {
            match observer {
                Observer::Listener(existing, listener) if *existing == id => {
                    listener(display);
                    return true;
                }
                _ => {}
            }
        }
        false
    }
}

fn detached_content(raw: &str) -> Result<CellContent> {
    let content = CellContent::parse(raw);
    if content.referenced_ranges().is_empty() {
        Ok(content)
    } else {
        Err(CascadeError::UnresolvedSheet {
            raw: raw.to_string(),
        })
    }
}
