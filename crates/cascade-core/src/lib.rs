//! cascade-core - UI-agnostic cell, sheet and spreadsheet model.

pub mod chart;
pub mod config;
pub mod error;
pub mod sheet;
pub mod spreadsheet;

pub use chart::{Chart, ChartData, ChartKind};
pub use config::SpreadsheetConfig;
pub use error::{CascadeError, Result};
pub use sheet::{Cell, CellContent, CellHandle, CellListener, CellRangeView, ObserverId, Sheet};
pub use spreadsheet::Spreadsheet;

pub use cascade_engine::engine::{Coordinates, Range};
