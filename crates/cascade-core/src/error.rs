//! Error types for Cascade core.
//!
//! Formula evaluation failures are not here: they stay inside the cell and
//! show up as its display value.

use cascade_engine::engine::Coordinates;
use thiserror::Error;

/// Hard failures of sheet and spreadsheet operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CascadeError {
    /// The edit was rejected and the cell keeps its previous content.
    #[error("circular reference: {cell} would depend on itself")]
    CircularReference { cell: Coordinates },

    #[error("cannot resolve the references in `{raw}` without an owning sheet")]
    UnresolvedSheet { raw: String },

    #[error("{target} is outside the {width}x{height} grid")]
    OutOfBounds {
        target: String,
        width: usize,
        height: usize,
    },

    #[error("sheet index {index} out of range ({len} sheets)")]
    SheetIndexOutOfRange { index: usize, len: usize },

    #[error("chart index {index} out of range ({len} charts)")]
    ChartIndexOutOfRange { index: usize, len: usize },

    #[error("invalid chart: {0}")]
    InvalidChart(String),

    #[error("no sheet named {0}")]
    UnknownSheet(String),
}

pub type Result<T> = std::result::Result<T, CascadeError>;
