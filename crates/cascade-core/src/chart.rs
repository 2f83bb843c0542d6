//! Chart descriptions attached to a sheet.
//!
//! A chart only records which ranges it plots; rendering is left to the
//! caller, which gets the series from [`crate::Sheet::chart_data`].

use cascade_engine::engine::Range;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CascadeError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    Bar,
    Line,
}

/// Immutable chart description. Both ranges are one row or one column and
/// hold the same number of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chart {
    id: Uuid,
    kind: ChartKind,
    x_range: Range,
    y_range: Range,
    title: String,
    x_label: String,
    y_label: String,
}

impl Chart {
    pub fn new(kind: ChartKind, x_range: Range, y_range: Range) -> Result<Chart> {
        for (axis, range) in [("x", x_range), ("y", y_range)] {
            if !range.is_one_dimensional() {
                return Err(CascadeError::InvalidChart(format!(
                    "{} range {} must be a single row or column",
                    axis, range
                )));
            }
        }
        if x_range.length() != y_range.length() {
            return Err(CascadeError::InvalidChart(format!(
                "x range {} and y range {} differ in length",
                x_range, y_range
            )));
        }
        Ok(Chart {
            id: Uuid::new_v4(),
            kind,
            x_range,
            y_range,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
        })
    }

    pub fn with_title(mut self, title: &str) -> Chart {
        self.title = title.to_string();
        self
    }

    pub fn with_axis_labels(mut self, x_label: &str, y_label: &str) -> Chart {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn x_range(&self) -> Range {
        self.x_range
    }

    pub fn y_range(&self) -> Range {
        self.y_range
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }
}

/// Values a renderer needs: one label and one optional number per point.
/// A y value is None when its cell does not display a number.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartData {
    pub x_labels: Vec<String>,
    pub y_values: Vec<Option<f64>>,
}

impl ChartData {
    pub fn points(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.x_labels
            .iter()
            .map(String::as_str)
            .zip(self.y_values.iter().copied())
    }
}
