//! Cell coordinates, rectangular ranges and A1 notation.
//!
//! Coordinates are 1-indexed (`A1` is row 1, column 1). Column letters use
//! bijective base-26 numbering over 0-based indices: 0 -> `A`, 25 -> `Z`,
//! 26 -> `AA`.
//!
//! # Examples
//!
//! ```ignore
//! let b3 = Coordinates::parse("b3").unwrap();
//! assert_eq!((b3.row(), b3.col()), (3, 2));
//! assert_eq!(b3.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Separator between the two corners of a range in formula text.
pub const RANGE_SEPARATOR: &str = "..";

/// Row and column of a cell, both 1-indexed.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Coordinates {
    row: usize,
    col: usize,
}

impl Coordinates {
    /// Both `row` and `col` must be at least 1.
    pub fn new(row: usize, col: usize) -> Coordinates {
        debug_assert!(row >= 1 && col >= 1, "coordinates are 1-indexed");
        Coordinates { row, col }
    }

    /// Build coordinates from 0-based grid indices.
    pub fn from_indices(row_index: usize, col_index: usize) -> Coordinates {
        Coordinates::new(row_index + 1, col_index + 1)
    }

    /// Like [`Coordinates::from_indices`], but None when an index is
    /// `usize::MAX`.
    pub fn checked_from_indices(row_index: usize, col_index: usize) -> Option<Coordinates> {
        Some(Coordinates::new(row_index.checked_add(1)?, col_index.checked_add(1)?))
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row_index(&self) -> usize {
        self.row - 1
    }

    pub fn col_index(&self) -> usize {
        self.col - 1
    }

    /// Parse A1 notation (case-insensitive). Returns None if the input is
    /// not a single cell token or the row is 0.
    pub fn parse(name: &str) -> Option<Coordinates> {
        let caps = a1_re().captures(name.trim())?;
        let col_index = letters_to_index(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?;
        if row == 0 {
            return None;
        }
        Some(Coordinates::new(row, col_index.checked_add(1)?))
    }
}

impl std::str::FromStr for Coordinates {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", index_to_letters(self.col_index()), self.row)
    }
}

/// Inclusive rectangle of cells. Never empty: both corners are part of it.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Range {
    top_left: Coordinates,
    bottom_right: Coordinates,
}

impl Range {
    /// Callers guarantee `top_left` is above and left of `bottom_right`.
    pub fn new(top_left: Coordinates, bottom_right: Coordinates) -> Range {
        Range {
            top_left,
            bottom_right,
        }
    }

    pub fn cell(coords: Coordinates) -> Range {
        Range::new(coords, coords)
    }

    /// Range covering both corners regardless of the order they are given in.
    pub fn spanning(a: Coordinates, b: Coordinates) -> Range {
        Range::new(
            Coordinates::new(a.row.min(b.row), a.col.min(b.col)),
            Coordinates::new(a.row.max(b.row), a.col.max(b.col)),
        )
    }

    /// Parse `A1` or `A1..B2`.
    pub fn parse(text: &str) -> Option<Range> {
        match text.split_once(RANGE_SEPARATOR) {
            Some((start, end)) => Some(Range::spanning(
                Coordinates::parse(start)?,
                Coordinates::parse(end)?,
            )),
            None => Coordinates::parse(text).map(Range::cell),
        }
    }

    pub fn top_left(&self) -> Coordinates {
        self.top_left
    }

    pub fn bottom_right(&self) -> Coordinates {
        self.bottom_right
    }

    pub fn width(&self) -> usize {
        self.bottom_right.col - self.top_left.col + 1
    }

    pub fn height(&self) -> usize {
        self.bottom_right.row - self.top_left.row + 1
    }

    /// Number of cells, or None if it does not fit in `usize`.
    pub fn cell_count(&self) -> Option<usize> {
        self.width().checked_mul(self.height())
    }

    pub fn is_single_cell(&self) -> bool {
        self.top_left == self.bottom_right
    }

    /// True when the range lies within one row or one column.
    pub fn is_one_dimensional(&self) -> bool {
        self.top_left.row == self.bottom_right.row || self.top_left.col == self.bottom_right.col
    }

    /// Number of cells along the range's long axis.
    pub fn length(&self) -> usize {
        self.width().max(self.height())
    }

    pub fn contains(&self, coords: Coordinates) -> bool {
        (self.top_left.row..=self.bottom_right.row).contains(&coords.row)
            && (self.top_left.col..=self.bottom_right.col).contains(&coords.col)
    }

    /// Every cell of the range in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coordinates> + use<> {
        let (top, left) = (self.top_left.row, self.top_left.col);
        let (bottom, right) = (self.bottom_right.row, self.bottom_right.col);
        (top..=bottom).flat_map(move |row| (left..=right).map(move |col| Coordinates::new(row, col)))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.top_left)
        } else {
            write!(f, "{}{}{}", self.top_left, RANGE_SEPARATOR, self.bottom_right)
        }
    }
}

/// Convert a 0-based column index to letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn index_to_letters(index: usize) -> String {
    let mut result = String::new();
    let mut n = index as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Inverse of [`index_to_letters`]. Case-insensitive; None on an empty
/// string, a non-letter, or overflow.
pub fn letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut acc = 0usize;
    for c in letters.bytes() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    acc.checked_sub(1)
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("A1 regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_a1_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(Coordinates::parse(&huge).is_none());
    }

    #[test]
    fn test_index_to_letters_handles_max_usize() {
        let letters = index_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_index_to_letters_first_columns() {
        assert_eq!(index_to_letters(0), "A");
        assert_eq!(index_to_letters(1), "B");
        assert_eq!(index_to_letters(25), "Z");
        assert_eq!(index_to_letters(26), "AA");
        assert_eq!(index_to_letters(27), "AB");
        assert_eq!(index_to_letters(51), "AZ");
        assert_eq!(index_to_letters(52), "BA");
        assert_eq!(index_to_letters(701), "ZZ");
        assert_eq!(index_to_letters(702), "AAA");
    }

    #[test]
    fn test_letters_round_trip() {
        for n in 0..20_000 {
            assert_eq!(letters_to_index(&index_to_letters(n)), Some(n), "index {}", n);
        }
    }

    #[test]
    fn test_letters_to_index_rejects_garbage() {
        assert_eq!(letters_to_index(""), None);
        assert_eq!(letters_to_index("A1"), None);
        assert_eq!(letters_to_index("a"), Some(0));
    }

    #[test]
    fn test_range_parse_and_display() {
        let range = Range::parse("b4..a3").unwrap();
        assert_eq!(range.top_left(), Coordinates::new(3, 1));
        assert_eq!(range.bottom_right(), Coordinates::new(4, 2));
        assert_eq!(range.to_string(), "A3..B4");
        assert_eq!(Range::parse("C7").unwrap().to_string(), "C7");
        assert!(Range::parse("A1....B2").is_none());
    }

    #[test]
    fn test_range_cells_are_row_major() {
        let range = Range::parse("A1..B2").unwrap();
        let cells: Vec<String> = range.cells().map(|c| c.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
        assert_eq!(range.cell_count(), Some(4));
        assert!(!range.is_one_dimensional());
        assert!(Range::parse("A1..A9").unwrap().is_one_dimensional());
    }
}
