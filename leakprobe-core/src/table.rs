//! Cell values and the labeled row table the probes operate on.

use crate::error::LeakError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A single table cell.
///
/// `Complex` doubles as the poison tag for the complex-shift encoding: the
/// arithmetic impls below propagate a nonzero imaginary part through numeric
/// pipelines, so a poisoned value stays distinguishable after an opaque
/// feature computation. `Missing` is absorbing under every operator, matching
/// NaN semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell {
    Real { value: f64 },
    Complex { re: f64, im: f64 },
    Missing,
}

impl Cell {
    pub fn real(value: f64) -> Self {
        Self::Real { value }
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Self::Complex { re, im }
    }

    /// True for the missing marker and for any value with a NaN component.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Real { value } => value.is_nan(),
            Self::Complex { re, im } => re.is_nan() || im.is_nan(),
        }
    }

    /// True only for a genuinely non-real value (nonzero imaginary part).
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex { im, .. } if *im != 0.0)
    }

    /// Real component, if the cell carries a value at all.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real { value } => Some(*value),
            Self::Complex { re, .. } => Some(*re),
            Self::Missing => None,
        }
    }

    fn parts(&self) -> Option<(f64, f64)> {
        match self {
            Self::Real { value } => Some((*value, 0.0)),
            Self::Complex { re, im } => Some((*re, *im)),
            Self::Missing => None,
        }
    }

    /// Complex dtype is sticky: once either operand is complex, the result
    /// stays in the complex variant even when its imaginary part is zero.
    fn combine(self, rhs: Cell, op: impl FnOnce((f64, f64), (f64, f64)) -> (f64, f64)) -> Cell {
        match (self.parts(), rhs.parts()) {
            (Some(a), Some(b)) => {
                let (re, im) = op(a, b);
                if matches!(self, Cell::Complex { .. }) || matches!(rhs, Cell::Complex { .. }) {
                    Cell::Complex { re, im }
                } else {
                    Cell::Real { value: re }
                }
            }
            _ => Cell::Missing,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Real { value }
    }
}

impl Add for Cell {
    type Output = Cell;
    fn add(self, rhs: Cell) -> Cell {
        self.combine(rhs, |a, b| (a.0 + b.0, a.1 + b.1))
    }
}

impl Sub for Cell {
    type Output = Cell;
    fn sub(self, rhs: Cell) -> Cell {
        self.combine(rhs, |a, b| (a.0 - b.0, a.1 - b.1))
    }
}

impl Mul for Cell {
    type Output = Cell;
    fn mul(self, rhs: Cell) -> Cell {
        self.combine(rhs, |a, b| (a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0))
    }
}

impl Div for Cell {
    type Output = Cell;
    fn div(self, rhs: Cell) -> Cell {
        self.combine(rhs, |a, b| {
            let denom = b.0 * b.0 + b.1 * b.1;
            ((a.0 * b.0 + a.1 * b.1) / denom, (a.1 * b.0 - a.0 * b.1) / denom)
        })
    }
}

impl Neg for Cell {
    type Output = Cell;
    fn neg(self) -> Cell {
        match self {
            Self::Real { value } => Self::Real { value: -value },
            Self::Complex { re, im } => Self::Complex { re: -re, im: -im },
            Self::Missing => Self::Missing,
        }
    }
}

impl Add<f64> for Cell {
    type Output = Cell;
    fn add(self, rhs: f64) -> Cell {
        self + Cell::from(rhs)
    }
}

impl Sub<f64> for Cell {
    type Output = Cell;
    fn sub(self, rhs: f64) -> Cell {
        self - Cell::from(rhs)
    }
}

impl Mul<f64> for Cell {
    type Output = Cell;
    fn mul(self, rhs: f64) -> Cell {
        self * Cell::from(rhs)
    }
}

impl Div<f64> for Cell {
    type Output = Cell;
    fn div(self, rhs: f64) -> Cell {
        self / Cell::from(rhs)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real { value } => write!(f, "{value}"),
            Self::Complex { re, im } => write!(f, "{re}{im:+}i"),
            Self::Missing => write!(f, "NaN"),
        }
    }
}

/// An ordered table of named numeric columns.
///
/// Row order is semantically significant for vertical leakage checks (it
/// encodes the temporal/sequence ordering) and irrelevant for horizontal
/// ones. The detection entry points never mutate a caller's table; each
/// probe pass clones it before poisoning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from named columns of equal length.
    pub fn from_columns<N: Into<String>>(
        columns: Vec<(N, Vec<Cell>)>,
    ) -> Result<Self, LeakError> {
        let mut names = Vec::with_capacity(columns.len());
        let mut data: Vec<Vec<Cell>> = Vec::with_capacity(columns.len());
        for (name, cells) in columns {
            names.push(name.into());
            data.push(cells);
        }
        let row_count = data.first().map_or(0, Vec::len);
        for (name, cells) in names.iter().zip(&data) {
            if cells.len() != row_count {
                return Err(LeakError::table(format!(
                    "column '{name}' has {} rows, expected {row_count}",
                    cells.len()
                )));
            }
        }
        let rows = (0..row_count)
            .map(|r| data.iter().map(|col| col[r]).collect())
            .collect();
        Ok(Self { columns: names, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column name).
    pub fn get(&self, row: usize, column: &str) -> Option<Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).copied()
    }

    /// All cells of a named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Append a column, or replace it if the name already exists.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) -> Result<(), LeakError> {
        if cells.len() != self.row_count() {
            return Err(LeakError::table(format!(
                "column '{name}' has {} rows, expected {}",
                cells.len(),
                self.row_count()
            )));
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row[idx] = cell;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_is_absorbing_under_arithmetic() {
        let m = Cell::Missing;
        let r = Cell::real(3.0);
        assert!((m + r).is_missing());
        assert!((r - m).is_missing());
        assert!((m * m).is_missing());
        assert!((r / m).is_missing());
    }

    #[test]
    fn complex_survives_arithmetic() {
        let poisoned = Cell::real(2.0) + Cell::complex(0.0, 1.0);
        assert_eq!(poisoned, Cell::complex(2.0, 1.0));
        // (2 + i) * 3 keeps the imaginary part
        let scaled = poisoned * 3.0;
        assert!(scaled.is_complex());
        assert_eq!(scaled, Cell::complex(6.0, 3.0));
        // complex multiplication: (2 + i)(2 + i) = 3 + 4i
        let squared = poisoned * poisoned;
        assert_eq!(squared, Cell::complex(3.0, 4.0));
    }

    #[test]
    fn zero_imaginary_part_is_not_complex() {
        let c = Cell::complex(5.0, 0.0);
        assert!(!c.is_complex());
        assert!(Cell::complex(5.0, 1.0).is_complex());
        assert!(!Cell::real(5.0).is_complex());
    }

    #[test]
    fn nan_real_counts_as_missing() {
        assert!(Cell::real(f64::NAN).is_missing());
        assert!(!Cell::real(0.0).is_missing());
        assert!(Cell::complex(f64::NAN, 1.0).is_missing());
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        let result = Table::from_columns(vec![
            ("a", vec![Cell::real(1.0), Cell::real(2.0)]),
            ("b", vec![Cell::real(3.0)]),
        ]);
        assert!(matches!(result, Err(LeakError::Table(_))));
    }

    #[test]
    fn from_columns_builds_row_major() {
        let table = Table::from_columns(vec![
            ("a", vec![Cell::real(1.0), Cell::real(2.0)]),
            ("b", vec![Cell::real(3.0), Cell::real(4.0)]),
        ])
        .unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.get(1, "a"), Some(Cell::real(2.0)));
        assert_eq!(table.get(0, "b"), Some(Cell::real(3.0)));
    }

    #[test]
    fn set_column_replaces_or_appends() {
        let mut table = Table::from_columns(vec![("a", vec![Cell::real(1.0)])]).unwrap();
        table.set_column("a", vec![Cell::real(9.0)]).unwrap();
        assert_eq!(table.get(0, "a"), Some(Cell::real(9.0)));
        table.set_column("b", vec![Cell::Missing]).unwrap();
        assert_eq!(table.get(0, "b"), Some(Cell::Missing));
        assert!(table.set_column("c", vec![]).is_err());
    }
}
