//! Cell corruption: the two interchangeable poison encodings and the
//! complex-to-missing normalization that funnels both into one comparator.

use crate::table::{Cell, Table};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// How poisoned cells are encoded.
///
/// The two encodings are independent witnesses: a black box that
/// special-cases NaN can mask the `Missing` pass but still propagate the
/// complex shift, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoisonEncoding {
    /// Overwrite cells with the missing marker.
    Missing,
    /// Shift cells by a unit imaginary offset, `value + 1i`.
    ComplexShifted,
}

/// Overwrite `columns × rows` in place. The row span is inclusive on both
/// ends. Callers pass a private copy; the detection entry points never hand
/// the caller's own table here.
pub fn poison(
    table: &mut Table,
    columns: &[String],
    rows: RangeInclusive<usize>,
    encoding: PoisonEncoding,
) {
    if table.row_count() == 0 {
        return;
    }
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    let last = table.row_count() - 1;
    let span = *rows.start()..=(*rows.end()).min(last);
    tracing::debug!(?encoding, rows = ?span, columns = columns.len(), "poisoning cells");
    for r in span {
        for &idx in &indices {
            let cell = &mut table.rows[r][idx];
            *cell = match encoding {
                PoisonEncoding::Missing => Cell::Missing,
                PoisonEncoding::ComplexShifted => match *cell {
                    Cell::Real { value } => Cell::complex(value, 1.0),
                    Cell::Complex { re, im } => Cell::complex(re, im + 1.0),
                    // numpy semantics: NaN + 1i is still complex
                    Cell::Missing => Cell::complex(f64::NAN, 1.0),
                },
            };
        }
    }
}

/// Map every complex cell in `columns` back to the missing marker, leaving
/// real values untouched. Run after a `ComplexShifted` pass so complex
/// leakage and NaN leakage are scored on the same scale.
pub fn unpoison_complex(table: &mut Table, columns: &[String]) {
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    for row in &mut table.rows {
        for &idx in &indices {
            if row[idx].is_complex() {
                row[idx] = Cell::Missing;
            }
        }
    }
}
