//! Vertical leakage detection: values flowing across row order where a sort
//! order (usually time) says they must not be visible yet.

use crate::error::LeakError;
use crate::poison::PoisonEncoding;
use crate::probe::{ProbeSpec, run_probe};
use crate::report::{LeakageSummary, ProbeScope};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Which way information is forbidden to flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Later rows must not influence earlier rows. The usual check when rows
    /// are sorted by date.
    #[default]
    Upward,
    /// Earlier rows must not influence later rows.
    Downward,
}

impl FromStr for Direction {
    type Err = LeakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upward" => Ok(Self::Upward),
            "downward" => Ok(Self::Downward),
            other => Err(LeakError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upward => write!(f, "upward"),
            Self::Downward => write!(f, "downward"),
        }
    }
}

/// Parameters for a vertical leakage check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerticalCheck {
    /// Columns the black box consumes; these get poisoned.
    pub input_cols: Vec<String>,
    /// Columns the black box produces; these get diffed.
    pub output_cols: Vec<String>,
    #[serde(default)]
    pub direction: Direction,
    /// Row the table is split at. Defaults to the midpoint, `floor(n / 2)`.
    /// Must stay below `n - 1` so both sides of the split are non-empty.
    #[serde(default)]
    pub split_row: Option<usize>,
    /// Skip the complex-shift pass and probe with NaN only.
    #[serde(default)]
    pub only_missing: bool,
}

impl VerticalCheck {
    pub fn new(
        input_cols: impl IntoIterator<Item = impl Into<String>>,
        output_cols: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            input_cols: input_cols.into_iter().map(Into::into).collect(),
            output_cols: output_cols.into_iter().map(Into::into).collect(),
            direction: Direction::default(),
            split_row: None,
            only_missing: false,
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn split_row(mut self, split_row: usize) -> Self {
        self.split_row = Some(split_row);
        self
    }

    pub fn only_missing(mut self, only_missing: bool) -> Self {
        self.only_missing = only_missing;
        self
    }
}

/// Check whether the black box lets rows on one side of a split influence
/// output features on the other side.
///
/// Runs the probe once with the NaN encoding and, unless `only_missing` is
/// set, again with the complex-shift encoding on a fresh copy; the two are
/// independent witnesses and either alone flags leakage. The caller's table
/// is never mutated. Errors from `feature_fn` propagate unmodified.
pub fn detect_vertical_leakage<F>(
    mut feature_fn: F,
    table: &Table,
    check: &VerticalCheck,
) -> Result<LeakageSummary, LeakError>
where
    F: FnMut(&Table) -> anyhow::Result<Table>,
{
    let split = validate(table, check)?;
    let n = table.row_count();

    // Poison one side of the split in the input columns, then compare the
    // other side's output signature against the unpoisoned baseline.
    let (poison_rows, observe_rows): (Range<usize>, Range<usize>) = match check.direction {
        Direction::Upward => (split..n, 0..split),
        Direction::Downward => (0..split, split..n),
    };

    tracing::info!(
        direction = %check.direction,
        split_row = split,
        "checking for vertical leakage"
    );

    let mut runs = Vec::with_capacity(2);
    let mut encodings = vec![PoisonEncoding::Missing];
    if !check.only_missing {
        encodings.push(PoisonEncoding::ComplexShifted);
    }
    for encoding in encodings {
        runs.push(run_probe(
            &mut feature_fn,
            table,
            ProbeSpec {
                scope: ProbeScope::Vertical {
                    direction: check.direction,
                    split_row: split,
                },
                poison_cols: &check.input_cols,
                observe_cols: &check.output_cols,
                observe_arg: "output_cols",
                poison_rows: poison_rows.clone(),
                observe_rows: observe_rows.clone(),
                encoding,
            },
        )?);
    }

    Ok(LeakageSummary::from_runs(runs))
}

/// Fail fast on bad arguments, before anything is poisoned. Returns the
/// resolved split row.
fn validate(table: &Table, check: &VerticalCheck) -> Result<usize, LeakError> {
    let n = table.row_count();
    if n < 2 {
        return Err(LeakError::invalid_input(
            "the input table needs at least 2 rows for a vertical check",
        ));
    }
    if check.input_cols.is_empty() {
        return Err(LeakError::invalid_input("'input_cols' must not be empty"));
    }
    if check.output_cols.is_empty() {
        return Err(LeakError::invalid_input("'output_cols' must not be empty"));
    }
    for col in &check.input_cols {
        if !table.has_column(col) {
            return Err(LeakError::MissingInputColumn {
                column: col.clone(),
                argument: "input_cols",
            });
        }
    }
    let split = check.split_row.unwrap_or(n / 2);
    if split >= n - 1 {
        return Err(LeakError::InvalidSplitRow {
            split_row: split,
            rows: n,
        });
    }
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn table(n: usize) -> Table {
        Table::from_columns(vec![(
            "x",
            (0..n).map(|i| Cell::real(i as f64)).collect(),
        )])
        .unwrap()
    }

    fn identity(t: &Table) -> anyhow::Result<Table> {
        let mut out = t.clone();
        out.set_column("f", t.column("x").unwrap())?;
        Ok(out)
    }

    #[test]
    fn direction_parses_from_str() {
        assert_eq!("upward".parse::<Direction>().unwrap(), Direction::Upward);
        assert_eq!("downward".parse::<Direction>().unwrap(), Direction::Downward);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(LeakError::InvalidDirection(_))
        ));
    }

    #[test]
    fn split_row_at_upper_bound_is_rejected() {
        let t = table(6);
        let check = VerticalCheck::new(["x"], ["f"]).split_row(5);
        let err = detect_vertical_leakage(identity, &t, &check).unwrap_err();
        assert!(matches!(err, LeakError::InvalidSplitRow { split_row: 5, rows: 6 }));

        let check = VerticalCheck::new(["x"], ["f"]).split_row(6);
        assert!(detect_vertical_leakage(identity, &t, &check).is_err());
    }

    #[test]
    fn split_row_just_below_bound_is_accepted() {
        let t = table(6);
        let check = VerticalCheck::new(["x"], ["f"]).split_row(4);
        let summary = detect_vertical_leakage(identity, &t, &check).unwrap();
        assert!(!summary.has_leakage);
    }

    #[test]
    fn undeclared_input_column_is_rejected() {
        let t = table(4);
        let check = VerticalCheck::new(["nope"], ["f"]);
        let err = detect_vertical_leakage(identity, &t, &check).unwrap_err();
        assert!(matches!(err, LeakError::MissingInputColumn { .. }));
    }

    #[test]
    fn missing_output_column_is_rejected() {
        let t = table(4);
        let check = VerticalCheck::new(["x"], ["not_produced"]);
        let err = detect_vertical_leakage(identity, &t, &check).unwrap_err();
        assert!(matches!(err, LeakError::MissingOutputColumn { .. }));
    }

    #[test]
    fn tiny_table_is_rejected() {
        let t = table(1);
        let check = VerticalCheck::new(["x"], ["f"]);
        assert!(matches!(
            detect_vertical_leakage(identity, &t, &check),
            Err(LeakError::InvalidInput(_))
        ));
    }

    #[test]
    fn default_split_is_midpoint_and_both_passes_run() {
        let t = table(8);
        let check = VerticalCheck::new(["x"], ["f"]);
        let summary = detect_vertical_leakage(identity, &t, &check).unwrap();
        assert_eq!(summary.runs.len(), 2);
        for run in &summary.runs {
            assert!(matches!(
                run.scope,
                ProbeScope::Vertical { split_row: 4, .. }
            ));
        }
    }

    #[test]
    fn only_missing_skips_the_complex_pass() {
        let t = table(8);
        let check = VerticalCheck::new(["x"], ["f"]).only_missing(true);
        let summary = detect_vertical_leakage(identity, &t, &check).unwrap();
        assert_eq!(summary.runs.len(), 1);
        assert_eq!(summary.runs[0].encoding, PoisonEncoding::Missing);
    }
}
