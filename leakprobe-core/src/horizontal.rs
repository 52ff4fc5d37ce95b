//! Horizontal leakage detection: a column influencing another column of the
//! same row where no dependency should exist, e.g. a label leaking into a
//! feature computed "from" it.

use crate::error::LeakError;
use crate::poison::PoisonEncoding;
use crate::probe::{ProbeSpec, run_probe};
use crate::report::{LeakageSummary, ProbeReport, ProbeScope};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Parameters for a horizontal leakage check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizontalCheck {
    /// Precomputed dependent-variable columns. They must pass through the
    /// black box unchanged, not be recomputed by it.
    pub target_cols: Vec<String>,
    /// Feature columns the black box produces, checked for leakage from the
    /// targets.
    pub output_cols: Vec<String>,
    /// Input feature columns. When supplied, a second, independent probe
    /// checks the reverse direction: these leaking into the targets.
    #[serde(default)]
    pub input_cols: Vec<String>,
    /// Skip the complex-shift passes and probe with NaN only.
    #[serde(default)]
    pub only_missing: bool,
}

impl HorizontalCheck {
    pub fn new(
        target_cols: impl IntoIterator<Item = impl Into<String>>,
        output_cols: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            target_cols: target_cols.into_iter().map(Into::into).collect(),
            output_cols: output_cols.into_iter().map(Into::into).collect(),
            input_cols: Vec::new(),
            only_missing: false,
        }
    }

    pub fn input_cols(mut self, input_cols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.input_cols = input_cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn only_missing(mut self, only_missing: bool) -> Self {
        self.only_missing = only_missing;
        self
    }
}

/// Check whether target columns leak into output features and, when input
/// columns are supplied, whether input features leak into the targets.
///
/// Each direction is probed once with the NaN encoding and, unless
/// `only_missing` is set, again with the complex-shift encoding on a fresh
/// copy. Poisoning covers every row; there is no split. The overall verdict
/// is the OR across all passes.
pub fn detect_horizontal_leakage<F>(
    mut feature_fn: F,
    table: &Table,
    check: &HorizontalCheck,
) -> Result<LeakageSummary, LeakError>
where
    F: FnMut(&Table) -> anyhow::Result<Table>,
{
    validate(table, check)?;

    let mut runs = Vec::with_capacity(4);

    tracing::info!("checking for leakage from target columns into output features");
    probe_direction(
        &mut feature_fn,
        table,
        &check.target_cols,
        &check.output_cols,
        "output_cols",
        check.only_missing,
        &mut runs,
    )?;

    if !check.input_cols.is_empty() {
        tracing::info!("checking for leakage from input feature columns into target columns");
        probe_direction(
            &mut feature_fn,
            table,
            &check.input_cols,
            &check.target_cols,
            "target_cols",
            check.only_missing,
            &mut runs,
        )?;
    }

    Ok(LeakageSummary::from_runs(runs))
}

fn probe_direction<F>(
    feature_fn: &mut F,
    table: &Table,
    from_cols: &[String],
    to_cols: &[String],
    observe_arg: &'static str,
    only_missing: bool,
    runs: &mut Vec<ProbeReport>,
) -> Result<(), LeakError>
where
    F: FnMut(&Table) -> anyhow::Result<Table>,
{
    let n = table.row_count();
    let mut encodings = vec![PoisonEncoding::Missing];
    if !only_missing {
        encodings.push(PoisonEncoding::ComplexShifted);
    }
    for encoding in encodings {
        runs.push(run_probe(
            feature_fn,
            table,
            ProbeSpec {
                scope: ProbeScope::Horizontal {
                    from_cols: from_cols.to_vec(),
                    to_cols: to_cols.to_vec(),
                },
                poison_cols: from_cols,
                observe_cols: to_cols,
                observe_arg,
                poison_rows: 0..n,
                observe_rows: 0..n,
                encoding,
            },
        )?);
    }
    Ok(())
}

fn validate(table: &Table, check: &HorizontalCheck) -> Result<(), LeakError> {
    if table.row_count() == 0 {
        return Err(LeakError::invalid_input("the input table is empty"));
    }
    if check.target_cols.is_empty() {
        return Err(LeakError::invalid_input("'target_cols' must not be empty"));
    }
    if check.output_cols.is_empty() {
        return Err(LeakError::invalid_input("'output_cols' must not be empty"));
    }
    for col in &check.target_cols {
        if !table.has_column(col) {
            return Err(LeakError::MissingInputColumn {
                column: col.clone(),
                argument: "target_cols",
            });
        }
    }
    for col in &check.input_cols {
        if !table.has_column(col) {
            return Err(LeakError::MissingInputColumn {
                column: col.clone(),
                argument: "input_cols",
            });
        }
    }
    Ok(())
}
