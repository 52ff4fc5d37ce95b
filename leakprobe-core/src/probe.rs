//! The canonical probe pass shared by the vertical and horizontal detectors:
//! baseline run, poison a private copy, rerun, normalize, diff signatures.

use crate::error::LeakError;
use crate::poison::{PoisonEncoding, poison, unpoison_complex};
use crate::report::{ProbeReport, ProbeScope};
use crate::signature::{diff_signatures, null_signature};
use crate::table::Table;
use std::ops::Range;

/// One probe pass, fully described.
pub(crate) struct ProbeSpec<'a> {
    pub scope: ProbeScope,
    /// Columns to corrupt in the input table.
    pub poison_cols: &'a [String],
    /// Columns whose null signature is compared.
    pub observe_cols: &'a [String],
    /// Caller-facing name of the argument `observe_cols` came from, for
    /// error reporting.
    pub observe_arg: &'static str,
    /// Rows to corrupt (half-open; may be empty).
    pub poison_rows: Range<usize>,
    /// Rows the signature is computed over: the region that must have been
    /// unaffected by the corruption.
    pub observe_rows: Range<usize>,
    pub encoding: PoisonEncoding,
}

pub(crate) fn run_probe<F>(
    feature_fn: &mut F,
    table: &Table,
    spec: ProbeSpec<'_>,
) -> Result<ProbeReport, LeakError>
where
    F: FnMut(&Table) -> anyhow::Result<Table>,
{
    tracing::debug!(encoding = ?spec.encoding, "running probe pass");

    let baseline_out = feature_fn(table)?;
    for col in spec.observe_cols {
        if !baseline_out.has_column(col) {
            return Err(LeakError::MissingOutputColumn {
                column: col.clone(),
                argument: spec.observe_arg,
            });
        }
    }
    let baseline_sig = null_signature(&baseline_out, spec.observe_cols, spec.observe_rows.clone());

    let mut poisoned = table.clone();
    if !spec.poison_rows.is_empty() {
        poison(
            &mut poisoned,
            spec.poison_cols,
            spec.poison_rows.start..=spec.poison_rows.end - 1,
            spec.encoding,
        );
    }
    let mut probed_out = feature_fn(&poisoned)?;
    if spec.encoding == PoisonEncoding::ComplexShifted {
        unpoison_complex(&mut probed_out, spec.observe_cols);
    }

    let row_count_mismatch = baseline_out.row_count() != table.row_count()
        || probed_out.row_count() != table.row_count();
    if row_count_mismatch {
        tracing::warn!(
            input_rows = table.row_count(),
            baseline_rows = baseline_out.row_count(),
            probed_rows = probed_out.row_count(),
            "feature function changed the row count; do not drop or add rows, this verdict is unreliable"
        );
    }

    let probed_sig = null_signature(&probed_out, spec.observe_cols, spec.observe_rows.clone());
    let leaks = diff_signatures(&baseline_sig, &probed_sig);

    if leaks.is_empty() {
        tracing::info!(encoding = ?spec.encoding, "no leakage detected in this pass");
    } else {
        tracing::info!(
            encoding = ?spec.encoding,
            features = leaks.len(),
            "leakage detected"
        );
        for leak in &leaks {
            if leak.leak_count < 0 {
                tracing::warn!(
                    feature = %leak.feature,
                    leak_count = leak.leak_count,
                    "null count decreased under poisoning; the feature function looks nondeterministic"
                );
            } else {
                tracing::info!(
                    feature = %leak.feature,
                    leak_count = leak.leak_count,
                    "leaking feature"
                );
            }
        }
    }

    Ok(ProbeReport {
        scope: spec.scope,
        encoding: spec.encoding,
        leaks,
        rows_checked: spec.observe_rows.len(),
        row_count_mismatch,
    })
}
