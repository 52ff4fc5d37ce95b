//! Evidence objects produced by probe runs.

use crate::poison::PoisonEncoding;
use crate::vertical::Direction;
use serde::{Deserialize, Serialize};

/// One feature whose null signature changed under poisoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakRecord {
    pub feature: String,
    /// Missing-value count in the unpoisoned baseline slice.
    pub baseline_nulls: usize,
    /// Missing-value count in the same slice after poisoning. `None` means
    /// the feature vanished from the black box's poisoned output.
    pub probed_nulls: Option<usize>,
    /// `probed_nulls - baseline_nulls`. Negative only when the black box is
    /// nondeterministic or reorders rows, which invalidates the run.
    pub leak_count: i64,
}

/// Which probe produced a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeScope {
    Vertical {
        direction: Direction,
        split_row: usize,
    },
    Horizontal {
        from_cols: Vec<String>,
        to_cols: Vec<String>,
    },
}

/// Outcome of a single probe-and-encoding pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub scope: ProbeScope,
    pub encoding: PoisonEncoding,
    /// Features with a signature mismatch, ordered by name.
    pub leaks: Vec<LeakRecord>,
    /// Rows in the compared slice.
    pub rows_checked: usize,
    /// The black box returned a different row count than it was given,
    /// breaking the row-index alignment the comparison relies on.
    pub row_count_mismatch: bool,
}

impl ProbeReport {
    pub fn has_leakage(&self) -> bool {
        !self.leaks.is_empty()
    }
}

/// Aggregate verdict across every pass one detection call ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakageSummary {
    /// True if any pass saw a signature mismatch (logical OR).
    pub has_leakage: bool,
    pub runs: Vec<ProbeReport>,
}

impl LeakageSummary {
    pub fn from_runs(runs: Vec<ProbeReport>) -> Self {
        Self {
            has_leakage: runs.iter().any(ProbeReport::has_leakage),
            runs,
        }
    }

    /// False when any pass hit the row-count mismatch, in which case the
    /// verdict should not be trusted.
    pub fn reliable(&self) -> bool {
        !self.runs.iter().any(|r| r.row_count_mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(leaks: Vec<LeakRecord>, mismatch: bool) -> ProbeReport {
        ProbeReport {
            scope: ProbeScope::Horizontal {
                from_cols: vec!["t".into()],
                to_cols: vec!["f".into()],
            },
            encoding: PoisonEncoding::Missing,
            leaks,
            rows_checked: 10,
            row_count_mismatch: mismatch,
        }
    }

    fn leak() -> LeakRecord {
        LeakRecord {
            feature: "f".into(),
            baseline_nulls: 0,
            probed_nulls: Some(5),
            leak_count: 5,
        }
    }

    #[test]
    fn summary_ors_across_runs() {
        let summary = LeakageSummary::from_runs(vec![report(vec![], false), report(vec![leak()], false)]);
        assert!(summary.has_leakage);
        assert!(summary.reliable());

        let clean = LeakageSummary::from_runs(vec![report(vec![], false)]);
        assert!(!clean.has_leakage);
    }

    #[test]
    fn mismatch_marks_summary_unreliable() {
        let summary = LeakageSummary::from_runs(vec![report(vec![], true)]);
        assert!(!summary.reliable());
    }
}
