//! Null-count signatures: the per-column missing-value counts the probes
//! diff to decide leakage.

use crate::report::LeakRecord;
use crate::table::Table;
use std::collections::BTreeMap;
use std::ops::Range;

/// Per-column missing-value counts over a row range.
///
/// Pure function of its inputs: same slice, same counts. Columns absent from
/// the table are omitted (the orchestrators validate column existence before
/// probing; an omission here surfaces as a left-join miss in
/// [`diff_signatures`]). The range is clamped to the table's row count.
pub fn null_signature(
    table: &Table,
    columns: &[String],
    rows: Range<usize>,
) -> BTreeMap<String, usize> {
    let start = rows.start.min(table.row_count());
    let end = rows.end.min(table.row_count());
    let mut signature = BTreeMap::new();
    for name in columns {
        let Some(idx) = table.column_index(name) else {
            continue;
        };
        let count = table.rows[start..end]
            .iter()
            .filter(|row| row[idx].is_missing())
            .count();
        signature.insert(name.clone(), count);
    }
    signature
}

/// Left-join the baseline signature against the probed one and keep every
/// mismatch. A feature missing from the probed signature is itself a
/// mismatch (the black box dropped the column on the poisoned run).
pub fn diff_signatures(
    baseline: &BTreeMap<String, usize>,
    probed: &BTreeMap<String, usize>,
) -> Vec<LeakRecord> {
    baseline
        .iter()
        .filter_map(|(feature, &baseline_nulls)| {
            let probed_nulls = probed.get(feature).copied();
            if probed_nulls == Some(baseline_nulls) {
                return None;
            }
            let leak_count = probed_nulls.map_or(0, |p| p as i64 - baseline_nulls as i64);
            Some(LeakRecord {
                feature: feature.clone(),
                baseline_nulls,
                probed_nulls,
                leak_count,
            })
        })
        .collect()
}
