//! # leakprobe-core — black-box data leakage detection
//!
//! Detects information leakage in feature-engineering pipelines by treating
//! the feature-creation function as an opaque black box: specific input
//! cells are corrupted and the per-column missing-value counts of the output
//! are compared against an unpoisoned baseline. Corruption showing up in
//! output cells that should have been unaffected is leakage.
//!
//! Two protocols share the same poison-and-diff primitive:
//!
//! - **Vertical** ([`detect_vertical_leakage`]): values flowing across row
//!   order, e.g. a feature for row `i` depending on rows after `i` when the
//!   table is time-sorted.
//! - **Horizontal** ([`detect_horizontal_leakage`]): values flowing between
//!   columns of the same row, e.g. a label leaking into a feature.
//!
//! Each probe runs with two interchangeable poison encodings as independent
//! witnesses: NaN injection and a complex-number shift that survives
//! arithmetic a NaN-special-casing pipeline might mask.
//!
//! ```
//! use leakprobe_core::{Cell, Table, VerticalCheck, detect_vertical_leakage};
//!
//! let table = Table::from_columns(vec![
//!     ("price", (0..10).map(|i| Cell::real(i as f64)).collect()),
//! ])?;
//!
//! // A lagged feature only looks backwards, so no upward leakage.
//! let lag = |t: &Table| -> anyhow::Result<Table> {
//!     let price = t.column("price").unwrap();
//!     let mut lagged = vec![Cell::Missing];
//!     lagged.extend_from_slice(&price[..price.len() - 1]);
//!     let mut out = t.clone();
//!     out.set_column("price_lag1", lagged)?;
//!     Ok(out)
//! };
//!
//! let check = VerticalCheck::new(["price"], ["price_lag1"]);
//! let summary = detect_vertical_leakage(lag, &table, &check)?;
//! assert!(!summary.has_leakage);
//! # Ok::<(), leakprobe_core::LeakError>(())
//! ```

pub mod error;
pub mod horizontal;
pub mod poison;
mod probe;
pub mod report;
pub mod signature;
pub mod table;
pub mod vertical;

pub use error::LeakError;
pub use horizontal::{HorizontalCheck, detect_horizontal_leakage};
pub use poison::PoisonEncoding;
pub use report::{LeakRecord, LeakageSummary, ProbeReport, ProbeScope};
pub use table::{Cell, Table};
pub use vertical::{Direction, VerticalCheck, detect_vertical_leakage};
