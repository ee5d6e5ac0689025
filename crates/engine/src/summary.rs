use serde::Serialize;

use crate::cascade::JoinStats;
use crate::model::ParseStats;

/// Run-level observability counts. Every number here is derived from the
/// cascade outcomes and the loaders' parse stats; nothing is recomputed from
/// the records.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub checklist_rows: usize,
    pub indicator_rows: usize,
    pub trait_rows: usize,
    /// Checklist ↔ indicator-table join (inner: residue rows are dropped).
    pub indicator_join: JoinStats,
    /// Joined rows surviving the indicator thresholds.
    pub filtered_rows: usize,
    pub filtered_out: usize,
    /// Filtered rows ↔ trait-database join (left outer: residue rows are
    /// emitted with null trait fields).
    pub trait_join: JoinStats,
    pub unknown_cells: ParseStats,
    pub output_rows: usize,
}

pub fn compute_summary(
    input_rows: (usize, usize, usize),
    indicator_join: JoinStats,
    filtered_rows: usize,
    trait_join: JoinStats,
    unknown_cells: ParseStats,
    output_rows: usize,
) -> MergeSummary {
    let (checklist_rows, indicator_rows, trait_rows) = input_rows;
    let filtered_out = indicator_join.matched_rows - filtered_rows;
    MergeSummary {
        checklist_rows,
        indicator_rows,
        trait_rows,
        indicator_join,
        filtered_rows,
        filtered_out,
        trait_join,
        unknown_cells,
        output_rows,
    }
}
