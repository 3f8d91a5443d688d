//! Merge-index builder (C4).
//!
//! Invoked only when the classifier produced a `MERGE` block. Builds a flat,
//! ascending `(timestamp, row id)` array that directs the downstream copy
//! stage to emit rows from the data side and the OOO side in globally
//! sorted order, breaking timestamp ties in favor of the data side so that
//! an OOO duplicate never reorders an existing row.

use crate::ooo::types::{MergeBlock, MergeIndex, MergeIndexEntry};

/// Builds the merge index for `merge`, zipping `data_ts[merge.data_lo..=merge.data_hi]`
/// (local row ids into the on-disk column) against
/// `ooo_ts[... ]` (already local to the OOO slice, indexed the same way the
/// classifier indexed it: `ooo_ts[0]` is global row id `ooo_row_base`).
///
/// `ooo_row_base` is the global row id of `ooo_ts[0]`, i.e. `srcOooLo` for the
/// partition; merge row ids in `merge.ooo_lo..=merge.ooo_hi` index into the
/// same global space, so `ooo_ts` is sliced by subtracting `ooo_row_base`.
pub fn build_merge_index(data_ts: &[i64], ooo_ts: &[i64], ooo_row_base: i64, merge: &MergeBlock) -> MergeIndex {
    assert_eq!(merge.kind, crate::ooo::types::BlockKind::Merge, "merge index requires a MERGE block");

    let data_lo = merge.data_lo as usize;
    let data_hi = merge.data_hi as usize;
    let data_run: Vec<MergeIndexEntry> = (data_lo..=data_hi)
        .map(|row| MergeIndexEntry { timestamp: data_ts[row], row_id: row as i64, from_data: true })
        .collect();

    let ooo_lo_local = (merge.ooo_lo - ooo_row_base) as usize;
    let ooo_hi_local = (merge.ooo_hi - ooo_row_base) as usize;
    let ooo_run: Vec<MergeIndexEntry> = (ooo_lo_local..=ooo_hi_local)
        .map(|local| MergeIndexEntry {
            timestamp: ooo_ts[local],
            row_id: merge.ooo_lo + (local - ooo_lo_local) as i64,
            from_data: false,
        })
        .collect();

    MergeIndex { entries: stable_merge(data_run, ooo_run) }
}

/// Stable ascending 2-way merge: on equal timestamps, the data-side entry is
/// emitted first.
fn stable_merge(data_run: Vec<MergeIndexEntry>, ooo_run: Vec<MergeIndexEntry>) -> Vec<MergeIndexEntry> {
    let mut out = Vec::with_capacity(data_run.len() + ooo_run.len());
    let mut i = 0;
    let mut j = 0;
    while i < data_run.len() && j < ooo_run.len() {
        if data_run[i].timestamp <= ooo_run[j].timestamp {
            out.push(data_run[i]);
            i += 1;
        } else {
            out.push(ooo_run[j]);
            j += 1;
        }
    }
    out.extend_from_slice(&data_run[i..]);
    out.extend_from_slice(&ooo_run[j..]);
    out
}
