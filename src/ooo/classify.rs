//! Overlap classifier (C1): given the on-disk and OOO timestamp ranges for
//! one partition, decides how the two sides overlap and produces the
//! `(prefix, merge, suffix)` block plan described in the classification
//! table.
//!
//! Row ids are expressed the way the rest of the crate expects them: data
//! row ids are local to the partition's on-disk column (`0..srcDataMax`),
//! OOO row ids are global indices into the ingest batch's sorted timestamp
//! array (`srcOooLo..=srcOooHi`).

use crate::ooo::bsearch::{bsearch64, ScanDirection};
use crate::ooo::types::{Block, BlockKind, BlockPlan, MergeBlock};

/// Classifies the overlap between `data_ts` (the on-disk column, ascending,
/// length `src_data_max`) and `ooo_ts` (this partition's OOO slice,
/// ascending, local index 0 corresponding to global row id `src_ooo_lo`).
///
/// Both slices must be non-empty; the opener never calls the classifier for
/// a brand-new partition (pure OOO append), where there is no data side to
/// compare against.
pub fn classify(data_ts: &[i64], ooo_ts: &[i64], src_ooo_lo: i64, src_ooo_hi: i64) -> BlockPlan {
    assert!(!data_ts.is_empty(), "classify requires a non-empty data side");
    assert!(!ooo_ts.is_empty(), "classify requires a non-empty ooo side");

    let src_data_max = data_ts.len() as i64;
    let data_ts_lo = data_ts[0];
    let data_ts_hi = data_ts[data_ts.len() - 1];
    let ooo_ts_lo = ooo_ts[0];
    let ooo_ts_max = ooo_ts[ooo_ts.len() - 1];

    if ooo_ts_lo > data_ts_hi {
        return case_a(src_ooo_lo, src_ooo_hi);
    }

    if ooo_ts_lo > data_ts_lo {
        return if ooo_ts_max < data_ts_hi {
            case_b(data_ts, ooo_ts_lo, ooo_ts_max, src_data_max, src_ooo_lo, src_ooo_hi)
        } else if ooo_ts_max > data_ts_hi {
            case_c(data_ts, ooo_ts, data_ts_hi, ooo_ts_lo, src_data_max, src_ooo_lo, src_ooo_hi)
        } else {
            case_d(data_ts, ooo_ts_lo, src_data_max, src_ooo_lo, src_ooo_hi)
        };
    }

    if ooo_ts_max <= data_ts_lo {
        return case_h(src_data_max, src_ooo_lo, src_ooo_hi);
    }
    if ooo_ts_max < data_ts_hi {
        case_e(data_ts, ooo_ts, data_ts_lo, ooo_ts_max, src_data_max, src_ooo_lo, src_ooo_hi)
    } else if ooo_ts_max > data_ts_hi {
        case_f(data_ts, ooo_ts, data_ts_lo, data_ts_hi, src_data_max, src_ooo_lo, src_ooo_hi)
    } else {
        case_g(data_ts, ooo_ts, data_ts_lo, src_data_max, src_ooo_lo, src_ooo_hi)
    }
}

fn case_a(src_ooo_lo: i64, src_ooo_hi: i64) -> BlockPlan {
    BlockPlan { prefix: Block::NONE, merge: MergeBlock::NONE, suffix: Block::oo(src_ooo_lo, src_ooo_hi) }
}

fn case_h(src_data_max: i64, src_ooo_lo: i64, src_ooo_hi: i64) -> BlockPlan {
    BlockPlan {
        prefix: Block::oo(src_ooo_lo, src_ooo_hi),
        merge: MergeBlock::NONE,
        suffix: Block::data(0, src_data_max - 1),
    }
}

fn case_b(
    data_ts: &[i64],
    ooo_ts_lo: i64,
    ooo_ts_max: i64,
    src_data_max: i64,
    src_ooo_lo: i64,
    src_ooo_hi: i64,
) -> BlockPlan {
    let p = bsearch64(data_ts, ooo_ts_lo, ScanDirection::Down);
    let q = bsearch64(data_ts, ooo_ts_max - 1, ScanDirection::Down) + 1;

    let mut merge_data_lo = p + 1;
    let mut merge_data_hi = q;
    let merge = if merge_data_lo >= merge_data_hi {
        merge_data_hi -= 1;
        MergeBlock { kind: BlockKind::Oo, data_lo: merge_data_lo, data_hi: merge_data_hi, ooo_lo: src_ooo_lo, ooo_hi: src_ooo_hi }
    } else {
        MergeBlock { kind: BlockKind::Merge, data_lo: merge_data_lo, data_hi: merge_data_hi, ooo_lo: src_ooo_lo, ooo_hi: src_ooo_hi }
    };

    BlockPlan {
        prefix: Block::data(0, p),
        merge,
        suffix: Block::data(q + 1, src_data_max - 1),
    }
}

fn case_c(
    data_ts: &[i64],
    ooo_ts: &[i64],
    data_ts_hi: i64,
    ooo_ts_lo: i64,
    src_data_max: i64,
    src_ooo_lo: i64,
    src_ooo_hi: i64,
) -> BlockPlan {
    let p = bsearch64(data_ts, ooo_ts_lo, ScanDirection::Down);
    let r_local = bsearch64(ooo_ts, data_ts_hi, ScanDirection::Up);
    let r = src_ooo_lo + r_local;

    BlockPlan {
        prefix: Block::data(0, p),
        merge: MergeBlock { kind: BlockKind::Merge, data_lo: p + 1, data_hi: src_data_max - 1, ooo_lo: src_ooo_lo, ooo_hi: r },
        suffix: Block::oo(r + 1, src_ooo_hi),
    }
}

fn case_d(data_ts: &[i64], ooo_ts_lo: i64, src_data_max: i64, src_ooo_lo: i64, src_ooo_hi: i64) -> BlockPlan {
    let p = bsearch64(data_ts, ooo_ts_lo, ScanDirection::Down);
    BlockPlan {
        prefix: Block::data(0, p),
        merge: MergeBlock { kind: BlockKind::Merge, data_lo: p + 1, data_hi: src_data_max - 1, ooo_lo: src_ooo_lo, ooo_hi: src_ooo_hi },
        suffix: Block::NONE,
    }
}

fn case_e(
    data_ts: &[i64],
    ooo_ts: &[i64],
    data_ts_lo: i64,
    ooo_ts_max: i64,
    src_data_max: i64,
    src_ooo_lo: i64,
    src_ooo_hi: i64,
) -> BlockPlan {
    let p_local = bsearch64(ooo_ts, data_ts_lo, ScanDirection::Down);
    let p = src_ooo_lo + p_local;
    let q = bsearch64(data_ts, ooo_ts_max, ScanDirection::Down);

    BlockPlan {
        prefix: Block::oo(src_ooo_lo, p),
        merge: MergeBlock { kind: BlockKind::Merge, data_lo: 0, data_hi: q, ooo_lo: p + 1, ooo_hi: src_ooo_hi },
        suffix: Block::data(q + 1, src_data_max - 1),
    }
}

fn case_f(
    data_ts: &[i64],
    ooo_ts: &[i64],
    data_ts_lo: i64,
    data_ts_hi: i64,
    src_data_max: i64,
    src_ooo_lo: i64,
    src_ooo_hi: i64,
) -> BlockPlan {
    let p_local = bsearch64(ooo_ts, data_ts_lo, ScanDirection::Down);
    let p = src_ooo_lo + p_local;
    let r_local = bsearch64(ooo_ts, data_ts_hi - 1, ScanDirection::Down) + 1;
    let r = src_ooo_lo + r_local;

    let mut merge_ooo_lo = p + 1;
    let mut merge_ooo_hi = r;
    let merge = if merge_ooo_lo > merge_ooo_hi {
        merge_ooo_hi -= 1;
        MergeBlock { kind: BlockKind::Data, data_lo: 0, data_hi: src_data_max - 1, ooo_lo: merge_ooo_lo, ooo_hi: merge_ooo_hi }
    } else {
        MergeBlock { kind: BlockKind::Merge, data_lo: 0, data_hi: src_data_max - 1, ooo_lo: merge_ooo_lo, ooo_hi: merge_ooo_hi }
    };

    let suffix = if r < src_ooo_hi { Block::oo(r + 1, src_ooo_hi) } else { Block::NONE };

    BlockPlan { prefix: Block::oo(src_ooo_lo, p), merge, suffix }
}

fn case_g(
    data_ts: &[i64],
    ooo_ts: &[i64],
    data_ts_lo: i64,
    src_data_max: i64,
    src_ooo_lo: i64,
    src_ooo_hi: i64,
) -> BlockPlan {
    let _ = data_ts;
    let p_local = bsearch64(ooo_ts, data_ts_lo, ScanDirection::Down);
    let p = src_ooo_lo + p_local;

    BlockPlan {
        prefix: Block::oo(src_ooo_lo, p),
        merge: MergeBlock { kind: BlockKind::Merge, data_lo: 0, data_hi: src_data_max - 1, ooo_lo: p + 1, ooo_hi: src_ooo_hi },
        suffix: Block::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_a_ooo_after_data() {
        let data = [10, 20, 30];
        let ooo = [40, 50];
        let plan = classify(&data, &ooo, 0, 1);
        assert_eq!(plan.prefix, Block::NONE);
        assert_eq!(plan.merge, MergeBlock::NONE);
        assert_eq!(plan.suffix, Block::oo(0, 1));
    }

    #[test]
    fn test_case_h_ooo_before_data() {
        let data = [10, 20, 30, 40, 50];
        let ooo = [1, 2];
        let plan = classify(&data, &ooo, 0, 1);
        assert_eq!(plan.prefix, Block::oo(0, 1));
        assert_eq!(plan.merge, MergeBlock::NONE);
        assert_eq!(plan.suffix, Block::data(0, 4));
    }

    /// S3 from the seed scenarios: data=[10,20,30,40,50], ooo=[22,25,35].
    #[test]
    fn test_s3_interleave_middle() {
        let data = [10, 20, 30, 40, 50];
        let ooo = [22, 25, 35];
        let plan = classify(&data, &ooo, 0, 2);

        assert_eq!(plan.prefix, Block::data(0, 1));
        assert_eq!(plan.merge.kind, BlockKind::Merge);
        assert_eq!(plan.merge.data_lo, 2);
        assert_eq!(plan.merge.data_hi, 3);
        assert_eq!(plan.merge.ooo_lo, 0);
        assert_eq!(plan.merge.ooo_hi, 2);
        assert_eq!(plan.suffix, Block::data(4, 4));
    }

    /// S5: data=[10,20,30] (tsHi=30), ooo=[25,35,45].
    #[test]
    fn test_s5_ooo_straddles_tail() {
        let data = [10, 20, 30];
        let ooo = [25, 35, 45];
        let plan = classify(&data, &ooo, 0, 2);

        assert_eq!(plan.prefix, Block::data(0, 1));
        assert_eq!(plan.merge.kind, BlockKind::Merge);
        assert_eq!(plan.merge.data_lo, 2);
        assert_eq!(plan.merge.data_hi, 2);
        assert_eq!(plan.merge.ooo_lo, 0);
        assert_eq!(plan.merge.ooo_hi, 0);
        assert_eq!(plan.suffix, Block::oo(1, 2));
    }

    #[test]
    fn test_case_d_merge_to_tail() {
        let data = [10, 20, 30];
        let ooo = [15, 30];
        let plan = classify(&data, &ooo, 5, 6);
        assert_eq!(plan.prefix, Block::data(0, 0));
        assert_eq!(plan.merge.kind, BlockKind::Merge);
        assert_eq!(plan.merge.data_lo, 1);
        assert_eq!(plan.merge.data_hi, 2);
        assert_eq!(plan.merge.ooo_lo, 5);
        assert_eq!(plan.merge.ooo_hi, 6);
        assert_eq!(plan.suffix, Block::NONE);
    }

    #[test]
    fn test_case_g_merge_from_head() {
        let data = [30, 40, 50];
        let ooo = [10, 50];
        let plan = classify(&data, &ooo, 0, 1);
        assert_eq!(plan.prefix, Block::oo(0, 0));
        assert_eq!(plan.merge.kind, BlockKind::Merge);
        assert_eq!(plan.merge.data_lo, 0);
        assert_eq!(plan.merge.data_hi, 2);
        assert_eq!(plan.merge.ooo_lo, 1);
        assert_eq!(plan.merge.ooo_hi, 1);
        assert_eq!(plan.suffix, Block::NONE);
    }

    /// Case B boundary: the bsearch window between prefix and suffix
    /// collapses to zero data rows, so the merge degrades to a pure `OO`
    /// block (§9's open question, pinned to the literal table text).
    #[test]
    fn test_case_b_degrades_to_oo_on_empty_data_window() {
        let data = [10, 20, 30, 40, 50];
        let ooo = [21, 22];
        let plan = classify(&data, &ooo, 0, 1);

        assert_eq!(plan.prefix, Block::data(0, 1));
        assert_eq!(plan.merge.kind, BlockKind::Oo);
        assert!(plan.merge.data_is_empty());
        assert_eq!(plan.suffix, Block::data(3, 4));
    }

    /// Case F boundary: the OOO window between prefix and suffix collapses
    /// to zero rows, so the merge degrades to a pure `DATA` block.
    #[test]
    fn test_case_f_degrades_to_data_on_empty_ooo_window() {
        let data = [30];
        let ooo = [10, 30, 50];
        let plan = classify(&data, &ooo, 0, 2);

        assert_eq!(plan.prefix, Block::oo(0, 1));
        assert_eq!(plan.merge.kind, BlockKind::Data);
        assert!(plan.merge.ooo_is_empty());
        assert_eq!(plan.suffix, Block::oo(2, 2));
    }

    #[test]
    fn test_coverage_property_case_c() {
        let data = [10, 20, 30];
        let ooo = [15, 40, 50];
        let plan = classify(&data, &ooo, 10, 12);

        let mut data_count = 0i64;
        let mut ooo_count = 0i64;
        for block in [plan.prefix, plan.suffix] {
            match block.kind {
                BlockKind::Data => data_count += block.len(),
                BlockKind::Oo => ooo_count += block.len(),
                BlockKind::None => {}
                BlockKind::Merge => unreachable!("prefix/suffix are never Merge"),
            }
        }
        if !plan.merge.data_is_empty() {
            data_count += plan.merge.data_hi - plan.merge.data_lo + 1;
        }
        if !plan.merge.ooo_is_empty() {
            ooo_count += plan.merge.ooo_hi - plan.merge.ooo_lo + 1;
        }

        assert_eq!(data_count, data.len() as i64);
        assert_eq!(ooo_count, ooo.len() as i64);
    }
}
