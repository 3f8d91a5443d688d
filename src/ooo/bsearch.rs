//! Binary-search locator (C2).
//!
//! Two flavors over sorted timestamp data: a plain `&[i64]` search, and a
//! strided search over packed `(timestamp, rowid)` pairs. Both honor
//! [`ScanDirection`] when the key has duplicates, and both return the nearest
//! in-range floor/ceiling index when the key is absent rather than failing.

/// Tie-break when the search key has duplicate entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Return the lowest index among equal keys.
    Up,
    /// Return the highest index among equal keys.
    Down,
}

/// Locates `value` in the ascending `&[i64]` timestamp array.
///
/// Returns the index of a matching entry (the lowest or highest among ties,
/// per `direction`), or, if `value` is absent, the nearest in-range index:
/// the floor index for `Down`, the ceiling index for `Up`. Returns `-1` if
/// `value` is below every entry (for `Down`) and `len` if above every entry
/// (for `Up`); callers clamp as their case requires.
pub fn bsearch64(data: &[i64], value: i64, direction: ScanDirection) -> i64 {
    if data.is_empty() {
        return -1;
    }

    let mut lo: i64 = 0;
    let mut hi: i64 = data.len() as i64 - 1;
    let mut result: i64 = -1;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let probe = data[mid as usize];
        match probe.cmp(&value) {
            std::cmp::Ordering::Equal => {
                result = mid;
                match direction {
                    ScanDirection::Down => lo = mid + 1,
                    ScanDirection::Up => hi = mid - 1,
                }
            }
            std::cmp::Ordering::Less => {
                if matches!(direction, ScanDirection::Down) {
                    result = mid;
                }
                lo = mid + 1;
            }
            std::cmp::Ordering::Greater => {
                if matches!(direction, ScanDirection::Up) {
                    result = mid;
                }
                hi = mid - 1;
            }
        }
    }

    result
}

/// Same semantics as [`bsearch64`], but over packed `(timestamp, rowid)`
/// pairs, searching on the timestamp component only.
pub fn bsearch_idx(pairs: &[(i64, i64)], value: i64, direction: ScanDirection) -> i64 {
    if pairs.is_empty() {
        return -1;
    }

    let mut lo: i64 = 0;
    let mut hi: i64 = pairs.len() as i64 - 1;
    let mut result: i64 = -1;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let probe = pairs[mid as usize].0;
        match probe.cmp(&value) {
            std::cmp::Ordering::Equal => {
                result = mid;
                match direction {
                    ScanDirection::Down => lo = mid + 1,
                    ScanDirection::Up => hi = mid - 1,
                }
            }
            std::cmp::Ordering::Less => {
                if matches!(direction, ScanDirection::Down) {
                    result = mid;
                }
                lo = mid + 1;
            }
            std::cmp::Ordering::Greater => {
                if matches!(direction, ScanDirection::Up) {
                    result = mid;
                }
                hi = mid - 1;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bsearch64_exact_no_dup() {
        let data = [10, 20, 30, 40, 50];
        assert_eq!(bsearch64(&data, 30, ScanDirection::Down), 2);
        assert_eq!(bsearch64(&data, 30, ScanDirection::Up), 2);
    }

    #[test]
    fn test_bsearch64_duplicates() {
        let data = [10, 20, 20, 20, 30];
        assert_eq!(bsearch64(&data, 20, ScanDirection::Down), 3);
        assert_eq!(bsearch64(&data, 20, ScanDirection::Up), 1);
    }

    #[test]
    fn test_bsearch64_absent_value() {
        let data = [10, 20, 30, 40];
        // 25 absent: DOWN returns floor (index of 20), UP returns ceil (index of 30).
        assert_eq!(bsearch64(&data, 25, ScanDirection::Down), 1);
        assert_eq!(bsearch64(&data, 25, ScanDirection::Up), 2);
    }

    #[test]
    fn test_bsearch64_out_of_range() {
        let data = [10, 20, 30];
        assert_eq!(bsearch64(&data, 5, ScanDirection::Down), -1);
        assert_eq!(bsearch64(&data, 100, ScanDirection::Up), 3);
    }

    #[test]
    fn test_bsearch_idx_duplicates() {
        let pairs = [(10, 0), (20, 1), (20, 2), (30, 3)];
        assert_eq!(bsearch_idx(&pairs, 20, ScanDirection::Down), 2);
        assert_eq!(bsearch_idx(&pairs, 20, ScanDirection::Up), 1);
    }

    #[test]
    fn test_bsearch_empty() {
        let data: [i64; 0] = [];
        assert_eq!(bsearch64(&data, 5, ScanDirection::Down), -1);
    }
}
