//! Integer-only overlap predicates over cell-local fixed-point boxes.
//!
//! Because every level's cell boundaries align on the shared global
//! fixed-point lattice, ranges from different levels compare after a pure
//! shift of `LEVEL_BITS` per level of difference. All comparisons are
//! inclusive: boundary-touching boxes count as overlapping, and degenerate
//! (point) extents participate normally.

use crate::cell::CellId;
use crate::level::{LEVEL_BITS, LOCAL_BITS, MAX_LEVEL};
use crate::link::Link;

/// Shifts left for non-negative amounts, right for negative ones.
#[inline]
fn shift(value: i64, amount: i32) -> i64 {
    if amount >= 0 {
        value << amount
    } else {
        value >> -amount
    }
}

/// Overlap between two links in the same cell: the cell offset cancels,
/// so the local ranges compare directly.
pub(crate) fn overlap_local<T>(l0: &Link<T>, l1: &Link<T>) -> bool {
    for axis in 0..3 {
        if l0.min[axis] > l1.max[axis] || l0.max[axis] < l1.min[axis] {
            return false;
        }
    }
    true
}

/// Overlap between two links at the same level in different cells.
pub(crate) fn overlap_same_level<T>(
    id0: &CellId,
    l0: &Link<T>,
    id1: &CellId,
    l1: &Link<T>,
) -> bool {
    debug_assert_eq!(id0.level, id1.level);
    let c0 = id0.coords();
    let c1 = id1.coords();
    for axis in 0..3 {
        let a0 = (i64::from(c0[axis]) << LOCAL_BITS) + i64::from(l0.min[axis]);
        let a1 = (i64::from(c0[axis]) << LOCAL_BITS) + i64::from(l0.max[axis]);
        let b0 = (i64::from(c1[axis]) << LOCAL_BITS) + i64::from(l1.min[axis]);
        let b1 = (i64::from(c1[axis]) << LOCAL_BITS) + i64::from(l1.max[axis]);
        if a0 > b1 || a1 < b0 {
            return false;
        }
    }
    true
}

/// Overlap across levels: `l1`'s range is rescaled into `id0`'s units by
/// shifting `LEVEL_BITS` per level of difference, after widening its
/// closed maximum to the half-open cell edge.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn overlap_cross<T>(id0: &CellId, l0: &Link<T>, id1: &CellId, l1: &Link<T>) -> bool {
    let rescale = (id0.level as i32 - id1.level as i32) * LEVEL_BITS as i32;
    let c0 = id0.coords();
    let c1 = id1.coords();
    for axis in 0..3 {
        let a0 = (i64::from(c0[axis]) << LOCAL_BITS) + i64::from(l0.min[axis]);
        let a1 = (i64::from(c0[axis]) << LOCAL_BITS) + i64::from(l0.max[axis]) + 1;
        let base = i64::from(c1[axis]) << LOCAL_BITS;
        let b0 = shift(base + i64::from(l1.min[axis]), rescale);
        let b1 = shift(base + i64::from(l1.max[axis]) + 1, rescale);
        if a0 > b1 || a1 < b0 {
            return false;
        }
    }
    true
}

/// Overlap between a global fixed-point box (expressed at the
/// [`MAX_LEVEL`] reference frame, i.e. raw codec units) and a link.
pub(crate) fn overlap_box<T>(min: &[i64; 3], max: &[i64; 3], id: &CellId, l: &Link<T>) -> bool {
    debug_assert!(id.level <= MAX_LEVEL);
    let rescale = LEVEL_BITS * (MAX_LEVEL - id.level);
    let coords = id.coords();
    for axis in 0..3 {
        let base = i64::from(coords[axis]) << LOCAL_BITS;
        let lo = (base + i64::from(l.min[axis])) << rescale;
        let hi = (base + i64::from(l.max[axis]) + 1) << rescale;
        if lo > max[axis] || hi < min[axis] {
            return false;
        }
    }
    true
}
