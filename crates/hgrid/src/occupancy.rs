//! Occupancy bitmask algebra over the virtual 4x4x4 sub-grid.
//!
//! Each cell summarizes which of its 64 child positions (2 bits per axis:
//! bit index `x | y << 2 | z << 4`) hold live descendants. The per-axis
//! clip tables used by [`range_mask`] are derived from that bit layout at
//! compile time rather than hard-coded.

use crate::cell::CellId;
use crate::level::{GLOBAL_BITS, LEVEL_BITS, MAX_LEVEL};

/// Coordinate of `bit` along `axis` in the 4x4x4 layout.
const fn bit_coord(bit: u32, axis: u32) -> u32 {
    (bit >> (axis * LEVEL_BITS)) & 3
}

const fn build_ge(axis: u32) -> [u64; 4] {
    let mut table = [0u64; 4];
    let mut threshold = 0;
    while threshold < 4 {
        let mut bit = 0;
        while bit < 64 {
            if bit_coord(bit, axis) >= threshold {
                table[threshold as usize] |= 1u64 << bit;
            }
            bit += 1;
        }
        threshold += 1;
    }
    table
}

const fn build_le(axis: u32) -> [u64; 4] {
    let mut table = [0u64; 4];
    let mut threshold = 0;
    while threshold < 4 {
        let mut bit = 0;
        while bit < 64 {
            if bit_coord(bit, axis) <= threshold {
                table[threshold as usize] |= 1u64 << bit;
            }
            bit += 1;
        }
        threshold += 1;
    }
    table
}

/// `GE[axis][i]`: bits whose coordinate along `axis` is at least `i`.
const GE: [[u64; 4]; 3] = [build_ge(0), build_ge(1), build_ge(2)];

/// `LE[axis][i]`: bits whose coordinate along `axis` is at most `i`.
const LE: [[u64; 4]; 3] = [build_le(0), build_le(1), build_le(2)];

/// The single-bit mask for a cell's position within its parent's 4x4x4
/// block (each coordinate taken modulo 4).
pub(crate) fn cell_bit(id: &CellId) -> u64 {
    1u64 << ((id.x & 3) | ((id.y & 3) << 2) | ((id.z & 3) << 4))
}

/// Which children of `id` a global fixed-point box `[min, max]` can
/// touch, including one child of slack below the minimum to cover links
/// spilling forward out of their own child cell.
pub(crate) fn range_mask(id: &CellId, min: &[i64; 3], max: &[i64; 3]) -> u64 {
    debug_assert!(id.level < MAX_LEVEL);
    let shift = GLOBAL_BITS - LEVEL_BITS * (id.level + 1);
    let base = id.coords();
    let mut mask = u64::MAX;
    for axis in 0..3 {
        let origin = i64::from(base[axis]) << LEVEL_BITS;
        let lo = (min[axis] >> shift) - origin - 1;
        let hi = (max[axis] >> shift) - origin;
        let lo_mask = if lo < 0 {
            u64::MAX
        } else if lo > 3 {
            0
        } else {
            GE[axis][usize::try_from(lo).unwrap_or(3)]
        };
        let hi_mask = if hi < 0 {
            0
        } else if hi > 3 {
            u64::MAX
        } else {
            LE[axis][usize::try_from(hi).unwrap_or(3)]
        };
        mask &= lo_mask & hi_mask;
    }
    mask
}
