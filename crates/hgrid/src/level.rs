//! Level geometry and the fixed-point coordinate codec.
//!
//! Every level of the grid shares one global fixed-point coordinate space
//! with [`GLOBAL_BITS`] bits of precision relative to the coarsest cell
//! size. A cell at `level` is `4x` smaller per axis than one at
//! `level - 1`, so moving one level costs [`LEVEL_BITS`] bits per axis and
//! each cell keeps [`LOCAL_BITS`] bits of intra-cell precision. The budget
//! split is a checked compile-time invariant, not a convention.

use nalgebra::Point3;

use crate::aabb::Aabb;

/// Linear shrink factor between consecutive levels (4x smaller per axis).
pub const LEVEL_FACTOR: f64 = 0.25;

/// Deepest (finest) level the fixed-point coordinate space can address.
pub const MAX_LEVEL: u32 = 10;

/// Bits of intra-cell precision per axis (128 subdivisions).
pub const LOCAL_BITS: u32 = 7;

/// Bits of relative precision between adjacent levels.
pub const LEVEL_BITS: u32 = 2;

/// Total bits of global fixed-point precision relative to the coarsest
/// cell size.
pub const GLOBAL_BITS: u32 = 27;

// The global budget must cover every level plus the intra-cell precision.
const _: () = assert!(GLOBAL_BITS >= LEVEL_BITS * MAX_LEVEL + LOCAL_BITS);

/// Largest intra-cell coordinate including one cell of spill.
pub(crate) const SPILL_MAX: i64 = (1 << (LOCAL_BITS + 1)) - 1;

/// Selects the resolution level for an object extent.
///
/// Starting at level 0 (cell size `max_cell_size`), descends while the
/// extent is smaller than a `LEVEL_FACTOR` fraction of the cell, so the
/// chosen cell size `c` satisfies `extent >= c * LEVEL_FACTOR` and
/// (below level 0) `extent < c`. Zero and degenerate extents clamp to
/// [`MAX_LEVEL`]; extents of at least `max_cell_size * LEVEL_FACTOR`
/// stay at level 0.
///
/// Returns the level and its cell size.
///
/// # Example
///
/// ```
/// use hgrid::select_level;
///
/// assert_eq!(select_level(1024.0, 300.0), (0, 1024.0));
/// assert_eq!(select_level(1024.0, 50.0), (2, 64.0));
/// assert_eq!(select_level(1024.0, 0.0).0, hgrid::MAX_LEVEL);
/// ```
#[must_use]
pub fn select_level(max_cell_size: f64, extent: f64) -> (u32, f64) {
    let mut level = 0;
    let mut cell_size = max_cell_size;
    let mut next = cell_size * LEVEL_FACTOR;
    while extent < next && level < MAX_LEVEL {
        cell_size = next;
        next *= LEVEL_FACTOR;
        level += 1;
    }
    (level, cell_size)
}

/// Encodes a world-space point into global fixed-point coordinates.
///
/// `encode(p) = floor(p * 2^GLOBAL_BITS / max_cell_size)` per axis.
/// Truncation is toward negative infinity so adjacent negative and
/// positive coordinates partition without a gap at cell boundaries.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn encode(point: &Point3<f64>, max_cell_size: f64) -> [i64; 3] {
    let scale = f64::from(1u32 << GLOBAL_BITS) / max_cell_size;
    [
        (point.x * scale).floor() as i64,
        (point.y * scale).floor() as i64,
        (point.z * scale).floor() as i64,
    ]
}

/// Encodes both corners of a world-space box.
#[must_use]
pub(crate) fn encode_box(aabb: &Aabb, max_cell_size: f64) -> ([i64; 3], [i64; 3]) {
    (
        encode(&aabb.min, max_cell_size),
        encode(&aabb.max, max_cell_size),
    )
}
