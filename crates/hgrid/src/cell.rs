//! Cell identifiers, the cell hash, and per-cell storage.

use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash, Hasher};

use nalgebra::Point3;

use crate::level::LEVEL_BITS;
use crate::link::NIL;

/// Identifies one cell of the multi-resolution grid.
///
/// Cells at `level` have linear size `max_cell_size * 0.25^level`; the
/// integer coordinates index the cell lattice at that level. Equality is
/// exact field equality.
///
/// # Example
///
/// ```
/// use hgrid::CellId;
///
/// let id = CellId::new(3, -2, 0, 1);
/// assert_eq!(id.parent(), CellId::new(0, -1, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId {
    /// X lattice coordinate at this level.
    pub x: i32,
    /// Y lattice coordinate at this level.
    pub y: i32,
    /// Z lattice coordinate at this level.
    pub z: i32,
    /// Resolution level; 0 is coarsest.
    pub level: u32,
}

impl CellId {
    /// Creates a cell identifier from raw lattice coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32, level: u32) -> Self {
        Self { x, y, z, level }
    }

    /// Identifies the cell containing a world-space corner at a level.
    ///
    /// Coordinates floor toward negative infinity, consistent with the
    /// fixed-point codec.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_corner(corner: Point3<f64>, level: u32, cell_size: f64) -> Self {
        Self {
            x: (corner.x / cell_size).floor() as i32,
            y: (corner.y / cell_size).floor() as i32,
            z: (corner.z / cell_size).floor() as i32,
            level,
        }
    }

    /// Returns the lattice coordinates as an array.
    #[must_use]
    pub const fn coords(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns the enclosing cell one level coarser.
    ///
    /// Must not be called at level 0.
    #[must_use]
    pub fn parent(self) -> Self {
        debug_assert!(self.level > 0);
        Self {
            x: self.x >> LEVEL_BITS,
            y: self.y >> LEVEL_BITS,
            z: self.z >> LEVEL_BITS,
            level: self.level - 1,
        }
    }

    /// Returns the first (minimum-corner) child cell one level finer.
    ///
    /// The children of this cell occupy the 4x4x4 block starting there.
    #[must_use]
    pub fn child_base(self) -> Self {
        Self {
            x: self.x << LEVEL_BITS,
            y: self.y << LEVEL_BITS,
            z: self.z << LEVEL_BITS,
            level: self.level + 1,
        }
    }
}

impl Hash for CellId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Field order is part of the hash contract.
        state.write_i32(self.x);
        state.write_i32(self.y);
        state.write_i32(self.z);
        state.write_u32(self.level);
    }
}

/// DJB2-style multiplicative hasher for [`CellId`] keys.
///
/// Seeds with 5381 and folds each field as `h = h * 33 + field`, in
/// x, y, z, level order. Deterministic across runs and processes, which
/// the backing map relies on for correctness, not just distribution.
#[derive(Debug, Clone)]
pub struct CellIdHasher {
    state: u64,
}

impl Default for CellIdHasher {
    fn default() -> Self {
        Self { state: 5381 }
    }
}

impl Hasher for CellIdHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state = self.state.wrapping_mul(33).wrapping_add(u64::from(b));
        }
    }

    fn write_i32(&mut self, i: i32) {
        #[allow(clippy::cast_sign_loss)]
        let field = u64::from(i as u32);
        self.state = self.state.wrapping_mul(33).wrapping_add(field);
    }

    fn write_u32(&mut self, i: u32) {
        self.state = self.state.wrapping_mul(33).wrapping_add(u64::from(i));
    }
}

/// The backing map, keyed by [`CellId`] with the DJB2 hasher.
pub(crate) type CellMap = HashMap<CellId, Cell, BuildHasherDefault<CellIdHasher>>;

/// Per-cell storage: the head of the intrusive link chain plus a 64-bit
/// occupancy summary over the cell's virtual 4x4x4 sub-grid.
///
/// A zero occupancy bit guarantees no descendant cell touches that
/// sub-region; a set bit is conservative. `head == NIL` means the cell
/// holds no links of its own (it may still exist for its occupancy bits).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cell {
    pub occupancy: u64,
    pub head: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            occupancy: 0,
            head: NIL,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hash_of(id: CellId) -> u64 {
        let mut hasher = CellIdHasher::default();
        id.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_equality_is_exact() {
        let a = CellId::new(1, 2, 3, 0);
        assert_eq!(a, CellId::new(1, 2, 3, 0));
        assert_ne!(a, CellId::new(1, 2, 3, 1));
        assert_ne!(a, CellId::new(3, 2, 1, 0));
    }

    #[test]
    fn test_hash_deterministic() {
        let id = CellId::new(-7, 12, 3, 4);
        assert_eq!(hash_of(id), hash_of(id));
    }

    #[test]
    fn test_hash_matches_djb2() {
        // h = 5381; h = h*33 + field for x, y, z, level.
        let id = CellId::new(1, 2, 3, 4);
        let mut expected: u64 = 5381;
        for field in [1u64, 2, 3, 4] {
            expected = expected.wrapping_mul(33).wrapping_add(field);
        }
        assert_eq!(hash_of(id), expected);
    }

    #[test]
    fn test_hash_field_order_matters() {
        assert_ne!(
            hash_of(CellId::new(1, 2, 3, 4)),
            hash_of(CellId::new(2, 1, 3, 4))
        );
    }

    #[test]
    fn test_from_corner_floors() {
        let id = CellId::from_corner(nalgebra::Point3::new(100.0, -0.5, 1023.9), 0, 1024.0);
        assert_eq!(id, CellId::new(0, -1, 0, 0));
    }

    #[test]
    fn test_parent_child_roundtrip() {
        let id = CellId::new(5, 6, 7, 2);
        let base = id.parent().child_base();
        // The child base is the origin of the 4x4x4 block containing id.
        assert_eq!(base.level, 2);
        assert!(base.x <= id.x && id.x < base.x + 4);
        assert!(base.y <= id.y && id.y < base.y + 4);
        assert!(base.z <= id.z && id.z < base.z + 4);
    }

    #[test]
    fn test_parent_negative_coords() {
        // Arithmetic shift keeps negative coordinates on the right lattice.
        let id = CellId::new(-1, -4, -5, 3);
        assert_eq!(id.parent(), CellId::new(-1, -1, -2, 2));
    }

    #[test]
    fn test_map_roundtrip() {
        let mut map: CellMap = CellMap::default();
        map.insert(CellId::new(1, 2, 3, 0), Cell::default());
        assert!(map.contains_key(&CellId::new(1, 2, 3, 0)));
        assert!(!map.contains_key(&CellId::new(1, 2, 3, 1)));
    }
}
