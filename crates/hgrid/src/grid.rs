//! The hierarchical grid itself: insertion, removal, and the collision
//! query engine.

use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::aabb::Aabb;
use crate::cell::{CellId, CellMap};
use crate::error::HGridError;
use crate::level::{
    encode_box, select_level, GLOBAL_BITS, LEVEL_FACTOR, LOCAL_BITS, MAX_LEVEL, SPILL_MAX,
};
use crate::link::{Link, LinkArena, NIL};
use crate::occupancy::{cell_bit, range_mask};
use crate::overlap::{overlap_box, overlap_cross, overlap_local, overlap_same_level};

/// Handle to one inserted link, returned by [`HGrid::add`].
///
/// Retaining the handle makes [`HGrid::remove_link`] O(1). A handle is
/// consumed by removal; holding onto it afterwards is a logic error on
/// the caller's side (the slot may be reused by a later insertion).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRef {
    pub(crate) cell: CellId,
    pub(crate) index: u32,
}

impl LinkRef {
    /// The cell the link was inserted into.
    #[must_use]
    pub fn cell(&self) -> CellId {
        self.cell
    }
}

/// A multi-resolution broad-phase index over axis-aligned bounding boxes.
///
/// Objects are opaque handles (`T`); the grid stores one link per inserted
/// object in the cell selected by the object's extent and answers
/// "which pairs overlap" without testing every pair. Not reentrant:
/// mutating the grid from inside a query callback is not supported, so
/// callers buffer mutations and apply them after the query returns.
///
/// # Example
///
/// ```
/// use hgrid::HGrid;
/// use nalgebra::Point3;
///
/// let mut grid = HGrid::new(1024.0).unwrap();
/// grid.add(1u32, &Point3::new(0.0, 0.0, 0.0), 300.0);
/// grid.add(2u32, &Point3::new(100.0, 100.0, 100.0), 50.0);
///
/// let mut pairs = Vec::new();
/// grid.find_all_collisions(|a, b| pairs.push((a, b)));
/// assert_eq!(pairs.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct HGrid<T> {
    max_cell_size: f64,
    cells: CellMap,
    links: LinkArena<T>,
}

impl<T: Copy + PartialEq> HGrid<T> {
    /// Creates a grid whose coarsest (level 0) cells have the given
    /// linear size.
    ///
    /// # Errors
    ///
    /// Returns [`HGridError::InvalidCellSize`] if `max_cell_size` is not
    /// positive and finite; a degenerate scale would corrupt the shared
    /// fixed-point coordinate space.
    pub fn new(max_cell_size: f64) -> Result<Self, HGridError> {
        if !max_cell_size.is_finite() || max_cell_size <= 0.0 {
            return Err(HGridError::InvalidCellSize(max_cell_size));
        }
        Ok(Self {
            max_cell_size,
            cells: CellMap::default(),
            links: LinkArena::new(),
        })
    }

    /// The linear size of level 0 cells.
    #[must_use]
    pub fn max_cell_size(&self) -> f64 {
        self.max_cell_size
    }

    /// The linear cell size at a level.
    ///
    /// # Errors
    ///
    /// Returns [`HGridError::LevelOutOfRange`] for levels beyond
    /// [`MAX_LEVEL`].
    #[allow(clippy::cast_possible_wrap)]
    pub fn cell_size(&self, level: u32) -> Result<f64, HGridError> {
        if level > MAX_LEVEL {
            return Err(HGridError::LevelOutOfRange {
                level,
                max: MAX_LEVEL,
            });
        }
        Ok(self.max_cell_size * LEVEL_FACTOR.powi(level as i32))
    }

    /// Number of cells in the backing map, including cells that exist
    /// only to carry occupancy bits for finer descendants.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of live links (inserted objects).
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// `true` if no objects are inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.len() == 0
    }

    /// Inserts an object with a cubic extent anchored at `corner`.
    ///
    /// The level is chosen from `size` per [`select_level`]; insertion is
    /// total (oversized extents land at level 0, degenerate ones at the
    /// finest level). Returns a handle for O(1) removal.
    pub fn add(&mut self, object: T, corner: &Point3<f64>, size: f64) -> LinkRef {
        let max = corner + Vector3::repeat(size);
        self.insert(object, corner, &max, size)
    }

    /// Inserts an object with an arbitrary bounding box.
    ///
    /// The level is chosen from the box's largest extent; the per-axis
    /// local footprint keeps the true corners.
    pub fn add_box(&mut self, object: T, bounds: &Aabb) -> LinkRef {
        self.insert(object, &bounds.min, &bounds.max, bounds.max_extent())
    }

    /// Removes an object previously inserted with the same `corner` and
    /// `size`.
    ///
    /// The caller must pass the extent used at insertion, not the
    /// object's current one, or the lookup lands in the wrong cell.
    /// Returns `false` (and logs a warning) when no matching link is
    /// found.
    pub fn remove(&mut self, object: T, corner: &Point3<f64>, size: f64) -> bool {
        let max = corner + Vector3::repeat(size);
        self.detach(object, corner, &max, size)
    }

    /// Removes an object previously inserted with the same bounding box.
    pub fn remove_box(&mut self, object: T, bounds: &Aabb) -> bool {
        self.detach(object, &bounds.min, &bounds.max, bounds.max_extent())
    }

    /// Removes a link by the handle returned from [`HGrid::add`], in O(1).
    ///
    /// Returns `false` (and logs a warning) when the handle's cell no
    /// longer exists.
    pub fn remove_link(&mut self, link: LinkRef) -> bool {
        if !self.cells.contains_key(&link.cell) {
            warn!(id = ?link.cell, "remove_link: cell no longer exists");
            return false;
        }
        self.unlink(&link.cell, link.index);
        self.release(link.cell);
        true
    }

    /// Empties every cell and returns all links to the pool.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.links.clear();
    }

    fn insert(&mut self, object: T, min: &Point3<f64>, max: &Point3<f64>, extent: f64) -> LinkRef {
        let (level, cell_size) = select_level(self.max_cell_size, extent);
        let (id, local_min, local_max) = compress(min, max, level, cell_size);

        let head = self.cells.entry(id).or_default().head;
        let index = self.links.alloc(Link {
            min: local_min,
            max: local_max,
            object,
            prev: NIL,
            next: head,
        });
        if head != NIL {
            self.links.get_mut(head).prev = index;
        }
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.head = index;
        }

        // Record the path to this cell in every ancestor's occupancy
        // mask. An already-set bit means the rest of the path is marked.
        let mut cur = id;
        while cur.level > 0 {
            let bit = cell_bit(&cur);
            cur = cur.parent();
            let cell = self.cells.entry(cur).or_default();
            if cell.occupancy & bit != 0 {
                break;
            }
            cell.occupancy |= bit;
        }

        LinkRef { cell: id, index }
    }

    fn detach(&mut self, object: T, min: &Point3<f64>, max: &Point3<f64>, extent: f64) -> bool {
        let (level, cell_size) = select_level(self.max_cell_size, extent);
        let (id, _, _) = compress(min, max, level, cell_size);

        let Some(cell) = self.cells.get(&id) else {
            warn!(?id, "remove: cell not found");
            return false;
        };
        let mut l = cell.head;
        while l != NIL {
            let link = self.links.get(l);
            let next = link.next;
            if link.object == object {
                self.unlink(&id, l);
                self.release(id);
                return true;
            }
            l = next;
        }
        warn!(?id, "remove: no matching object in cell");
        false
    }

    /// Unlinks a slot from its cell chain and returns it to the pool.
    fn unlink(&mut self, id: &CellId, index: u32) {
        let (prev, next) = {
            let link = self.links.get(index);
            (link.prev, link.next)
        };
        if next != NIL {
            self.links.get_mut(next).prev = prev;
        }
        if prev != NIL {
            self.links.get_mut(prev).next = next;
        } else if let Some(cell) = self.cells.get_mut(id) {
            cell.head = next;
        }
        self.links.free(index);
    }

    /// Erases the cell if it holds neither links nor occupied
    /// descendants, then clears and cascades through ancestor occupancy
    /// bits. A cell with live descendants stays even when its own link
    /// list is empty, so coarse-to-fine descent never dangles.
    fn release(&mut self, mut id: CellId) {
        loop {
            match self.cells.get(&id) {
                Some(cell) if cell.head == NIL && cell.occupancy == 0 => {
                    self.cells.remove(&id);
                }
                _ => return,
            }
            if id.level == 0 {
                return;
            }
            let bit = cell_bit(&id);
            id = id.parent();
            if let Some(parent) = self.cells.get_mut(&id) {
                parent.occupancy &= !bit;
            } else {
                return;
            }
        }
    }

    /// Invokes `f` once for every unordered pair of inserted objects
    /// whose boxes overlap.
    ///
    /// For each link this tests the rest of its own cell's chain, then
    /// the same-level neighbor cells its footprint spills into (forward
    /// half-space only, so a cross-cell pair is tested from one side),
    /// then every coarser cell its footprint can reach. Cross-level
    /// pairs are found from the finer side exclusively.
    pub fn find_all_collisions<F: FnMut(T, T)>(&self, mut f: F) {
        for (id, cell) in &self.cells {
            let mut l = cell.head;
            while l != NIL {
                let link = self.links.get(l);
                let next = link.next;

                // Pairs within this cell.
                let mut l2 = next;
                while l2 != NIL {
                    let other = self.links.get(l2);
                    if overlap_local(link, other) {
                        f(link.object, other.object);
                    }
                    l2 = other.next;
                }

                // Same-level neighbors, driven by the link's spill bits.
                let sx = i32::from(link.max[0] >> LOCAL_BITS);
                let sy = i32::from(link.max[1] >> LOCAL_BITS);
                let sz = i32::from(link.max[2] >> LOCAL_BITS);
                for dz in 0..=sz {
                    let y_lo = if dz == 0 { 0 } else { -1 };
                    for dy in y_lo..=sy {
                        let x_lo = if dz == 0 && dy == 0 { 1 } else { -1 };
                        for dx in x_lo..=sx {
                            self.collide_neighbor(id, link, dx, dy, dz, &mut f);
                        }
                    }
                }

                // Coarser cells reachable from this link's footprint:
                // walk the parents of both the home cell and the
                // farthest spilled-into cell, checking one cell of slack
                // below and the spill span above.
                let mut c0 = *id;
                let mut c1 = CellId::new(id.x + sx, id.y + sy, id.z + sz, id.level);
                while c0.level > 0 {
                    c0 = c0.parent();
                    c1 = c1.parent();
                    for dz in -1..=(c1.z - c0.z) {
                        for dy in -1..=(c1.y - c0.y) {
                            for dx in -1..=(c1.x - c0.x) {
                                let pid =
                                    CellId::new(c0.x + dx, c0.y + dy, c0.z + dz, c0.level);
                                self.collide_ancestor(id, link, &pid, &mut f);
                            }
                        }
                    }
                }

                l = next;
            }
        }
    }

    /// Invokes `f` once per inserted object whose box overlaps `bounds`,
    /// passing `(object, query)`.
    ///
    /// Scans the level 0 cells the box footprint can reach (one cell of
    /// slack below the minimum corner for neighbor spill) and descends
    /// into finer levels only where the occupancy mask has bits inside
    /// the box's range.
    ///
    /// # Example
    ///
    /// ```
    /// use hgrid::{Aabb, HGrid};
    /// use nalgebra::Point3;
    ///
    /// let mut grid = HGrid::new(1024.0).unwrap();
    /// grid.add(1u32, &Point3::new(0.0, 0.0, 0.0), 300.0);
    /// grid.add(2u32, &Point3::new(100.0, 100.0, 100.0), 50.0);
    ///
    /// let query = Aabb::from_corner_size(Point3::new(90.0, 90.0, 90.0), 20.0);
    /// let mut hits = Vec::new();
    /// grid.find_collisions(99u32, &query, |obj, _| hits.push(obj));
    /// hits.sort_unstable();
    /// assert_eq!(hits, vec![1, 2]);
    /// ```
    #[allow(clippy::cast_possible_truncation)]
    pub fn find_collisions<F: FnMut(T, T)>(&self, query: T, bounds: &Aabb, mut f: F) {
        let (min, max) = encode_box(bounds, self.max_cell_size);
        for x in ((min[0] >> GLOBAL_BITS) - 1)..=(max[0] >> GLOBAL_BITS) {
            for y in ((min[1] >> GLOBAL_BITS) - 1)..=(max[1] >> GLOBAL_BITS) {
                for z in ((min[2] >> GLOBAL_BITS) - 1)..=(max[2] >> GLOBAL_BITS) {
                    let id = CellId::new(x as i32, y as i32, z as i32, 0);
                    self.collide_box(&id, &min, &max, query, &mut f);
                }
            }
        }
    }

    /// Tests a link against everything in one same-level neighbor cell.
    fn collide_neighbor<F: FnMut(T, T)>(
        &self,
        id: &CellId,
        link: &Link<T>,
        dx: i32,
        dy: i32,
        dz: i32,
        f: &mut F,
    ) {
        let nid = CellId::new(id.x + dx, id.y + dy, id.z + dz, id.level);
        let Some(cell) = self.cells.get(&nid) else {
            return;
        };
        let mut l = cell.head;
        while l != NIL {
            let other = self.links.get(l);
            if overlap_same_level(id, link, &nid, other) {
                f(link.object, other.object);
            }
            l = other.next;
        }
    }

    /// Tests a link against everything in one coarser cell.
    fn collide_ancestor<F: FnMut(T, T)>(
        &self,
        id: &CellId,
        link: &Link<T>,
        pid: &CellId,
        f: &mut F,
    ) {
        let Some(cell) = self.cells.get(pid) else {
            return;
        };
        let mut l = cell.head;
        while l != NIL {
            let other = self.links.get(l);
            if overlap_cross(id, link, pid, other) {
                f(link.object, other.object);
            }
            l = other.next;
        }
    }

    /// Tests a query box against one cell's links, then recurses into
    /// the occupied children inside the box's reach.
    fn collide_box<F: FnMut(T, T)>(
        &self,
        id: &CellId,
        min: &[i64; 3],
        max: &[i64; 3],
        query: T,
        f: &mut F,
    ) {
        let Some(cell) = self.cells.get(id) else {
            return;
        };
        let mut l = cell.head;
        while l != NIL {
            let link = self.links.get(l);
            if overlap_box(min, max, id, link) {
                f(link.object, query);
            }
            l = link.next;
        }

        if cell.occupancy == 0 || id.level >= MAX_LEVEL {
            return;
        }
        let mut vmask = cell.occupancy & range_mask(id, min, max);
        if vmask == 0 {
            return;
        }
        let base = id.child_base();
        for z in 0..4 {
            if vmask & 0xffff == 0 {
                vmask >>= 16;
                continue;
            }
            for y in 0..4 {
                if vmask & 0xf == 0 {
                    vmask >>= 4;
                    continue;
                }
                for x in 0..4 {
                    if vmask & 1 != 0 {
                        let child = CellId::new(base.x + x, base.y + y, base.z + z, base.level);
                        self.collide_box(&child, min, max, query, f);
                    }
                    vmask >>= 1;
                }
            }
        }
    }
}

/// Computes the cell a box's minimum corner lands in at a level, plus
/// the box's cell-local fixed-point footprint.
///
/// The minimum is inherently within the cell; the maximum keeps up to
/// one full cell of spill and clamps past that (only possible for
/// extents above the coarsest cell size, which stay at level 0).
#[allow(clippy::cast_possible_truncation)]
fn compress(
    min: &Point3<f64>,
    max: &Point3<f64>,
    level: u32,
    cell_size: f64,
) -> (CellId, [u8; 3], [u8; 3]) {
    let scale = f64::from(1u32 << LOCAL_BITS) / cell_size;
    let mut coords = [0i32; 3];
    let mut local_min = [0u8; 3];
    let mut local_max = [0u8; 3];
    for axis in 0..3 {
        let g0 = (min[axis] * scale).floor() as i64;
        let g1 = (max[axis] * scale).floor() as i64;
        let c = g0 >> LOCAL_BITS;
        let lo = g0 - (c << LOCAL_BITS);
        coords[axis] = c as i32;
        local_min[axis] = lo as u8;
        local_max[axis] = (g1 - (c << LOCAL_BITS)).clamp(lo, SPILL_MAX) as u8;
    }
    (
        CellId::new(coords[0], coords[1], coords[2], level),
        local_min,
        local_max,
    )
}
