//! Hierarchical spatial grid broad-phase for collision detection.
//!
//! This crate provides [`HGrid`], a multi-resolution spatial index over
//! axis-aligned bounding boxes. It answers "which pairs of objects
//! overlap" and "which objects overlap this box" without testing every
//! pair, which keeps per-step collision enumeration close to linear in
//! the number of occupied cells plus true overlaps:
//!
//! - [`HGrid`] - The broad-phase index; objects are opaque `Copy` handles
//! - [`Aabb`] - World-space axis-aligned bounding box
//! - [`CellId`] - Integer cell coordinates plus resolution level
//! - [`LinkRef`] - Handle from [`HGrid::add`] for O(1) removal
//! - [`select_level`] - The extent-to-level sizing rule
//!
//! # How it works
//!
//! Level 0 cells have linear size `max_cell_size`; every level below is
//! 4x smaller per axis. An object lands at the coarsest level whose cell
//! it fills at least a quarter of, so small objects never drown in huge
//! cells and large ones never shatter across thousands of tiny ones.
//! All coordinates share one global fixed-point lattice, which makes
//! cross-level overlap tests pure integer shifts and compares. Each cell
//! carries a 64-bit occupancy summary of its 4x4x4 child block, letting
//! queries skip provably empty subtrees in O(1).
//!
//! # Example
//!
//! ```
//! use hgrid::{Aabb, HGrid};
//! use nalgebra::Point3;
//!
//! // Coarsest cells are 1024 units across.
//! let mut grid = HGrid::new(1024.0)?;
//!
//! // Objects are opaque handles; here, plain ids.
//! grid.add(1u32, &Point3::new(0.0, 0.0, 0.0), 300.0);
//! grid.add(2u32, &Point3::new(100.0, 100.0, 100.0), 50.0);
//! grid.add(3u32, &Point3::new(5000.0, 0.0, 0.0), 50.0);
//!
//! // Enumerate every overlapping pair, regardless of level.
//! let mut pairs = Vec::new();
//! grid.find_all_collisions(|a, b| pairs.push((a, b)));
//! assert_eq!(pairs, vec![(2, 1)]);
//!
//! // Or collect everything touching a query box.
//! let query = Aabb::from_corner_size(Point3::new(4900.0, -10.0, -10.0), 200.0);
//! let mut hits = Vec::new();
//! grid.find_collisions(0u32, &query, |obj, _| hits.push(obj));
//! assert_eq!(hits, vec![3]);
//! # Ok::<(), hgrid::HGridError>(())
//! ```
//!
//! # Usage notes
//!
//! The grid is single-threaded and not reentrant: do not call `add` or
//! `remove` from inside a query callback; buffer mutations and apply
//! them afterwards. Removal must pass the same extent used at insertion
//! (or use the [`LinkRef`] handle), since the extent decides which cell
//! is searched.

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod aabb;
mod cell;
mod error;
mod grid;
mod level;
mod link;
mod occupancy;
mod overlap;

// Re-export core types
pub use aabb::Aabb;
pub use cell::{CellId, CellIdHasher};
pub use error::HGridError;
pub use grid::{HGrid, LinkRef};
pub use level::{select_level, GLOBAL_BITS, LEVEL_BITS, LEVEL_FACTOR, LOCAL_BITS, MAX_LEVEL};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
