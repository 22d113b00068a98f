//! Index-addressed arena for per-cell object links.
//!
//! Links are pooled in a `Vec` and addressed by `u32` index with [`NIL`]
//! as the null sentinel; freed slots are chained through their `next`
//! field for O(1) reuse. In-cell chains are doubly linked so a link can
//! be unlinked in O(1) given its index.

/// Null sentinel for link indices and chain ends.
pub(crate) const NIL: u32 = u32::MAX;

/// One (object, cell) insertion.
///
/// `min`/`max` hold the object's AABB clipped to the cell, in cell-local
/// fixed-point units: `min` in `[0, 127]`, `max` in `[min, 255]` (values
/// past 127 record spill into the next cell along that axis).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Link<T> {
    pub min: [u8; 3],
    pub max: [u8; 3],
    pub object: T,
    pub prev: u32,
    pub next: u32,
}

/// Pool of link records with free-list reuse.
#[derive(Debug, Clone)]
pub(crate) struct LinkArena<T> {
    slots: Vec<Link<T>>,
    free_head: u32,
    live: usize,
}

impl<T: Copy> LinkArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NIL,
            live: 0,
        }
    }

    /// Stores a link, reusing a freed slot when one is available.
    #[allow(clippy::cast_possible_truncation)]
    pub fn alloc(&mut self, link: Link<T>) -> u32 {
        self.live += 1;
        if self.free_head == NIL {
            debug_assert!(self.slots.len() < NIL as usize);
            let index = self.slots.len() as u32;
            self.slots.push(link);
            index
        } else {
            let index = self.free_head;
            self.free_head = self.slots[index as usize].next;
            self.slots[index as usize] = link;
            index
        }
    }

    /// Returns a slot to the free list. The caller must have unlinked it
    /// from its cell chain first.
    pub fn free(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.next = self.free_head;
        slot.prev = NIL;
        self.free_head = index;
        self.live -= 1;
    }

    pub fn get(&self, index: u32) -> &Link<T> {
        &self.slots[index as usize]
    }

    pub fn get_mut(&mut self, index: u32) -> &mut Link<T> {
        &mut self.slots[index as usize]
    }

    /// Number of live links.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Drops every slot, live or free.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = NIL;
        self.live = 0;
    }
}
