use std::collections::BTreeSet;

/// Allocates and recycles unique `u32` indices with liveness tracking.
///
/// Used by the renderer registry to hand out texture handles. Freed
/// indices are recycled lowest-first, so handle values stay compact.
/// Freeing an index that is not live is reported instead of corrupting
/// the pool.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::new();
/// let a = alloc.alloc();  // 0
/// let b = alloc.alloc();  // 1
/// alloc.free(a);          // true, 0 is available again
/// alloc.free(a);          // false, already free
/// let c = alloc.alloc();  // 0 (recycled)
/// ```
#[derive(Debug, Default)]
pub struct SlotAllocator {
    free: BTreeSet<u32>,
    live: Vec<bool>,
    len: u32,
}

impl SlotAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the lowest available index
    pub fn alloc(&mut self) -> u32 {
        self.len += 1;
        match self.free.pop_first() {
            Some(id) => {
                self.live[id as usize] = true;
                id
            }
            None => {
                self.live.push(true);
                (self.live.len() - 1) as u32
            }
        }
    }

    /// Return an index to the pool
    ///
    /// Returns `false` if `id` was never allocated or is already free.
    pub fn free(&mut self, id: u32) -> bool {
        match self.live.get_mut(id as usize) {
            Some(live) if *live => {
                *live = false;
                self.free.insert(id);
                self.len -= 1;
                true
            }
            _ => false,
        }
    }

    /// Whether `id` is currently allocated
    pub fn is_live(&self, id: u32) -> bool {
        self.live.get(id as usize).copied().unwrap_or(false)
    }

    /// Highest index ever allocated + 1
    pub fn high_water_mark(&self) -> u32 {
        self.live.len() as u32
    }

    /// Number of currently allocated indices
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no index is currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
