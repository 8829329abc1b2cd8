//! Many Fibonacci heaps sharing one node store
//!
//! A [`FibonacciForest`] owns a single arena and any number of heaps, each
//! named by a [`HeapId`]. Since every node already lives in the shared arena,
//! [`FibonacciForest::unite`] is a root-list splice and a minimum comparison:
//! O(1), with no node moved or re-keyed. Handles issued before a union stay
//! valid for the united heap.
//!
//! Each node records the tag of the heap it was inserted into. Tags of united
//! heaps are joined in a small union-find, so checking that a handle belongs to
//! a heap costs an inverse-Ackermann lookup rather than a walk up the tree.

use crate::config::HeapConfig;
use crate::fibonacci::{Core, FibonacciHandle, InvariantViolation, Roots};
use crate::traits::{next_heap_id, HeapError};
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

new_key_type! {
    /// Names one heap inside a [`FibonacciForest`]
    pub struct HeapId;
}

#[derive(Debug)]
struct HeapEntry {
    roots: Roots,
    /// Union-find representative of every tag merged into this heap
    tag: usize,
}

/// A pool of Fibonacci heaps backed by one arena
///
/// # Example
///
/// ```rust
/// use fibheap::forest::FibonacciForest;
///
/// let mut forest = FibonacciForest::default();
/// let a = forest.new_heap();
/// let b = forest.new_heap();
/// let handle = forest.insert(a, 5, "five").unwrap();
/// forest.insert(b, 3, "three").unwrap();
///
/// let united = forest.unite(a, b).unwrap();
/// forest.decrease_key(united, &handle, 1).unwrap();
/// assert_eq!(forest.extract_min(united), Ok((1, "five")));
/// assert_eq!(forest.len(united), Ok(1));
/// ```
#[derive(Debug)]
pub struct FibonacciForest<T, P: Ord> {
    core: Core<T, P>,
    heaps: SlotMap<HeapId, HeapEntry>,
    /// Union-find parent per tag; a root names itself
    tags: Vec<usize>,
    ranks: Vec<u8>,
    id: u64,
}

impl<T, P: Ord> FibonacciForest<T, P> {
    /// Creates an empty forest. `config.capacity` pre-sizes the shared arena.
    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            core: Core::new(config),
            heaps: SlotMap::with_key(),
            tags: Vec::new(),
            ranks: Vec::new(),
            id: next_heap_id(),
        }
    }

    /// Returns the configuration the forest was built with.
    pub fn config(&self) -> HeapConfig {
        self.core.config
    }

    /// Adds an empty heap to the forest.
    pub fn new_heap(&mut self) -> HeapId {
        let tag = self.tags.len();
        self.tags.push(tag);
        self.ranks.push(0);
        self.heaps.insert(HeapEntry {
            roots: Roots::default(),
            tag,
        })
    }

    /// Number of live heaps.
    pub fn heap_count(&self) -> usize {
        self.heaps.len()
    }

    /// Number of elements across all heaps, which is the arena occupancy.
    pub fn node_count(&self) -> usize {
        self.core.arena.len()
    }

    pub fn len(&self, heap: HeapId) -> Result<usize, HeapError> {
        Ok(self.entry(heap)?.roots.len)
    }

    pub fn is_empty(&self, heap: HeapId) -> Result<bool, HeapError> {
        Ok(self.entry(heap)?.roots.min.is_none())
    }

    /// Inserts an element into `heap`.
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if `heap` is not a live heap of this forest.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn insert(
        &mut self,
        heap: HeapId,
        priority: P,
        item: T,
    ) -> Result<FibonacciHandle, HeapError> {
        let entry = self.heaps.get_mut(heap).ok_or(HeapError::InvalidHandle)?;
        let node = self
            .core
            .insert(&mut entry.roots, priority, item, entry.tag);
        Ok(FibonacciHandle {
            heap: self.id,
            node,
        })
    }

    /// # Errors
    /// [`HeapError::InvalidHandle`] for an unknown heap,
    /// [`HeapError::EmptyHeap`] if it holds nothing.
    pub fn peek_min(&self, heap: HeapId) -> Result<(&P, &T), HeapError> {
        let entry = self.entry(heap)?;
        self.core.peek_min(&entry.roots)
    }

    /// Removes and returns the minimum of `heap`.
    ///
    /// # Time Complexity
    /// O(log n) amortized, n being the size of `heap`
    pub fn extract_min(&mut self, heap: HeapId) -> Result<(P, T), HeapError> {
        let entry = self.heaps.get_mut(heap).ok_or(HeapError::InvalidHandle)?;
        self.core.extract_min(&mut entry.roots)
    }

    /// Lowers the priority of the element behind `handle`, which must belong to
    /// `heap`.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] for an unknown heap, an extracted element,
    ///   or an element of another heap
    /// - [`HeapError::InvalidDecreaseKey`] if `new_priority` is greater than
    ///   the current priority
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_key(
        &mut self,
        heap: HeapId,
        handle: &FibonacciHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        self.resolve(heap, handle)?;
        let entry = self.heaps.get_mut(heap).ok_or(HeapError::InvalidHandle)?;
        self.core
            .decrease_key(&mut entry.roots, handle.node, new_priority)
    }

    /// Melds heaps `a` and `b` into a new heap and returns its id.
    ///
    /// Both ids become invalid. Every handle issued for either heap is valid
    /// for the result.
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if either id is unknown or both are the
    /// same heap. The forest is unchanged.
    ///
    /// # Time Complexity
    /// O(1), plus an inverse-Ackermann tag union
    pub fn unite(&mut self, a: HeapId, b: HeapId) -> Result<HeapId, HeapError> {
        if a == b || !self.heaps.contains_key(a) || !self.heaps.contains_key(b) {
            return Err(HeapError::InvalidHandle);
        }
        let (Some(mut keep), Some(other)) = (self.heaps.remove(a), self.heaps.remove(b)) else {
            return Err(HeapError::InvalidHandle);
        };

        self.core.meld(&mut keep.roots, other.roots);
        keep.tag = self.union(keep.tag, other.tag);

        if self.core.config.trace {
            debug!(len = keep.roots.len, moved = 0, "united forest heaps");
        }
        Ok(self.heaps.insert(keep))
    }

    /// Drops `heap` and every element in it, returning how many were freed.
    ///
    /// # Time Complexity
    /// O(n) in the size of `heap`
    pub fn remove_heap(&mut self, heap: HeapId) -> Result<usize, HeapError> {
        let entry = self.heaps.remove(heap).ok_or(HeapError::InvalidHandle)?;
        let nodes = self.core.collect_nodes(&entry.roots);
        for &node in &nodes {
            self.core.arena.release(node);
        }
        Ok(nodes.len())
    }

    /// Returns the priority and item behind `handle`, if it is still live.
    pub fn get(&self, handle: &FibonacciHandle) -> Option<(&P, &T)> {
        if handle.heap != self.id {
            return None;
        }
        let node = self.core.arena.get(handle.node)?;
        Some((&node.priority, &node.item))
    }

    /// Returns true if `handle` is a live element of `heap`.
    pub fn contains(&self, heap: HeapId, handle: &FibonacciHandle) -> bool {
        self.resolve(heap, handle).is_ok()
    }

    /// Number of trees in `heap`'s root list.
    pub fn root_count(&self, heap: HeapId) -> Result<usize, HeapError> {
        let entry = self.entry(heap)?;
        Ok(self.core.root_count(&entry.roots))
    }

    /// Emits one trace event per root of `heap` when tracing is enabled.
    pub fn trace_root_list(&self, heap: HeapId) -> Result<(), HeapError> {
        let entry = self.entry(heap)?;
        self.core.trace_root_list(&entry.roots);
        Ok(())
    }

    /// Verifies every heap's trees, that each node is reachable from exactly
    /// the heap its tag resolves to, and that no arena slot is orphaned.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut reachable = 0;
        let mut recorded = 0;
        for entry in self.heaps.values() {
            recorded += entry.roots.len;
            reachable += self
                .core
                .check_trees(&entry.roots, |owner| self.find(owner) == entry.tag)?;
        }
        let allocated = self.core.arena.len();
        if reachable != allocated {
            return Err(InvariantViolation::SizeMismatch {
                recorded,
                reachable,
                allocated,
            });
        }
        Ok(())
    }

    fn entry(&self, heap: HeapId) -> Result<&HeapEntry, HeapError> {
        self.heaps.get(heap).ok_or(HeapError::InvalidHandle)
    }

    fn resolve(&self, heap: HeapId, handle: &FibonacciHandle) -> Result<(), HeapError> {
        let entry = self.entry(heap)?;
        if handle.heap != self.id {
            return Err(HeapError::InvalidHandle);
        }
        let node = self
            .core
            .arena
            .get(handle.node)
            .ok_or(HeapError::InvalidHandle)?;
        if self.find(node.owner) == entry.tag {
            Ok(())
        } else {
            Err(HeapError::InvalidHandle)
        }
    }

    /// Representative of `tag`'s set. Read-only, so no path compression.
    fn find(&self, mut tag: usize) -> usize {
        while self.tags[tag] != tag {
            tag = self.tags[tag];
        }
        tag
    }

    /// Joins two representatives by rank, halving paths on the way.
    fn union(&mut self, a: usize, b: usize) -> usize {
        let a = self.find_halving(a);
        let b = self.find_halving(b);
        if a == b {
            return a;
        }
        let (high, low) = if self.ranks[a] >= self.ranks[b] {
            (a, b)
        } else {
            (b, a)
        };
        self.tags[low] = high;
        if self.ranks[high] == self.ranks[low] {
            self.ranks[high] += 1;
        }
        high
    }

    fn find_halving(&mut self, mut tag: usize) -> usize {
        while self.tags[tag] != tag {
            let grandparent = self.tags[self.tags[tag]];
            self.tags[tag] = grandparent;
            tag = grandparent;
        }
        tag
    }
}

impl<T, P: Ord> Default for FibonacciForest<T, P> {
    fn default() -> Self {
        Self::with_config(HeapConfig::default())
    }
}
