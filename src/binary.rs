//! Indexed Binary Heap implementation
//!
//! An array-backed binary min-heap with a position table, so elements can be
//! located through a handle and their priority lowered in place. This is the
//! baseline the Fibonacci heap is measured against in shortest-path workloads.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity      |
//! |----------------|-----------------|
//! | `push`         | O(log n)        |
//! | `pop`          | O(log n)        |
//! | `peek`         | O(1)            |
//! | `decrease_key` | O(log n)        |
//! | `unite`        | O(m log(n + m)) |
//!
//! # Example
//!
//! ```rust
//! use fibheap::{DecreaseKeyHeap, Heap};
//! use fibheap::binary::IndexedBinaryHeap;
//!
//! let mut heap = IndexedBinaryHeap::new();
//! let three = heap.push_with_handle(3, "three");
//! heap.push(1, "one");
//! heap.push(2, "two");
//!
//! heap.decrease_key(&three, 0).unwrap();
//! assert_eq!(heap.pop(), Some((0, "three")));
//! assert_eq!(heap.pop(), Some((1, "one")));
//! assert_eq!(heap.pop(), Some((2, "two")));
//! assert_eq!(heap.pop(), None);
//! ```

use crate::traits::{next_heap_id, DecreaseKeyHeap, Handle, Heap, HeapError, MergeableHeap};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct Slot;
}

/// Handle to an element in an [`IndexedBinaryHeap`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BinaryHandle {
    heap: u64,
    slot: Slot,
}

impl Handle for BinaryHandle {}

#[derive(Debug)]
struct Entry<T, P> {
    priority: P,
    item: T,
    slot: Slot,
}

/// A binary min-heap supporting `decrease_key`
///
/// Every live element owns a slot in `positions` recording where it sits in
/// `data`. Popping frees the slot for reuse, so the table is bounded by the
/// peak size rather than the number of pushes; slot generations keep stale
/// handles from resolving to the slot's next occupant.
#[derive(Debug)]
pub struct IndexedBinaryHeap<T, P: Ord> {
    data: Vec<Entry<T, P>>,
    positions: SlotMap<Slot, usize>,
    id: u64,
}

impl<T, P: Ord> IndexedBinaryHeap<T, P> {
    /// Creates an empty heap with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            positions: SlotMap::with_capacity_and_key(capacity),
            id: next_heap_id(),
        }
    }

    /// Returns the priority and item behind `handle`, if it is still in the heap.
    pub fn get(&self, handle: &BinaryHandle) -> Option<(&P, &T)> {
        let index = self.resolve(handle).ok()?;
        let entry = &self.data[index];
        Some((&entry.priority, &entry.item))
    }

    fn resolve(&self, handle: &BinaryHandle) -> Result<usize, HeapError> {
        if handle.heap != self.id {
            return Err(HeapError::InvalidHandle);
        }
        self.positions
            .get(handle.slot)
            .copied()
            .ok_or(HeapError::InvalidHandle)
    }

    fn insert(&mut self, priority: P, item: T) -> BinaryHandle {
        let index = self.data.len();
        let slot = self.positions.insert(index);
        self.data.push(Entry {
            priority,
            item,
            slot,
        });
        self.sift_up(index);
        BinaryHandle {
            heap: self.id,
            slot,
        }
    }

    /// Swaps two entries and records their new positions
    fn swap(&mut self, a: usize, b: usize) {
        self.data.swap(a, b);
        self.positions[self.data[a].slot] = a;
        self.positions[self.data[b].slot] = b;
    }

    /// Move element at index up to maintain heap property
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.data[index].priority < self.data[parent].priority {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at index down to maintain heap property
    fn sift_down(&mut self, mut index: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.data[left].priority < self.data[smallest].priority {
                smallest = left;
            }
            if right < len && self.data[right].priority < self.data[smallest].priority {
                smallest = right;
            }

            if smallest != index {
                self.swap(index, smallest);
                index = smallest;
            } else {
                break;
            }
        }
    }
}

impl<T, P: Ord> Heap<T, P> for IndexedBinaryHeap<T, P> {
    fn new() -> Self {
        Self::with_capacity(0)
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        self.data.first().map(|entry| (&entry.priority, &entry.item))
    }

    fn pop(&mut self) -> Option<(P, T)> {
        if self.data.is_empty() {
            return None;
        }

        let last = self.data.len() - 1;
        self.swap(0, last);
        let entry = self.data.pop()?;
        self.positions.remove(entry.slot);

        if !self.data.is_empty() {
            self.sift_down(0);
        }

        Some((entry.priority, entry.item))
    }
}

impl<T, P: Ord> DecreaseKeyHeap<T, P> for IndexedBinaryHeap<T, P> {
    type Handle = BinaryHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        let index = self.resolve(handle)?;
        if new_priority > self.data[index].priority {
            return Err(HeapError::InvalidDecreaseKey);
        }
        self.data[index].priority = new_priority;
        self.sift_up(index);
        Ok(())
    }
}

impl<T, P: Ord> MergeableHeap<T, P> for IndexedBinaryHeap<T, P> {
    /// Pushes the smaller operand's elements into the larger one.
    ///
    /// Handles of the larger operand stay valid; the smaller operand's do not.
    fn unite(self, other: Self) -> Self {
        let (mut keep, absorb) = if self.data.len() >= other.data.len() {
            (self, other)
        } else {
            (other, self)
        };
        for entry in absorb.data {
            keep.insert(entry.priority, entry.item);
        }
        keep
    }
}

impl<T, P: Ord> Default for IndexedBinaryHeap<T, P> {
    fn default() -> Self {
        Self::new()
    }
}
