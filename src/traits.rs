//! Common traits for heap data structures
//!
//! This module provides a three-tier trait hierarchy for priority queues:
//!
//! - [`Heap`]: base trait with `push`/`peek`/`pop`
//! - [`DecreaseKeyHeap`]: adds handle-based `decrease_key`
//! - [`MergeableHeap`]: adds `unite`, consuming both operands
//!
//! The base [`Heap`] trait is compatible with Rust's standard heap API patterns,
//! while [`DecreaseKeyHeap`] adds the operations needed for relaxation-based
//! algorithms like Dijkstra's shortest path.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a process-unique id that handles carry to name their heap.
pub(crate) fn next_heap_id() -> u64 {
    NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed)
}

/// Error type for heap operations
///
/// Every variant is a caller contract violation. The heap is left unchanged
/// when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// `peek_min` or `extract_min` on an empty heap
    #[error("operation requires a non-empty heap")]
    EmptyHeap,
    /// The new priority is greater than the current priority
    #[error("new priority is greater than current priority")]
    InvalidDecreaseKey,
    /// The handle is no longer valid (element was removed) or belongs to another heap
    #[error("handle is no longer valid (element was removed or belongs to another heap)")]
    InvalidHandle,
}

/// A handle to an element in the heap, used for decrease_key operations
///
/// This is an opaque type that identifies a specific element in the heap.
/// The exact implementation varies by heap type.
pub trait Handle: Copy + PartialEq + Eq + std::fmt::Debug {}

/// Base trait for heap/priority queue data structures
///
/// Unlike `BinaryHeap` which stores values directly (using `Ord`), these heaps
/// store (priority, item) pairs to separate the ordering key from the data.
///
/// # Example
///
/// ```rust
/// use fibheap::Heap;
/// use fibheap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<T, P: Ord> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given priority
    fn push(&mut self, priority: P, item: T);

    /// Returns the minimum priority and associated item without removing it
    ///
    /// # Time Complexity
    /// O(1) for all implementations
    fn peek(&self) -> Option<(&P, &T)>;

    /// Removes and returns the minimum priority and associated item
    fn pop(&mut self) -> Option<(P, T)>;
}

/// Extended heap trait with `decrease_key` support
///
/// # Example
///
/// ```rust
/// use fibheap::{DecreaseKeyHeap, Heap};
/// use fibheap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<T, P: Ord>: Heap<T, P> {
    /// The handle type for this heap, used to reference elements for decrease_key
    type Handle: Handle;

    /// Inserts an element with the given priority, returning a handle
    ///
    /// # Time Complexity
    /// - Fibonacci Heap: O(1)
    /// - Indexed Binary Heap: O(log n)
    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle;

    /// Lowers the priority of the element identified by `handle`
    ///
    /// An equal priority is accepted and leaves the structure unchanged.
    ///
    /// # Errors
    /// - [`HeapError::InvalidDecreaseKey`] if `new_priority` is greater than
    ///   the current priority
    /// - [`HeapError::InvalidHandle`] if the element was already removed
    ///
    /// # Time Complexity
    /// - Fibonacci Heap: O(1) amortized
    /// - Indexed Binary Heap: O(log n)
    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError>;
}

/// Heaps that can be melded
///
/// `unite` takes both operands by value, so neither can be used after the call.
pub trait MergeableHeap<T, P: Ord>: Heap<T, P> + Sized {
    /// Consumes `self` and `other`, returning a heap holding the union
    ///
    /// # Time Complexity
    /// - Fibonacci Heap: O(1) splice plus moving the smaller arena
    /// - Indexed Binary Heap: O(m log(n + m))
    fn unite(self, other: Self) -> Self;
}
