//! Fibonacci heap with decrease-key and meld
//!
//! This crate provides an arena-backed Fibonacci heap, an indexed binary heap
//! to compare it against, and a Dijkstra shortest-path routine generic over
//! both.
//!
//! # Features
//!
//! - **Fibonacci Heap**: O(1) insert and find-min; O(1) amortized decrease_key;
//!   O(log n) amortized extract-min; meld by splicing root lists
//! - **Fibonacci Forest**: many heaps over one shared arena, melded in O(1)
//!   with every handle kept valid
//! - **Indexed Binary Heap**: O(log n) insert, extract-min and decrease_key
//! - **Dijkstra**: single-source shortest paths over any [`DecreaseKeyHeap`]
//!
//! Structural tracing is opt-in through [`config::HeapConfig`] and goes through
//! the `tracing` facade.
//!
//! # Example
//!
//! ```rust
//! use fibheap::fibonacci::FibonacciHeap;
//!
//! let mut heap = FibonacciHeap::default();
//! let handle1 = heap.insert(5, "item1");
//! let _handle2 = heap.insert(3, "item2");
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.peek_min(), Ok((&1, &"item1")));
//! ```

mod arena;
pub mod binary;
pub mod config;
pub mod fibonacci;
pub mod forest;
pub mod pathfinding;
pub mod traits;

// Re-export the main traits for convenience
pub use traits::{DecreaseKeyHeap, Heap, HeapError, MergeableHeap};
