//! Single-source shortest paths over an adjacency-list graph
//!
//! This module provides a generic implementation of Dijkstra's algorithm that
//! leverages the `decrease_key` operation of the heaps in this crate. The heap
//! only stores vertex indices; per-vertex metadata (tentative distance, hop
//! count, predecessor, heap handle) lives in a table indexed by vertex.
//!
//! Unreachable vertices have no distance: "infinity" is `None`, so the heaps
//! never see a sentinel value. A path whose cost would overflow `C` is never
//! relaxed, so a vertex only reachable through such paths stays unreachable.
//!
//! # Example
//!
//! ```rust
//! use fibheap::pathfinding::{dijkstra, Graph};
//! use fibheap::fibonacci::FibonacciHeap;
//!
//! let graph = Graph::from_undirected_edges(4, [(0, 1, 4u64), (1, 2, 1), (0, 2, 7)]).unwrap();
//! let paths = dijkstra::<FibonacciHeap<_, _>, _>(&graph, 0).unwrap();
//!
//! assert_eq!(paths.distance(2), Some(5));
//! assert_eq!(paths.hops(2), Some(2));
//! assert_eq!(paths.path_to(2), Some(vec![0, 1, 2]));
//! assert_eq!(paths.distance(3), None);
//! ```

use crate::traits::{DecreaseKeyHeap, HeapError};
use num_traits::CheckedAdd;
use std::ops::Add;
use thiserror::Error;
use tracing::debug;

/// Trait for types that can be used as edge weights and path costs.
///
/// This requires the type to be orderable, copyable, and support checked
/// addition. `Default` is the zero cost of the source vertex.
pub trait Cost: Ord + Copy + Add<Output = Self> + CheckedAdd + Default {}

impl<T> Cost for T where T: Ord + Copy + Add<Output = Self> + CheckedAdd + Default {}

/// Errors from building a graph or running a search on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("vertex {vertex} is out of range for a graph with {len} vertices")]
    VertexOutOfRange { vertex: usize, len: usize },
    #[error("heap rejected an operation: {0}")]
    Heap(#[from] HeapError),
}

/// A weighted edge to `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<C> {
    pub to: usize,
    pub weight: C,
}

/// Adjacency-list graph over vertices `0..vertex_count()`
///
/// Weights must be non-negative for [`dijkstra`] to return shortest paths.
#[derive(Debug, Clone)]
pub struct Graph<C> {
    adjacency: Vec<Vec<Edge<C>>>,
}

impl<C: Cost> Graph<C> {
    /// Creates a graph with `vertices` vertices and no edges.
    pub fn new(vertices: usize) -> Self {
        Graph {
            adjacency: vec![Vec::new(); vertices],
        }
    }

    /// Builds an undirected graph: each `(u, v, w)` adds an edge both ways.
    pub fn from_undirected_edges(
        vertices: usize,
        edges: impl IntoIterator<Item = (usize, usize, C)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Graph::new(vertices);
        for (u, v, weight) in edges {
            graph.add_undirected_edge(u, v, weight)?;
        }
        Ok(graph)
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges (an undirected edge counts twice).
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Adds a directed edge `from -> to`.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: C) -> Result<(), GraphError> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.adjacency[from].push(Edge { to, weight });
        Ok(())
    }

    /// Adds `u -> v` and `v -> u` with the same weight.
    pub fn add_undirected_edge(&mut self, u: usize, v: usize, weight: C) -> Result<(), GraphError> {
        self.add_edge(u, v, weight)?;
        self.add_edge(v, u, weight)
    }

    /// Outgoing edges of `vertex`.
    pub fn neighbors(&self, vertex: usize) -> Result<&[Edge<C>], GraphError> {
        self.check_vertex(vertex)?;
        Ok(&self.adjacency[vertex])
    }

    fn check_vertex(&self, vertex: usize) -> Result<(), GraphError> {
        if vertex < self.adjacency.len() {
            Ok(())
        } else {
            Err(GraphError::VertexOutOfRange {
                vertex,
                len: self.adjacency.len(),
            })
        }
    }
}

/// Metadata stored for each vertex during search.
struct VertexEntry<C, H> {
    distance: Option<C>,
    hops: usize,
    came_from: Option<usize>,
    /// Handle into the heap while the vertex is in the open set
    handle: Option<H>,
    settled: bool,
}

impl<C, H> VertexEntry<C, H> {
    fn unreached() -> Self {
        VertexEntry {
            distance: None,
            hops: 0,
            came_from: None,
            handle: None,
            settled: false,
        }
    }
}

/// Result of a single-source search.
#[derive(Debug, Clone)]
pub struct ShortestPaths<C> {
    source: usize,
    distances: Vec<Option<C>>,
    hops: Vec<Option<usize>>,
    came_from: Vec<Option<usize>>,
}

impl<C: Cost> ShortestPaths<C> {
    pub fn source(&self) -> usize {
        self.source
    }

    /// Shortest distance from the source, or `None` if unreachable.
    pub fn distance(&self, vertex: usize) -> Option<C> {
        self.distances.get(vertex).copied().flatten()
    }

    /// Number of edges on the chosen shortest path, or `None` if unreachable.
    pub fn hops(&self, vertex: usize) -> Option<usize> {
        self.hops.get(vertex).copied().flatten()
    }

    /// Vertices from the source to `vertex` inclusive, or `None` if unreachable.
    pub fn path_to(&self, vertex: usize) -> Option<Vec<usize>> {
        self.distance(vertex)?;
        let mut path = vec![vertex];
        let mut current = vertex;
        while let Some(previous) = self.came_from[current] {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }

    /// Number of vertices with a finite distance, the source included.
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }
}

/// Runs Dijkstra's algorithm from `source` over every reachable vertex.
///
/// Each vertex is pushed when first discovered and improved in place with
/// `decrease_key` afterwards, so the heap never holds a vertex twice.
/// Edges whose path cost overflows `C` are skipped.
///
/// # Type Parameters
/// - `H`: the heap type, e.g. [`FibonacciHeap`](crate::fibonacci::FibonacciHeap)
///   or [`IndexedBinaryHeap`](crate::binary::IndexedBinaryHeap)
/// - `C`: the edge weight type
///
/// # Errors
/// [`GraphError::VertexOutOfRange`] if `source` is not a vertex of `graph`.
pub fn dijkstra<H, C>(graph: &Graph<C>, source: usize) -> Result<ShortestPaths<C>, GraphError>
where
    C: Cost,
    H: DecreaseKeyHeap<usize, C>,
{
    graph.check_vertex(source)?;

    let mut heap = H::new();
    let mut entries: Vec<VertexEntry<C, H::Handle>> =
        (0..graph.vertex_count()).map(|_| VertexEntry::unreached()).collect();

    entries[source].distance = Some(C::default());
    entries[source].handle = Some(heap.push_with_handle(C::default(), source));

    let mut settled = 0usize;
    let mut relaxations = 0usize;
    let mut decrease_keys = 0usize;
    let mut overflows = 0usize;

    while let Some((distance, current)) = heap.pop() {
        let entry = &mut entries[current];
        entry.settled = true;
        entry.handle = None;
        let current_hops = entry.hops;
        settled += 1;

        for edge in &graph.adjacency[current] {
            let Some(candidate) = distance.checked_add(&edge.weight) else {
                overflows += 1;
                continue;
            };
            let target = &mut entries[edge.to];
            if target.settled {
                continue;
            }
            if target.distance.is_some_and(|existing| candidate >= existing) {
                continue;
            }

            relaxations += 1;
            target.distance = Some(candidate);
            target.hops = current_hops + 1;
            target.came_from = Some(current);

            match target.handle {
                Some(handle) => {
                    heap.decrease_key(&handle, candidate)?;
                    decrease_keys += 1;
                }
                None => target.handle = Some(heap.push_with_handle(candidate, edge.to)),
            }
        }
    }

    debug!(
        source,
        settled, relaxations, decrease_keys, overflows, "dijkstra finished"
    );

    let mut paths = ShortestPaths {
        source,
        distances: Vec::with_capacity(entries.len()),
        hops: Vec::with_capacity(entries.len()),
        came_from: Vec::with_capacity(entries.len()),
    };
    for entry in entries {
        paths.hops.push(entry.distance.map(|_| entry.hops));
        paths.distances.push(entry.distance);
        paths.came_from.push(entry.came_from);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::IndexedBinaryHeap;
    use crate::fibonacci::FibonacciHeap;

    fn diamond() -> Graph<u64> {
        //   0 --4-- 1
        //   |       |
        //   1       1
        //   |       |
        //   2 --1-- 3 --10-- 4
        Graph::from_undirected_edges(
            6,
            [(0, 1, 4), (0, 2, 1), (2, 3, 1), (1, 3, 1), (3, 4, 10)],
        )
        .unwrap()
    }

    #[test]
    fn test_dijkstra_fibonacci() {
        let paths = dijkstra::<FibonacciHeap<_, _>, _>(&diamond(), 0).unwrap();
        assert_eq!(paths.source(), 0);
        assert_eq!(paths.distance(0), Some(0));
        assert_eq!(paths.distance(1), Some(3));
        assert_eq!(paths.distance(3), Some(2));
        assert_eq!(paths.distance(4), Some(12));
        assert_eq!(paths.hops(4), Some(3));
        assert_eq!(paths.path_to(1), Some(vec![0, 2, 3, 1]));
    }

    #[test]
    fn test_dijkstra_binary() {
        let paths = dijkstra::<IndexedBinaryHeap<_, _>, _>(&diamond(), 4).unwrap();
        assert_eq!(paths.distance(0), Some(12));
        assert_eq!(paths.path_to(0), Some(vec![4, 3, 2, 0]));
    }

    #[test]
    fn test_unreachable_vertex() {
        let paths = dijkstra::<FibonacciHeap<_, _>, _>(&diamond(), 0).unwrap();
        assert_eq!(paths.distance(5), None);
        assert_eq!(paths.hops(5), None);
        assert_eq!(paths.path_to(5), None);
        assert_eq!(paths.reachable_count(), 5);
    }

    #[test]
    fn test_start_is_isolated() {
        let paths = dijkstra::<FibonacciHeap<_, _>, _>(&diamond(), 5).unwrap();
        assert_eq!(paths.distance(5), Some(0));
        assert_eq!(paths.hops(5), Some(0));
        assert_eq!(paths.path_to(5), Some(vec![5]));
        assert_eq!(paths.reachable_count(), 1);
    }

    #[test]
    fn test_source_out_of_range() {
        let result = dijkstra::<FibonacciHeap<_, _>, _>(&diamond(), 6);
        assert_eq!(
            result.unwrap_err(),
            GraphError::VertexOutOfRange { vertex: 6, len: 6 }
        );
    }

    #[test]
    fn test_graph_building() {
        let mut graph: Graph<u32> = Graph::new(3);
        graph.add_edge(0, 1, 5).unwrap();
        graph.add_undirected_edge(1, 2, 2).unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(1).unwrap(), &[Edge { to: 2, weight: 2 }]);
        assert_eq!(
            graph.add_edge(0, 3, 1),
            Err(GraphError::VertexOutOfRange { vertex: 3, len: 3 })
        );

        // Directed edge is not traversed backwards
        let paths = dijkstra::<FibonacciHeap<_, _>, _>(&graph, 1).unwrap();
        assert_eq!(paths.distance(0), None);
        assert_eq!(paths.distance(2), Some(2));
    }

    #[test]
    fn test_decrease_key_finds_optimal() {
        // The direct edge is discovered first and later improved
        let graph =
            Graph::from_undirected_edges(4, [(0, 3, 100u32), (0, 1, 1), (1, 2, 1), (2, 3, 1)])
                .unwrap();
        let paths = dijkstra::<FibonacciHeap<_, _>, _>(&graph, 0).unwrap();
        assert_eq!(paths.distance(3), Some(3));
        assert_eq!(paths.hops(3), Some(3));
    }

    #[test]
    fn test_large_linear_graph() {
        let edges = (0..999).map(|i| (i, i + 1, 1u64));
        let graph = Graph::from_undirected_edges(1000, edges).unwrap();
        let paths = dijkstra::<FibonacciHeap<_, _>, _>(&graph, 0).unwrap();
        assert_eq!(paths.distance(999), Some(999));
        assert_eq!(paths.hops(999), Some(999));
    }

    #[test]
    fn test_overflowing_paths_are_skipped() {
        // 0 -> 1 -> 2 costs 300, which does not fit in a u8
        let mut graph = Graph::new(4);
        graph.add_edge(0, 1, 200u8).unwrap();
        graph.add_edge(1, 2, 100).unwrap();
        graph.add_edge(0, 3, 50).unwrap();
        graph.add_edge(3, 2, 150).unwrap();

        let paths = dijkstra::<FibonacciHeap<_, _>, _>(&graph, 0).unwrap();
        assert_eq!(paths.distance(1), Some(200));
        assert_eq!(paths.distance(2), Some(200));
        assert_eq!(paths.path_to(2), Some(vec![0, 3, 2]));

        // Without the detour the only path overflows
        let mut graph = Graph::new(3);
        graph.add_edge(0, 1, 255u8).unwrap();
        graph.add_edge(1, 2, 1).unwrap();
        let paths = dijkstra::<IndexedBinaryHeap<_, _>, _>(&graph, 0).unwrap();
        assert_eq!(paths.distance(1), Some(255));
        assert_eq!(paths.distance(2), None);
        assert_eq!(paths.reachable_count(), 2);
    }
}
