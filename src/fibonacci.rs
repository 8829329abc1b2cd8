//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) insert and find-min
//! - O(1) amortized decrease_key
//! - O(log n) amortized extract-min
//! - O(1) meld of heaps sharing a node store
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list and the heap keeps a key to the minimum root.
//! Nodes live in a slot-map arena; links are arena keys,
//! so cuts, links and consolidation only ever rewrite keys.
//!
//! Extract-min promotes the children of the removed root and then consolidates:
//! roots of equal degree are linked until every degree appears at most once.
//! Decrease-key cuts a node whose priority drops below its parent's and walks up
//! the ancestors, cutting every marked one (cascading cut). A node is marked once
//! it has lost a child, which bounds the degree of every node by O(log n).
//!
//! [`FibonacciHeap`] owns its arena. Melding two of them splices the root lists
//! after moving the smaller arena over. Heaps that are meant to be melded
//! repeatedly can live in one [`FibonacciForest`](crate::forest::FibonacciForest),
//! where a meld is a pure root-list splice.

use crate::arena::{Arena, Node, NodeKey};
use crate::config::HeapConfig;
use crate::traits::{next_heap_id, DecreaseKeyHeap, Handle, Heap, HeapError, MergeableHeap};
use slotmap::SecondaryMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, trace};

/// Handle to an element in a Fibonacci heap
///
/// A handle names both the store that created it and the element's arena slot.
/// Using it after the element was extracted, or with a different heap, yields
/// [`HeapError::InvalidHandle`]. After [`FibonacciHeap::unite_remapped`], use
/// [`HandleRemap::translate`] to carry handles over to the united heap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    pub(crate) heap: u64,
    pub(crate) node: NodeKey,
}

impl Handle for FibonacciHandle {}

/// A structural property that a heap's `check_invariants` found broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// `left` and `right` links are not mutual inverses, or a ring never closes
    #[error("sibling ring is malformed")]
    BrokenRing,
    /// A child's priority is below its parent's
    #[error("heap order violated between a node and its parent")]
    HeapOrder,
    /// A node's `parent` does not name the node owning its child list
    #[error("node's parent link does not match the tree it hangs in")]
    WrongParent,
    /// A node's degree differs from the length of its child list
    #[error("degree {recorded} does not match {actual} children")]
    DegreeMismatch { recorded: usize, actual: usize },
    /// A root carries the mark flag
    #[error("root node is marked")]
    MarkedRoot,
    /// Some root has a smaller priority than the recorded minimum
    #[error("recorded minimum is not the smallest root")]
    MinNotMinimal,
    /// A forest node is reachable from a heap its owner tag does not resolve to
    #[error("node is reachable from a heap it does not belong to")]
    ForeignNode,
    /// The recorded size disagrees with the reachable or allocated node count
    #[error("recorded size {recorded} but {reachable} reachable and {allocated} allocated")]
    SizeMismatch {
        recorded: usize,
        reachable: usize,
        allocated: usize,
    },
}

/// Translates handles from the operands of a union to the united heap
///
/// Returned by [`FibonacciHeap::unite_remapped`]. The larger operand keeps its
/// arena and its handles unchanged; the smaller operand's nodes move and are
/// re-keyed.
#[derive(Debug)]
pub struct HandleRemap {
    survivor: u64,
    absorbed: u64,
    keys: SecondaryMap<NodeKey, NodeKey>,
}

impl HandleRemap {
    /// Returns the handle naming the same element in the united heap.
    ///
    /// Returns `None` for handles that belonged to neither operand or whose
    /// element had already been extracted from the absorbed operand.
    pub fn translate(&self, handle: FibonacciHandle) -> Option<FibonacciHandle> {
        if handle.heap == self.survivor {
            Some(handle)
        } else if handle.heap == self.absorbed {
            self.keys.get(handle.node).map(|&node| FibonacciHandle {
                heap: self.survivor,
                node,
            })
        } else {
            None
        }
    }

    /// Number of nodes moved between arenas by the union.
    pub fn moved(&self) -> usize {
        self.keys.len()
    }
}

/// Minimum root and size of one heap inside an arena
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Roots {
    pub(crate) min: Option<NodeKey>,
    pub(crate) len: usize,
}

/// Arena plus the operations on one root list living in it
///
/// Every operation takes the [`Roots`] of the heap it acts on, so a single
/// arena can back one heap or a whole forest of them.
#[derive(Debug)]
pub(crate) struct Core<T, P> {
    pub(crate) arena: Arena<T, P>,
    pub(crate) config: HeapConfig,
}

impl<T, P: Ord> Core<T, P> {
    pub(crate) fn new(config: HeapConfig) -> Self {
        Self {
            arena: Arena::with_capacity(config.capacity),
            config,
        }
    }

    pub(crate) fn insert(
        &mut self,
        roots: &mut Roots,
        priority: P,
        item: T,
        owner: usize,
    ) -> NodeKey {
        let node = self.arena.alloc(priority, item, owner);
        self.add_root(roots, node);
        roots.len += 1;
        node
    }

    pub(crate) fn peek_min(&self, roots: &Roots) -> Result<(&P, &T), HeapError> {
        let min = roots.min.ok_or(HeapError::EmptyHeap)?;
        let node = &self.arena[min];
        Ok((&node.priority, &node.item))
    }

    pub(crate) fn extract_min(&mut self, roots: &mut Roots) -> Result<(P, T), HeapError> {
        let z = roots.min.ok_or(HeapError::EmptyHeap)?;
        let removed = self.arena.remove(z).ok_or(HeapError::EmptyHeap)?;

        // Any remaining root serves as the entry point into the root list
        let mut entry = (removed.right != z).then_some(removed.right);

        // Promote children one at a time so the root list stays a single ring
        if let Some(first) = removed.child {
            let mut current = first;
            for _ in 0..removed.degree {
                let next = self.arena[current].right;
                self.arena.unlink(current);

                let node = &mut self.arena[current];
                node.parent = None;
                node.marked = false;

                match entry {
                    Some(root) => self.arena.splice(root, current),
                    None => entry = Some(current),
                }
                current = next;
            }
        }

        roots.len -= 1;
        roots.min = entry;
        if entry.is_some() {
            self.consolidate(roots);
        }

        Ok((removed.priority, removed.item))
    }

    /// `node` must be live and belong to `roots`.
    pub(crate) fn decrease_key(
        &mut self,
        roots: &mut Roots,
        node: NodeKey,
        new_priority: P,
    ) -> Result<(), HeapError> {
        if new_priority > self.arena[node].priority {
            return Err(HeapError::InvalidDecreaseKey);
        }
        self.arena[node].priority = new_priority;

        match self.arena[node].parent {
            None => {
                if let Some(min) = roots.min {
                    if self.arena[node].priority < self.arena[min].priority {
                        roots.min = Some(node);
                    }
                }
            }
            Some(parent) => {
                if self.arena[node].priority < self.arena[parent].priority {
                    self.cut(roots, node, parent);
                    self.cascading_cut(roots, parent);
                }
            }
        }
        Ok(())
    }

    /// Splices `other`'s root list into `keep`'s. Both must live in this arena.
    pub(crate) fn meld(&mut self, keep: &mut Roots, other: Roots) {
        let Some(other_min) = other.min else {
            return;
        };
        match keep.min {
            Some(min) => {
                self.arena.splice(min, other_min);
                if self.arena[other_min].priority < self.arena[min].priority {
                    keep.min = Some(other_min);
                }
            }
            None => keep.min = Some(other_min),
        }
        keep.len += other.len;
    }

    /// Every node reachable from `roots`, roots first.
    pub(crate) fn collect_nodes(&self, roots: &Roots) -> Vec<NodeKey> {
        let mut nodes: Vec<NodeKey> = match roots.min {
            Some(min) => self.arena.ring(min).collect(),
            None => return Vec::new(),
        };
        let mut next = 0;
        while next < nodes.len() {
            if let Some(child) = self.arena[nodes[next]].child {
                nodes.extend(self.arena.ring(child));
            }
            next += 1;
        }
        nodes
    }

    pub(crate) fn root_count(&self, roots: &Roots) -> usize {
        roots.min.map_or(0, |min| self.arena.ring(min).count())
    }

    pub(crate) fn trace_root_list(&self, roots: &Roots) {
        if !self.config.trace {
            return;
        }
        let Some(min) = roots.min else {
            trace!("root list is empty");
            return;
        };
        for (position, root) in self.arena.ring(min).enumerate() {
            let node = &self.arena[root];
            trace!(
                position,
                degree = node.degree,
                marked = node.marked,
                is_min = root == min,
                "root"
            );
        }
    }

    /// Verifies the trees hanging off `roots` and returns how many nodes they hold.
    ///
    /// `owned` is asked about every node's owner tag. Does not compare against
    /// the arena size; callers that own the whole arena do that.
    pub(crate) fn check_trees(
        &self,
        roots: &Roots,
        owned: impl Fn(usize) -> bool,
    ) -> Result<usize, InvariantViolation> {
        let allocated = self.arena.len();
        let size_mismatch = |reachable| InvariantViolation::SizeMismatch {
            recorded: roots.len,
            reachable,
            allocated,
        };

        let Some(min) = roots.min else {
            return if roots.len == 0 {
                Ok(0)
            } else {
                Err(size_mismatch(0))
            };
        };

        let mut reachable = 0;
        let mut stack = Vec::new();
        for root in self.ring_members(min)? {
            let node = &self.arena[root];
            if node.parent.is_some() {
                return Err(InvariantViolation::WrongParent);
            }
            if node.marked {
                return Err(InvariantViolation::MarkedRoot);
            }
            if node.priority < self.arena[min].priority {
                return Err(InvariantViolation::MinNotMinimal);
            }
            stack.push(root);
        }

        while let Some(current) = stack.pop() {
            reachable += 1;
            if reachable > allocated {
                return Err(size_mismatch(reachable));
            }
            let node = &self.arena[current];
            if !owned(node.owner) {
                return Err(InvariantViolation::ForeignNode);
            }
            let children = match node.child {
                Some(child) => self.ring_members(child)?,
                None => Vec::new(),
            };
            if children.len() != node.degree {
                return Err(InvariantViolation::DegreeMismatch {
                    recorded: node.degree,
                    actual: children.len(),
                });
            }
            for child in children {
                let child_node = &self.arena[child];
                if child_node.parent != Some(current) {
                    return Err(InvariantViolation::WrongParent);
                }
                if child_node.priority < node.priority {
                    return Err(InvariantViolation::HeapOrder);
                }
                stack.push(child);
            }
        }

        if reachable != roots.len {
            return Err(size_mismatch(reachable));
        }
        Ok(reachable)
    }

    /// Collects a ring, checking link symmetry and that it closes in bounded steps.
    fn ring_members(&self, start: NodeKey) -> Result<Vec<NodeKey>, InvariantViolation> {
        let mut members = Vec::new();
        let mut current = start;
        loop {
            let node = self.arena.get(current).ok_or(InvariantViolation::BrokenRing)?;
            let right = self.arena.get(node.right).ok_or(InvariantViolation::BrokenRing)?;
            if right.left != current {
                return Err(InvariantViolation::BrokenRing);
            }
            members.push(current);
            if members.len() > self.arena.len() {
                return Err(InvariantViolation::BrokenRing);
            }
            current = node.right;
            if current == start {
                return Ok(members);
            }
        }
    }

    /// Splices a singleton into the root list and updates the minimum.
    fn add_root(&mut self, roots: &mut Roots, node: NodeKey) {
        match roots.min {
            Some(min) => {
                self.arena.splice(min, node);
                if self.arena[node].priority < self.arena[min].priority {
                    roots.min = Some(node);
                }
            }
            None => roots.min = Some(node),
        }
    }

    /// Links trees of equal degree until every degree occurs at most once.
    ///
    /// The cursor always names the next unprocessed root and is advanced before
    /// the current root is touched; linking only ever absorbs the current tree
    /// or a table entry, so the cursor stays live for the whole pass. `min` is
    /// only an entry point here and is redirected whenever its node is absorbed.
    fn consolidate(&mut self, roots: &mut Roots) {
        let Some(start) = roots.min else {
            return;
        };
        let root_count = self.arena.ring(start).count();
        let mut table: SmallVec<[Option<NodeKey>; 64]> = SmallVec::new();
        let mut links = 0usize;

        let mut cursor = start;
        for _ in 0..root_count {
            let mut x = cursor;
            cursor = self.arena[cursor].right;

            let mut degree = self.arena[x].degree;
            loop {
                if degree >= table.len() {
                    table.resize(degree + 1, None);
                }
                let Some(mut y) = table[degree].take() else {
                    break;
                };
                if self.arena[y].priority < self.arena[x].priority {
                    std::mem::swap(&mut x, &mut y);
                }
                if roots.min == Some(y) {
                    roots.min = Some(x);
                }
                self.link(y, x);
                links += 1;
                degree += 1;
            }
            table[degree] = Some(x);
        }

        roots.min = None;
        for root in table.iter().flatten().copied() {
            let smaller = match roots.min {
                Some(min) => self.arena[root].priority < self.arena[min].priority,
                None => true,
            };
            if smaller {
                roots.min = Some(root);
            }
        }

        if self.config.trace {
            trace!(
                roots_before = root_count,
                roots_after = table.iter().flatten().count(),
                links,
                table_len = table.len(),
                "consolidated root list"
            );
        }
    }

    /// Makes root `child` a child of root `parent`. Does not compare priorities.
    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        self.arena.unlink(child);

        let node = &mut self.arena[child];
        node.parent = Some(parent);
        node.marked = false;

        match self.arena[parent].child {
            Some(first) => self.arena.splice(first, child),
            None => self.arena[parent].child = Some(child),
        }
        self.arena[parent].degree += 1;
    }

    /// Moves `node` from `parent`'s child list into the root list.
    fn cut(&mut self, roots: &mut Roots, node: NodeKey, parent: NodeKey) {
        let right = self.arena[node].right;
        let owner = &mut self.arena[parent];
        if owner.child == Some(node) {
            owner.child = (right != node).then_some(right);
        }
        owner.degree -= 1;

        self.arena.unlink(node);
        let cut = &mut self.arena[node];
        cut.parent = None;
        cut.marked = false;
        self.add_root(roots, node);
    }

    /// Walks up from `node`, cutting marked ancestors and marking the first
    /// unmarked non-root one. Roots are never marked.
    fn cascading_cut(&mut self, roots: &mut Roots, mut node: NodeKey) {
        let mut depth = 0usize;
        while let Some(parent) = self.arena[node].parent {
            if !self.arena[node].marked {
                self.arena[node].marked = true;
                break;
            }
            self.cut(roots, node, parent);
            depth += 1;
            node = parent;
        }

        if self.config.trace && depth > 0 {
            trace!(depth, "cascading cut");
        }
    }
}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use fibheap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::default();
/// let handle = heap.insert(5, "item");
/// heap.insert(3, "other");
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek_min(), Ok((&1, &"item")));
/// assert_eq!(heap.extract_min(), Ok((1, "item")));
/// assert_eq!(heap.len(), 1);
/// ```
pub struct FibonacciHeap<T, P: Ord> {
    core: Core<T, P>,
    roots: Roots,
    id: u64,
}

impl<T, P: Ord> FibonacciHeap<T, P> {
    /// Creates an empty heap with the given configuration.
    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            core: Core::new(config),
            roots: Roots::default(),
            id: next_heap_id(),
        }
    }

    /// Returns the configuration this heap was built with.
    pub fn config(&self) -> HeapConfig {
        self.core.config
    }

    /// Returns true if the heap holds no elements.
    pub fn is_empty(&self) -> bool {
        self.roots.min.is_none()
    }

    /// Returns the number of live elements.
    pub fn len(&self) -> usize {
        self.roots.len
    }

    /// Inserts an element and returns a handle for later `decrease_key` calls.
    ///
    /// # Time Complexity
    /// O(1)
    pub fn insert(&mut self, priority: P, item: T) -> FibonacciHandle {
        let node = self.core.insert(&mut self.roots, priority, item, 0);
        self.handle(node)
    }

    /// Returns the minimum priority and its item.
    ///
    /// # Errors
    /// [`HeapError::EmptyHeap`] if the heap is empty.
    pub fn peek_min(&self) -> Result<(&P, &T), HeapError> {
        self.core.peek_min(&self.roots)
    }

    /// Removes and returns the minimum priority and its item.
    ///
    /// # Errors
    /// [`HeapError::EmptyHeap`] if the heap is empty.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn extract_min(&mut self) -> Result<(P, T), HeapError> {
        self.core.extract_min(&mut self.roots)
    }

    /// Lowers the priority of the element behind `handle`.
    ///
    /// An equal priority is accepted. If the new priority drops below the
    /// parent's, the node is cut into the root list and its marked ancestors
    /// are cut after it.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] for an extracted element or a handle from
    ///   another heap
    /// - [`HeapError::InvalidDecreaseKey`] if `new_priority` is greater than
    ///   the current priority
    ///
    /// Neither error modifies the heap.
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_key(
        &mut self,
        handle: &FibonacciHandle,
        new_priority: P,
    ) -> Result<(), HeapError> {
        let node = self.resolve(handle)?;
        self.core.decrease_key(&mut self.roots, node, new_priority)
    }

    /// Melds two heaps, consuming both.
    ///
    /// Handles of the larger operand stay valid; see [`Self::unite_remapped`]
    /// to keep the smaller operand's handles too.
    pub fn unite(self, other: Self) -> Self {
        self.unite_remapped(other).0
    }

    /// Melds two heaps, consuming both, and reports how handles moved.
    ///
    /// The root lists are spliced in O(1). Each heap owns its own arena, so the
    /// smaller operand's nodes are first moved into the larger one's arena,
    /// which costs O(min(n, m)). Use a
    /// [`FibonacciForest`](crate::forest::FibonacciForest) when melds must not
    /// move nodes.
    pub fn unite_remapped(self, other: Self) -> (Self, HandleRemap) {
        let (mut keep, mut absorb) = if self.roots.len >= other.roots.len {
            (self, other)
        } else {
            (other, self)
        };
        keep.core.config.trace |= absorb.core.config.trace;

        let mut remap = HandleRemap {
            survivor: keep.id,
            absorbed: absorb.id,
            keys: SecondaryMap::new(),
        };

        let Some(absorbed_min) = absorb.roots.min else {
            return (keep, remap);
        };

        let moved: Vec<(NodeKey, Node<T, P>)> = absorb.core.arena.drain().collect();
        let mut new_keys = Vec::with_capacity(moved.len());
        for (old, node) in moved {
            let new = keep.core.arena.adopt(node);
            remap.keys.insert(old, new);
            new_keys.push(new);
        }
        for new in new_keys {
            let node = &mut keep.core.arena[new];
            node.left = remap.keys[node.left];
            node.right = remap.keys[node.right];
            node.parent = node.parent.map(|parent| remap.keys[parent]);
            node.child = node.child.map(|child| remap.keys[child]);
        }

        let moved_roots = Roots {
            min: Some(remap.keys[absorbed_min]),
            len: absorb.roots.len,
        };
        keep.core.meld(&mut keep.roots, moved_roots);

        if keep.core.config.trace {
            debug!(
                len = keep.roots.len,
                moved = remap.moved(),
                "united fibonacci heaps"
            );
        }
        (keep, remap)
    }

    /// Returns the priority and item behind `handle`, if it is still live.
    pub fn get(&self, handle: &FibonacciHandle) -> Option<(&P, &T)> {
        let node = self.resolve(handle).ok()?;
        let node = &self.core.arena[node];
        Some((&node.priority, &node.item))
    }

    /// Returns true if the element sits in the root list.
    pub fn is_root(&self, handle: &FibonacciHandle) -> Result<bool, HeapError> {
        let node = self.resolve(handle)?;
        Ok(self.core.arena[node].parent.is_none())
    }

    /// Returns the element's mark flag.
    pub fn is_marked(&self, handle: &FibonacciHandle) -> Result<bool, HeapError> {
        let node = self.resolve(handle)?;
        Ok(self.core.arena[node].marked)
    }

    /// Returns the element's number of direct children.
    pub fn degree_of(&self, handle: &FibonacciHandle) -> Result<usize, HeapError> {
        let node = self.resolve(handle)?;
        Ok(self.core.arena[node].degree)
    }

    /// Returns the element's parent, or `None` for a root.
    pub fn parent_of(
        &self,
        handle: &FibonacciHandle,
    ) -> Result<Option<FibonacciHandle>, HeapError> {
        let node = self.resolve(handle)?;
        Ok(self.core.arena[node].parent.map(|parent| self.handle(parent)))
    }

    /// Returns the element's direct children.
    pub fn children_of(&self, handle: &FibonacciHandle) -> Result<Vec<FibonacciHandle>, HeapError> {
        let node = self.resolve(handle)?;
        Ok(match self.core.arena[node].child {
            Some(child) => self.core.arena.ring(child).map(|c| self.handle(c)).collect(),
            None => Vec::new(),
        })
    }

    /// Returns the number of trees in the root list.
    pub fn root_count(&self) -> usize {
        self.core.root_count(&self.roots)
    }

    /// Emits one trace event per root (degree and mark) when tracing is enabled.
    pub fn trace_root_list(&self) {
        self.core.trace_root_list(&self.roots);
    }

    /// Walks the whole structure and verifies every structural invariant.
    ///
    /// O(n). Intended for tests and debugging.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let reachable = self.core.check_trees(&self.roots, |_| true)?;
        let allocated = self.core.arena.len();
        if allocated != reachable {
            return Err(InvariantViolation::SizeMismatch {
                recorded: self.roots.len,
                reachable,
                allocated,
            });
        }
        Ok(())
    }

    fn handle(&self, node: NodeKey) -> FibonacciHandle {
        FibonacciHandle {
            heap: self.id,
            node,
        }
    }

    fn resolve(&self, handle: &FibonacciHandle) -> Result<NodeKey, HeapError> {
        if handle.heap == self.id && self.core.arena.contains(handle.node) {
            Ok(handle.node)
        } else {
            Err(HeapError::InvalidHandle)
        }
    }
}

impl<T, P: Ord> Default for FibonacciHeap<T, P> {
    fn default() -> Self {
        Self::with_config(HeapConfig::default())
    }
}

impl<T, P: Ord> Heap<T, P> for FibonacciHeap<T, P> {
    fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        FibonacciHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        FibonacciHeap::len(self)
    }

    fn push(&mut self, priority: P, item: T) {
        self.insert(priority, item);
    }

    fn peek(&self) -> Option<(&P, &T)> {
        self.peek_min().ok()
    }

    fn pop(&mut self) -> Option<(P, T)> {
        self.extract_min().ok()
    }
}

impl<T, P: Ord> DecreaseKeyHeap<T, P> for FibonacciHeap<T, P> {
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, priority: P, item: T) -> Self::Handle {
        self.insert(priority, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), HeapError> {
        FibonacciHeap::decrease_key(self, handle, new_priority)
    }
}

impl<T, P: Ord> MergeableHeap<T, P> for FibonacciHeap<T, P> {
    fn unite(self, other: Self) -> Self {
        FibonacciHeap::unite(self, other)
    }
}
