//! Slot-map arena holding heap nodes and their circular sibling lists
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeKey`]. Structural
//! links (parent, child, left, right) are plain keys and never keep a node
//! alive; the arena owns every node. Removing a node returns its slot to the
//! slot map's free list, and the slot's generation is bumped so stale keys no
//! longer resolve.
//!
//! Sibling rings follow the usual circular-list conventions:
//! - A single node points to itself (both `left` and `right`)
//! - There is no head or tail; any member is an entry point
//! - [`Arena::splice`], [`Arena::unlink`] and [`Arena::remove`] are the only
//!   mutators of sibling links; [`Arena::release`] drops a node whose whole
//!   ring is being freed

use slotmap::{new_key_type, SlotMap};
use std::ops::{Index, IndexMut};

new_key_type! {
    /// Key of a node inside an [`Arena`]
    pub struct NodeKey;
}

/// A tree and ring element
#[derive(Debug)]
pub(crate) struct Node<T, P> {
    pub(crate) priority: P,
    pub(crate) item: T,
    pub(crate) parent: Option<NodeKey>,
    /// One child; the rest are reachable through its sibling ring
    pub(crate) child: Option<NodeKey>,
    pub(crate) left: NodeKey,
    pub(crate) right: NodeKey,
    /// Number of direct children
    pub(crate) degree: usize,
    /// Lost a child since becoming a child of its current parent
    pub(crate) marked: bool,
    /// Tag of the forest heap the node was inserted into; 0 in a standalone heap
    pub(crate) owner: usize,
}

#[derive(Debug)]
pub(crate) struct Arena<T, P> {
    nodes: SlotMap<NodeKey, Node<T, P>>,
}

impl<T, P> Arena<T, P> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub(crate) fn get(&self, key: NodeKey) -> Option<&Node<T, P>> {
        self.nodes.get(key)
    }

    /// Allocates a detached node forming a singleton ring.
    pub(crate) fn alloc(&mut self, priority: P, item: T, owner: usize) -> NodeKey {
        self.nodes.insert_with_key(|key| Node {
            priority,
            item,
            parent: None,
            child: None,
            left: key,
            right: key,
            degree: 0,
            marked: false,
            owner,
        })
    }

    /// Takes `x` out of its ring and releases its slot.
    ///
    /// Only the sibling ring is repaired. Children keep their stale `parent`
    /// key until the caller rewrites it.
    pub(crate) fn remove(&mut self, x: NodeKey) -> Option<Node<T, P>> {
        let node = self.nodes.remove(x)?;
        if node.right != x {
            self.nodes[node.left].right = node.right;
            self.nodes[node.right].left = node.left;
        }
        Some(node)
    }

    /// Frees a slot without touching its neighbours.
    ///
    /// Only for tearing down whole trees, where every neighbour goes too.
    pub(crate) fn release(&mut self, x: NodeKey) -> Option<Node<T, P>> {
        self.nodes.remove(x)
    }

    /// Removes every node, yielding them with their old keys.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (NodeKey, Node<T, P>)> + '_ {
        self.nodes.drain()
    }

    /// Inserts a node verbatim, links included. Callers must rewrite the links.
    pub(crate) fn adopt(&mut self, node: Node<T, P>) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Merges the ring containing `a` with the ring containing `b`.
    ///
    /// `b`'s ring is inserted right after `a`. Both may be singletons. The two
    /// keys must belong to different rings.
    pub(crate) fn splice(&mut self, a: NodeKey, b: NodeKey) {
        let a_next = self.nodes[a].right;
        let b_prev = self.nodes[b].left;

        self.nodes[a].right = b;
        self.nodes[b].left = a;
        self.nodes[b_prev].right = a_next;
        self.nodes[a_next].left = b_prev;
    }

    /// Removes `x` from its ring and leaves it as a singleton.
    ///
    /// Any external reference to `x` (the heap minimum, a parent's `child`)
    /// is the caller's to fix.
    pub(crate) fn unlink(&mut self, x: NodeKey) {
        let left = self.nodes[x].left;
        let right = self.nodes[x].right;

        self.nodes[left].right = right;
        self.nodes[right].left = left;

        let node = &mut self.nodes[x];
        node.left = x;
        node.right = x;
    }

    /// Iterates the ring containing `start`, beginning at `start`.
    ///
    /// The ring must not be modified while iterating.
    pub(crate) fn ring(&self, start: NodeKey) -> Ring<'_, T, P> {
        Ring {
            arena: self,
            start,
            next: Some(start),
        }
    }
}

impl<T, P> Index<NodeKey> for Arena<T, P> {
    type Output = Node<T, P>;

    fn index(&self, key: NodeKey) -> &Self::Output {
        &self.nodes[key]
    }
}

impl<T, P> IndexMut<NodeKey> for Arena<T, P> {
    fn index_mut(&mut self, key: NodeKey) -> &mut Self::Output {
        &mut self.nodes[key]
    }
}

/// Iterator over one sibling ring
pub(crate) struct Ring<'a, T, P> {
    arena: &'a Arena<T, P>,
    start: NodeKey,
    next: Option<NodeKey>,
}

impl<T, P> Iterator for Ring<'_, T, P> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let current = self.next?;
        let right = self.arena[current].right;
        self.next = (right != self.start).then_some(right);
        Some(current)
    }
}
