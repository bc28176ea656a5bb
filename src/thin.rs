//! Thin heap.
//!
//! A Fibonacci-heap relative that replaces marks with *ranks*: every node
//! carries a rank, and a node is **thick** when its highest-ranked child
//! has rank exactly one below its own, **thin** when that child is two
//! below (or when a rank-1 node has no child). Roots keep plain heap
//! order; non-roots additionally keep the rank sequence along each child
//! list (first child rank `r-1` or `r-2`, then descending by one).
//!
//! `decrease_key` cuts the violating node to the root list, but first
//! repairs ranks along its left siblings: a thick sibling donates its
//! first child into the gap and the walk stops; a thin sibling absorbs
//! the tracked rank and the walk continues; at the parent, a root just
//! takes the new rank, a previously-thick parent simply becomes thin,
//! and any other parent is cut recursively.
//!
//! `pop` consolidates every root, then the orphaned children of the old
//! minimum, through a rank-indexed table, and rebuilds the root list.

use std::marker::PhantomData;
use std::ptr::NonNull;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::traits::{AddressableHeap, HeapError, HeapId};

struct Node<K, I> {
    key: K,
    id: I,
    rank: u32,
    /// Highest-ranked child.
    child: Option<NonNull<Node<K, I>>>,
    /// Previous sibling, or the parent for a first child. `None` exactly
    /// for roots.
    left: Option<NonNull<Node<K, I>>>,
    /// Next sibling, or the next root on the root list.
    right: Option<NonNull<Node<K, I>>>,
}

/// Addressable thin min-heap.
///
/// O(1) push and amortized decrease-key; O(log n) amortized pop.
pub struct ThinHeap<K, I> {
    /// Minimal root; points into the `root` list.
    min_root: Option<NonNull<Node<K, I>>>,
    /// Head of the singly-linked root list.
    root: Option<NonNull<Node<K, I>>>,
    /// Consolidation table, fully drained at the end of every pop.
    roots_by_rank: Vec<Option<NonNull<Node<K, I>>>>,
    /// Resident id → node.
    id_to_node: FxHashMap<I, NonNull<Node<K, I>>>,
    _owns: PhantomData<Box<Node<K, I>>>,
}

impl<K: Ord, I: HeapId> ThinHeap<K, I> {
    pub fn new() -> Self {
        Self {
            min_root: None,
            root: None,
            roots_by_rank: vec![None],
            id_to_node: FxHashMap::default(),
            _owns: PhantomData,
        }
    }

    unsafe fn is_thick(node: NonNull<Node<K, I>>) -> bool {
        match (*node.as_ptr()).child {
            Some(child) => (*child.as_ptr()).rank + 1 == (*node.as_ptr()).rank,
            None => (*node.as_ptr()).rank == 0,
        }
    }

    unsafe fn is_root(node: NonNull<Node<K, I>>) -> bool {
        (*node.as_ptr()).left.is_none()
    }

    /// Makes `node` thick by dropping its rank to fit its first child.
    unsafe fn make_thick(node: NonNull<Node<K, I>>) {
        (*node.as_ptr()).rank = match (*node.as_ptr()).child {
            Some(child) => (*child.as_ptr()).rank + 1,
            None => 0,
        };
    }

    /// Adds a highest-ranked child, increasing `parent`'s rank.
    unsafe fn add_child(parent: NonNull<Node<K, I>>, child: NonNull<Node<K, I>>) {
        if let Some(first) = (*parent.as_ptr()).child {
            (*first.as_ptr()).left = Some(child);
        }
        (*child.as_ptr()).left = Some(parent);
        (*child.as_ptr()).right = (*parent.as_ptr()).child;
        (*parent.as_ptr()).child = Some(child);
        (*parent.as_ptr()).rank += 1;
    }

    /// Inserts `node` as the right sibling of `at`.
    unsafe fn insert_after(at: NonNull<Node<K, I>>, node: NonNull<Node<K, I>>) {
        (*node.as_ptr()).left = Some(at);
        (*node.as_ptr()).right = (*at.as_ptr()).right;
        if let Some(right) = (*at.as_ptr()).right {
            (*right.as_ptr()).left = Some(node);
        }
        (*at.as_ptr()).right = Some(node);
    }

    /// Detaches the first child of a thick node without lowering its
    /// rank (the caller re-homes the child into the rank gap).
    unsafe fn detach_first_child(node: NonNull<Node<K, I>>) -> NonNull<Node<K, I>> {
        debug_assert!(Self::is_thick(node));
        let child = (*node.as_ptr()).child.expect("thick node has a child");
        if let Some(right) = (*child.as_ptr()).right {
            (*right.as_ptr()).left = Some(node);
        }
        (*node.as_ptr()).child = (*child.as_ptr()).right;
        (*child.as_ptr()).left = None;
        (*child.as_ptr()).right = None;
        child
    }

    /// Cuts a non-root from its siblings and parent.
    unsafe fn cut(node: NonNull<Node<K, I>>) {
        let left = (*node.as_ptr()).left.expect("cut requires a non-root");
        if (*left.as_ptr()).child == Some(node) {
            (*left.as_ptr()).child = (*node.as_ptr()).right;
        } else {
            (*left.as_ptr()).right = (*node.as_ptr()).right;
        }
        if let Some(right) = (*node.as_ptr()).right {
            (*right.as_ptr()).left = (*node.as_ptr()).left;
        }
        (*node.as_ptr()).left = None;
        (*node.as_ptr()).right = None;
    }

    /// Merges two trees; the smaller-key root adopts the other.
    unsafe fn merge_trees(
        a: NonNull<Node<K, I>>,
        b: NonNull<Node<K, I>>,
    ) -> NonNull<Node<K, I>> {
        if (*a.as_ptr()).key < (*b.as_ptr()).key {
            Self::add_child(a, b);
            a
        } else {
            Self::add_child(b, a);
            b
        }
    }

    /// Merges `root` into `roots_by_rank`, combining equal-rank trees
    /// until a free slot is found.
    unsafe fn merge_root(&mut self, mut root: NonNull<Node<K, I>>) {
        loop {
            let rank = (*root.as_ptr()).rank as usize;
            if rank >= self.roots_by_rank.len() {
                self.roots_by_rank.resize(rank + 1, None);
            }

            match self.roots_by_rank[rank].take() {
                None => {
                    self.roots_by_rank[rank] = Some(root);
                    return;
                }
                Some(other) => {
                    // The merged tree has the next rank up.
                    root = Self::merge_trees(root, other);
                }
            }
        }
    }

    /// Cuts `tree` out of its position and pushes it onto the root list,
    /// repairing the ranks it leaves behind.
    unsafe fn cut_and_move_to_root(&mut self, tree: NonNull<Node<K, I>>) {
        debug_assert!(!Self::is_root(tree));

        self.lower_rank(tree);

        Self::cut(tree);
        Self::make_thick(tree);
        (*tree.as_ptr()).right = self.root;
        self.root = Some(tree);
    }

    /// Repairs the rank sequence around `tree` before it is cut.
    unsafe fn lower_rank(&mut self, tree: NonNull<Node<K, I>>) {
        let mut rank = (*tree.as_ptr()).rank;
        let mut tree = tree;
        let mut left = (*tree.as_ptr()).left.expect("non-root has a left link");

        // Walk the left siblings until reaching the parent.
        while (*left.as_ptr()).child != Some(tree) {
            if Self::is_thick(left) {
                // A thick sibling fills the gap with its first child.
                let left_child = Self::detach_first_child(left);
                Self::insert_after(left, left_child);
                return;
            }

            // A thin sibling takes the vacated rank; keep walking.
            (*left.as_ptr()).rank = rank;
            tree = left;
            left = (*left.as_ptr()).left.expect("sibling chain ends at parent");
            rank += 1;
        }

        // A root parent just takes the adjusted rank.
        if Self::is_root(left) {
            (*left.as_ptr()).rank = rank;
            return;
        }

        // A previously-thick parent is now thin; nothing to fix.
        if (*left.as_ptr()).rank == rank + 1 {
            return;
        }

        // Otherwise cut the parent too, then drop its rank.
        self.cut_and_move_to_root(left);
        (*left.as_ptr()).rank = rank;
    }

    unsafe fn validate_node(
        &self,
        node: NonNull<Node<K, I>>,
        seen: &mut FxHashSet<NonNull<Node<K, I>>>,
    ) {
        assert!(seen.insert(node), "node reached twice");
        assert_eq!(
            self.id_to_node.get(&(*node.as_ptr()).id).copied(),
            Some(node),
            "id index does not resolve to this node"
        );

        let rank = (*node.as_ptr()).rank;
        match (*node.as_ptr()).child {
            Some(first) => {
                assert_eq!((*first.as_ptr()).left, Some(node));

                let first_rank = (*first.as_ptr()).rank;
                assert!(
                    first_rank + 1 == rank || first_rank + 2 == rank,
                    "first child rank must be one or two below"
                );

                let mut expected_rank = first_rank;
                let mut child = Some(first);
                while let Some(c) = child {
                    assert!(!Self::is_root(c));
                    assert_eq!((*c.as_ptr()).rank, expected_rank, "child ranks descend by one");
                    assert!(!((*c.as_ptr()).key < (*node.as_ptr()).key), "heap order violated");
                    self.validate_node(c, seen);
                    if let Some(right) = (*c.as_ptr()).right {
                        assert_eq!((*right.as_ptr()).left, Some(c));
                        expected_rank = expected_rank.checked_sub(1).expect("rank underflow");
                    }
                    child = (*c.as_ptr()).right;
                }
            }
            None => assert!(rank <= 1, "childless nodes are rank 0 or 1"),
        }
    }
}

impl<K: Ord, I: HeapId> Default for ThinHeap<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, I> Drop for ThinHeap<K, I> {
    fn drop(&mut self) {
        unsafe fn free<K, I>(mut node: Option<NonNull<Node<K, I>>>) {
            while let Some(n) = node {
                unsafe {
                    let next = (*n.as_ptr()).right;
                    free((*n.as_ptr()).child);
                    drop(Box::from_raw(n.as_ptr()));
                    node = next;
                }
            }
        }
        unsafe { free(self.root.take()) }
    }
}

impl<K: Ord, I: HeapId> AddressableHeap<K, I> for ThinHeap<K, I> {
    fn len(&self) -> usize {
        self.id_to_node.len()
    }

    fn push(&mut self, key: K, id: I) -> Result<(), HeapError> {
        if self.id_to_node.contains_key(&id) {
            return Err(HeapError::DuplicateId);
        }

        let node = NonNull::from(Box::leak(Box::new(Node {
            key,
            id,
            rank: 0,
            child: None,
            left: None,
            right: self.root,
        })));
        self.id_to_node.insert(id, node);

        unsafe {
            let is_new_min = match self.min_root {
                None => true,
                Some(min) => (*node.as_ptr()).key < (*min.as_ptr()).key,
            };
            if is_new_min {
                self.min_root = Some(node);
            }
        }
        self.root = Some(node);
        Ok(())
    }

    fn get(&self, id: I) -> Option<&K> {
        self.id_to_node
            .get(&id)
            .map(|node| unsafe { &(*node.as_ptr()).key })
    }

    fn peek(&self) -> Option<(&K, I)> {
        self.min_root.map(|min| unsafe {
            let node = min.as_ptr();
            (&(*node).key, (*node).id)
        })
    }

    fn pop(&mut self) -> Option<(K, I)> {
        let min = self.min_root?;
        unsafe {
            // Merge every other root into the rank table.
            let mut tree = self.root;
            while let Some(t) = tree {
                let next = (*t.as_ptr()).right.take();
                if t != min {
                    self.merge_root(t);
                }
                tree = next;
            }

            // Then the orphaned children of the minimum, thick again.
            let mut child = (*min.as_ptr()).child.take();
            while let Some(c) = child {
                let next = (*c.as_ptr()).right.take();
                (*c.as_ptr()).left = None;
                Self::make_thick(c);
                self.merge_root(c);
                child = next;
            }

            // Rebuild the root list with the new minimum first.
            self.min_root = None;
            self.root = None;
            for i in 0..self.roots_by_rank.len() {
                if let Some(t) = self.roots_by_rank[i].take() {
                    let is_new_min = match self.min_root {
                        None => true,
                        Some(min) => (*t.as_ptr()).key < (*min.as_ptr()).key,
                    };
                    if is_new_min {
                        self.min_root = Some(t);
                    }
                    (*t.as_ptr()).right = self.root;
                    self.root = Some(t);
                }
            }

            let node = Box::from_raw(min.as_ptr());
            self.id_to_node.remove(&node.id);
            Some((node.key, node.id))
        }
    }

    fn decrease_key(&mut self, id: I, new_key: K) -> Result<(), HeapError> {
        let node = *self.id_to_node.get(&id).ok_or(HeapError::UnknownId)?;
        unsafe {
            if (*node.as_ptr()).key < new_key {
                return Err(HeapError::KeyNotDecreased);
            }
            (*node.as_ptr()).key = new_key;

            let min = self.min_root.expect("resident id implies non-empty heap");
            if (*node.as_ptr()).key < (*min.as_ptr()).key {
                self.min_root = Some(node);
            }

            if !Self::is_root(node) {
                self.cut_and_move_to_root(node);
            }
        }
        Ok(())
    }

    fn validate(&self) {
        unsafe {
            let min = match self.min_root {
                Some(min) => min,
                None => {
                    assert!(self.root.is_none());
                    assert!(self.id_to_node.is_empty());
                    return;
                }
            };

            let mut seen = FxHashSet::default();
            let mut root = self.root;
            while let Some(r) = root {
                assert!(Self::is_root(r));
                assert!(
                    !((*r.as_ptr()).key < (*min.as_ptr()).key),
                    "min_root is not minimal"
                );
                self.validate_node(r, &mut seen);
                root = (*r.as_ptr()).right;
            }
            assert_eq!(seen.len(), self.id_to_node.len(), "ids missing from forest");
        }
    }
}
