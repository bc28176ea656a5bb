//! Binomial heap.
//!
//! A forest of binomial trees on a singly-linked root list in ascending
//! dimension. A tree of dimension `d` holds `2^d` nodes; its root has
//! children of dimensions `d-1, d-2, ..., 0` along the child chain
//! (`child` points at the highest-dimension child, `right` at the next
//! lower sibling — except on the root list, where `right` ascends).
//!
//! Merging two root lists works like binary addition: walk both lists in
//! lockstep by dimension, and when two equal-dimension roots collide,
//! link them into a carry tree of dimension `d + 1`.
//!
//! `decrease_key` sifts the `(key, id)` payload up by content swap rather
//! than relocating nodes, so the id index must be rewritten after every
//! swap; external structure (and the positions other ids resolve to) is
//! untouched.

use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::traits::{AddressableHeap, HeapError, HeapId};

struct Node<K, I> {
    key: K,
    id: I,
    /// Dimension of the binomial tree rooted here.
    dimension: u32,
    parent: Option<NonNull<Node<K, I>>>,
    /// Highest-dimension child.
    child: Option<NonNull<Node<K, I>>>,
    /// Next sibling. Descending dimension below a parent; ascending on
    /// the root list.
    right: Option<NonNull<Node<K, I>>>,
}

/// Addressable binomial min-heap.
///
/// O(log n) push, pop, and decrease-key.
pub struct BinomialHeap<K, I> {
    /// Root list in ascending dimension.
    root: Option<NonNull<Node<K, I>>>,
    /// Resident id → node holding that id's payload.
    id_to_node: FxHashMap<I, NonNull<Node<K, I>>>,
    _owns: PhantomData<Box<Node<K, I>>>,
}

impl<K: Ord, I: HeapId> BinomialHeap<K, I> {
    pub fn new() -> Self {
        Self {
            root: None,
            id_to_node: FxHashMap::default(),
            _owns: PhantomData,
        }
    }

    /// Links two trees of equal dimension; the larger-key root becomes
    /// the highest child of the smaller, which is returned with its
    /// dimension increased.
    unsafe fn merge_trees(
        mut a: NonNull<Node<K, I>>,
        mut b: NonNull<Node<K, I>>,
    ) -> NonNull<Node<K, I>> {
        debug_assert_eq!((*a.as_ptr()).dimension, (*b.as_ptr()).dimension);

        if (*b.as_ptr()).key < (*a.as_ptr()).key {
            mem::swap(&mut a, &mut b);
        }

        (*b.as_ptr()).right = (*a.as_ptr()).child;
        (*b.as_ptr()).parent = Some(a);
        (*a.as_ptr()).child = Some(b);
        (*a.as_ptr()).dimension += 1;
        a
    }

    /// Merges two root lists (both in ascending dimension) into one,
    /// carrying equal-dimension collisions into higher dimensions like
    /// binary addition.
    unsafe fn merge_tree_list(
        a: Option<NonNull<Node<K, I>>>,
        b: Option<NonNull<Node<K, I>>>,
    ) -> Option<NonNull<Node<K, I>>> {
        let mut node_a = a;
        let mut node_b = b;

        let mut merged_head: Option<NonNull<Node<K, I>>> = None;
        // Link through which the next root is appended: the head slot
        // first, then the previous root's `right` field.
        let mut tail_link: *mut Option<NonNull<Node<K, I>>> = &mut merged_head;

        loop {
            let (a_ptr, b_ptr) = match (node_a, node_b) {
                (None, rest) | (rest, None) => {
                    *tail_link = rest;
                    break;
                }
                (Some(a_ptr), Some(b_ptr)) => (a_ptr, b_ptr),
            };

            let dim_a = (*a_ptr.as_ptr()).dimension;
            let dim_b = (*b_ptr.as_ptr()).dimension;

            if dim_a == dim_b {
                // Detach both from their siblings and merge into a carry
                // tree of the next dimension.
                let next_a = (*a_ptr.as_ptr()).right.take();
                let next_b = (*b_ptr.as_ptr()).right.take();
                let carry = Self::merge_trees(a_ptr, b_ptr);

                if next_a.is_none() {
                    node_a = Some(carry);
                } else {
                    node_a = Self::merge_tree_list(Some(carry), next_a);
                }
                node_b = next_b;
                continue;
            }

            // Append the lower-dimension root to the merged list.
            let lower = if dim_a < dim_b {
                node_a = (*a_ptr.as_ptr()).right;
                a_ptr
            } else {
                node_b = (*b_ptr.as_ptr()).right;
                b_ptr
            };
            (*lower.as_ptr()).right = None;
            *tail_link = Some(lower);
            tail_link = &mut (*lower.as_ptr()).right;
        }

        merged_head
    }

    /// Removes the children of `node` and returns them as a root list in
    /// ascending dimension (the child chain descends, so it is reversed).
    unsafe fn detach_children(node: NonNull<Node<K, I>>) -> Option<NonNull<Node<K, I>>> {
        let mut prev: Option<NonNull<Node<K, I>>> = None;
        let mut child = (*node.as_ptr()).child.take();
        while let Some(c) = child {
            let next = (*c.as_ptr()).right;
            (*c.as_ptr()).parent = None;
            (*c.as_ptr()).right = prev;
            prev = Some(c);
            child = next;
        }
        prev
    }

    /// Returns the minimum root and its predecessor on the root list.
    /// Among equal keys the earlier root wins.
    unsafe fn min_root(&self) -> Option<(NonNull<Node<K, I>>, Option<NonNull<Node<K, I>>>)> {
        let first = self.root?;
        let mut min_root = first;
        let mut min_prev: Option<NonNull<Node<K, I>>> = None;

        let mut prev = first;
        let mut current = (*first.as_ptr()).right;
        while let Some(root) = current {
            if (*root.as_ptr()).key < (*min_root.as_ptr()).key {
                min_root = root;
                min_prev = Some(prev);
            }
            prev = root;
            current = (*root.as_ptr()).right;
        }
        Some((min_root, min_prev))
    }

    /// Moves the payload at `node` upwards by content swap until its
    /// parent's key is not larger, rewriting the id index per swap.
    unsafe fn sift_up(&mut self, mut node: NonNull<Node<K, I>>) {
        loop {
            let parent = match (*node.as_ptr()).parent {
                Some(p) if (*node.as_ptr()).key < (*p.as_ptr()).key => p,
                _ => break,
            };

            // The displaced parent payload lands in `node`; record its
            // new home before moving on.
            mem::swap(&mut (*node.as_ptr()).key, &mut (*parent.as_ptr()).key);
            mem::swap(&mut (*node.as_ptr()).id, &mut (*parent.as_ptr()).id);
            self.id_to_node.insert((*node.as_ptr()).id, node);

            node = parent;
        }
        self.id_to_node.insert((*node.as_ptr()).id, node);
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

        let dimension = (*node.as_ptr()).dimension;
        if dimension > 0 {
            let child = (*node.as_ptr()).child.expect("dimension > 0 needs a child");
            assert_eq!((*child.as_ptr()).parent, Some(node));
            assert_eq!((*child.as_ptr()).dimension, dimension - 1);
            assert!(!((*child.as_ptr()).key < (*node.as_ptr()).key));
            self.validate_node(child, seen);

            if (*node.as_ptr()).parent.is_some() {
                let right = (*node.as_ptr()).right.expect("non-root sibling chain");
                assert_eq!((*right.as_ptr()).parent, (*node.as_ptr()).parent);
                assert_eq!((*right.as_ptr()).dimension, dimension - 1);
                self.validate_node(right, seen);
            }
        } else {
            assert!((*node.as_ptr()).child.is_none());
            if (*node.as_ptr()).parent.is_some() {
                assert!((*node.as_ptr()).right.is_none());
            }
        }
    }
}

impl<K: Ord, I: HeapId> Default for BinomialHeap<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, I> Drop for BinomialHeap<K, I> {
    fn drop(&mut self) {
        // Teardown walks child and right links only; parent pointers are
        // ignored.
        unsafe fn free<K, I>(node: Option<NonNull<Node<K, I>>>) {
            if let Some(node) = node {
                unsafe {
                    free((*node.as_ptr()).child);
                    free((*node.as_ptr()).right);
                    drop(Box::from_raw(node.as_ptr()));
                }
            }
        }
        unsafe { free(self.root.take()) }
    }
}

impl<K: Ord, I: HeapId> AddressableHeap<K, I> for BinomialHeap<K, I> {
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
            dimension: 0,
            parent: None,
            child: None,
            right: None,
        })));
        self.id_to_node.insert(id, node);

        unsafe {
            self.root = Self::merge_tree_list(self.root, Some(node));
        }
        Ok(())
    }

    fn get(&self, id: I) -> Option<&K> {
        self.id_to_node
            .get(&id)
            .map(|node| unsafe { &(*node.as_ptr()).key })
    }

    fn peek(&self) -> Option<(&K, I)> {
        unsafe {
            let (min_root, _) = self.min_root()?;
            let node = min_root.as_ptr();
            Some((&(*node).key, (*node).id))
        }
    }

    fn pop(&mut self) -> Option<(K, I)> {
        unsafe {
            let (min_root, prev) = self.min_root()?;

            match prev {
                Some(prev) => (*prev.as_ptr()).right = (*min_root.as_ptr()).right,
                None => self.root = (*min_root.as_ptr()).right,
            }

            let children = Self::detach_children(min_root);
            self.root = Self::merge_tree_list(self.root, children);

            let node = Box::from_raw(min_root.as_ptr());
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
            self.sift_up(node);
        }
        Ok(())
    }

    fn validate(&self) {
        unsafe {
            let mut seen = FxHashSet::default();
            let mut prev_dimension: Option<u32> = None;
            let mut current = self.root;
            while let Some(root) = current {
                assert!((*root.as_ptr()).parent.is_none(), "root has a parent");
                if let Some(prev) = prev_dimension {
                    assert!(
                        (*root.as_ptr()).dimension > prev,
                        "root dimensions must strictly ascend"
                    );
                }
                prev_dimension = Some((*root.as_ptr()).dimension);
                self.validate_node(root, &mut seen);
                current = (*root.as_ptr()).right;
            }
            assert_eq!(seen.len(), self.id_to_node.len(), "ids missing from forest");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_propagate_like_binary_addition() {
        let mut heap = BinomialHeap::new();
        // 2^4 - 1 elements: forest of dimensions 0..=3.
        for i in 0..15 {
            heap.push(i, i).unwrap();
            heap.validate();
        }
        assert_eq!(heap.len(), 15);
        assert_eq!(heap.peek(), Some((&0, 0)));
    }

    #[test]
    fn payload_swap_keeps_other_ids_resolvable() {
        let mut heap = BinomialHeap::new();
        for i in 0..8 {
            heap.push(i * 10, i).unwrap();
        }
        // Sift id 7 through several ancestors.
        heap.decrease_key(7, -1).unwrap();
        heap.validate();
        for i in 0..7 {
            assert_eq!(heap.get(i), Some(&(i * 10)));
        }
        assert_eq!(heap.pop(), Some((-1, 7)));
        heap.validate();
    }
}
