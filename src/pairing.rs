//! Pairing heap.
//!
//! A single heap-ordered multi-way tree. Children hang off their parent
//! in a singly-linked list through `right`; `left` points at the
//! previous sibling, or at the parent for a first child, which is what
//! makes an O(1) detach possible during `decrease_key`.
//!
//! `pop` consolidates the orphaned children with the classic *two-pass
//! pairing*: a left-to-right sweep merging adjacent siblings (each merged
//! tree pushed onto a stack threaded through the `right` links), then a
//! right-to-left sweep folding the stack into a single tree. The two
//! passes are what give the amortized bounds; a single left-to-right
//! fold would degenerate.

use std::marker::PhantomData;
use std::ptr::NonNull;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::traits::{AddressableHeap, HeapError, HeapId};

struct Node<K, I> {
    key: K,
    id: I,
    /// First child.
    child: Option<NonNull<Node<K, I>>>,
    /// Previous sibling, or the parent for a first child.
    left: Option<NonNull<Node<K, I>>>,
    /// Next sibling.
    right: Option<NonNull<Node<K, I>>>,
}

/// Addressable pairing min-heap.
///
/// O(1) push; O(log n) amortized pop; o(log n) amortized decrease-key.
pub struct PairingHeap<K, I> {
    root: Option<NonNull<Node<K, I>>>,
    /// Resident id → node.
    id_to_node: FxHashMap<I, NonNull<Node<K, I>>>,
    _owns: PhantomData<Box<Node<K, I>>>,
}

impl<K: Ord, I: HeapId> PairingHeap<K, I> {
    pub fn new() -> Self {
        Self {
            root: None,
            id_to_node: FxHashMap::default(),
            _owns: PhantomData,
        }
    }

    /// Prepends `child` to `parent`'s child list.
    unsafe fn add_child(parent: NonNull<Node<K, I>>, child: NonNull<Node<K, I>>) {
        if let Some(first) = (*parent.as_ptr()).child {
            (*first.as_ptr()).left = Some(child);
        }
        (*child.as_ptr()).left = Some(parent);
        (*child.as_ptr()).right = (*parent.as_ptr()).child;
        (*parent.as_ptr()).child = Some(child);
    }

    /// Merges two trees; the smaller-key root adopts the other and wins.
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

    /// Two-pass pairing over a child list, returning the merged root.
    unsafe fn merge_tree_list(tree_list: NonNull<Node<K, I>>) -> NonNull<Node<K, I>> {
        // First pass: merge adjacent pairs left to right, pushing each
        // merged tree onto a stack threaded through the `right` links.
        let mut merged_head: Option<NonNull<Node<K, I>>> = None;
        let mut node = Some(tree_list);

        while let Some(n) = node {
            let next = match (*n.as_ptr()).right {
                Some(next) => next,
                None => {
                    (*n.as_ptr()).right = merged_head;
                    merged_head = Some(n);
                    break;
                }
            };

            let next_next = (*next.as_ptr()).right;
            let merged = Self::merge_trees(n, next);
            (*merged.as_ptr()).right = merged_head;
            merged_head = Some(merged);

            node = next_next;
        }

        // Second pass: fold the stack right to left into a single tree.
        let merged_head = merged_head.expect("child list is non-empty");
        let mut result = merged_head;
        let mut node = (*merged_head.as_ptr()).right.take();
        while let Some(n) = node {
            let next = (*n.as_ptr()).right.take();
            result = Self::merge_trees(n, result);
            node = next;
        }

        (*result.as_ptr()).left = None;
        result
    }

    /// Unlinks `node` from its parent's child list.
    unsafe fn detach_from_parent(node: NonNull<Node<K, I>>) {
        let left = match (*node.as_ptr()).left {
            Some(left) => left,
            None => return,
        };

        if (*left.as_ptr()).child == Some(node) {
            // First child: `left` is the parent.
            (*left.as_ptr()).child = (*node.as_ptr()).right;
        } else {
            (*left.as_ptr()).right = (*node.as_ptr()).right;
        }
        if let Some(right) = (*node.as_ptr()).right {
            (*right.as_ptr()).left = Some(left);
        }

        (*node.as_ptr()).left = None;
        (*node.as_ptr()).right = None;
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

        let mut prev = node;
        let mut child = (*node.as_ptr()).child;
        while let Some(c) = child {
            assert_eq!((*c.as_ptr()).left, Some(prev), "broken left link");
            assert!(
                !((*c.as_ptr()).key < (*node.as_ptr()).key),
                "heap order violated"
            );
            self.validate_node(c, seen);
            prev = c;
            child = (*c.as_ptr()).right;
        }
    }
}

impl<K: Ord, I: HeapId> Default for PairingHeap<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, I> Drop for PairingHeap<K, I> {
    fn drop(&mut self) {
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

impl<K: Ord, I: HeapId> AddressableHeap<K, I> for PairingHeap<K, I> {
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
            child: None,
            left: None,
            right: None,
        })));
        self.id_to_node.insert(id, node);

        self.root = Some(match self.root {
            None => node,
            Some(root) => unsafe { Self::merge_trees(root, node) },
        });
        Ok(())
    }

    fn get(&self, id: I) -> Option<&K> {
        self.id_to_node
            .get(&id)
            .map(|node| unsafe { &(*node.as_ptr()).key })
    }

    fn peek(&self) -> Option<(&K, I)> {
        self.root.map(|root| unsafe {
            let node = root.as_ptr();
            (&(*node).key, (*node).id)
        })
    }

    fn pop(&mut self) -> Option<(K, I)> {
        let min_root = self.root?;
        unsafe {
            self.root = (*min_root.as_ptr())
                .child
                .take()
                .map(|children| Self::merge_tree_list(children));

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

            if self.root == Some(node) {
                return Ok(());
            }
            Self::detach_from_parent(node);
            let root = self.root.expect("non-root node implies a root");
            self.root = Some(Self::merge_trees(root, node));
        }
        Ok(())
    }

    fn validate(&self) {
        unsafe {
            let mut seen = FxHashSet::default();
            if let Some(root) = self.root {
                assert!((*root.as_ptr()).left.is_none(), "root has a left link");
                assert!((*root.as_ptr()).right.is_none(), "root has a sibling");
                self.validate_node(root, &mut seen);
            }
            assert_eq!(seen.len(), self.id_to_node.len(), "ids missing from tree");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_pass_pairing_consolidates_children() {
        let mut heap = PairingHeap::new();
        // Ascending pushes make every element a direct child of the
        // root, so the first pop exercises the full two-pass merge.
        for i in 0..9 {
            heap.push(i, i).unwrap();
        }
        assert_eq!(heap.pop(), Some((0, 0)));
        heap.validate();
        for i in 1..9 {
            assert_eq!(heap.pop(), Some((i, i)));
        }
    }

    #[test]
    fn decrease_key_detaches_and_remerges() {
        let mut heap = PairingHeap::new();
        for i in 0..6 {
            heap.push(10 * (i as i32 + 1), i).unwrap();
        }
        heap.pop().unwrap();
        heap.decrease_key(5, 1).unwrap();
        heap.validate();
        assert_eq!(heap.peek(), Some((&1, 5)));
    }
}
