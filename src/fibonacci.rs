//! Fibonacci heap.
//!
//! A collection of heap-ordered trees on a circular doubly-linked root
//! list, with a pointer at the minimal root. Children of a node form
//! their own circular list. Consolidation (merging roots of equal
//! degree, like binary addition with carries) happens only inside `pop`,
//! through a degree-indexed table that lives for the duration of that
//! call.
//!
//! `decrease_key` cuts a heap-order-violating node to the root list and
//! then *cascades*: every already-marked ancestor is cut as well, and the
//! first unmarked non-root ancestor is marked. A node is marked only when
//! it loses a child while being a non-root; the mark is cleared whenever
//! the node becomes a root. This bounds node degrees by the Fibonacci
//! growth argument.

use std::marker::PhantomData;
use std::ptr::NonNull;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::traits::{AddressableHeap, HeapError, HeapId};

struct Node<K, I> {
    key: K,
    id: I,
    /// Number of children.
    degree: u32,
    /// Whether this (non-root) node has lost a child since it last
    /// became a non-root.
    marked: bool,
    parent: Option<NonNull<Node<K, I>>>,
    /// Some child in the circular child list.
    child: Option<NonNull<Node<K, I>>>,
    /// Previous node in the circular sibling list (self when alone).
    left: NonNull<Node<K, I>>,
    /// Next node in the circular sibling list (self when alone).
    right: NonNull<Node<K, I>>,
}

/// Addressable Fibonacci min-heap.
///
/// O(1) push and amortized decrease-key; O(log n) amortized pop.
pub struct FibonacciHeap<K, I> {
    /// Minimal root; entry point into the circular root list.
    min_root: Option<NonNull<Node<K, I>>>,
    /// Resident id → node.
    id_to_node: FxHashMap<I, NonNull<Node<K, I>>>,
    _owns: PhantomData<Box<Node<K, I>>>,
}

impl<K: Ord, I: HeapId> FibonacciHeap<K, I> {
    pub fn new() -> Self {
        Self {
            min_root: None,
            id_to_node: FxHashMap::default(),
            _owns: PhantomData,
        }
    }

    /// Splices `node` (currently alone) into the circular list `at` is on.
    unsafe fn add_sibling(at: NonNull<Node<K, I>>, node: NonNull<Node<K, I>>) {
        let at_left = (*at.as_ptr()).left;
        (*node.as_ptr()).right = at;
        (*node.as_ptr()).left = at_left;
        (*at_left.as_ptr()).right = node;
        (*at.as_ptr()).left = node;
    }

    /// Unlinks `node` from its circular sibling list, leaving it alone.
    unsafe fn detach_from_siblings(node: NonNull<Node<K, I>>) {
        let left = (*node.as_ptr()).left;
        let right = (*node.as_ptr()).right;
        (*left.as_ptr()).right = right;
        (*right.as_ptr()).left = left;
        (*node.as_ptr()).left = node;
        (*node.as_ptr()).right = node;
    }

    /// Makes `node` (alone) a child of `parent`, increasing its degree.
    unsafe fn add_child(parent: NonNull<Node<K, I>>, node: NonNull<Node<K, I>>) {
        debug_assert!((*node.as_ptr()).left == node && (*node.as_ptr()).right == node);
        if let Some(child) = (*parent.as_ptr()).child {
            Self::add_sibling(child, node);
        }
        (*parent.as_ptr()).child = Some(node);
        (*node.as_ptr()).parent = Some(parent);
        (*parent.as_ptr()).degree += 1;
    }

    /// Cuts `node` loose from its parent and siblings; it becomes a lone
    /// root-to-be with its mark cleared.
    unsafe fn cut(node: NonNull<Node<K, I>>) {
        if let Some(parent) = (*node.as_ptr()).parent.take() {
            if (*parent.as_ptr()).child == Some(node) {
                (*parent.as_ptr()).child = if (*node.as_ptr()).left == node {
                    None
                } else {
                    Some((*node.as_ptr()).right)
                };
            }
            (*parent.as_ptr()).degree -= 1;
        }
        Self::detach_from_siblings(node);
        (*node.as_ptr()).marked = false;
    }

    /// Merges `root` into the degree table, carrying upward while a tree
    /// of equal degree is already parked there.
    unsafe fn merge_root(
        roots_by_degree: &mut Vec<Option<NonNull<Node<K, I>>>>,
        mut root: NonNull<Node<K, I>>,
    ) {
        loop {
            let degree = (*root.as_ptr()).degree as usize;
            if roots_by_degree.len() < degree + 1 {
                roots_by_degree.resize(degree + 1, None);
            }

            let other = match roots_by_degree[degree].take() {
                None => {
                    roots_by_degree[degree] = Some(root);
                    return;
                }
                Some(other) => other,
            };

            // Smaller key becomes the parent; the result has one more
            // child and goes around again.
            if (*root.as_ptr()).key < (*other.as_ptr()).key {
                Self::add_child(root, other);
            } else {
                Self::add_child(other, root);
                root = other;
            }
        }
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

        if let Some(first) = (*node.as_ptr()).child {
            let mut num_children = 0;
            let mut child = first;
            loop {
                assert_eq!((*child.as_ptr()).parent, Some(node));
                assert_eq!((*(*child.as_ptr()).right.as_ptr()).left, child);
                assert_eq!((*(*child.as_ptr()).left.as_ptr()).right, child);
                assert!(!((*child.as_ptr()).key < (*node.as_ptr()).key));
                self.validate_node(child, seen);
                num_children += 1;
                child = (*child.as_ptr()).right;
                if child == first {
                    break;
                }
            }
            assert_eq!((*node.as_ptr()).degree, num_children);
        } else {
            assert_eq!((*node.as_ptr()).degree, 0);
        }
    }
}

impl<K: Ord, I: HeapId> Default for FibonacciHeap<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, I> Drop for FibonacciHeap<K, I> {
    fn drop(&mut self) {
        // Teardown only follows child rings; parent pointers are ignored.
        unsafe fn free_tree<K, I>(node: NonNull<Node<K, I>>) {
            unsafe {
                if let Some(first) = (*node.as_ptr()).child {
                    let mut child = first;
                    loop {
                        let next = (*child.as_ptr()).right;
                        free_tree(child);
                        if next == first {
                            break;
                        }
                        child = next;
                    }
                }
                drop(Box::from_raw(node.as_ptr()));
            }
        }

        if let Some(min) = self.min_root.take() {
            unsafe {
                for root in Self::collect_ring(min) {
                    free_tree(root);
                }
            }
        }
    }
}

impl<K, I> FibonacciHeap<K, I> {
    /// Collects the members of the circular list containing `start`.
    unsafe fn collect_ring(start: NonNull<Node<K, I>>) -> Vec<NonNull<Node<K, I>>> {
        let mut members = Vec::new();
        let mut current = start;
        loop {
            members.push(current);
            current = (*current.as_ptr()).right;
            if current == start {
                break;
            }
        }
        members
    }
}

impl<K: Ord, I: HeapId> AddressableHeap<K, I> for FibonacciHeap<K, I> {
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
            degree: 0,
            marked: false,
            parent: None,
            child: None,
            left: NonNull::dangling(),
            right: NonNull::dangling(),
        })));
        unsafe {
            (*node.as_ptr()).left = node;
            (*node.as_ptr()).right = node;

            match self.min_root {
                None => self.min_root = Some(node),
                Some(min) => {
                    Self::add_sibling(min, node);
                    if (*node.as_ptr()).key < (*min.as_ptr()).key {
                        self.min_root = Some(node);
                    }
                }
            }
        }
        self.id_to_node.insert(id, node);
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
            let other_roots = if (*min.as_ptr()).right == min {
                Vec::new()
            } else {
                let mut ring = Self::collect_ring((*min.as_ptr()).right);
                ring.pop(); // drop the min itself (last in the walk)
                ring
            };
            let children = (*min.as_ptr())
                .child
                .take()
                .map(|child| Self::collect_ring(child))
                .unwrap_or_default();

            // Degree table lives only for this consolidation.
            let mut roots_by_degree: Vec<Option<NonNull<Node<K, I>>>> = Vec::new();
            for root in other_roots {
                Self::detach_from_siblings(root);
                Self::merge_root(&mut roots_by_degree, root);
            }
            for child in children {
                (*child.as_ptr()).parent = None;
                (*child.as_ptr()).marked = false;
                (*child.as_ptr()).left = child;
                (*child.as_ptr()).right = child;
                Self::merge_root(&mut roots_by_degree, child);
            }

            // Rebuild the root list and find the new minimum.
            self.min_root = None;
            for root in roots_by_degree.into_iter().flatten() {
                match self.min_root {
                    None => self.min_root = Some(root),
                    Some(current_min) => {
                        Self::add_sibling(current_min, root);
                        if (*root.as_ptr()).key < (*current_min.as_ptr()).key {
                            self.min_root = Some(root);
                        }
                    }
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

            // Done unless the new key undercuts the parent.
            let mut parent = match (*node.as_ptr()).parent {
                Some(p) if (*node.as_ptr()).key < (*p.as_ptr()).key => p,
                _ => return Ok(()),
            };

            Self::cut(node);
            Self::add_sibling(min, node);

            // Cascade: cut marked ancestors, mark the first unmarked
            // non-root ancestor.
            loop {
                if (*parent.as_ptr()).parent.is_none() {
                    break;
                }
                if !(*parent.as_ptr()).marked {
                    (*parent.as_ptr()).marked = true;
                    break;
                }
                let next = (*parent.as_ptr()).parent;
                Self::cut(parent);
                Self::add_sibling(min, parent);
                parent = match next {
                    Some(next) => next,
                    None => break,
                };
            }
        }
        Ok(())
    }

    fn validate(&self) {
        unsafe {
            let min = match self.min_root {
                Some(min) => min,
                None => {
                    assert!(self.id_to_node.is_empty());
                    return;
                }
            };

            let mut seen = FxHashSet::default();
            for root in Self::collect_ring(min) {
                assert!((*root.as_ptr()).parent.is_none(), "root has a parent");
                assert!(!(*root.as_ptr()).marked, "root is marked");
                assert!(
                    !((*root.as_ptr()).key < (*min.as_ptr()).key),
                    "min_root is not minimal"
                );
                self.validate_node(root, &mut seen);
            }
            assert_eq!(seen.len(), self.id_to_node.len(), "ids missing from forest");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consolidation_bounds_root_degrees() {
        let mut heap = FibonacciHeap::new();
        for i in 0..32 {
            heap.push(i, i).unwrap();
        }
        // Pop triggers the only consolidation.
        assert_eq!(heap.pop(), Some((0, 0)));
        heap.validate();
        assert_eq!(heap.len(), 31);
        assert_eq!(heap.peek(), Some((&1, 1)));
    }

    #[test]
    fn cascading_cuts_clear_marks_on_new_roots() {
        let mut heap = FibonacciHeap::new();
        for i in 0..16 {
            heap.push(i * 10, i).unwrap();
        }
        heap.pop().unwrap(); // build real trees
        heap.validate();

        // Repeated decreases force cuts and eventually a cascade.
        for id in (8..16).rev() {
            heap.decrease_key(id, 1 - id as i32).unwrap();
            heap.validate();
        }
        assert_eq!(heap.peek().map(|(k, _)| *k), Some(-14));
    }
}
