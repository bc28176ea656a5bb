//! 2-3 heap (Takaoka).
//!
//! A forest holding at most one tree per *dimension*. A node of
//! dimension `d` has child trunks of dimensions `d-1, d-2, ..., 0`,
//! linked in a cyclic sibling list through `left`/`right` (the `child`
//! pointer names the highest-dimension child, the ring descends from
//! there).
//!
//! A *trunk* is one or two nodes tied together by `partner` pointers;
//! the `is_secondary` flag says which is which. The secondary never has
//! siblings of its own, shares the primary's parent, and its key is not
//! smaller than the primary's. Merging two trees of dimension `d`
//! combines their trunks: depending on which of the two already has a
//! partner, the result is a fuller trunk at `d`, a carry tree at
//! `d + 1`, or both a carry and a same-dimension remainder, exactly
//! like adding digits in base 3.
//!
//! `decrease_key` either reorders within a trunk or removes the node's
//! subtree with [`TwoThreeHeap::remove_tree`], whose cases restructure
//! the neighborhood (parent trunk, parent's partner trunk, or the
//! next-higher sibling) so the per-dimension child sequence survives,
//! and then re-inserts the subtree as a root.

use std::marker::PhantomData;
use std::ptr::NonNull;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::traits::{AddressableHeap, HeapError, HeapId};

struct Node<K, I> {
    key: K,
    id: I,
    /// Dimension of the tree rooted here.
    dimension: u32,
    /// True for the second node of a two-node trunk.
    is_secondary: bool,
    /// The other node of this trunk, if any.
    partner: Option<NonNull<Node<K, I>>>,
    /// The node whose child ring this trunk hangs in; `None` for roots
    /// and detached subtrees.
    parent: Option<NonNull<Node<K, I>>>,
    /// Highest-dimension child.
    child: Option<NonNull<Node<K, I>>>,
    /// Cyclic sibling ring (self when alone).
    left: NonNull<Node<K, I>>,
    right: NonNull<Node<K, I>>,
}

/// Addressable 2-3 min-heap.
///
/// O(1) amortized push and decrease-key; O(log n) amortized pop.
pub struct TwoThreeHeap<K, I> {
    /// Tree roots indexed by dimension; at most one per slot.
    roots: Vec<Option<NonNull<Node<K, I>>>>,
    /// Resident id → node.
    id_to_node: FxHashMap<I, NonNull<Node<K, I>>>,
    _owns: PhantomData<Box<Node<K, I>>>,
}

impl<K: Ord, I: HeapId> TwoThreeHeap<K, I> {
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            id_to_node: FxHashMap::default(),
            _owns: PhantomData,
        }
    }

    unsafe fn has_siblings(node: NonNull<Node<K, I>>) -> bool {
        (*node.as_ptr()).right != node
    }

    /// Attaches `partner` as the secondary of `primary`'s trunk.
    unsafe fn attach_partner(primary: NonNull<Node<K, I>>, partner: NonNull<Node<K, I>>) {
        debug_assert!(!(*primary.as_ptr()).is_secondary);

        (*partner.as_ptr()).partner = Some(primary);
        (*primary.as_ptr()).partner = Some(partner);
        (*partner.as_ptr()).parent = (*primary.as_ptr()).parent;
        (*partner.as_ptr()).is_secondary = true;
    }

    /// Detaches a secondary node from its trunk so it can be re-homed.
    unsafe fn detach_from_trunk(node: NonNull<Node<K, I>>) {
        debug_assert!((*node.as_ptr()).is_secondary);

        (*node.as_ptr()).is_secondary = false;
        let partner = (*node.as_ptr()).partner.take().expect("secondary has a partner");
        (*partner.as_ptr()).partner = None;
        (*node.as_ptr()).parent = None;
    }

    /// Adds `new_child` (same dimension) as the new highest child,
    /// raising this node's dimension.
    unsafe fn add_child(parent: NonNull<Node<K, I>>, new_child: NonNull<Node<K, I>>) {
        debug_assert!(!(*new_child.as_ptr()).is_secondary);
        debug_assert!(!((*new_child.as_ptr()).key < (*parent.as_ptr()).key));
        debug_assert_eq!((*new_child.as_ptr()).dimension, (*parent.as_ptr()).dimension);

        (*parent.as_ptr()).dimension += 1;

        (*new_child.as_ptr()).parent = Some(parent);
        if let Some(partner) = (*new_child.as_ptr()).partner {
            (*partner.as_ptr()).parent = Some(parent);
        }

        if let Some(first) = (*parent.as_ptr()).child {
            let first_left = (*first.as_ptr()).left;
            (*new_child.as_ptr()).right = first;
            (*new_child.as_ptr()).left = first_left;
            (*first_left.as_ptr()).right = new_child;
            (*first.as_ptr()).left = new_child;
        }
        (*parent.as_ptr()).child = Some(new_child);
    }

    /// Detaches this node (always the current highest child) from its
    /// parent, lowering the parent's dimension.
    unsafe fn detach_from_parent(node: NonNull<Node<K, I>>) {
        debug_assert!(!(*node.as_ptr()).is_secondary);

        let parent = (*node.as_ptr()).parent.expect("node has a parent");
        if !Self::has_siblings(node) {
            (*parent.as_ptr()).child = None;
        } else {
            (*parent.as_ptr()).child = Some((*node.as_ptr()).right);

            let left = (*node.as_ptr()).left;
            let right = (*node.as_ptr()).right;
            (*left.as_ptr()).right = right;
            (*right.as_ptr()).left = left;
            (*node.as_ptr()).left = node;
            (*node.as_ptr()).right = node;
        }

        (*parent.as_ptr()).dimension -= 1;
        (*node.as_ptr()).parent = None;
        if let Some(partner) = (*node.as_ptr()).partner {
            (*partner.as_ptr()).parent = None;
        }
    }

    /// Replaces `old_child` with `new_child` in this node's child ring.
    unsafe fn replace_child(
        parent: NonNull<Node<K, I>>,
        old_child: NonNull<Node<K, I>>,
        new_child: NonNull<Node<K, I>>,
    ) {
        if Self::has_siblings(old_child) {
            let left = (*old_child.as_ptr()).left;
            let right = (*old_child.as_ptr()).right;
            (*new_child.as_ptr()).left = left;
            (*new_child.as_ptr()).right = right;
            (*left.as_ptr()).right = new_child;
            (*right.as_ptr()).left = new_child;

            (*old_child.as_ptr()).left = old_child;
            (*old_child.as_ptr()).right = old_child;
        }

        (*new_child.as_ptr()).parent = Some(parent);
        if let Some(partner) = (*new_child.as_ptr()).partner {
            (*partner.as_ptr()).parent = Some(parent);
        }

        (*old_child.as_ptr()).parent = None;
        if let Some(partner) = (*old_child.as_ptr()).partner {
            (*partner.as_ptr()).parent = None;
        }

        if (*parent.as_ptr()).child == Some(old_child) {
            (*parent.as_ptr()).child = Some(new_child);
        }
    }

    /// Swaps the roles within `primary`'s trunk: the secondary takes the
    /// primary's place among the siblings (or in the root table).
    unsafe fn swap_partner(&mut self, primary: NonNull<Node<K, I>>) {
        debug_assert!(!(*primary.as_ptr()).is_secondary);
        let partner = (*primary.as_ptr()).partner.expect("trunk has two nodes");

        if Self::has_siblings(primary) {
            let left = (*primary.as_ptr()).left;
            let right = (*primary.as_ptr()).right;
            (*partner.as_ptr()).left = left;
            (*partner.as_ptr()).right = right;
            (*left.as_ptr()).right = partner;
            (*right.as_ptr()).left = partner;

            (*primary.as_ptr()).left = primary;
            (*primary.as_ptr()).right = primary;
        }

        match (*primary.as_ptr()).parent {
            Some(parent) => {
                if (*parent.as_ptr()).child == Some(primary) {
                    (*parent.as_ptr()).child = Some(partner);
                }
            }
            // Root trunk: the dimension slot follows the new primary.
            None => {
                let dim = (*primary.as_ptr()).dimension as usize;
                if dim < self.roots.len() && self.roots[dim] == Some(primary) {
                    self.roots[dim] = Some(partner);
                }
            }
        }

        (*partner.as_ptr()).is_secondary = false;
        (*primary.as_ptr()).is_secondary = true;
    }

    /// Moves this node's partner down to become its child.
    unsafe fn switch_partner_to_child(node: NonNull<Node<K, I>>) {
        let partner = (*node.as_ptr()).partner.expect("trunk has two nodes");
        Self::detach_from_trunk(partner);
        Self::add_child(node, partner);
    }

    /// Moves this node's highest child up to become its partner.
    unsafe fn switch_child_to_partner(node: NonNull<Node<K, I>>) {
        debug_assert!((*node.as_ptr()).partner.is_none());
        let child = (*node.as_ptr()).child.expect("node has a child");
        Self::detach_from_parent(child);
        Self::attach_partner(node, child);
    }

    /// Builds a trunk out of `a` and (optionally) `b`, smaller key first.
    unsafe fn make_trunk(
        a: NonNull<Node<K, I>>,
        b: Option<NonNull<Node<K, I>>>,
    ) -> NonNull<Node<K, I>> {
        let b = match b {
            None => {
                debug_assert!((*a.as_ptr()).partner.is_none());
                return a;
            }
            Some(b) => b,
        };
        if (*b.as_ptr()).key < (*a.as_ptr()).key {
            Self::attach_partner(b, a);
            b
        } else {
            Self::attach_partner(a, b);
            a
        }
    }

    /// Merges two trees of the same dimension.
    ///
    /// Returns `(merged, carry)`: `merged` keeps the dimension (a fuller
    /// trunk or the leftover of case 4), `carry` has dimension + 1.
    unsafe fn merge_trees(
        mut a: NonNull<Node<K, I>>,
        mut b: NonNull<Node<K, I>>,
    ) -> (Option<NonNull<Node<K, I>>>, Option<NonNull<Node<K, I>>>) {
        debug_assert!(!Self::has_siblings(a));
        debug_assert!(!Self::has_siblings(b));
        debug_assert_eq!((*a.as_ptr()).dimension, (*b.as_ptr()).dimension);

        // Make `a` the smaller tree.
        if (*b.as_ptr()).key < (*a.as_ptr()).key {
            std::mem::swap(&mut a, &mut b);
        }

        (*a.as_ptr()).parent = None;
        let a_partner = (*a.as_ptr()).partner;
        let b_partner = (*b.as_ptr()).partner;

        let a_partner = match a_partner {
            None => {
                // Case 1: [a], [b] -> trunk [a, b], no carry.
                if b_partner.is_none() {
                    Self::attach_partner(a, b);
                    return (Some(a), None);
                }

                // Case 2: [a], [b, b'] -> carry a -> [b, b'].
                Self::add_child(a, b);
                return (None, Some(a));
            }
            Some(a_partner) => a_partner,
        };

        // Case 3: [a, a'], [b] -> carry a -> ([a', b] or [b, a']).
        if b_partner.is_none() {
            Self::detach_from_trunk(a_partner);

            if (*a_partner.as_ptr()).key < (*b.as_ptr()).key {
                Self::attach_partner(a_partner, b);
                Self::add_child(a, a_partner);
            } else {
                Self::attach_partner(b, a_partner);
                Self::add_child(a, b);
            }
            return (None, Some(a));
        }

        // Case 4: [a, a'], [b, b'] -> carry a -> [b, b'] plus the
        // same-dimension remainder [a'].
        Self::detach_from_trunk(a_partner);
        Self::add_child(a, b);
        (Some(a_partner), Some(a))
    }

    fn root_slot(&mut self, dim: usize) -> Option<NonNull<Node<K, I>>> {
        if self.roots.len() <= dim {
            self.roots.resize(dim + 1, None);
        }
        self.roots[dim]
    }

    /// Registers a (detached) tree as the root for its dimension.
    unsafe fn set_root(&mut self, root: NonNull<Node<K, I>>) {
        let dim = (*root.as_ptr()).dimension as usize;
        if self.roots.len() <= dim {
            self.roots.resize(dim + 1, None);
        }
        debug_assert!(self.roots[dim].is_none());
        self.roots[dim] = Some(root);

        (*root.as_ptr()).parent = None;
        if let Some(partner) = (*root.as_ptr()).partner {
            (*partner.as_ptr()).parent = None;
        }
    }

    /// Inserts a detached tree, merging through the dimensions until
    /// every carry has found a free slot.
    unsafe fn insert_root(&mut self, tree: NonNull<Node<K, I>>) {
        debug_assert!((*tree.as_ptr()).parent.is_none());
        debug_assert!(!Self::has_siblings(tree));

        let dim = (*tree.as_ptr()).dimension as usize;
        let root = match self.root_slot(dim) {
            None => {
                self.set_root(tree);
                return;
            }
            Some(root) => root,
        };
        self.roots[dim] = None;

        let (merged, carry) = Self::merge_trees(root, tree);
        if let Some(merged) = merged {
            self.set_root(merged);
        }
        if let Some(carry) = carry {
            self.insert_root(carry);
        }
    }

    /// Returns the minimal root. Earlier dimensions win ties.
    fn min_root(&self) -> Option<NonNull<Node<K, I>>> {
        let mut min_node: Option<NonNull<Node<K, I>>> = None;
        for root in self.roots.iter().flatten() {
            unsafe {
                let smaller = match min_node {
                    None => true,
                    Some(min) => (*root.as_ptr()).key < (*min.as_ptr()).key,
                };
                if smaller {
                    min_node = Some(*root);
                }
            }
        }
        min_node
    }

    /// Removes `tree`'s subtree from the heap, restructuring the
    /// neighborhood so the per-dimension child sequence stays intact.
    /// Afterwards `tree` is detached (parent-less, sibling-less).
    unsafe fn remove_tree(&mut self, tree: NonNull<Node<K, I>>) {
        let parent = (*tree.as_ptr()).parent;
        let dim = (*tree.as_ptr()).dimension;

        // With a partner the trunk absorbs the removal.
        if let Some(partner) = (*tree.as_ptr()).partner {
            if (*partner.as_ptr()).is_secondary {
                self.swap_partner(tree);
            }
            Self::detach_from_trunk(tree);
            return;
        }

        // Roots just vacate their slot.
        let parent = match parent {
            None => {
                self.clear_root(dim as usize);
                return;
            }
            Some(parent) => parent,
        };

        // Examine the trunk of the parent's partner.
        let pp = match (*parent.as_ptr()).partner {
            Some(pp) if (*pp.as_ptr()).dimension == dim => Some(pp),
            _ => None,
        };
        if let Some(pp) = pp {
            let pp_child = (*pp.as_ptr()).child.expect("partner trunk has a child");
            if (*pp_child.as_ptr()).partner.is_some() {
                Self::detach_from_parent(tree);
                debug_assert_eq!((*parent.as_ptr()).dimension, dim);

                // Convert the pp_child trunk into a parent-child pair.
                Self::detach_from_parent(pp_child);
                Self::switch_partner_to_child(pp_child);

                // Convert the [parent, pp] trunk into a parent-child pair.
                if (*parent.as_ptr()).is_secondary {
                    Self::switch_partner_to_child(pp);
                    Self::attach_partner(pp, pp_child);
                } else {
                    Self::switch_partner_to_child(parent);
                    Self::attach_partner(parent, pp_child);
                }
                return;
            }

            // Make pp primary.
            if (*pp.as_ptr()).is_secondary {
                Self::detach_from_trunk(pp);
                Self::switch_child_to_partner(pp);
                Self::replace_child(parent, tree, pp);
            } else {
                Self::detach_from_parent(tree);
                Self::detach_from_trunk(parent);
                Self::attach_partner(pp_child, parent);
                if (*parent.as_ptr()).key < (*pp_child.as_ptr()).key {
                    self.swap_partner(pp_child);
                }
            }
            return;
        }

        let left = (*tree.as_ptr()).left;

        if (*left.as_ptr()).dimension == dim + 1 {
            let lp = (*left.as_ptr()).partner;

            let left_child = (*left.as_ptr()).child.expect("higher sibling has a child");
            if (*left_child.as_ptr()).partner.is_some() {
                // Convert the left_child trunk into a parent-child pair.
                Self::detach_from_parent(left_child);
                Self::switch_partner_to_child(left_child);

                // Form a trunk from [left_child, lp] and slot it back in.
                if let Some(lp) = lp {
                    Self::detach_from_trunk(lp);
                }
                let trunk = Self::make_trunk(left_child, lp);
                Self::replace_child(parent, left, trunk);

                // `left` moves over to fill the removed slot.
                Self::replace_child(parent, tree, left);
                return;
            }

            if let Some(lp) = lp {
                let lp_child = (*lp.as_ptr()).child.expect("partner tree has a child");
                if (*lp_child.as_ptr()).partner.is_some() {
                    // Convert the lp_child trunk into a parent-child pair.
                    Self::detach_from_parent(lp_child);
                    Self::switch_partner_to_child(lp_child);

                    // Trunk [left, lp_child]; `lp` fills the removed slot.
                    Self::detach_from_trunk(lp);
                    Self::attach_partner(left, lp_child);
                    Self::replace_child(parent, tree, lp);
                    return;
                }

                Self::detach_from_trunk(lp);
                Self::switch_child_to_partner(lp);
                Self::replace_child(parent, tree, lp);
                return;
            }

            // Create a [left, left_child] trunk to fill the removed slot.
            self.remove_tree(left);
            Self::switch_child_to_partner(left);
            Self::replace_child(parent, tree, left);
            return;
        }

        debug_assert!((*tree.as_ptr()).partner.is_none());
        self.remove_tree(parent);
        Self::detach_from_parent(tree);
        self.insert_root(parent);
    }

    fn clear_root(&mut self, dim: usize) {
        self.roots[dim] = None;
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

        if (*node.as_ptr()).partner.is_none() {
            assert!(!(*node.as_ptr()).is_secondary, "secondary without partner");
        }
        if (*node.as_ptr()).is_secondary {
            assert!((*node.as_ptr()).right == node && (*node.as_ptr()).left == node);
        }

        if let Some(partner) = (*node.as_ptr()).partner {
            if !(*node.as_ptr()).is_secondary {
                assert!(!((*partner.as_ptr()).key < (*node.as_ptr()).key));
                assert_eq!((*partner.as_ptr()).partner, Some(node));
                assert_eq!((*partner.as_ptr()).parent, (*node.as_ptr()).parent);
                assert_eq!((*partner.as_ptr()).dimension, (*node.as_ptr()).dimension);
                assert!((*partner.as_ptr()).is_secondary);
                self.validate_node(partner, seen);
            }
        }

        if (*node.as_ptr()).dimension > 0 {
            let first = (*node.as_ptr()).child.expect("dimension > 0 needs children");
            let mut child = first;
            let mut child_dim = (*node.as_ptr()).dimension as i64 - 1;
            loop {
                assert!(child_dim >= 0, "too many children for the dimension");
                assert!(!((*child.as_ptr()).key < (*node.as_ptr()).key));
                assert!(!(*child.as_ptr()).is_secondary);
                assert_eq!((*child.as_ptr()).dimension as i64, child_dim);
                assert_eq!((*(*child.as_ptr()).right.as_ptr()).left, child);
                assert_eq!((*child.as_ptr()).parent, Some(node));
                self.validate_node(child, seen);

                child = (*child.as_ptr()).right;
                child_dim -= 1;
                if child == first {
                    break;
                }
            }
        }
    }
}

impl<K: Ord, I: HeapId> Default for TwoThreeHeap<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, I> Drop for TwoThreeHeap<K, I> {
    fn drop(&mut self) {
        // The partner back-link is broken before recursing into the
        // partner's subtree so trunk teardown cannot double-free.
        unsafe fn free_tree<K, I>(node: NonNull<Node<K, I>>) {
            unsafe {
                if let Some(partner) = (*node.as_ptr()).partner.take() {
                    (*partner.as_ptr()).partner = None;
                    free_tree(partner);
                }
                if let Some(first) = (*node.as_ptr()).child.take() {
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

        for slot in std::mem::take(&mut self.roots) {
            if let Some(root) = slot {
                unsafe { free_tree(root) }
            }
        }
    }
}

impl<K: Ord, I: HeapId> AddressableHeap<K, I> for TwoThreeHeap<K, I> {
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
            is_secondary: false,
            partner: None,
            parent: None,
            child: None,
            left: NonNull::dangling(),
            right: NonNull::dangling(),
        })));
        unsafe {
            (*node.as_ptr()).left = node;
            (*node.as_ptr()).right = node;
            self.insert_root(node);
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
        self.min_root().map(|min| unsafe {
            let node = min.as_ptr();
            (&(*node).key, (*node).id)
        })
    }

    fn pop(&mut self) -> Option<(K, I)> {
        let min_root = self.min_root()?;
        unsafe {
            // The partner, if any, takes over the dimension slot.
            let dim = (*min_root.as_ptr()).dimension as usize;
            match (*min_root.as_ptr()).partner {
                Some(partner) => {
                    Self::detach_from_trunk(partner);
                    self.roots[dim] = None;
                    self.set_root(partner);
                }
                None => self.clear_root(dim),
            }

            // Re-insert the children as roots.
            while let Some(child) = (*min_root.as_ptr()).child {
                Self::detach_from_parent(child);
                self.insert_root(child);
            }

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

            let heap_order_kept = match (*node.as_ptr()).parent {
                None => true,
                Some(parent) => !((*node.as_ptr()).key < (*parent.as_ptr()).key),
            };
            if heap_order_kept {
                // A secondary that undercuts its primary switches roles.
                if (*node.as_ptr()).is_secondary {
                    let primary = (*node.as_ptr()).partner.expect("secondary has a partner");
                    if (*node.as_ptr()).key < (*primary.as_ptr()).key {
                        self.swap_partner(primary);
                    }
                }
                return Ok(());
            }

            self.remove_tree(node);

            debug_assert!((*node.as_ptr()).parent.is_none());
            debug_assert!(!Self::has_siblings(node));

            self.insert_root(node);
        }
        Ok(())
    }

    fn validate(&self) {
        unsafe {
            let mut seen = FxHashSet::default();
            for (dim, slot) in self.roots.iter().enumerate() {
                if let Some(root) = slot {
                    assert!((*root.as_ptr()).parent.is_none(), "root has a parent");
                    assert!(!(*root.as_ptr()).is_secondary, "root is a secondary");
                    assert_eq!((*root.as_ptr()).dimension as usize, dim);
                    assert!(!Self::has_siblings(*root), "root has siblings");
                    self.validate_node(*root, &mut seen);
                }
            }
            assert_eq!(seen.len(), self.id_to_node.len(), "ids missing from forest");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trunk_carries_behave_like_base_three_digits() {
        let mut heap = TwoThreeHeap::new();
        // 1, 2 and 3 elements exercise merge cases 1 and 2; growing
        // further walks through case 3 and 4 carries.
        for i in 0..27 {
            heap.push(i, i).unwrap();
            heap.validate();
        }
        assert_eq!(heap.peek(), Some((&0, 0)));
        for i in 0..27 {
            assert_eq!(heap.pop(), Some((i, i)));
            heap.validate();
        }
    }

    #[test]
    fn secondary_swap_without_detach() {
        let mut heap = TwoThreeHeap::new();
        heap.push(10, 0).unwrap();
        heap.push(20, 1).unwrap(); // trunk [10, 20]
        // Reducing the secondary above the primary's key only swaps roles.
        heap.decrease_key(1, 5).unwrap();
        heap.validate();
        assert_eq!(heap.peek(), Some((&5, 1)));
        assert_eq!(heap.pop(), Some((5, 1)));
        assert_eq!(heap.pop(), Some((10, 0)));
    }

    #[test]
    fn remove_tree_restructures_the_neighborhood() {
        let mut heap = TwoThreeHeap::new();
        for i in 0..40 {
            heap.push(100 + i, i).unwrap();
        }
        // Cut interior nodes loose in an order that hits several of the
        // removal cases.
        for id in [35, 17, 3, 28, 11, 39, 22] {
            heap.decrease_key(id, -(id as i32)).unwrap();
            heap.validate();
        }
        let mut last = i32::MIN;
        let mut count = 0;
        while let Some((key, _)) = heap.pop() {
            heap.validate();
            assert!(key >= last);
            last = key;
            count += 1;
        }
        assert_eq!(count, 40);
    }
}
