//! Weak heap.
//!
//! An array-backed multi-way tree stored in the binary layout, where a
//! per-position "reverse" bit decides which of positions `2i` and
//! `2i + 1` is the sibling and which is the child. Position 0's bit is
//! always 0. An element only has to be ordered against its
//! *ancestor-parent*: the nearest ancestor reached by halving the
//! position while its low bit equals the current ancestor's reverse bit.
//!
//! Weak heaps need one comparison per level on pop (against roughly two
//! for a binary heap) at the cost of the extra bit array.

use rustc_hash::FxHashMap;

use crate::traits::{AddressableHeap, HeapError, HeapId};

/// Addressable weak min-heap.
pub struct WeakHeap<K, I> {
    /// `(key, id)` pairs in binary layout.
    elements: Vec<(K, I)>,
    /// Per-position bit: when false, `2i + 1` is the child of `i`;
    /// when true, `2i` is.
    reverse: Vec<bool>,
    /// Resident id → index in `elements`.
    id_to_index: FxHashMap<I, usize>,
}

impl<K: Ord, I: HeapId> WeakHeap<K, I> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            reverse: Vec::new(),
            id_to_index: FxHashMap::default(),
        }
    }

    /// Returns the ancestor-parent of `pos`.
    ///
    /// Walks upward while the current position is the *sibling* successor
    /// of its ancestor, i.e. while its low bit equals the ancestor's
    /// reverse bit.
    fn ancestor_parent(&self, pos: usize) -> usize {
        debug_assert!(pos > 0);
        let mut ancestor = pos;
        loop {
            let is_right_child = ancestor & 1;
            ancestor /= 2;
            if usize::from(self.reverse[ancestor]) != is_right_child {
                return ancestor;
            }
        }
    }

    /// Swaps two positions and rewrites the index entries of both moved
    /// elements.
    fn swap_elements(&mut self, a: usize, b: usize) {
        self.elements.swap(a, b);
        self.id_to_index.insert(self.elements[a].1, a);
        self.id_to_index.insert(self.elements[b].1, b);
    }

    /// Moves the element at `pos` upwards along the ancestor-parent chain
    /// until the order constraint holds.
    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let ancestor = self.ancestor_parent(pos);
            if self.elements[pos].0 < self.elements[ancestor].0 {
                self.swap_elements(pos, ancestor);
                pos = ancestor;
            } else {
                break;
            }
        }
    }

    /// Restores the order constraint for the element at position 0.
    ///
    /// Descends to the deepest child along the sibling chain of position
    /// 1, then walks back up to the root, swapping with the top wherever
    /// an element is smaller and flipping that position's reverse bit so
    /// the subtree it just absorbed stays on the child side.
    fn sift_down(&mut self) {
        let len = self.elements.len();
        if len <= 1 {
            return;
        }

        let mut pos = 1;
        loop {
            let next = pos * 2 + usize::from(self.reverse[pos]);
            if next >= len {
                break;
            }
            pos = next;
        }

        while pos > 0 {
            if self.elements[pos].0 < self.elements[0].0 {
                self.swap_elements(pos, 0);
                self.reverse[pos] = !self.reverse[pos];
            }
            pos /= 2;
        }
    }
}

impl<K: Ord, I: HeapId> Default for WeakHeap<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, I: HeapId> AddressableHeap<K, I> for WeakHeap<K, I> {
    fn len(&self) -> usize {
        self.elements.len()
    }

    fn push(&mut self, key: K, id: I) -> Result<(), HeapError> {
        if self.id_to_index.contains_key(&id) {
            return Err(HeapError::DuplicateId);
        }

        let pos = self.elements.len();
        self.id_to_index.insert(id, pos);
        self.elements.push((key, id));
        self.reverse.push(false);
        self.sift_up(pos);
        Ok(())
    }

    fn get(&self, id: I) -> Option<&K> {
        self.id_to_index.get(&id).map(|&pos| &self.elements[pos].0)
    }

    fn peek(&self) -> Option<(&K, I)> {
        self.elements.first().map(|(key, id)| (key, *id))
    }

    fn pop(&mut self) -> Option<(K, I)> {
        if self.elements.is_empty() {
            return None;
        }
        let last = self.elements.len() - 1;
        self.swap_elements(0, last);
        let (key, id) = self.elements.pop().expect("heap is non-empty");
        self.reverse.truncate(self.elements.len());
        self.id_to_index.remove(&id);
        self.sift_down();
        Some((key, id))
    }

    fn decrease_key(&mut self, id: I, new_key: K) -> Result<(), HeapError> {
        let pos = *self.id_to_index.get(&id).ok_or(HeapError::UnknownId)?;
        if self.elements[pos].0 < new_key {
            return Err(HeapError::KeyNotDecreased);
        }
        self.elements[pos].0 = new_key;
        self.sift_up(pos);
        Ok(())
    }

    fn validate(&self) {
        assert_eq!(self.reverse.len(), self.elements.len());
        if !self.elements.is_empty() {
            assert!(!self.reverse[0], "position 0 must not be reversed");
        }

        for pos in 1..self.elements.len() {
            let ancestor = self.ancestor_parent(pos);
            assert!(
                !(self.elements[pos].0 < self.elements[ancestor].0),
                "order violated between {pos} and ancestor {ancestor}"
            );
        }
        for (pos, (_, id)) in self.elements.iter().enumerate() {
            assert_eq!(self.id_to_index.get(id).copied(), Some(pos));
        }
        assert_eq!(self.id_to_index.len(), self.elements.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_restores_order_with_reverse_flips() {
        let mut heap = WeakHeap::new();
        for (i, key) in [7, 3, 9, 1, 5, 8, 2, 6].into_iter().enumerate() {
            heap.push(key, i).unwrap();
            heap.validate();
        }

        let mut popped = Vec::new();
        while let Some((key, _)) = heap.pop() {
            heap.validate();
            popped.push(key);
        }
        assert_eq!(popped, vec![1, 2, 3, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn decrease_key_resifts_against_ancestors() {
        let mut heap = WeakHeap::new();
        for i in 0..16 {
            heap.push(100 + i, i as usize).unwrap();
        }
        heap.decrease_key(15, 1).unwrap();
        heap.validate();
        assert_eq!(heap.peek(), Some((&1, 15)));
    }
}
