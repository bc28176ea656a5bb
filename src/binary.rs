//! Binary heap, the baseline variant.
//!
//! A flat array in the usual implicit layout (parent of index `i > 0` is
//! `(i - 1) / 2`) plus a hash index from id to array position. Every
//! structural move goes through [`BinaryHeap::swap_elements`], the single
//! place the index is rewritten; a swap that bypassed it would
//! desynchronize the index from the array.

use rustc_hash::FxHashMap;

use crate::traits::{AddressableHeap, HeapError, HeapId};

/// Addressable binary min-heap.
///
/// O(log n) push, pop, and decrease-key; O(1) peek and lookup.
pub struct BinaryHeap<K, I> {
    /// `(key, id)` pairs in implicit-tree order.
    elements: Vec<(K, I)>,
    /// Resident id → index in `elements`.
    id_to_index: FxHashMap<I, usize>,
}

impl<K: Ord, I: HeapId> BinaryHeap<K, I> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            id_to_index: FxHashMap::default(),
        }
    }

    /// Swaps two positions and rewrites the index entries of both moved
    /// elements.
    fn swap_elements(&mut self, a: usize, b: usize) {
        self.elements.swap(a, b);
        self.id_to_index.insert(self.elements[a].1, a);
        self.id_to_index.insert(self.elements[b].1, b);
    }

    /// Moves the element at `pos` upwards until its parent is not larger.
    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.elements[pos].0 < self.elements[parent].0 {
                self.swap_elements(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    /// Moves the element at `pos` downwards until no child is smaller.
    /// Prefers the smaller child; ties go to the left child.
    fn sift_down(&mut self, mut pos: usize) {
        let len = self.elements.len();
        loop {
            let mut child = pos * 2 + 1;
            if child >= len {
                break;
            }
            if child + 1 < len && self.elements[child + 1].0 < self.elements[child].0 {
                child += 1;
            }
            if self.elements[child].0 < self.elements[pos].0 {
                self.swap_elements(pos, child);
                pos = child;
            } else {
                break;
            }
        }
    }
}

impl<K: Ord, I: HeapId> Default for BinaryHeap<K, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, I: HeapId> AddressableHeap<K, I> for BinaryHeap<K, I> {
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
        self.id_to_index.remove(&id);
        self.sift_down(0);
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
        for pos in 1..self.elements.len() {
            let parent = (pos - 1) / 2;
            assert!(
                !(self.elements[pos].0 < self.elements[parent].0),
                "heap order violated at position {pos}"
            );
        }
        for (pos, (_, id)) in self.elements.iter().enumerate() {
            assert_eq!(
                self.id_to_index.get(id).copied(),
                Some(pos),
                "id index does not resolve to position {pos}"
            );
        }
        assert_eq!(self.id_to_index.len(), self.elements.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_keep_the_index_in_sync() {
        let mut heap = BinaryHeap::new();
        for (key, id) in [(50, 0), (40, 1), (30, 2), (20, 3), (10, 4)] {
            heap.push(key, id).unwrap();
            heap.validate();
        }
        assert_eq!(heap.peek(), Some((&10, 4)));
        assert_eq!(heap.get(0), Some(&50));

        heap.decrease_key(0, 5).unwrap();
        heap.validate();
        assert_eq!(heap.pop(), Some((5, 0)));
        heap.validate();
    }

    #[test]
    fn sift_down_prefers_left_child_on_ties() {
        let mut heap = BinaryHeap::new();
        heap.push(1, 0).unwrap();
        heap.push(2, 1).unwrap(); // left child
        heap.push(2, 2).unwrap(); // right child
        assert_eq!(heap.pop(), Some((1, 0)));
        assert_eq!(heap.pop(), Some((2, 2)));
        assert_eq!(heap.pop(), Some((2, 1)));
    }
}
