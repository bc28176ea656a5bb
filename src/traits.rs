//! The common contract shared by every heap variant.
//!
//! Unlike Rust's standard `BinaryHeap`, which only supports extract-min,
//! these heaps are *addressable*: every element carries a caller-supplied
//! identifier, and the heap maintains an id → location index so that keys
//! can be looked up and decreased after insertion. This is the operation
//! set Dijkstra's algorithm needs from its priority queue.

use std::hash::Hash;

use thiserror::Error;

/// Errors for contract-violating heap operations.
///
/// These indicate caller bugs rather than runtime conditions to recover
/// from; callers are expected to unwrap them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// An element with the same id is already in the heap.
    #[error("an element with this id is already in the heap")]
    DuplicateId,
    /// No element with the given id is in the heap.
    #[error("no element with this id is in the heap")]
    UnknownId,
    /// The new key is greater than the current key.
    #[error("new key is greater than the current key")]
    KeyNotDecreased,
}

/// Marker for identifier types: cheaply copyable and hashable.
///
/// Blanket-implemented; `usize`, `u32`, `i64` and friends all qualify.
pub trait HeapId: Copy + Eq + Hash {}

impl<I> HeapId for I where I: Copy + Eq + Hash {}

/// An addressable min-heap of `(key, id)` elements.
///
/// Only `<` on `K` is ever used for ordering; ties are permitted and
/// broken arbitrarily (deterministically per variant, but callers must
/// not depend on the order among equal keys).
///
/// Between any two public operations every implementation maintains:
///
/// 1. No two resident elements share an id.
/// 2. The id index resolves every resident id to its element.
/// 3. Heap order: `parent.key <= child.key` for every internal edge.
/// 4. `len()` equals the size of the id index.
pub trait AddressableHeap<K: Ord, I: HeapId> {
    /// Returns the number of resident elements.
    fn len(&self) -> usize;

    /// Returns true if the heap holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a new element.
    ///
    /// Fails with [`HeapError::DuplicateId`] when `id` is already resident.
    fn push(&mut self, key: K, id: I) -> Result<(), HeapError>;

    /// Returns the current key for `id`, or `None` if absent.
    ///
    /// This is the documented way to test presence; absence is not an
    /// error.
    fn get(&self, id: I) -> Option<&K>;

    /// Returns a minimal element without removing it, or `None` when empty.
    fn peek(&self) -> Option<(&K, I)>;

    /// Removes and returns the element [`peek`](Self::peek) would return.
    fn pop(&mut self) -> Option<(K, I)>;

    /// Replaces the key for `id` with `new_key`.
    ///
    /// Requires `new_key <= current`; decreasing to the same value is
    /// accepted and has no observable effect. Fails with
    /// [`HeapError::UnknownId`] when absent and
    /// [`HeapError::KeyNotDecreased`] when the key would increase.
    fn decrease_key(&mut self, id: I, new_key: K) -> Result<(), HeapError>;

    /// Checks every structural invariant, panicking with a diagnostic on
    /// the first violation. For tests; not part of the runtime contract.
    fn validate(&self);
}
