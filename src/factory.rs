//! A uniform way to name and construct heap variants.
//!
//! Harnesses that compare implementations (the shortest-path driver, the
//! test suites, the perf binary) enumerate heaps through this registry
//! rather than naming concrete types.

use crate::binary::BinaryHeap;
use crate::binomial::BinomialHeap;
use crate::fibonacci::FibonacciHeap;
use crate::pairing::PairingHeap;
use crate::thin::ThinHeap;
use crate::traits::{AddressableHeap, HeapId};
use crate::twothree::TwoThreeHeap;
use crate::weak::WeakHeap;

/// Pairs a variant name with a constructor for fresh instances.
pub struct HeapFactory<K, I> {
    name: &'static str,
    make: fn() -> Box<dyn AddressableHeap<K, I>>,
}

impl<K, I> Clone for HeapFactory<K, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, I> Copy for HeapFactory<K, I> {}

impl<K: Ord + 'static, I: HeapId + 'static> HeapFactory<K, I> {
    pub fn new(name: &'static str, make: fn() -> Box<dyn AddressableHeap<K, I>>) -> Self {
        Self { name, make }
    }

    /// The variant name, e.g. `"pairing_heap"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Creates a fresh, empty heap of this variant.
    pub fn build(&self) -> Box<dyn AddressableHeap<K, I>> {
        (self.make)()
    }

    pub fn binary() -> Self {
        Self::new("binary_heap", || Box::new(BinaryHeap::new()))
    }

    pub fn binomial() -> Self {
        Self::new("binomial_heap", || Box::new(BinomialHeap::new()))
    }

    pub fn weak() -> Self {
        Self::new("weak_heap", || Box::new(WeakHeap::new()))
    }

    pub fn pairing() -> Self {
        Self::new("pairing_heap", || Box::new(PairingHeap::new()))
    }

    pub fn two_three() -> Self {
        Self::new("two_three_heap", || Box::new(TwoThreeHeap::new()))
    }

    pub fn fibonacci() -> Self {
        Self::new("fibonacci_heap", || Box::new(FibonacciHeap::new()))
    }

    pub fn thin() -> Self {
        Self::new("thin_heap", || Box::new(ThinHeap::new()))
    }

    /// Every variant, for harnesses that compare implementations.
    pub fn all() -> Vec<Self> {
        vec![
            Self::binary(),
            Self::binomial(),
            Self::weak(),
            Self::pairing(),
            Self::two_three(),
            Self::fibonacci(),
            Self::thin(),
        ]
    }

    /// Looks a variant up by name.
    pub fn by_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_factory_builds_a_working_heap() {
        for factory in HeapFactory::<i32, usize>::all() {
            let mut heap = factory.build();
            assert!(heap.is_empty(), "{} not empty", factory.name());
            heap.push(3, 0).unwrap();
            heap.push(1, 1).unwrap();
            assert_eq!(heap.pop(), Some((1, 1)), "{}", factory.name());
        }
    }

    #[test]
    fn lookup_by_name() {
        assert!(HeapFactory::<i32, usize>::by_name("two_three_heap").is_some());
        assert!(HeapFactory::<i32, usize>::by_name("splay_heap").is_none());
    }
}
