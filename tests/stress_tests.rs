//! Randomized operation stress with structural validation.
//!
//! Mirrors the long-form workload the perf harness runs, but with
//! `validate()` after every mutation so that a corrupted sibling ring,
//! a stale index entry or a broken rank sequence is caught at the
//! operation that introduced it, not at some later pop.

use addressable_heaps::{AddressableHeap, HeapFactory};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RANDOM_SEED: u64 = 12346789;

struct HeapTester {
    heap: Box<dyn AddressableHeap<i64, usize>>,
    ids: Vec<usize>,
}

impl HeapTester {
    fn new(factory: &HeapFactory<i64, usize>) -> Self {
        Self {
            heap: factory.build(),
            ids: Vec::new(),
        }
    }

    fn add(&mut self, key: i64, id: usize) {
        self.heap.push(key, id).unwrap();
        self.heap.validate();

        self.ids.push(id);
        assert_eq!(self.heap.len(), self.ids.len());
        assert_eq!(self.heap.get(id), Some(&key));
    }

    fn pop_minimum(&mut self) -> (i64, usize) {
        let expected = {
            let (key, id) = self.heap.peek().unwrap();
            (*key, id)
        };
        let popped = self.heap.pop().unwrap();
        self.heap.validate();
        assert_eq!(popped, expected);

        let index = self.ids.iter().position(|&id| id == popped.1).unwrap();
        self.ids.swap_remove(index);
        assert_eq!(self.heap.len(), self.ids.len());

        popped
    }

    fn reduce_key(&mut self, new_key: i64, id: usize) {
        self.heap.decrease_key(id, new_key).unwrap();
        self.heap.validate();

        assert_eq!(self.heap.get(id), Some(&new_key));
        assert_eq!(self.heap.len(), self.ids.len());
    }

    fn random_reduce_key(&mut self, rng: &mut StdRng) {
        assert!(!self.ids.is_empty());
        let id = self.ids[rng.gen_range(0..self.ids.len())];
        let key = *self.heap.get(id).unwrap();
        let reduction = if key > 4 { rng.gen_range(0..key / 4) } else { 0 };
        self.reduce_key((key - reduction).max(0), id);
    }

    fn clear(&mut self) {
        while !self.heap.is_empty() {
            self.pop_minimum();
        }
    }
}

fn test_add_and_pop(factory: &HeapFactory<i64, usize>, num_elements: usize) {
    let mut tester = HeapTester::new(factory);
    for i in 0..num_elements {
        tester.add(i as i64 * 10, i);
        assert_eq!(tester.heap.peek().map(|(key, _)| *key), Some(0));
    }
    for i in 0..num_elements {
        assert_eq!(tester.pop_minimum(), (i as i64 * 10, i));
    }
}

fn test_reduce_key(factory: &HeapFactory<i64, usize>, num_elements: usize) {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut tester = HeapTester::new(factory);
    for i in 0..num_elements {
        tester.add(i as i64 * 100, i);
    }

    for _ in 0..num_elements {
        let id = rng.gen_range(0..num_elements);
        let key = *tester.heap.get(id).unwrap();
        tester.reduce_key(key * 3 / 4, id);
    }
    tester.clear();
}

fn test_random_operations(
    factory: &HeapFactory<i64, usize>,
    num_elements: usize,
    num_operations: usize,
) {
    let mut rng = StdRng::seed_from_u64(RANDOM_SEED);
    let mut tester = HeapTester::new(factory);

    for i in 0..num_operations {
        if tester.heap.len() < num_elements {
            tester.add(rng.gen_range(0..1_000_000), i);
        }

        tester.random_reduce_key(&mut rng);

        if !tester.heap.is_empty() && rng.gen_range(0..4) == 0 {
            tester.pop_minimum();
        }
        if !tester.heap.is_empty() && rng.gen_range(0..4) == 0 {
            tester.pop_minimum();
        }

        if !tester.heap.is_empty() {
            tester.random_reduce_key(&mut rng);
        }
    }
    tester.clear();
}

fn run_stress(factory: HeapFactory<i64, usize>) {
    test_add_and_pop(&factory, 300);
    test_reduce_key(&factory, 300);
    test_random_operations(&factory, 100, 600);
}

#[test]
fn stress_binary_heap() {
    run_stress(HeapFactory::binary());
}

#[test]
fn stress_binomial_heap() {
    run_stress(HeapFactory::binomial());
}

#[test]
fn stress_weak_heap() {
    run_stress(HeapFactory::weak());
}

#[test]
fn stress_pairing_heap() {
    run_stress(HeapFactory::pairing());
}

#[test]
fn stress_two_three_heap() {
    run_stress(HeapFactory::two_three());
}

#[test]
fn stress_fibonacci_heap() {
    run_stress(HeapFactory::fibonacci());
}

#[test]
fn stress_thin_heap() {
    run_stress(HeapFactory::thin());
}
