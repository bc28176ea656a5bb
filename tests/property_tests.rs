//! Property-based tests using proptest.
//!
//! Random operation sequences run against every variant, with a plain
//! `HashMap` as the reference model: the heap's minimum must always be
//! the model's minimum, lookups must return the latest written key, and
//! all variants must agree on the multiset of popped elements.

use std::collections::HashMap;

use addressable_heaps::{AddressableHeap, HeapFactory};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
    /// Decrease the key of the `slot`-th resident id (mod population)
    /// by `by`.
    Decrease(usize, i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-1000..1000i32).prop_map(Op::Push),
        Just(Op::Pop),
        ((0usize..64), (0..500i32)).prop_map(|(slot, by)| Op::Decrease(slot, by)),
    ]
}

/// Applies `ops`, checking the heap against the model after every step.
/// Returns the popped elements in pop order.
fn apply_ops(heap: &mut dyn AddressableHeap<i32, usize>, ops: &[Op]) -> Vec<(i32, usize)> {
    let mut model: HashMap<usize, i32> = HashMap::new();
    let mut next_id = 0usize;
    let mut popped = Vec::new();

    for op in ops {
        match op {
            Op::Push(key) => {
                heap.push(*key, next_id).unwrap();
                model.insert(next_id, *key);
                next_id += 1;
            }
            Op::Pop => match heap.pop() {
                Some((key, id)) => {
                    assert_eq!(model.remove(&id), Some(key), "popped a stale key");
                    assert!(
                        model.values().all(|&other| key <= other),
                        "popped key was not minimal"
                    );
                    popped.push((key, id));
                }
                None => assert!(model.is_empty()),
            },
            Op::Decrease(slot, by) => {
                if model.is_empty() {
                    continue;
                }
                let mut ids: Vec<usize> = model.keys().copied().collect();
                ids.sort_unstable();
                let id = ids[slot % ids.len()];
                let new_key = model[&id].saturating_sub(*by);
                heap.decrease_key(id, new_key).unwrap();
                model.insert(id, new_key);
            }
        }

        heap.validate();
        assert_eq!(heap.len(), model.len());
        match heap.peek() {
            Some((&key, id)) => {
                assert_eq!(model.get(&id), Some(&key));
                assert_eq!(Some(key), model.values().min().copied());
            }
            None => assert!(model.is_empty()),
        }
    }

    // Lookups resolve every resident id to its latest key.
    for (&id, &key) in &model {
        assert_eq!(heap.get(id), Some(&key));
    }

    popped
}

macro_rules! variant_property_tests {
    ($mod_name:ident, $factory:expr) => {
        mod $mod_name {
            use super::*;

            proptest! {
                #[test]
                fn random_ops_match_the_model(
                    ops in prop::collection::vec(op_strategy(), 0..80)
                ) {
                    let factory: HeapFactory<i32, usize> = $factory;
                    let mut heap = factory.build();
                    apply_ops(&mut *heap, &ops);
                }

                #[test]
                fn drained_pops_are_sorted(
                    keys in prop::collection::vec(-1000..1000i32, 1..120)
                ) {
                    let factory: HeapFactory<i32, usize> = $factory;
                    let mut heap = factory.build();
                    for (id, &key) in keys.iter().enumerate() {
                        heap.push(key, id).unwrap();
                    }

                    let mut last = i32::MIN;
                    while let Some((key, _)) = heap.pop() {
                        prop_assert!(key >= last);
                        last = key;
                    }
                    prop_assert!(heap.is_empty());
                }
            }
        }
    };
}

variant_property_tests!(binary, HeapFactory::binary());
variant_property_tests!(binomial, HeapFactory::binomial());
variant_property_tests!(weak, HeapFactory::weak());
variant_property_tests!(pairing, HeapFactory::pairing());
variant_property_tests!(two_three, HeapFactory::two_three());
variant_property_tests!(fibonacci, HeapFactory::fibonacci());
variant_property_tests!(thin, HeapFactory::thin());

proptest! {
    /// Every variant produces the same multiset of pop results for the
    /// same operation sequence (tie-break order among equal keys may
    /// differ, so the comparison is order-insensitive).
    #[test]
    fn variants_agree_on_popped_elements(
        ops in prop::collection::vec(op_strategy(), 0..60)
    ) {
        let mut all_results: Vec<Vec<(i32, usize)>> = Vec::new();

        for factory in HeapFactory::<i32, usize>::all() {
            let mut heap = factory.build();
            let mut popped = apply_ops(&mut *heap, &ops);
            while let Some(element) = heap.pop() {
                popped.push(element);
            }
            popped.sort_unstable();
            all_results.push(popped);
        }

        let (first, rest) = all_results.split_first().unwrap();
        for other in rest {
            prop_assert_eq!(other, first);
        }
    }
}
