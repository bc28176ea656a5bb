//! Generic tests applied to every heap variant.
//!
//! Each variant gets the same suite through a macro-generated module, so
//! a contract regression in one implementation shows up under its own
//! test name.

use addressable_heaps::traits::HeapError;
use addressable_heaps::AddressableHeap;

macro_rules! heap_contract_tests {
    ($mod_name:ident, $heap_type:ty) => {
        mod $mod_name {
            use super::*;

            #[test]
            fn empty_heap() {
                let mut heap = <$heap_type>::new();
                assert!(heap.is_empty());
                assert_eq!(heap.len(), 0);
                assert_eq!(heap.peek(), None);
                assert_eq!(heap.pop(), None);
                heap.validate();
            }

            #[test]
            fn basic_operations() {
                let mut heap = <$heap_type>::new();
                heap.push(5, 0).unwrap();
                heap.push(1, 1).unwrap();
                heap.push(10, 2).unwrap();
                heap.push(3, 3).unwrap();

                assert!(!heap.is_empty());
                assert_eq!(heap.len(), 4);
                assert_eq!(heap.peek(), Some((&1, 1)));

                assert_eq!(heap.pop(), Some((1, 1)));
                assert_eq!(heap.pop(), Some((3, 3)));
                assert_eq!(heap.pop(), Some((5, 0)));
                assert_eq!(heap.pop(), Some((10, 2)));
                assert_eq!(heap.pop(), None);
                assert!(heap.is_empty());
            }

            #[test]
            fn pop_equals_prior_peek() {
                let mut heap = <$heap_type>::new();
                for (i, key) in [4, 9, 2, 7, 2, 8].into_iter().enumerate() {
                    heap.push(key, i).unwrap();
                }
                loop {
                    let peeked = match heap.peek() {
                        Some((&key, id)) => (key, id),
                        None => break,
                    };
                    assert_eq!(heap.pop(), Some(peeked));
                }
            }

            #[test]
            fn sorts_ascending_input() {
                let mut heap = <$heap_type>::new();
                for i in 0..200 {
                    heap.push(i, i as usize).unwrap();
                }
                for i in 0..200 {
                    assert_eq!(heap.pop().map(|(key, _)| key), Some(i));
                }
            }

            #[test]
            fn sorts_descending_input() {
                let mut heap = <$heap_type>::new();
                for i in (0..200).rev() {
                    heap.push(i, i as usize).unwrap();
                }
                for i in 0..200 {
                    assert_eq!(heap.pop().map(|(key, _)| key), Some(i));
                }
            }

            #[test]
            fn sorts_shuffled_input() {
                // Deterministic shuffle: multiply by a unit mod 251.
                let mut heap = <$heap_type>::new();
                for i in 0..251i64 {
                    let key = (i * 113) % 251;
                    heap.push(key, i as usize).unwrap();
                }
                heap.validate();
                for expected in 0..251i64 {
                    assert_eq!(heap.pop().map(|(key, _)| key), Some(expected));
                }
            }

            #[test]
            fn duplicate_keys_all_come_out() {
                let mut heap = <$heap_type>::new();
                heap.push(5, 0).unwrap();
                heap.push(5, 1).unwrap();
                heap.push(5, 2).unwrap();
                heap.push(1, 3).unwrap();

                assert_eq!(heap.pop(), Some((1, 3)));
                let mut seen = std::collections::HashSet::new();
                for _ in 0..3 {
                    let (key, id) = heap.pop().unwrap();
                    assert_eq!(key, 5);
                    assert!(seen.insert(id));
                }
                assert_eq!(seen.len(), 3);
            }

            #[test]
            fn len_tracks_inserts_minus_pops() {
                let mut heap = <$heap_type>::new();
                let mut expected = 0usize;
                for i in 0..60 {
                    heap.push(i * 7 % 13, i as usize).unwrap();
                    expected += 1;
                    if i % 3 == 0 {
                        heap.pop().unwrap();
                        expected -= 1;
                    }
                    assert_eq!(heap.len(), expected);
                }
            }

            #[test]
            fn lookup_returns_latest_write() {
                let mut heap = <$heap_type>::new();
                for i in 0..30 {
                    heap.push(1000 + i, i as usize).unwrap();
                }
                assert_eq!(heap.get(12), Some(&1012));

                heap.decrease_key(12, 40).unwrap();
                assert_eq!(heap.get(12), Some(&40));

                heap.decrease_key(12, 2).unwrap();
                assert_eq!(heap.get(12), Some(&2));

                assert_eq!(heap.pop(), Some((2, 12)));
                assert_eq!(heap.get(12), None);
            }

            #[test]
            fn duplicate_id_is_rejected() {
                let mut heap = <$heap_type>::new();
                heap.push(1, 7).unwrap();
                assert_eq!(heap.push(2, 7), Err(HeapError::DuplicateId));
                // The resident element is untouched.
                assert_eq!(heap.len(), 1);
                assert_eq!(heap.get(7), Some(&1));
                heap.validate();
            }

            #[test]
            fn unknown_id_is_rejected() {
                let mut heap = <$heap_type>::new();
                heap.push(1, 0).unwrap();
                assert_eq!(heap.decrease_key(3, 0), Err(HeapError::UnknownId));
            }

            #[test]
            fn increasing_a_key_is_rejected() {
                let mut heap = <$heap_type>::new();
                heap.push(10, 0).unwrap();
                assert_eq!(heap.decrease_key(0, 11), Err(HeapError::KeyNotDecreased));
                assert_eq!(heap.get(0), Some(&10));
            }

            #[test]
            fn decreasing_to_the_same_key_is_idempotent() {
                let mut heap = <$heap_type>::new();
                heap.push(10, 0).unwrap();
                heap.push(20, 1).unwrap();
                heap.decrease_key(1, 20).unwrap();
                heap.validate();
                assert_eq!(heap.get(1), Some(&20));
                assert_eq!(heap.pop(), Some((10, 0)));
                assert_eq!(heap.pop(), Some((20, 1)));
            }

            #[test]
            fn reduce_key_reorders_pops() {
                // The decrease-key stress sequence: every variant must
                // produce exactly this pop order.
                let mut heap = <$heap_type>::new();
                for (i, key) in [10, 20, 30, 40, 50].into_iter().enumerate() {
                    heap.push(key, i).unwrap();
                }
                heap.decrease_key(4, 5).unwrap();
                heap.decrease_key(3, 1).unwrap();
                heap.decrease_key(2, 0).unwrap();
                heap.validate();

                let mut popped = Vec::new();
                while let Some(element) = heap.pop() {
                    popped.push(element);
                }
                assert_eq!(popped, vec![(0, 2), (1, 3), (5, 4), (10, 0), (20, 1)]);
            }

            #[test]
            fn decrease_key_to_new_minimum() {
                let mut heap = <$heap_type>::new();
                for i in 0..50 {
                    heap.push(100 + i, i as usize).unwrap();
                }
                heap.pop().unwrap(); // force internal restructuring
                heap.decrease_key(37, -5).unwrap();
                assert_eq!(heap.peek(), Some((&-5, 37)));
            }

            #[test]
            fn validate_is_idempotent() {
                let mut heap = <$heap_type>::new();
                for i in 0..20 {
                    heap.push((i * 31) % 17, i as usize).unwrap();
                }
                heap.pop().unwrap();
                heap.decrease_key(15, -1).unwrap();
                heap.validate();
                heap.validate();
            }

            #[test]
            fn drop_with_resident_elements() {
                let mut heap = <$heap_type>::new();
                for i in 0..100 {
                    heap.push(i, i as usize).unwrap();
                }
                heap.pop().unwrap();
                // Dropped with 99 elements resident; Miri/asan would
                // catch leaks or double frees in teardown.
            }

            #[test]
            fn interleaved_operations_stay_consistent() {
                let mut heap = <$heap_type>::new();
                let mut next_id = 0usize;
                for round in 0..40i64 {
                    heap.push(round * 97 % 41, next_id).unwrap();
                    next_id += 1;
                    heap.push(round * 53 % 37, next_id).unwrap();
                    next_id += 1;
                    if round % 2 == 0 {
                        heap.pop().unwrap();
                    }
                    heap.validate();
                }

                let mut last = i64::MIN;
                while let Some((key, _)) = heap.pop() {
                    assert!(key >= last);
                    last = key;
                }
            }
        }
    };
}

heap_contract_tests!(binary, addressable_heaps::binary::BinaryHeap<i64, usize>);
heap_contract_tests!(binomial, addressable_heaps::binomial::BinomialHeap<i64, usize>);
heap_contract_tests!(weak, addressable_heaps::weak::WeakHeap<i64, usize>);
heap_contract_tests!(pairing, addressable_heaps::pairing::PairingHeap<i64, usize>);
heap_contract_tests!(two_three, addressable_heaps::twothree::TwoThreeHeap<i64, usize>);
heap_contract_tests!(fibonacci, addressable_heaps::fibonacci::FibonacciHeap<i64, usize>);
heap_contract_tests!(thin, addressable_heaps::thin::ThinHeap<i64, usize>);
