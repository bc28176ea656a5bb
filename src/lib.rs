//! Addressable priority queues and a shortest-path layer built on them.
//!
//! Seven min-heap variants implement one contract — insert, minimum
//! inspection and extraction, key lookup by external id, and
//! decrease-key — with different internal representations and
//! asymptotic trade-offs:
//!
//! - **Binary heap**: the array baseline; O(log n) everything
//! - **Weak heap**: array + reverse bits; fewer comparisons per pop
//! - **Binomial heap**: forest with binary-addition merges
//! - **Pairing heap**: two-pass pairing, o(log n) amortized decrease-key
//! - **Fibonacci heap**: cascading cuts, O(1) amortized decrease-key
//! - **Thin heap**: rank repair instead of marks
//! - **2-3 heap**: Takaoka's trunk structure, O(1) amortized decrease-key
//!
//! The [`shortest_path`] module runs Dijkstra's algorithm against any
//! variant through the [`HeapFactory`] registry, plus a queue-based
//! relaxation oracle used to cross-check results in tests.
//!
//! # Example
//!
//! ```rust
//! use addressable_heaps::pairing::PairingHeap;
//! use addressable_heaps::AddressableHeap;
//!
//! let mut heap = PairingHeap::new();
//! heap.push(5, "a").unwrap();
//! heap.push(3, "b").unwrap();
//! heap.decrease_key("a", 1).unwrap();
//! assert_eq!(heap.peek(), Some((&1, "a")));
//! ```

pub mod binary;
pub mod binomial;
pub mod factory;
pub mod fibonacci;
pub mod graph;
pub mod pairing;
pub mod shortest_path;
pub mod thin;
pub mod traits;
pub mod twothree;
pub mod weak;

pub use factory::HeapFactory;
pub use traits::{AddressableHeap, HeapError, HeapId};
