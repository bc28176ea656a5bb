//! Single-source shortest paths over a weighted directed graph.
//!
//! [`DijkstraShortestPath`] is the real algorithm; it runs against any
//! heap variant through the factory registry, which is how the heaps'
//! external contract gets exercised end to end. [`BfsShortestPath`] is a
//! plain queue-based relaxation kept as a cross-check oracle for small
//! inputs; it is not an efficient algorithm and its tie-break between
//! equal-cost paths can differ from Dijkstra's, so harnesses should
//! compare distances, not paths, against it.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Add;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::factory::HeapFactory;
use crate::graph::{VertexId, WeightedGraph};

/// Edge-weight / distance types: ordered, copyable, addable, with
/// `Default` supplying the zero origin distance.
pub trait Weight: Ord + Copy + Add<Output = Self> + Default {}

impl<T> Weight for T where T: Ord + Copy + Add<Output = Self> + Default {}

/// A shortest path from the start vertex to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<W> {
    /// Total weight along `vertices`.
    pub distance: W,
    /// The vertices walked, starting at the source and ending at the
    /// destination.
    pub vertices: Vec<VertexId>,
}

impl<W: fmt::Display> fmt::Display for Path<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path (")?;
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, "->")?;
            }
            write!(f, "{vertex}")?;
        }
        write!(f, ", distance: {})", self.distance)
    }
}

/// Computes shortest paths from a start vertex to every reachable
/// vertex. Unreachable vertices are absent from the result.
pub trait ShortestPath<W: Weight> {
    /// Name for logs and comparison harnesses.
    fn name(&self) -> &str;

    fn run(&self, graph: &WeightedGraph<W>, start_vertex_id: VertexId)
        -> FxHashMap<VertexId, Path<W>>;
}

/// Dijkstra's algorithm on top of an addressable heap.
///
/// The heap is keyed by tentative distance with the vertex id as the
/// element id; settling pops the closest unsettled vertex, relaxation
/// either inserts a neighbor or decreases its key. Negative tentative
/// distances are a contract violation and abort the run.
pub struct DijkstraShortestPath<W> {
    heap_factory: HeapFactory<W, VertexId>,
    name: String,
}

impl<W: Weight + 'static> DijkstraShortestPath<W> {
    pub fn new(heap_factory: HeapFactory<W, VertexId>) -> Self {
        Self {
            name: format!("Dijkstra's Shortest Path ({})", heap_factory.name()),
            heap_factory,
        }
    }
}

impl<W: Weight + 'static> ShortestPath<W> for DijkstraShortestPath<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(
        &self,
        weighted_graph: &WeightedGraph<W>,
        start_vertex_id: VertexId,
    ) -> FxHashMap<VertexId, Path<W>> {
        let mut num_adds = 0u64;
        let mut num_pops = 0u64;
        let mut num_reduce_keys = 0u64;

        // Predecessor on the current best path to each touched vertex.
        let mut prev_vertex: FxHashMap<VertexId, VertexId> = FxHashMap::default();

        let graph = &weighted_graph.graph;
        let weights = &weighted_graph.edge_weights;

        let mut heap = self.heap_factory.build();
        heap.push(W::default(), start_vertex_id)
            .expect("fresh heap rejected the start vertex");
        num_adds += 1;

        let mut results: FxHashMap<VertexId, Path<W>> = FxHashMap::default();
        while let Some((distance, vertex_id)) = heap.pop() {
            num_pops += 1;

            // Skip if this vertex was already settled.
            if results.contains_key(&vertex_id) {
                continue;
            }
            results.insert(
                vertex_id,
                Path {
                    distance,
                    vertices: Vec::new(),
                },
            );

            for edge in graph.vertex(vertex_id).edges() {
                let to_id = edge.to_vertex_id();

                // A settled neighbor already has a shorter path.
                if results.contains_key(&to_id) {
                    continue;
                }

                let total_distance = distance + weights.get(edge.id());
                assert!(
                    total_distance >= W::default(),
                    "negative distance computed; weights must be non-negative"
                );

                match heap.get(to_id) {
                    None => {
                        heap.push(total_distance, to_id)
                            .expect("neighbor unexpectedly in heap");
                        num_adds += 1;
                        prev_vertex.insert(to_id, vertex_id);
                    }
                    Some(&current) if total_distance < current => {
                        heap.decrease_key(to_id, total_distance)
                            .expect("relaxation failed to decrease the key");
                        num_reduce_keys += 1;
                        prev_vertex.insert(to_id, vertex_id);
                    }
                    Some(_) => {}
                }
            }
        }

        // Walk the predecessor chain backwards for each settled vertex.
        for (&vertex_id, path) in results.iter_mut() {
            let mut current = vertex_id;
            while current != start_vertex_id {
                path.vertices.push(current);
                current = prev_vertex[&current];
            }
            path.vertices.push(start_vertex_id);
            path.vertices.reverse();
        }

        debug!(num_adds, num_pops, num_reduce_keys, heap = self.heap_factory.name(), "heap operations");

        results
    }
}

/// FIFO relaxation "shortest path".
///
/// Re-relaxes vertices whenever a shorter distance is found, so it
/// terminates with correct distances for non-negative weights, but it is
/// quadratic in the worst case and its choice among equal-cost paths is
/// an artifact of queue order. Verification oracle only.
pub struct BfsShortestPath;

impl<W: Weight> ShortestPath<W> for BfsShortestPath {
    fn name(&self) -> &str {
        "BFS Shortest Path"
    }

    fn run(
        &self,
        weighted_graph: &WeightedGraph<W>,
        start_vertex_id: VertexId,
    ) -> FxHashMap<VertexId, Path<W>> {
        let graph = &weighted_graph.graph;
        let weights = &weighted_graph.edge_weights;

        let mut results: FxHashMap<VertexId, Path<W>> = FxHashMap::default();
        results.insert(
            start_vertex_id,
            Path {
                distance: W::default(),
                vertices: vec![start_vertex_id],
            },
        );

        let mut queue = VecDeque::new();
        queue.push_back(start_vertex_id);

        while let Some(vertex_id) = queue.pop_front() {
            let current = results[&vertex_id].clone();

            for edge in graph.vertex(vertex_id).edges() {
                let to_id = edge.to_vertex_id();
                let total_distance = current.distance + weights.get(edge.id());

                if let Some(existing) = results.get(&to_id) {
                    if total_distance >= existing.distance {
                        continue;
                    }
                }

                let mut vertices = current.vertices.clone();
                vertices.push(to_id);
                results.insert(
                    to_id,
                    Path {
                        distance: total_distance,
                        vertices,
                    },
                );
                queue.push_back(to_id);
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, Properties};

    fn two_hop_graph() -> WeightedGraph<i64> {
        let mut builder = GraphBuilder::new("two-hop");
        let a = builder.add_vertex();
        let b = builder.add_vertex();
        let c = builder.add_vertex();
        let mut weights = Properties::new(0);
        weights.set(builder.add_edge(a, b), 4);
        weights.set(builder.add_edge(b, c), 2);
        weights.set(builder.add_edge(a, c), 9);
        let graph = builder.build();
        graph.validate();
        WeightedGraph::new(graph, weights)
    }

    #[test]
    fn dijkstra_takes_the_cheaper_two_hop_route() {
        let graph = two_hop_graph();
        let dijkstra = DijkstraShortestPath::new(HeapFactory::binary());
        let results = dijkstra.run(&graph, 0);
        assert_eq!(results[&2].distance, 6);
        assert_eq!(results[&2].vertices, vec![0, 1, 2]);
    }

    #[test]
    fn bfs_oracle_agrees_on_distances() {
        let graph = two_hop_graph();
        let bfs = BfsShortestPath;
        let results = bfs.run(&graph, 0);
        assert_eq!(results[&1].distance, 4);
        assert_eq!(results[&2].distance, 6);
    }

    #[test]
    fn path_display_renders_the_route() {
        let path = Path {
            distance: 9,
            vertices: vec![0, 1, 2, 3],
        };
        assert_eq!(path.to_string(), "Path (0->1->2->3, distance: 9)");
    }
}
