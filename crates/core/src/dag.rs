//! # DAG - Name-Keyed Directed Acyclic Graph
//!
//! Vertices are addressed by name and carry a payload `V`; edges carry an
//! optional payload `E`. Every mutation keeps the graph acyclic.
//!
//! ## Policies
//!
//! - **Parallel edges**: when disallowed, a second edge between the same
//!   endpoints (in either direction) is rejected.
//! - **Self loops**: rejected unless enabled. When enabled they are stored
//!   but ignored by `parents`, `children`, `in_degree` and the ordering.
//!
//! The storage is a `petgraph` [`DiGraph`] plus a name index.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, VecDeque};

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::CoreError;

/// A named vertex with its payload.
#[derive(Debug, Clone)]
pub struct Vertex<V> {
    pub name: String,
    pub payload: V,
}

/// A directed acyclic graph keyed by vertex name.
///
/// # Example
///
/// ```rust
/// use bayesnet_core::Dag;
///
/// let mut g: Dag<()> = Dag::new();
/// for v in ["Cloud", "Rain", "Wet"] {
///     g.add_vertex(v, ());
/// }
/// g.add_edge("Cloud", "Rain", ()).unwrap();
/// g.add_edge("Rain", "Wet", ()).unwrap();
/// assert!(g.add_edge("Wet", "Cloud", ()).is_err());
/// assert_eq!(g.breadth_first_enumerate(), vec!["Cloud", "Rain", "Wet"]);
/// ```
#[derive(Debug, Clone)]
pub struct Dag<V, E = ()> {
    graph: DiGraph<Vertex<V>, E>,
    index: HashMap<String, NodeIndex>,
    allow_parallel: bool,
    allow_self_loops: bool,
}

impl<V, E> Default for Dag<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> Dag<V, E> {
    /// An empty graph with parallel edges and self loops disabled.
    pub fn new() -> Self {
        Self::with_policy(false, false)
    }

    pub fn with_policy(allow_parallel: bool, allow_self_loops: bool) -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            allow_parallel,
            allow_self_loops,
        }
    }

    pub fn allows_parallel(&self) -> bool {
        self.allow_parallel
    }

    pub fn allows_self_loops(&self) -> bool {
        self.allow_self_loops
    }

    /// Add a vertex. Returns `false` (and keeps the old payload) if the
    /// name already exists.
    pub fn add_vertex(&mut self, name: &str, payload: V) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        let idx = self.graph.add_node(Vertex {
            name: name.to_string(),
            payload,
        });
        self.index.insert(name.to_string(), idx);
        true
    }

    fn lookup(&self, name: &str) -> Result<NodeIndex, CoreError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::UnknownVertex {
                name: name.to_string(),
            })
    }

    /// Add the edge `from -> to`.
    ///
    /// Fails on unknown endpoints, disallowed self loops or parallel edges,
    /// and on any edge that would close a directed cycle.
    pub fn add_edge(&mut self, from: &str, to: &str, payload: E) -> Result<(), CoreError> {
        let a = self.lookup(from)?;
        let b = self.lookup(to)?;

        if a == b {
            if !self.allow_self_loops {
                return Err(CoreError::SelfLoop {
                    node: from.to_string(),
                });
            }
        } else {
            if !self.allow_parallel
                && (self.graph.contains_edge(a, b) || self.graph.contains_edge(b, a))
            {
                return Err(CoreError::ParallelEdge {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            if has_path_connecting(&self.graph, b, a, None) {
                return Err(CoreError::Cycle {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        self.graph.add_edge(a, b, payload);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn vertex(&self, name: &str) -> Option<&V> {
        self.index.get(name).map(|&i| &self.graph[i].payload)
    }

    pub fn vertex_mut(&mut self, name: &str) -> Option<&mut V> {
        let idx = *self.index.get(name)?;
        Some(&mut self.graph[idx].payload)
    }

    /// Vertex names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|v| v.name.as_str())
    }

    /// Payloads paired with their names, in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = (&str, &V)> {
        self.graph
            .node_weights()
            .map(|v| (v.name.as_str(), &v.payload))
    }

    /// All edges as `(from, to, payload)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &E)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].name.as_str(),
                self.graph[e.target()].name.as_str(),
                e.weight(),
            )
        })
    }

    fn neighbours(&self, name: &str, dir: Direction) -> Vec<String> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let set: BTreeSet<&str> = self
            .graph
            .neighbors_directed(idx, dir)
            .filter(|&n| n != idx)
            .map(|n| self.graph[n].name.as_str())
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Direct predecessors, sorted by name.
    pub fn parents(&self, name: &str) -> Vec<String> {
        self.neighbours(name, Direction::Incoming)
    }

    /// Direct successors, sorted by name.
    pub fn children(&self, name: &str) -> Vec<String> {
        self.neighbours(name, Direction::Outgoing)
    }

    /// Number of incoming edges, self loops excluded.
    pub fn in_degree(&self, name: &str) -> usize {
        self.index
            .get(name)
            .map(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .filter(|e| e.source() != idx)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Every vertex reachable from `name` ignoring edge direction, excluding
    /// `name` itself.
    pub fn connected(&self, name: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let Some(&start) = self.index.get(name) else {
            return seen;
        };
        let mut visited = vec![false; self.graph.node_count()];
        let mut queue = VecDeque::from([start]);
        visited[start.index()] = true;
        while let Some(idx) = queue.pop_front() {
            for n in self.graph.neighbors_undirected(idx) {
                if !visited[n.index()] {
                    visited[n.index()] = true;
                    seen.insert(self.graph[n].name.clone());
                    queue.push_back(n);
                }
            }
        }
        seen
    }

    /// Every vertex reachable from `name` along directed edges, excluding
    /// `name` itself.
    pub fn descendants(&self, name: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let Some(&start) = self.index.get(name) else {
            return out;
        };
        let mut visited = vec![false; self.graph.node_count()];
        let mut stack = vec![start];
        visited[start.index()] = true;
        while let Some(idx) = stack.pop() {
            for n in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if !visited[n.index()] {
                    visited[n.index()] = true;
                    out.insert(self.graph[n].name.clone());
                    stack.push(n);
                }
            }
        }
        out
    }

    /// Is there a directed path `from ->* to`? A vertex reaches itself.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => has_path_connecting(&self.graph, a, b, None),
            _ => false,
        }
    }

    /// Topological order: vertices with no pending parents are emitted
    /// first, ties broken by lower original in-degree then by name.
    pub fn breadth_first_enumerate(&self) -> Vec<String> {
        let n = self.graph.node_count();
        let original: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.in_degree(&self.graph[idx].name))
            .collect();
        let mut pending = original.clone();

        let mut ready = BinaryHeap::new();
        for idx in self.graph.node_indices() {
            if pending[idx.index()] == 0 {
                ready.push(Reverse((original[idx.index()], self.graph[idx].name.as_str(), idx)));
            }
        }

        let mut order = Vec::with_capacity(n);
        while let Some(Reverse((_, name, idx))) = ready.pop() {
            order.push(name.to_string());
            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let child = edge.target();
                if child == idx {
                    continue;
                }
                pending[child.index()] -= 1;
                if pending[child.index()] == 0 {
                    ready.push(Reverse((
                        original[child.index()],
                        self.graph[child].name.as_str(),
                        child,
                    )));
                }
            }
        }
        order
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Drop every vertex and edge; the policies are kept.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(names: &[&str]) -> Dag<()> {
        let mut g = Dag::new();
        for n in names {
            g.add_vertex(n, ());
        }
        for w in names.windows(2) {
            g.add_edge(w[0], w[1], ()).unwrap();
        }
        g
    }

    #[test]
    fn test_add_vertex_idempotent() {
        let mut g: Dag<i32> = Dag::new();
        assert!(g.add_vertex("A", 1));
        assert!(!g.add_vertex("A", 2));
        assert_eq!(g.vertex("A"), Some(&1));
        assert_eq!(g.vertex_count(), 1);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut g = chain(&["A", "B", "C"]);
        let err = g.add_edge("C", "A", ()).unwrap_err();
        assert!(matches!(err, CoreError::Cycle { .. }));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_parallel_edges() {
        let mut g = chain(&["A", "B"]);
        assert!(matches!(
            g.add_edge("A", "B", ()),
            Err(CoreError::ParallelEdge { .. })
        ));
        assert!(matches!(
            g.add_edge("B", "A", ()),
            Err(CoreError::ParallelEdge { .. })
        ));

        let mut multi: Dag<()> = Dag::with_policy(true, false);
        multi.add_vertex("A", ());
        multi.add_vertex("B", ());
        multi.add_edge("A", "B", ()).unwrap();
        multi.add_edge("A", "B", ()).unwrap();
        assert_eq!(multi.edge_count(), 2);
        assert_eq!(multi.in_degree("B"), 2);
        assert_eq!(multi.parents("B"), vec!["A"]);
    }

    #[test]
    fn test_self_loops() {
        let mut g = chain(&["A"]);
        assert!(matches!(
            g.add_edge("A", "A", ()),
            Err(CoreError::SelfLoop { .. })
        ));

        let mut looped: Dag<()> = Dag::with_policy(false, true);
        looped.add_vertex("A", ());
        looped.add_edge("A", "A", ()).unwrap();
        assert!(looped.parents("A").is_empty());
        assert_eq!(looped.in_degree("A"), 0);
        assert_eq!(looped.breadth_first_enumerate(), vec!["A"]);
    }

    #[test]
    fn test_unknown_vertex() {
        let mut g = chain(&["A"]);
        assert!(matches!(
            g.add_edge("A", "Z", ()),
            Err(CoreError::UnknownVertex { ref name }) if name == "Z"
        ));
    }

    #[test]
    fn test_relations() {
        let mut g = chain(&["A", "B", "C"]);
        g.add_vertex("D", ());
        g.add_vertex("E", ());
        g.add_edge("D", "B", ()).unwrap();
        assert_eq!(g.parents("B"), vec!["A", "D"]);
        assert_eq!(g.children("A"), vec!["B"]);
        assert_eq!(
            g.descendants("A").into_iter().collect::<Vec<_>>(),
            vec!["B", "C"]
        );
        assert_eq!(
            g.connected("C").into_iter().collect::<Vec<_>>(),
            vec!["A", "B", "D"]
        );
        assert!(g.has_path("D", "C"));
        assert!(!g.has_path("C", "D"));
        assert!(g.connected("E").is_empty());
    }

    #[test]
    fn test_breadth_first_prefers_low_in_degree() {
        let mut g: Dag<()> = Dag::new();
        for n in ["Wet", "Sprinkler", "Rain", "Cloud"] {
            g.add_vertex(n, ());
        }
        g.add_edge("Cloud", "Sprinkler", ()).unwrap();
        g.add_edge("Cloud", "Rain", ()).unwrap();
        g.add_edge("Sprinkler", "Wet", ()).unwrap();
        g.add_edge("Rain", "Wet", ()).unwrap();
        assert_eq!(
            g.breadth_first_enumerate(),
            vec!["Cloud", "Rain", "Sprinkler", "Wet"]
        );
    }

    #[test]
    fn test_clear() {
        let mut g = chain(&["A", "B"]);
        g.clear();
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
        assert!(g.add_vertex("A", ()));
    }
}
