//! Bayes-Ball: which conditions can a query ignore?
//!
//! Balls start at every query variable, travelling up to its parents (as
//! if arriving "from a child") and down to its children ("from a parent").
//! Each vertex is visited at most once per direction.
//!
//! | vertex | ball from a child | ball from a parent |
//! |---|---|---|
//! | query variable | stop | stop |
//! | observed | mark requisite, stop | absorbed |
//! | unobserved | pass to parents and children | pass to children; to parents too if it has an observed descendant |
//!
//! Observed conditions that are never marked are irrelevant. Every parent
//! of a query variable is marked, so pruning never removes a condition
//! the chain-rule evaluator reads.

use std::collections::{BTreeSet, HashSet, VecDeque};

use bayesnet_core::{CondEvent, Dag};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    Child,
    Parent,
}

/// Result of one Bayes-Ball pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    /// Observed conditions the query depends on.
    pub requisite: BTreeSet<String>,
    /// Observed conditions that can be dropped.
    pub irrelevant: BTreeSet<String>,
}

/// Run Bayes-Ball for `query` over `dag`.
///
/// Conditions naming variables outside the graph are irrelevant.
pub fn bayes_ball<V, E>(dag: &Dag<V, E>, query: &CondEvent) -> Reachability {
    let targets: BTreeSet<&str> = query.events().names().collect();
    let observed: BTreeSet<&str> = query
        .conditions()
        .iter()
        .filter(|e| !e.is_placeholder())
        .map(|e| e.name())
        .filter(|n| !targets.contains(n))
        .collect();

    let has_observed_descendant =
        |v: &str| dag.descendants(v).iter().any(|d| observed.contains(d.as_str()));

    let mut queue: VecDeque<(String, Side)> = VecDeque::new();
    for &t in &targets {
        queue.extend(dag.parents(t).into_iter().map(|p| (p, Side::Child)));
        queue.extend(dag.children(t).into_iter().map(|c| (c, Side::Parent)));
    }

    let mut visited: HashSet<(String, Side)> = HashSet::new();
    let mut requisite = BTreeSet::new();

    while let Some((v, from)) = queue.pop_front() {
        if !visited.insert((v.clone(), from)) {
            continue;
        }
        if targets.contains(v.as_str()) {
            continue;
        }
        if observed.contains(v.as_str()) {
            if from == Side::Child {
                requisite.insert(v);
            }
            continue;
        }
        match from {
            Side::Child => {
                queue.extend(dag.parents(&v).into_iter().map(|p| (p, Side::Child)));
                queue.extend(dag.children(&v).into_iter().map(|c| (c, Side::Parent)));
            }
            Side::Parent => {
                queue.extend(dag.children(&v).into_iter().map(|c| (c, Side::Parent)));
                if has_observed_descendant(&v) {
                    queue.extend(dag.parents(&v).into_iter().map(|p| (p, Side::Child)));
                }
            }
        }
    }

    let irrelevant: BTreeSet<String> = observed
        .iter()
        .filter(|n| !requisite.contains(**n))
        .map(|n| n.to_string())
        .collect();
    debug!(query = %query, ?requisite, ?irrelevant, "bayes-ball");
    Reachability {
        requisite,
        irrelevant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bayesnet_core::Event;

    fn dag(vertices: &[&str], edges: &[(&str, &str)]) -> Dag<()> {
        let mut g = Dag::new();
        for v in vertices {
            g.add_vertex(v, ());
        }
        for (a, b) in edges {
            g.add_edge(a, b, ()).unwrap();
        }
        g
    }

    fn query(target: &str, observed: &[&str]) -> CondEvent {
        CondEvent::given(
            Event::equals(target, true),
            observed.iter().map(|o| Event::equals(*o, true)),
        )
        .unwrap()
    }

    #[test]
    fn test_chain() {
        let g = dag(&["X", "Y", "Z"], &[("X", "Y"), ("Y", "Z")]);
        let r = bayes_ball(&g, &query("Z", &["X", "Y"]));
        assert_eq!(r.irrelevant.into_iter().collect::<Vec<_>>(), vec!["X"]);
        assert!(r.requisite.contains("Y"));
    }

    #[test]
    fn test_v_structure() {
        let g = dag(
            &["1", "2", "3", "4", "5", "6"],
            &[("1", "2"), ("3", "2"), ("3", "6"), ("5", "6"), ("5", "4")],
        );
        let r = bayes_ball(&g, &query("6", &["2", "5"]));
        assert_eq!(r.irrelevant.into_iter().collect::<Vec<_>>(), vec!["2"]);
        assert_eq!(r.requisite.into_iter().collect::<Vec<_>>(), vec!["5"]);
    }

    #[test]
    fn test_active_collider_reaches_other_parent() {
        // A -> C <- B, C -> D; observing D activates the collider.
        let g = dag(&["A", "B", "C", "D"], &[("A", "C"), ("B", "C"), ("C", "D")]);
        let r = bayes_ball(&g, &query("A", &["B", "D"]));
        assert!(r.requisite.contains("B"));
        assert_eq!(r.irrelevant.into_iter().collect::<Vec<_>>(), vec!["D"]);
    }

    #[test]
    fn test_unknown_condition_is_irrelevant() {
        let g = dag(&["X"], &[]);
        let r = bayes_ball(&g, &query("X", &["Ghost"]));
        assert!(r.irrelevant.contains("Ghost"));
    }
}
