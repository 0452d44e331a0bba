//! Property tests for the probability layer.
//!
//! Random five-variable boolean nets (edges only from lower to higher
//! index, so every edge mask is acyclic) trained on random frequencies.

use bayesnet_core::{CondEvent, Event, EventCatenation, Interval, Kind, Value, ValueRange};
use bayesnet_prob::{BayesNet, ContinuousLeaf, DiscreteProbability, Gaussian, Uniform};
use bayesnet_table::Table;
use proptest::prelude::*;

const NAMES: [&str; 5] = ["V0", "V1", "V2", "V3", "V4"];
const TOL: f64 = 1e-10;

/// The ten `i < j` pairs, indexed by bit position.
fn pairs() -> Vec<(usize, usize)> {
    (0..NAMES.len())
        .flat_map(|i| ((i + 1)..NAMES.len()).map(move |j| (i, j)))
        .collect()
}

fn trained_net(edge_mask: u16, counts: &[usize]) -> BayesNet {
    let mut net = BayesNet::new();
    for name in NAMES {
        net.add_node(name, Some(ValueRange::boolean()), None);
    }
    for (bit, (i, j)) in pairs().into_iter().enumerate() {
        if edge_mask & (1 << bit) != 0 {
            net.add_cause_effect(NAMES[i], NAMES[j]).unwrap();
        }
    }

    let mut table = Table::new(NAMES.iter().map(|n| (*n, Kind::Bool))).unwrap();
    for (assignment, &count) in counts.iter().enumerate() {
        let row: Vec<Value> = (0..NAMES.len())
            .map(|i| Value::Bool(assignment & (1 << i) != 0))
            .collect();
        for _ in 0..count {
            table.push_row(row.clone()).unwrap();
        }
    }
    let report = net.train_with_table(&table, false).unwrap();
    assert!(report.is_complete());
    net
}

fn cond(events: Vec<Event>, conditions: Vec<Event>) -> CondEvent {
    CondEvent::new(
        EventCatenation::from_events(events).unwrap(),
        EventCatenation::from_events(conditions).unwrap(),
    )
    .unwrap()
}

fn arb_counts() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..5, 1 << NAMES.len())
}

// ============================================================================
// Tables
// ============================================================================

proptest! {
    #[test]
    fn prop_normalised_rows_sum_to_one_or_zero(
        size in 2u64..6,
        tenths in prop::collection::vec(prop::option::of(0u32..=10), 12),
    ) {
        let range = ValueRange::with_values(Kind::UInt, (0..size).map(Value::UInt)).unwrap();
        let mut cpt = DiscreteProbability::new(
            "X",
            range,
            vec![("C".to_string(), ValueRange::boolean())],
        )
        .unwrap();
        for (k, cell) in tenths.iter().enumerate() {
            if let Some(t) = cell {
                let x = Value::UInt(k as u64 % size);
                let c = Value::Bool(k % 2 == 0);
                cpt.set(x, &[c], f64::from(*t) / 10.0).unwrap();
            }
        }
        cpt.normalise();
        for sum in cpt.row_sums().values() {
            prop_assert!(*sum == 0.0 || (sum - 1.0).abs() < TOL, "row sum {}", sum);
        }
    }

    #[test]
    fn prop_canonise_covers_every_cell(
        size in 1u64..5,
        observed in prop::collection::vec((0u64..5, any::<bool>()), 1..10),
    ) {
        let range = ValueRange::with_values(Kind::UInt, (0..size).map(Value::UInt)).unwrap();
        let mut cpt = DiscreteProbability::new(
            "X",
            range,
            vec![("C".to_string(), ValueRange::boolean())],
        )
        .unwrap();
        for (x, c) in &observed {
            cpt.set(Value::UInt(x % size), &[Value::Bool(*c)], 0.5).unwrap();
        }
        cpt.canonise().unwrap();
        prop_assert_eq!(cpt.len(), size as usize * 2);
        for x in 0..size {
            for c in [false, true] {
                prop_assert!(cpt.get(&Value::UInt(x), &[Value::Bool(c)]).is_some());
            }
        }
    }
}

// ============================================================================
// Networks
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_joint_is_product_of_chain_factors(
        edge_mask in 0u16..1024,
        counts in arb_counts(),
        assignment in prop::collection::vec(any::<bool>(), NAMES.len()),
    ) {
        let net = trained_net(edge_mask, &counts);
        prop_assert!(net.fully_defined());

        let order = net.breadth_first_node_names();
        let event = |name: &str| {
            let i = NAMES.iter().position(|n| *n == name).unwrap();
            Event::equals(name, assignment[i])
        };

        let joint = net.p(&cond(order.iter().map(|n| event(n.as_str())).collect(), vec![]));
        let mut product = 1.0;
        for (k, name) in order.iter().enumerate() {
            let prefix = order[..k].iter().map(|n| event(n.as_str())).collect();
            product *= net.p(&cond(vec![event(name.as_str())], prefix));
        }
        prop_assert!(joint > 0.0);
        prop_assert!((joint - product).abs() < TOL, "{} vs {}", joint, product);
    }

    #[test]
    fn prop_pruning_never_changes_the_result(
        edge_mask in 0u16..1024,
        counts in arb_counts(),
        target in 0usize..5,
        observed in prop::collection::vec(prop::option::of(any::<bool>()), NAMES.len()),
    ) {
        let net = trained_net(edge_mask, &counts);
        let conditions: Vec<Event> = observed
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .filter_map(|(i, v)| v.map(|v| Event::equals(NAMES[i], v)))
            .collect();
        let q = cond(vec![Event::equals(NAMES[target], true)], conditions);

        let pruned = net.evaluate(&q, true).unwrap();
        let full = net.evaluate(&q, false).unwrap();
        prop_assert!((pruned - full).abs() < TOL, "{}: {} vs {}", q, pruned, full);

        for name in net.irrelevant(&q) {
            prop_assert!(!net.parents(NAMES[target]).contains(&name));
        }
    }
}

// ============================================================================
// Continuous Leaves
// ============================================================================

proptest! {
    #[test]
    fn prop_gaussian_measures(mean in -100.0f64..100.0, std_dev in 0.01f64..50.0) {
        let g = Gaussian::new(mean, std_dev).unwrap();
        prop_assert!((g.interval_probability(&Interval::full()) - 1.0).abs() < TOL);
        prop_assert_eq!(g.interval_probability(&Interval::point(mean)), 0.0);
        let one_sigma = Interval::closed(mean - std_dev, mean + std_dev).unwrap();
        prop_assert!((g.interval_probability(&one_sigma) - 0.6826894921).abs() < 1e-9);
    }

    #[test]
    fn prop_uniform_half_lines(a in 0.0f64..=1.0) {
        let u = ContinuousLeaf::Uniform(Uniform::new(0.0, 1.0).unwrap());
        prop_assert!((u.interval_probability(&Interval::at_least(a)) - (1.0 - a)).abs() < TOL);
        prop_assert!((u.interval_probability(&Interval::at_most(a)) - a).abs() < TOL);
    }
}
