//! Smoke tests for the core crate.
//!
//! These tests verify that the basic vocabulary works end to end:
//! - Values parse, order and hash consistently
//! - Ranges and events compose and detect conflicts
//! - The DAG stays acyclic under arbitrary edge sequences

use std::collections::HashSet;

use bayesnet_core::{
    CondEvent, CoreError, Dag, ErrorClass, Event, EventCatenation, Interval, Kind, Value,
    ValueRange,
};
use proptest::prelude::*;

// ============================================================================
// Value Tests
// ============================================================================

#[test]
fn smoke_values_parse_and_display() {
    let v = Value::parse_as(Kind::Char, "'B'").unwrap();
    assert_eq!(v, Value::Char('B'));
    assert_eq!(v.to_string(), "'B'");

    let d = Value::parse_as(Kind::Date, "2024-03-01").unwrap();
    assert_eq!(d.kind(), Kind::Date);

    let i = Value::parse_as(Kind::FloatInterval, "[0.5, +inf)").unwrap();
    assert!(i.contains(&Value::Float(0.5)));
    assert!(!i.contains(&Value::Float(0.4)));
}

#[test]
fn smoke_value_parse_errors_are_classified() {
    let err = Value::parse_as(Kind::UInt, "-1").unwrap_err();
    assert_eq!(err.class(), ErrorClass::Parse);
    assert!(Value::parse_as(Kind::Int, "").is_err());
}

#[test]
fn smoke_value_total_order_across_kinds() {
    let mut values = vec![
        Value::from("abc"),
        Value::Float(2.0),
        Value::Bool(true),
        Value::Int(-3),
        Value::Float(-1.0),
    ];
    values.sort();
    assert_eq!(values[0], Value::Bool(true));
    assert_eq!(values[1], Value::Int(-3));
    assert_eq!(values[2], Value::Float(-1.0));
    assert_eq!(values[4], Value::from("abc"));

    let set: HashSet<Value> = values.into_iter().collect();
    assert!(set.contains(&Value::Float(2.0)));
}

#[test]
fn smoke_value_serde() {
    let v = Value::from(Interval::closed(1i64, 4).unwrap());
    let json = serde_json::to_string(&v).unwrap();
    let back: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v, back);
}

// ============================================================================
// Range and Event Tests
// ============================================================================

#[test]
fn smoke_range_building() {
    let mut rain = ValueRange::discrete(Kind::String);
    for v in ["heavy", "light", "none", "light"] {
        rain.add(Value::from(v)).unwrap();
    }
    assert_eq!(rain.len(), 3);
    assert_eq!(rain.to_string(), "string{heavy, light, none}");
}

#[test]
fn smoke_cond_event_display() {
    let q = CondEvent::given(
        Event::equals("Rain", "heavy"),
        [Event::equals("Cloud", true)],
    )
    .unwrap();
    assert_eq!(q.to_string(), "P(Rain=heavy | Cloud=true)");
}

#[test]
fn smoke_conflict_is_reported() {
    let a = EventCatenation::single(Event::equals("Cloud", true));
    let b = EventCatenation::single(Event::equals("Cloud", false));
    let err = a.and(&b).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Conflict);
    assert!(err.to_string().contains("Cloud"));
}

// ============================================================================
// DAG Tests
// ============================================================================

#[test]
fn smoke_dag_rejects_cycle() {
    let mut g: Dag<()> = Dag::new();
    for v in ["X", "Y", "Z"] {
        g.add_vertex(v, ());
    }
    g.add_edge("X", "Y", ()).unwrap();
    g.add_edge("Y", "Z", ()).unwrap();
    let err = g.add_edge("Z", "X", ()).unwrap_err();
    assert_eq!(
        err,
        CoreError::Cycle {
            from: "Z".to_string(),
            to: "X".to_string()
        }
    );
    assert_eq!(err.class(), ErrorClass::Structural);
}

proptest! {
    /// Whatever sequence of edges is offered, the accepted ones never form a
    /// cycle and the breadth-first order lists every parent before its child.
    #[test]
    fn prop_accepted_edges_stay_acyclic(
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..40)
    ) {
        let names: Vec<String> = (0..8).map(|i| format!("v{}", i)).collect();
        let mut g: Dag<()> = Dag::new();
        for n in &names {
            g.add_vertex(n, ());
        }
        for (a, b) in edges {
            let _ = g.add_edge(&names[a], &names[b], ());
        }

        for n in &names {
            prop_assert!(!g.descendants(n).contains(n));
        }

        let order = g.breadth_first_enumerate();
        prop_assert_eq!(order.len(), names.len());
        let position = |n: &str| order.iter().position(|o| o == n).unwrap();
        for (from, to, _) in g.edges() {
            prop_assert!(position(from) < position(to));
        }
    }
}
