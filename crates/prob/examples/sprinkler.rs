//! The sprinkler network: training, queries and Bayes-Ball.
//!
//! Run with: cargo run -p bayesnet-prob --example sprinkler
//!
//! Set `RUST_LOG=bayesnet_prob=debug` to watch training and pruning.
//!
//! Structure:
//!
//! ```text
//!          Cloud
//!        ↙       ↘
//!     Rain     Sprinkler
//!        ↘       ↙
//!        WetGrass
//! ```

use bayesnet_core::{CondEvent, Event, EventCatenation, Kind, Value, ValueRange};
use bayesnet_prob::BayesNet;
use bayesnet_table::Table;
use tracing_subscriber::EnvFilter;

/// How many times each (cloud, rain, sprinkler, wet) combination was seen.
/// Every combination appears at least once.
fn observations(cloud: bool, rain: &str, sprinkler: u64, wet: bool) -> usize {
    let mut n = 1;
    if cloud && rain == "heavy" {
        n += 3;
    }
    if !cloud && rain == "none" {
        n += 4;
    }
    if cloud && sprinkler == 0 {
        n += 2;
    }
    if wet == (rain != "none" || sprinkler > 0) {
        n += 2;
    }
    n
}

fn training_table() -> Result<Table, Box<dyn std::error::Error>> {
    let mut table = Table::new([
        ("Cloud", Kind::Bool),
        ("Rain", Kind::String),
        ("Sprinkler", Kind::UInt),
        ("WetGrass", Kind::Bool),
    ])?;
    for cloud in [true, false] {
        for rain in ["heavy", "light", "none"] {
            for sprinkler in 0..4u64 {
                for wet in [true, false] {
                    for _ in 0..observations(cloud, rain, sprinkler, wet) {
                        table.push_row(vec![
                            Value::Bool(cloud),
                            Value::from(rain),
                            Value::UInt(sprinkler),
                            Value::Bool(wet),
                        ])?;
                    }
                }
            }
        }
    }
    Ok(table)
}

fn query(events: Vec<Event>, conditions: Vec<Event>) -> Result<CondEvent, Box<dyn std::error::Error>> {
    Ok(CondEvent::new(
        EventCatenation::from_events(events)?,
        EventCatenation::from_events(conditions)?,
    )?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== The Sprinkler Network ===\n");

    // -------------------------------------------------------------------------
    // 1. Structure
    // -------------------------------------------------------------------------
    let mut net = BayesNet::new();
    net.add_node("Cloud", Some(ValueRange::boolean()), Some("overcast sky"));
    net.add_node("Rain", None, Some("rain intensity"));
    net.add_node(
        "Sprinkler",
        Some(ValueRange::with_values(Kind::UInt, (0..4u64).map(Value::UInt))?),
        Some("sprinkler setting"),
    );
    net.add_node("WetGrass", Some(ValueRange::boolean()), None);
    net.add_cause_effect("Cloud", "Rain")?;
    net.add_cause_effect("Cloud", "Sprinkler")?;
    net.add_cause_effect("Rain", "WetGrass")?;
    net.add_cause_effect("Sprinkler", "WetGrass")?;

    println!("1. Structure");
    println!("------------");
    for name in net.breadth_first_node_names() {
        let parents = net.parents(&name);
        println!("  {:<10} parents: {:?}", name, parents);
    }
    println!();

    // -------------------------------------------------------------------------
    // 2. Training
    // -------------------------------------------------------------------------
    let table = training_table()?;
    let report = net.train_with_table(&table, false)?;

    println!("2. Training on {} observations", table.iter_rows().count());
    println!("--------------------------------");
    println!("  trained: {:?}", report.trained);
    for (name, error) in &report.failed {
        println!("  failed:  {} ({})", name, error);
    }
    if let Some(rain) = net.node("Rain") {
        println!("  discovered: {}", rain);
    }
    println!("  fully defined: {}", net.fully_defined());
    println!();

    // -------------------------------------------------------------------------
    // 3. Queries
    // -------------------------------------------------------------------------
    println!("3. Queries");
    println!("----------");
    let queries = [
        query(vec![Event::equals("Cloud", true)], vec![])?,
        query(
            vec![Event::equals("Rain", "heavy")],
            vec![Event::equals("Cloud", true)],
        )?,
        query(
            vec![Event::equals("Rain", "none")],
            vec![Event::equals("Cloud", false)],
        )?,
        query(
            vec![Event::greater("Sprinkler", 1u64)],
            vec![Event::equals("Cloud", true)],
        )?,
        query(
            vec![Event::equals("Cloud", true), Event::equals("WetGrass", true)],
            vec![],
        )?,
        query(vec![Event::equals("WetGrass", true)], vec![])?,
    ];
    for q in &queries {
        println!("  {:<45} = {:.4}", q.to_string(), net.p(q));
    }
    println!();

    // -------------------------------------------------------------------------
    // 4. Bayes-Ball
    // -------------------------------------------------------------------------
    println!("4. Bayes-Ball");
    println!("------------");
    let q = query(
        vec![Event::equals("WetGrass", true)],
        vec![
            Event::equals("Cloud", true),
            Event::equals("Rain", "light"),
            Event::equals("Sprinkler", 0u64),
        ],
    )?;
    println!("  {}", q);
    println!("  irrelevant conditions: {:?}", net.irrelevant(&q));
    println!("  P = {:.4}", net.p(&q));
    println!();
    println!("Once Rain and Sprinkler are known, Cloud says nothing more about WetGrass.");

    Ok(())
}
