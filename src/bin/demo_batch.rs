use std::collections::BTreeMap;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use matchday_oracle::goals::Outcome;
use matchday_oracle::synthetic::synthetic_inputs;
use matchday_oracle::{EngineConfig, init_tracing, load_tables, predict_many};

fn main() -> Result<()> {
    init_tracing();
    let config = EngineConfig::from_env()?;
    let tables = load_tables(&config)?;

    let n = std::env::args()
        .nth(1)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(100);
    let seed = std::env::var("DEMO_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(2024);

    let inputs = synthetic_inputs(&mut StdRng::seed_from_u64(seed), n);
    let results = predict_many(&inputs, &config, &tables);

    let mut outcomes: BTreeMap<Outcome, usize> = BTreeMap::new();
    let mut value_bets = 0usize;
    let mut total_goals = 0.0;
    let mut confidence = 0.0;
    for r in &results {
        *outcomes.entry(r.expected_result).or_default() += 1;
        value_bets += r.value_bets.len();
        total_goals += r.total_goals;
        confidence += r.confidence;
    }

    let count = results.len().max(1) as f64;
    println!("Fixtures: {} (seed {seed})", results.len());
    for outcome in Outcome::ALL {
        println!(
            "{:<9} {}",
            outcome.as_str(),
            outcomes.get(&outcome).copied().unwrap_or(0)
        );
    }
    println!("Avg total: {:.2}", total_goals / count);
    println!("Avg confidence: {:.1}", confidence / count);
    println!("Value bets: {value_bets}");
    Ok(())
}
