use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::info;

use matchday_oracle::standings::{StatsLookup, parse_standings_json};
use matchday_oracle::store::{self, PredictionStore};
use matchday_oracle::{EngineConfig, PredictionInput, init_tracing, load_tables, predict_many};

fn main() -> Result<()> {
    init_tracing();
    let config = EngineConfig::from_env()?;

    let mut path = None;
    let mut standings_path = None;
    let mut persist = false;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => persist = true,
            "--standings" => {
                standings_path = Some(PathBuf::from(
                    args.next().context("--standings needs a file")?,
                ))
            }
            _ => path = Some(PathBuf::from(arg)),
        }
    }
    let path = path.ok_or_else(|| {
        anyhow!("usage: matchday_oracle <input.json> [--standings <file>] [--store]")
    })?;

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).context("invalid input json")?;
    let batch = value.is_array();
    let mut inputs: Vec<PredictionInput> = if batch {
        serde_json::from_value(value).context("invalid prediction inputs")?
    } else {
        vec![serde_json::from_value(value).context("invalid prediction input")?]
    };

    if let Some(standings_path) = standings_path {
        let raw = fs::read_to_string(&standings_path)
            .with_context(|| format!("read {}", standings_path.display()))?;
        let standings = parse_standings_json(&raw)?;
        let mut lookup = StatsLookup::new(config.stats_cache_ttl);
        let mut filled = 0usize;
        for input in inputs.iter_mut() {
            if input.enriched.home_stats.is_some() && input.enriched.away_stats.is_some() {
                continue;
            }
            let h2h = std::mem::take(&mut input.enriched.h2h);
            let ctx = &input.context;
            let data = lookup.enrich(&standings, &ctx.home_team, &ctx.away_team, h2h);
            let enriched = &mut input.enriched;
            enriched.home_stats = enriched.home_stats.take().or(data.home_stats);
            enriched.away_stats = enriched.away_stats.take().or(data.away_stats);
            enriched.h2h = data.h2h;
            if enriched.standings.is_empty() {
                enriched.standings = data.standings;
            }
            filled += 1;
        }
        info!(filled, league_size = standings.league_size(), "inputs enriched from standings");
    }

    let tables = load_tables(&config)?;
    let results = predict_many(&inputs, &config, &tables);
    for r in &results {
        for bet in &r.value_bets {
            info!(
                home = %r.home_team,
                away = %r.away_team,
                bookmaker = %bet.bookmaker,
                odds = bet.best_odds,
                "{} | {}",
                bet.recommendation(),
                bet.explanation()
            );
        }
    }

    if persist {
        let db_path = config
            .db_path
            .clone()
            .or_else(store::default_db_path)
            .context("unable to resolve sqlite path")?;
        let store = PredictionStore::open(&db_path)?;
        for result in &results {
            store.save(result)?;
        }
        info!(count = results.len(), db = %db_path.display(), "predictions saved");
    }

    let out = if batch {
        serde_json::to_string_pretty(&results)
    } else {
        serde_json::to_string_pretty(&results[0])
    }
    .context("serialize prediction")?;
    println!("{out}");
    Ok(())
}
