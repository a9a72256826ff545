use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::{info, warn};

use matchday_oracle::store::{self, AccuracyPeriod, PredictionStore};
use matchday_oracle::{EngineConfig, init_tracing};

#[derive(Debug, Deserialize)]
struct FinalScore {
    prediction_id: i64,
    home_goals: u32,
    away_goals: u32,
}

fn main() -> Result<()> {
    init_tracing();
    let config = EngineConfig::from_env()?;

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: verify_results <results.json> [all|week|month]"))?;
    let period = match args.next() {
        Some(raw) => AccuracyPeriod::parse(&raw)
            .ok_or_else(|| anyhow!("unknown period {raw:?}, expected all, week or month"))?,
        None => AccuracyPeriod::All,
    };
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let scores: Vec<FinalScore> = serde_json::from_str(&raw).context("invalid results json")?;

    let db_path = config
        .db_path
        .clone()
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let store = PredictionStore::open(&db_path)?;

    let mut applied = 0usize;
    for score in &scores {
        match store.record_result(score.prediction_id, score.home_goals, score.away_goals) {
            Ok(v) => {
                applied += 1;
                info!(
                    id = score.prediction_id,
                    result_correct = v.result_correct,
                    total_correct = ?v.total_correct,
                    "verified"
                );
            }
            Err(err) => warn!(id = score.prediction_id, "skipped: {err:#}"),
        }
    }

    let summary = store.accuracy(period)?;
    println!("Verified now: {applied}/{}", scores.len());
    println!("Verified total ({}): {}", period.label(), summary.verified);
    println!(
        "Result hits: {} ({})",
        summary.result_hits,
        percent(summary.result_rate())
    );
    println!(
        "Total hits: {}/{} ({})",
        summary.total_hits,
        summary.totals_settled,
        percent(summary.total_rate())
    );
    println!(
        "Wins: {}/{} ({}), draws: {}/{} ({})",
        summary.win_hits,
        summary.win_calls,
        percent(summary.win_rate()),
        summary.draw_hits,
        summary.draw_calls,
        percent(summary.draw_rate())
    );
    if let Some(err) = summary.avg_total_error {
        println!("Avg total error: {err:.2}");
    }
    Ok(())
}

fn percent(rate: Option<f64>) -> String {
    rate.map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0))
}
