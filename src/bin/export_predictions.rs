use std::path::PathBuf;

use anyhow::{Context, Result};

use matchday_oracle::export::export_predictions;
use matchday_oracle::store::{self, PredictionStore};
use matchday_oracle::{EngineConfig, init_tracing};

fn main() -> Result<()> {
    init_tracing();
    let config = EngineConfig::from_env()?;

    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("predictions.xlsx"));
    let db_path = config
        .db_path
        .clone()
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;

    let store = PredictionStore::open(&db_path)?;
    let report = export_predictions(&store, &out)?;

    println!("Export complete");
    println!("File: {}", out.display());
    println!("Predictions: {}", report.predictions);
    println!("Verified: {}", report.verified);
    Ok(())
}
