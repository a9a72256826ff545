pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod factors;
pub mod goals;
pub mod markets;
pub mod model;
pub mod overlays;
pub mod pipeline;
pub mod standings;
pub mod store;
pub mod strength;
pub mod synthetic;
pub mod tables;
pub mod tips;
pub mod value_bet;
pub mod verification;

pub use config::{EngineConfig, ProbabilityModel};
pub use engine::{PredictionResult, predict, predict_many};
pub use model::PredictionInput;
pub use tables::LookupTables;

/// `RUST_LOG`-driven stderr logging for the binaries; defaults to `info`.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Built-in tables, or the JSON override named in the config.
pub fn load_tables(config: &EngineConfig) -> anyhow::Result<LookupTables> {
    match &config.tables_path {
        Some(path) => LookupTables::load(path),
        None => Ok(LookupTables::builtin().clone()),
    }
}
