use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::MlWeights;

const DEFAULT_MIN_EDGE: f64 = 5.0;
const DEFAULT_LEAGUE_SIZE: u32 = 20;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// How the three outcome probabilities are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityModel {
    /// Each probability is non-zero only inside its own decision band.
    #[default]
    Banded,
    /// Smooth three-way distribution over the goal difference.
    Softmax,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub min_value_edge: f64,
    pub default_league_size: u32,
    pub probability_model: ProbabilityModel,
    pub tables_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub stats_cache_ttl: Duration,
    pub ml_weights: MlWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_value_edge: DEFAULT_MIN_EDGE,
            default_league_size: DEFAULT_LEAGUE_SIZE,
            probability_model: ProbabilityModel::Banded,
            tables_path: None,
            db_path: None,
            stats_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            ml_weights: MlWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let min_value_edge = match get("MIN_VALUE_EDGE") {
            Some(raw) => {
                let value = parse_f64("MIN_VALUE_EDGE", &raw)?;
                if value < 0.0 {
                    return Err(ConfigError::OutOfRange {
                        key: "MIN_VALUE_EDGE",
                        value,
                    });
                }
                value
            }
            None => DEFAULT_MIN_EDGE,
        };

        let default_league_size = match get("DEFAULT_LEAGUE_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| ConfigError::NotANumber {
                    key: "DEFAULT_LEAGUE_SIZE",
                    value: raw.clone(),
                })?
                .clamp(4, 40),
            None => DEFAULT_LEAGUE_SIZE,
        };

        let probability_model = match get("PROBABILITY_MODEL")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("banded") => ProbabilityModel::Banded,
            Some("softmax") => ProbabilityModel::Softmax,
            Some(other) => return Err(ConfigError::UnknownProbabilityModel(other.to_string())),
        };

        let stats_cache_ttl = match get("STATS_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                ConfigError::NotANumber {
                    key: "STATS_CACHE_TTL_SECS",
                    value: raw.clone(),
                }
            })?),
            None => Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        };

        let ml_weights = MlWeights {
            h2h: weight(&get, "ML_H2H_WEIGHT")?,
            motivation: weight(&get, "ML_MOTIVATION_WEIGHT")?,
            streak: weight(&get, "ML_STREAK_WEIGHT")?,
        };

        Ok(Self {
            min_value_edge,
            default_league_size,
            probability_model,
            tables_path: get("LOOKUP_TABLES_PATH").map(PathBuf::from),
            db_path: get("PREDICTIONS_DB").map(PathBuf::from),
            stats_cache_ttl,
            ml_weights,
        })
    }
}

fn weight(get: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<f64, ConfigError> {
    let Some(raw) = get(key) else {
        return Ok(1.0);
    };
    let value = parse_f64(key, &raw)?;
    if !(0.0..=3.0).contains(&value) {
        return Err(ConfigError::OutOfRange { key, value });
    }
    Ok(value)
}

fn parse_f64(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ConfigError::NotANumber {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_source_gives_defaults() {
        let cfg = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = EngineConfig::from_lookup(lookup(&[
            ("MIN_VALUE_EDGE", "3.5"),
            ("DEFAULT_LEAGUE_SIZE", "100"),
            ("PROBABILITY_MODEL", "SoftMax"),
            ("ML_STREAK_WEIGHT", "0.4"),
            ("PREDICTIONS_DB", "/tmp/p.sqlite"),
        ]))
        .unwrap();
        assert_eq!(cfg.min_value_edge, 3.5);
        assert_eq!(cfg.default_league_size, 40);
        assert_eq!(cfg.probability_model, ProbabilityModel::Softmax);
        assert_eq!(cfg.ml_weights.streak, 0.4);
        assert_eq!(cfg.ml_weights.h2h, 1.0);
        assert_eq!(cfg.db_path, Some(PathBuf::from("/tmp/p.sqlite")));
    }

    #[test]
    fn rejects_bad_values() {
        let err = EngineConfig::from_lookup(lookup(&[("MIN_VALUE_EDGE", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::NotANumber { key: "MIN_VALUE_EDGE", .. }));

        let err = EngineConfig::from_lookup(lookup(&[("ML_H2H_WEIGHT", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { key: "ML_H2H_WEIGHT", .. }));

        let err = EngineConfig::from_lookup(lookup(&[("PROBABILITY_MODEL", "poisson")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownProbabilityModel("poisson".to_string()));
    }

    #[test]
    fn blank_values_are_unset() {
        let cfg = EngineConfig::from_lookup(lookup(&[("MIN_VALUE_EDGE", "  ")])).unwrap();
        assert_eq!(cfg.min_value_edge, DEFAULT_MIN_EDGE);
    }
}
