use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    NotANumber { key: &'static str, value: String },

    #[error("{key} is out of range: {value}")]
    OutOfRange { key: &'static str, value: f64 },

    #[error("unknown PROBABILITY_MODEL={0}, expected banded or softmax")]
    UnknownProbabilityModel(String),
}
