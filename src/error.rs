use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid network structure: {0}")]
    Structure(String),

    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    Shape {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid gene range [{lo}, {hi}]")]
    Range { lo: f64, hi: f64 },

    #[error("population of {0} is too small to breed, need at least 2")]
    PopulationSize(usize),

    #[error("generation {0} must be evaluated before breeding")]
    NotEvaluated(usize),

    #[error("expected {expected} parent weights, got {got}")]
    WeightCount { expected: usize, got: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
