use thiserror::Error;

/// Errors raised synchronously by the simulation core. These are caller or
/// configuration errors, never transient faults, so nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("insufficient capital: cannot afford one share at {price} with {available} available")]
    InsufficientCapital { price: f64, available: f64 },
}
