use thiserror::Error;

/// Fatal configuration problems. Reported before any path is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("allocation weights must sum to 1.0 (got {total:.6})")]
    AllocationSum { total: f64 },

    #[error("allocation weight for {asset} must be between 0 and 1 (got {weight})")]
    AllocationWeight { asset: &'static str, weight: f64 },

    #[error("{0}")]
    AgeOrdering(String),

    #[error("{field} must be {requirement} (got {value})")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("simulation count must be > 0")]
    NoSimulations,

    #[error("unknown withdrawal policy '{0}'")]
    UnknownWithdrawalPolicy(String),

    #[error("unknown sampling strategy '{0}'")]
    UnknownSamplingStrategy(String),

    #[error("unknown inflation model '{0}'")]
    UnknownInflationModel(String),

    #[error("correlation between {left} and {right} must be between -1 and 1 (got {value})")]
    CorrelationRange {
        left: &'static str,
        right: &'static str,
        value: f64,
    },

    #[error("correlation matrix is not positive definite")]
    CorrelationNotPositiveDefinite,

    #[error("fat-tail degrees of freedom must be > 2 (got {0})")]
    DegreesOfFreedom(f64),

    #[error("block size must be > 0")]
    ZeroBlockSize,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("simulation cancelled after {completed} of {requested} paths")]
    Cancelled { completed: u32, requested: u32 },
}

/// Shorthand used by validators: `require(value >= 0.0, "field", ">= 0", value)?`.
pub(crate) fn require(
    ok: bool,
    field: &'static str,
    requirement: &'static str,
    value: f64,
) -> Result<(), ConfigError> {
    if ok && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            requirement,
            value,
        })
    }
}
