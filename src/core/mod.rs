mod analyzer;
mod dataset;
mod engine;
mod error;
mod glide;
mod history;
mod path;
mod returns;
mod rng;
#[cfg(test)]
mod scenarios;
mod sensitivity;
mod sequence;
mod stats;
mod types;
mod withdrawal;

pub use analyzer::{analyze, max_drawdown};
pub use dataset::{INFLATION_FIRST_YEAR, builtin_correlation};
pub use engine::{DEFAULT_BATCH_SIZE, Ensemble, SAMPLE_PATH_LIMIT, SimulationEngine, run_simulation};
pub use error::{ConfigError, SimulationError};
pub use glide::{MAX_GLIDE_STEP, apply_glide_path, target_conservative_fraction};
pub use history::{AssetClassSeries, CorrelationMatrix, HistoricalData, HistoricalDataSource};
pub use path::{PathOutcome, Phase, SimulationPath};
pub use returns::{CASH_RETURN, MarketState, ReturnGenerator};
pub use rng::{SimRng, derive_seed};
pub use sensitivity::{
    BreakevenConfig, BreakevenIteration, BreakevenResult, SensitivityPoint, SensitivityResult,
    SensitivityVariable, analyze_sensitivity, find_breakeven, resplit_equity,
    run_comprehensive_sensitivity,
};
pub use sequence::{
    DEFAULT_TEST_RATES, REPLAY_START_BALANCE, ReplayOutcome, SafeWithdrawalSummary, SequenceRisk,
    WindowResult, WorstYear, analyze_sequence_risk, historical_safe_withdrawal_rates,
    safe_withdrawal_percentiles,
};
pub use stats::{ReturnStatistics, cholesky, percentile, percentile_sorted};
pub use types::{
    ALLOCATION_TOLERANCE, AssetClass, InflationModel, Insight, InsightKind, Percentiles,
    PortfolioAllocation, SamplingStrategy, SimulationParameters, SimulationResult,
    WithdrawalPolicyKind, YearPercentiles,
};
pub use withdrawal::{GUARDRAIL_ADJUSTMENT, WithdrawalRules, WithdrawalState};
