use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::analyzer::analyze;
use super::error::SimulationError;
use super::history::{HistoricalData, HistoricalDataSource};
use super::path::{PathOutcome, SimulationPath};
use super::returns::ReturnGenerator;
use super::rng::SimRng;
use super::types::{SimulationParameters, SimulationResult};

/// Paths simulated between cancellation checks.
pub const DEFAULT_BATCH_SIZE: u32 = 256;
/// Raw trajectories kept for charting.
pub const SAMPLE_PATH_LIMIT: usize = 100;

/// Raw per-path output of a run, in path-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    pub final_balances: Vec<f64>,
    /// One trajectory per path; each has `total_years + 1` entries.
    pub trajectories: Vec<Vec<f64>>,
    pub withdrawals: Vec<Vec<f64>>,
    pub sample_paths: Vec<Vec<f64>>,
    /// Ruin year of every path that ruined.
    pub ruin_years: Vec<u32>,
}

impl Ensemble {
    fn with_capacity(paths: usize) -> Self {
        Self {
            final_balances: Vec::with_capacity(paths),
            trajectories: Vec::with_capacity(paths),
            withdrawals: Vec::with_capacity(paths),
            sample_paths: Vec::with_capacity(paths.min(SAMPLE_PATH_LIMIT)),
            ruin_years: Vec::new(),
        }
    }

    fn push(&mut self, outcome: PathOutcome) {
        self.final_balances.push(outcome.final_balance());
        if let Some(year) = outcome.ruin_year {
            self.ruin_years.push(year);
        }
        if self.sample_paths.len() < SAMPLE_PATH_LIMIT {
            self.sample_paths.push(outcome.trajectory.clone());
        }
        self.trajectories.push(outcome.trajectory);
        self.withdrawals.push(outcome.withdrawals);
    }

    pub fn len(&self) -> usize {
        self.final_balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.final_balances.is_empty()
    }
}

/// Runs independent paths in parallel over a shared read-only data source.
pub struct SimulationEngine<'a, D: HistoricalDataSource + ?Sized> {
    data: &'a D,
    batch_size: u32,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a, D: HistoricalDataSource + ?Sized> SimulationEngine<'a, D> {
    pub fn new(data: &'a D) -> Self {
        Self {
            data,
            batch_size: DEFAULT_BATCH_SIZE,
            cancel: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Checked between batches; setting it aborts the run with
    /// [`SimulationError::Cancelled`].
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn data(&self) -> &'a D {
        self.data
    }

    pub fn run(&self, params: &SimulationParameters) -> Result<SimulationResult, SimulationError> {
        let started = Instant::now();
        let ensemble = self.run_paths(params)?;
        let result = analyze(params, &ensemble);
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            success_rate = result.success_rate,
            "simulation finished"
        );
        Ok(result)
    }

    /// Validates `params`, then simulates every path. Either all paths
    /// complete or an error comes back.
    pub fn run_paths(&self, params: &SimulationParameters) -> Result<Ensemble, SimulationError> {
        params.validate()?;
        let generator = ReturnGenerator::new(self.data, params)?;

        let requested = params.simulations;
        info!(
            paths = requested,
            years = params.total_years(),
            strategy = ?params.sampling_strategy,
            policy = ?params.withdrawal_policy,
            seed = params.seed,
            "simulation started"
        );

        let mut ensemble = Ensemble::with_capacity(requested as usize);
        let mut start = 0_u32;
        while start < requested {
            if self.is_cancelled() {
                warn!(completed = start, requested, "simulation cancelled");
                return Err(SimulationError::Cancelled {
                    completed: start,
                    requested,
                });
            }

            let end = start.saturating_add(self.batch_size).min(requested);
            let batch: Vec<PathOutcome> = (start..end)
                .into_par_iter()
                .map(|path_index| {
                    let rng = SimRng::for_path(params.seed, path_index);
                    SimulationPath::new(params, &generator, rng).finish()
                })
                .collect();
            for outcome in batch {
                ensemble.push(outcome);
            }
            debug!(completed = end, requested, "batch finished");
            start = end;
        }

        Ok(ensemble)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|token| token.load(Ordering::Relaxed))
    }
}

/// Runs `params` against the bundled historical dataset.
pub fn run_simulation(params: &SimulationParameters) -> Result<SimulationResult, SimulationError> {
    let data = HistoricalData::builtin();
    SimulationEngine::new(&data).run(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ConfigError;
    use crate::core::types::{PortfolioAllocation, SamplingStrategy};
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

    fn small_params() -> SimulationParameters {
        SimulationParameters {
            current_age: 55,
            retirement_age: 60,
            life_expectancy: 80,
            simulations: 300,
            ..SimulationParameters::default()
        }
    }

    #[test]
    fn identical_seeds_give_identical_results() {
        let data = HistoricalData::builtin();
        let engine = SimulationEngine::new(&data);
        let params = small_params();
        let first = engine.run(&params).expect("run");
        let second = engine.run(&params).expect("run");
        assert_eq!(first, second);
    }

    #[test]
    fn results_do_not_depend_on_batch_size() {
        let data = HistoricalData::builtin();
        let params = small_params();
        let a = SimulationEngine::new(&data)
            .with_batch_size(7)
            .run_paths(&params)
            .expect("run");
        let b = SimulationEngine::new(&data)
            .with_batch_size(1_000)
            .run_paths(&params)
            .expect("run");
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let data = HistoricalData::builtin();
        let engine = SimulationEngine::new(&data);
        let mut params = small_params();
        let a = engine.run_paths(&params).expect("run");
        params.seed += 1;
        let b = engine.run_paths(&params).expect("run");
        assert_ne!(a.final_balances, b.final_balances);
    }

    #[test]
    fn ensemble_shapes_match_parameters() {
        let data = HistoricalData::builtin();
        let params = small_params();
        let ensemble = SimulationEngine::new(&data).run_paths(&params).expect("run");
        assert_eq!(ensemble.len(), 300);
        assert_eq!(ensemble.sample_paths.len(), SAMPLE_PATH_LIMIT);
        assert_eq!(
            ensemble.sample_paths[..],
            ensemble.trajectories[..SAMPLE_PATH_LIMIT]
        );
        assert!(ensemble.trajectories.iter().all(|t| t.len() == 26));
        assert!(ensemble.withdrawals.iter().all(|w| w.len() == 25));
        assert!(ensemble.ruin_years.len() <= ensemble.len());
    }

    #[test]
    fn invalid_configuration_fails_before_any_work() {
        let data = HistoricalData::builtin();
        let engine = SimulationEngine::new(&data);

        let mut params = small_params();
        params.allocation = PortfolioAllocation {
            us_equity: 0.7,
            ..PortfolioAllocation::empty()
        };
        assert!(matches!(
            engine.run(&params),
            Err(SimulationError::Config(ConfigError::AllocationSum { .. }))
        ));

        let mut params = small_params();
        params.retirement_age = 90;
        assert!(matches!(
            engine.run(&params),
            Err(SimulationError::Config(ConfigError::AgeOrdering(_)))
        ));

        let mut params = small_params();
        params.simulations = 0;
        assert!(matches!(
            engine.run(&params),
            Err(SimulationError::Config(ConfigError::NoSimulations))
        ));
    }

    #[test]
    fn cancelled_token_stops_between_batches() {
        let data = HistoricalData::builtin();
        let token = Arc::new(AtomicBool::new(true));
        let engine = SimulationEngine::new(&data).with_cancel_token(token.clone());
        assert!(matches!(
            engine.run(&small_params()),
            Err(SimulationError::Cancelled {
                completed: 0,
                requested: 300
            })
        ));

        token.store(false, Ordering::Relaxed);
        assert!(engine.run(&small_params()).is_ok());
    }

    #[test]
    fn run_simulation_uses_bundled_data() {
        let mut params = small_params();
        params.simulations = 50;
        params.sampling_strategy = SamplingStrategy::Parametric;
        let result = run_simulation(&params).expect("run");
        assert!((0.0..=100.0).contains(&result.success_rate));
        assert_eq!(result.params, params);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(12))]

        #[test]
        fn prop_engine_is_deterministic_for_any_seed(
            seed in any::<u64>(),
            strategy_idx in 0usize..3,
            simulations in 1u32..40,
        ) {
            let data = HistoricalData::builtin();
            let mut params = small_params();
            params.seed = seed;
            params.simulations = simulations;
            params.sampling_strategy = [
                SamplingStrategy::Parametric,
                SamplingStrategy::HistoricalBootstrap,
                SamplingStrategy::BlockBootstrap,
            ][strategy_idx];
            let engine = SimulationEngine::new(&data).with_batch_size(5);
            let a = engine.run_paths(&params).expect("run");
            let b = engine.run_paths(&params).expect("run");
            prop_assert_eq!(a.len(), simulations as usize);
            prop_assert!(a.final_balances.iter().all(|b| b.is_finite() && *b >= 0.0));
            prop_assert_eq!(a, b);
        }
    }
}
