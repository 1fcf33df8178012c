use std::collections::BTreeMap;

use rand_distr::ChiSquared;

use super::error::ConfigError;
use super::history::{AssetClassSeries, HistoricalDataSource};
use super::rng::SimRng;
use super::stats::{ReturnStatistics, cholesky};
use super::types::{
    AssetClass, InflationModel, PortfolioAllocation, SamplingStrategy, SimulationParameters,
};

/// Fixed low-volatility return credited to the cash weight.
pub const CASH_RETURN: f64 = 0.02;

pub const CRYPTO_FALLBACK_MEAN: f64 = 0.30;
pub const CRYPTO_FALLBACK_STD_DEV: f64 = 0.80;
const DEFAULT_MEAN: f64 = 0.07;
const DEFAULT_STD_DEV: f64 = 0.15;

const US_EQUITY_PROXY: f64 = 0.07;
const INTL_PROXY_SCALE: f64 = 0.9;
const REITS_PROXY_SCALE: f64 = 0.8;
const BONDS_PROXY: f64 = 0.03;
const GOLD_PROXY: f64 = 0.02;

pub const STOCHASTIC_INFLATION_MEAN: f64 = 0.025;
const STOCHASTIC_INFLATION_PERSISTENCE: f64 = 0.6;
const STOCHASTIC_INFLATION_VOL: f64 = 0.012;

/// Worst possible single-year asset return.
const RETURN_FLOOR: f64 = -1.0;

/// Per-path sampler state: the current bootstrap block and the last
/// mean-reverting inflation draw.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketState {
    block: BlockCursor,
    inflation: f64,
}

impl Default for MarketState {
    fn default() -> Self {
        Self {
            block: BlockCursor::default(),
            inflation: STOCHASTIC_INFLATION_MEAN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BlockCursor {
    next_index: usize,
    remaining: usize,
}

#[derive(Debug, Clone)]
struct StudentT {
    chi_squared: ChiSquared<f64>,
    dof: f64,
}

impl StudentT {
    fn new(dof: f64) -> Result<Self, ConfigError> {
        if !(dof.is_finite() && dof > 2.0) {
            return Err(ConfigError::DegreesOfFreedom(dof));
        }
        let chi_squared = ChiSquared::new(dof).map_err(|_| ConfigError::DegreesOfFreedom(dof))?;
        Ok(Self { chi_squared, dof })
    }

    /// Multiplier turning standard normals into unit-variance t draws. One
    /// multiplier shared by all assets in a year makes the draw jointly t.
    fn scale(&self, rng: &mut SimRng) -> f64 {
        let chi = rng.sample(&self.chi_squared).max(f64::MIN_POSITIVE);
        ((self.dof - 2.0) / self.dof).sqrt() / (chi / self.dof).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Moments {
    mean: f64,
    std_dev: f64,
}

/// Produces one simulated year of portfolio return and inflation for a run.
/// Immutable after construction and shared by every path; per-path state
/// lives in [`MarketState`].
#[derive(Debug, Clone)]
pub struct ReturnGenerator {
    strategy: SamplingStrategy,
    block_size: usize,
    series: BTreeMap<AssetClass, AssetClassSeries>,
    /// Calendar year of bootstrap index 0.
    first_year: i32,
    bootstrap_len: usize,
    correlated: Vec<AssetClass>,
    moments: Vec<Moments>,
    factor: Vec<Vec<f64>>,
    student: Option<StudentT>,
    inflation_model: InflationModel,
    fixed_inflation: f64,
    inflation: Vec<f64>,
}

impl ReturnGenerator {
    pub fn new<D>(data: &D, params: &SimulationParameters) -> Result<Self, ConfigError>
    where
        D: HistoricalDataSource + ?Sized,
    {
        if params.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        params.allocation.validate()?;

        let series: BTreeMap<AssetClass, AssetClassSeries> = AssetClass::ALL
            .into_iter()
            .filter(|class| *class != AssetClass::Cash)
            .filter_map(|class| {
                data.series(class)
                    .filter(|s| !s.is_empty())
                    .map(|s| (class, s.clone()))
            })
            .collect();

        // Classes that can carry weight during the run; the glide path only
        // ever moves weight into bonds.
        let mut active: Vec<AssetClass> = params
            .allocation
            .iter()
            .map(|(class, _)| class)
            .filter(|class| *class != AssetClass::Cash)
            .collect();
        if params.glide_path && !active.contains(&AssetClass::Bonds) {
            active.push(AssetClass::Bonds);
            active.sort();
        }

        let (first_year, bootstrap_len) = calendar_span(&series, active.iter().copied())
            .or_else(|| calendar_span(&series, series.keys().copied()))
            .unwrap_or((0, 0));

        let moments = active
            .iter()
            .map(|class| asset_moments(*class, series.get(class)))
            .collect();

        let factor = if params.sampling_strategy == SamplingStrategy::Parametric {
            cholesky(&data.correlation().dense(&active))
                .ok_or(ConfigError::CorrelationNotPositiveDefinite)?
        } else {
            Vec::new()
        };

        let student = if params.fat_tails {
            Some(StudentT::new(params.fat_tail_degrees_of_freedom)?)
        } else {
            None
        };

        Ok(Self {
            strategy: params.sampling_strategy,
            block_size: params.block_size as usize,
            series,
            first_year,
            bootstrap_len,
            correlated: active,
            moments,
            factor,
            student,
            inflation_model: params.inflation_model,
            fixed_inflation: params.fixed_inflation_rate,
            inflation: data.inflation().to_vec(),
        })
    }

    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// One year of weighted portfolio return for `allocation`.
    pub fn generate(
        &self,
        allocation: &PortfolioAllocation,
        state: &mut MarketState,
        rng: &mut SimRng,
    ) -> f64 {
        let risky = match self.strategy {
            SamplingStrategy::Parametric => self.parametric(allocation, rng),
            SamplingStrategy::HistoricalBootstrap => {
                let index = rng.index(self.bootstrap_len);
                self.historical_year(allocation, index, rng)
            }
            SamplingStrategy::BlockBootstrap => {
                let index = self.next_block_index(&mut state.block, rng);
                self.historical_year(allocation, index, rng)
            }
        };
        risky + allocation.cash * CASH_RETURN
    }

    /// One year of inflation under the configured model.
    pub fn inflation(&self, state: &mut MarketState, rng: &mut SimRng) -> f64 {
        match self.inflation_model {
            InflationModel::Fixed => self.fixed_inflation,
            InflationModel::Historical => {
                if self.inflation.is_empty() {
                    self.fixed_inflation
                } else {
                    self.inflation[rng.index(self.inflation.len())]
                }
            }
            InflationModel::Stochastic => {
                let shock = rng.normal(0.0, STOCHASTIC_INFLATION_VOL);
                let next = STOCHASTIC_INFLATION_MEAN
                    + STOCHASTIC_INFLATION_PERSISTENCE
                        * (state.inflation - STOCHASTIC_INFLATION_MEAN)
                    + shock;
                state.inflation = next.max(0.0);
                state.inflation
            }
        }
    }

    fn parametric(&self, allocation: &PortfolioAllocation, rng: &mut SimRng) -> f64 {
        // Row i of the factor reads z[0..=i]; nothing past the last held
        // class is needed.
        let n = allocation
            .iter()
            .filter_map(|(class, _)| self.correlated.iter().position(|c| *c == class))
            .max()
            .map_or(0, |i| i + 1);
        let z: Vec<f64> = (0..n).map(|_| rng.standard_normal()).collect();
        let scale = self.student.as_ref().map(|t| t.scale(rng)).unwrap_or(1.0);

        let mut total = 0.0;
        for (class, weight) in allocation.iter() {
            if class == AssetClass::Cash {
                continue;
            }
            let draw = match self.correlated.iter().position(|c| *c == class) {
                Some(i) => {
                    let correlated: f64 = (0..=i).map(|k| self.factor[i][k] * z[k]).sum();
                    let m = self.moments[i];
                    m.mean + m.std_dev * correlated * scale
                }
                None => {
                    let m = asset_moments(class, self.series.get(&class));
                    m.mean + m.std_dev * self.standard_draw(rng)
                }
            };
            total += weight * draw.max(RETURN_FLOOR);
        }
        total
    }

    fn historical_year(
        &self,
        allocation: &PortfolioAllocation,
        index: usize,
        rng: &mut SimRng,
    ) -> f64 {
        allocation
            .iter()
            .filter(|(class, _)| *class != AssetClass::Cash)
            .map(|(class, weight)| weight * self.historical_return(class, index, rng))
            .sum()
    }

    /// Every class reads the same calendar year. Years before a series
    /// starts use its proxy; years after it ends clamp to its last return.
    fn historical_return(&self, class: AssetClass, index: usize, rng: &mut SimRng) -> f64 {
        if class == AssetClass::Crypto {
            return match self.series.get(&class) {
                Some(series) => series.returns[rng.index(series.len())],
                None => (CRYPTO_FALLBACK_MEAN + CRYPTO_FALLBACK_STD_DEV * self.standard_draw(rng))
                    .max(RETURN_FLOOR),
            };
        }
        let year = self.first_year + index as i32;
        self.series
            .get(&class)
            .and_then(|s| s.for_year(year))
            .unwrap_or_else(|| self.proxy(class, year))
    }

    fn proxy(&self, class: AssetClass, year: i32) -> f64 {
        let us_equity = || {
            self.series
                .get(&AssetClass::UsEquity)
                .and_then(|s| s.for_year(year))
                .unwrap_or(US_EQUITY_PROXY)
        };
        match class {
            AssetClass::UsEquity => US_EQUITY_PROXY,
            AssetClass::IntlEquity => INTL_PROXY_SCALE * us_equity(),
            AssetClass::Reits => REITS_PROXY_SCALE * us_equity(),
            AssetClass::Bonds => BONDS_PROXY,
            AssetClass::Gold => GOLD_PROXY,
            AssetClass::Crypto => CRYPTO_FALLBACK_MEAN,
            AssetClass::Cash => CASH_RETURN,
        }
    }

    fn next_block_index(&self, cursor: &mut BlockCursor, rng: &mut SimRng) -> usize {
        if cursor.remaining == 0 {
            let starts = self.bootstrap_len.saturating_sub(self.block_size) + 1;
            cursor.next_index = rng.index(starts);
            cursor.remaining = self.block_size;
        }
        let index = cursor.next_index;
        cursor.next_index += 1;
        cursor.remaining -= 1;
        index
    }

    fn standard_draw(&self, rng: &mut SimRng) -> f64 {
        let z = rng.standard_normal();
        match &self.student {
            Some(t) => z * t.scale(rng),
            None => z,
        }
    }
}

/// First calendar year and length of the union of years covered by the
/// non-crypto `classes` that have a series.
fn calendar_span(
    series: &BTreeMap<AssetClass, AssetClassSeries>,
    classes: impl Iterator<Item = AssetClass>,
) -> Option<(i32, usize)> {
    let (first, last) = classes
        .filter(|class| *class != AssetClass::Crypto)
        .filter_map(|class| series.get(&class))
        .map(|s| (s.first_year, s.last_year()))
        .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)))?;
    Some((first, (last - first) as usize + 1))
}

/// Crypto always uses the fixed high-volatility moments: its short sample is
/// dominated by a handful of thousand-percent years.
fn asset_moments(class: AssetClass, series: Option<&AssetClassSeries>) -> Moments {
    if class == AssetClass::Crypto {
        return Moments {
            mean: CRYPTO_FALLBACK_MEAN,
            std_dev: CRYPTO_FALLBACK_STD_DEV,
        };
    }
    if let Some(stats) = series.and_then(|s| ReturnStatistics::from_returns(&s.returns)) {
        return Moments {
            mean: stats.mean,
            std_dev: stats.std_dev,
        };
    }
    match class {
        AssetClass::Cash => Moments {
            mean: CASH_RETURN,
            std_dev: 0.0,
        },
        _ => Moments {
            mean: DEFAULT_MEAN,
            std_dev: DEFAULT_STD_DEV,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::{CorrelationMatrix, HistoricalData};
    use proptest::prelude::{any, prop_assert, proptest};

    fn single_asset_params(class: AssetClass, strategy: SamplingStrategy) -> SimulationParameters {
        SimulationParameters {
            allocation: PortfolioAllocation::single(class),
            sampling_strategy: strategy,
            fat_tails: false,
            glide_path: false,
            ..SimulationParameters::default()
        }
    }

    fn sample_moments(
        generator: &ReturnGenerator,
        allocation: &PortfolioAllocation,
        draws: usize,
        seed: u64,
    ) -> (f64, f64) {
        let mut rng = SimRng::from_seed(seed);
        let mut state = MarketState::default();
        let values: Vec<f64> = (0..draws)
            .map(|_| generator.generate(allocation, &mut state, &mut rng))
            .collect();
        let stats = ReturnStatistics::from_returns(&values).expect("draws");
        (stats.mean, stats.std_dev)
    }

    fn tiny_data() -> HistoricalData {
        let correlation = CorrelationMatrix::new()
            .with(AssetClass::UsEquity, AssetClass::Bonds, 0.2)
            .expect("valid");
        HistoricalData::new(vec![0.01, 0.02, 0.03], correlation)
            .with_series(AssetClassSeries::new(
                AssetClass::UsEquity,
                2000,
                vec![0.10, -0.20, 0.30, 0.05],
            ))
            .with_series(AssetClassSeries::new(AssetClass::Bonds, 2000, vec![0.04, 0.02]))
    }

    #[test]
    fn single_asset_draws_converge_to_history_for_every_strategy() {
        let data = HistoricalData::builtin();
        let us = ReturnStatistics::from_returns(
            &data.series(AssetClass::UsEquity).expect("us").returns,
        )
        .expect("stats");

        for (strategy, tol) in [
            (SamplingStrategy::Parametric, 0.01),
            (SamplingStrategy::HistoricalBootstrap, 0.01),
            (SamplingStrategy::BlockBootstrap, 0.02),
        ] {
            let params = single_asset_params(AssetClass::UsEquity, strategy);
            let generator = ReturnGenerator::new(&data, &params).expect("generator");
            let (mean, sd) = sample_moments(&generator, &params.allocation, 40_000, 11);
            assert!((mean - us.mean).abs() < tol, "{strategy:?} mean {mean} vs {}", us.mean);
            assert!(
                (sd - us.std_dev).abs() < 2.0 * tol,
                "{strategy:?} sd {sd} vs {}",
                us.std_dev
            );
        }
    }

    #[test]
    fn short_series_bootstrap_stays_within_its_own_history() {
        let data = HistoricalData::builtin();
        let params = single_asset_params(AssetClass::IntlEquity, SamplingStrategy::HistoricalBootstrap);
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let intl = ReturnStatistics::from_returns(
            &data.series(AssetClass::IntlEquity).expect("intl").returns,
        )
        .expect("stats");
        let (mean, _) = sample_moments(&generator, &params.allocation, 40_000, 5);
        assert!((mean - intl.mean).abs() < 0.01, "mean {mean} vs {}", intl.mean);
    }

    #[test]
    fn cash_only_portfolio_earns_cash_return() {
        let data = HistoricalData::builtin();
        for strategy in [
            SamplingStrategy::Parametric,
            SamplingStrategy::HistoricalBootstrap,
            SamplingStrategy::BlockBootstrap,
        ] {
            let params = single_asset_params(AssetClass::Cash, strategy);
            let generator = ReturnGenerator::new(&data, &params).expect("generator");
            let mut rng = SimRng::from_seed(1);
            let mut state = MarketState::default();
            let r = generator.generate(&params.allocation, &mut state, &mut rng);
            assert!((r - CASH_RETURN).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_series_fall_back_to_proxies() {
        let data = tiny_data();
        let mut params = single_asset_params(AssetClass::Gold, SamplingStrategy::HistoricalBootstrap);
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let mut rng = SimRng::from_seed(3);
        let mut state = MarketState::default();
        assert_eq!(generator.generate(&params.allocation, &mut state, &mut rng), GOLD_PROXY);

        params.allocation = PortfolioAllocation::single(AssetClass::IntlEquity);
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let us = [0.10, -0.20, 0.30, 0.05];
        for _ in 0..32 {
            let r = generator.generate(&params.allocation, &mut state, &mut rng);
            assert!(us.iter().any(|u| (INTL_PROXY_SCALE * u - r).abs() < 1e-12), "{r}");
        }
    }

    #[test]
    fn shorter_series_clamp_to_last_observation() {
        let data = tiny_data();
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::HistoricalBootstrap);
        params.allocation = PortfolioAllocation {
            us_equity: 0.5,
            bonds: 0.5,
            ..PortfolioAllocation::empty()
        };
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let expected = [
            0.5 * 0.10 + 0.5 * 0.04,
            0.5 * -0.20 + 0.5 * 0.02,
            0.5 * 0.30 + 0.5 * 0.02,
            0.5 * 0.05 + 0.5 * 0.02,
        ];
        let mut rng = SimRng::from_seed(8);
        let mut state = MarketState::default();
        for _ in 0..64 {
            let r = generator.generate(&params.allocation, &mut state, &mut rng);
            assert!(expected.iter().any(|e| (e - r).abs() < 1e-12), "{r}");
        }
    }

    #[test]
    fn mixed_start_years_line_up_by_calendar_year() {
        let data = HistoricalData::new(vec![0.02], CorrelationMatrix::new())
            .with_series(AssetClassSeries::new(
                AssetClass::UsEquity,
                2000,
                vec![0.10, -0.20, 0.30, 0.05],
            ))
            .with_series(AssetClassSeries::new(AssetClass::IntlEquity, 2002, vec![0.50, 0.60]));
        let mut params =
            single_asset_params(AssetClass::UsEquity, SamplingStrategy::HistoricalBootstrap);
        params.allocation = PortfolioAllocation {
            us_equity: 0.5,
            intl_equity: 0.5,
            ..PortfolioAllocation::empty()
        };
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        // 2000 and 2001 predate the intl series and use 0.9 x US.
        let expected = [
            0.5 * 0.10 + 0.5 * INTL_PROXY_SCALE * 0.10,
            0.5 * -0.20 + 0.5 * INTL_PROXY_SCALE * -0.20,
            0.5 * 0.30 + 0.5 * 0.50,
            0.5 * 0.05 + 0.5 * 0.60,
        ];
        let mut seen = [false; 4];
        let mut rng = SimRng::from_seed(31);
        let mut state = MarketState::default();
        for _ in 0..128 {
            let r = generator.generate(&params.allocation, &mut state, &mut rng);
            let hit = expected.iter().position(|e| (e - r).abs() < 1e-12);
            assert!(hit.is_some(), "{r}");
            if let Some(i) = hit {
                seen[i] = true;
            }
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn builtin_intl_is_not_pinned_to_its_last_year() {
        let data = HistoricalData::builtin();
        let mut params =
            single_asset_params(AssetClass::UsEquity, SamplingStrategy::HistoricalBootstrap);
        params.allocation = PortfolioAllocation {
            us_equity: 0.5,
            intl_equity: 0.5,
            ..PortfolioAllocation::empty()
        };
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let intl_only = PortfolioAllocation::single(AssetClass::IntlEquity);
        let last = data
            .series(AssetClass::IntlEquity)
            .and_then(|s| s.returns.last().copied())
            .expect("intl");
        let mut rng = SimRng::from_seed(8);
        let mut state = MarketState::default();
        let pinned = (0..2_000)
            .filter(|_| generator.generate(&intl_only, &mut state, &mut rng) == last)
            .count();
        // Roughly 1 in 98 years is the final one.
        assert!(pinned < 100, "{pinned} of 2000 draws hit the last observation");
    }

    #[test]
    fn unheld_trailing_classes_cost_no_draws() {
        let data = HistoricalData::builtin();
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::Parametric);
        let plain = ReturnGenerator::new(&data, &params).expect("generator");
        // Bonds join the factor for the glide path but start at zero weight.
        params.glide_path = true;
        let glided = ReturnGenerator::new(&data, &params).expect("generator");
        assert_eq!(glided.correlated, vec![AssetClass::UsEquity, AssetClass::Bonds]);

        let mut a = SimRng::from_seed(77);
        let mut b = SimRng::from_seed(77);
        let mut state = MarketState::default();
        for _ in 0..32 {
            assert_eq!(
                plain.generate(&params.allocation, &mut state, &mut a),
                glided.generate(&params.allocation, &mut state, &mut b)
            );
        }
    }

    #[test]
    fn block_bootstrap_walks_consecutive_years() {
        let returns: Vec<f64> = (0..10).map(|i| i as f64 / 100.0).collect();
        let data = HistoricalData::new(Vec::new(), CorrelationMatrix::new())
            .with_series(AssetClassSeries::new(AssetClass::UsEquity, 1990, returns));
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::BlockBootstrap);
        params.block_size = 4;
        let generator = ReturnGenerator::new(&data, &params).expect("generator");

        let mut rng = SimRng::from_seed(21);
        let mut state = MarketState::default();
        for _ in 0..20 {
            let block: Vec<f64> = (0..4)
                .map(|_| generator.generate(&params.allocation, &mut state, &mut rng))
                .collect();
            for pair in block.windows(2) {
                assert!((pair[1] - pair[0] - 0.01).abs() < 1e-12, "{block:?}");
            }
            assert!(block[3] <= 0.09 + 1e-12);
        }
    }

    #[test]
    fn block_longer_than_history_starts_at_zero_and_clamps() {
        let data = tiny_data();
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::BlockBootstrap);
        params.block_size = 6;
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let mut rng = SimRng::from_seed(2);
        let mut state = MarketState::default();
        let block: Vec<f64> = (0..6)
            .map(|_| generator.generate(&params.allocation, &mut state, &mut rng))
            .collect();
        assert_eq!(block, vec![0.10, -0.20, 0.30, 0.05, 0.05, 0.05]);
    }

    #[test]
    fn crypto_without_history_uses_volatile_fallback() {
        let data = tiny_data();
        let params = single_asset_params(AssetClass::Crypto, SamplingStrategy::HistoricalBootstrap);
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let (mean, sd) = sample_moments(&generator, &params.allocation, 40_000, 17);
        // The -100% floor trims the left tail, pulling the mean up and the
        // spread in slightly.
        assert!(mean > CRYPTO_FALLBACK_MEAN - 0.02 && mean < CRYPTO_FALLBACK_MEAN + 0.08, "{mean}");
        assert!(sd > 0.6 && sd < 0.85, "{sd}");
    }

    #[test]
    fn parametric_draws_follow_the_correlation_matrix() {
        let data = HistoricalData::builtin();
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::Parametric);
        params.allocation = PortfolioAllocation {
            us_equity: 0.5,
            intl_equity: 0.5,
            ..PortfolioAllocation::empty()
        };
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let us_only = PortfolioAllocation::single(AssetClass::UsEquity);
        let intl_only = PortfolioAllocation::single(AssetClass::IntlEquity);

        let mut us_rng = SimRng::from_seed(99);
        let mut intl_rng = SimRng::from_seed(99);
        let mut state = MarketState::default();
        let n = 20_000;
        let pairs: Vec<(f64, f64)> = (0..n)
            .map(|_| {
                (
                    generator.generate(&us_only, &mut state, &mut us_rng),
                    generator.generate(&intl_only, &mut state, &mut intl_rng),
                )
            })
            .collect();
        let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
        let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
        let cov = pairs.iter().map(|p| (p.0 - mean_a) * (p.1 - mean_b)).sum::<f64>() / n as f64;
        let var_a = pairs.iter().map(|p| (p.0 - mean_a).powi(2)).sum::<f64>() / n as f64;
        let var_b = pairs.iter().map(|p| (p.1 - mean_b).powi(2)).sum::<f64>() / n as f64;
        let rho = cov / (var_a * var_b).sqrt();
        assert!((rho - 0.85).abs() < 0.03, "rho {rho}");
    }

    #[test]
    fn fat_tails_keep_variance_but_raise_kurtosis() {
        let data = HistoricalData::builtin();
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::Parametric);
        params.fat_tails = true;
        params.fat_tail_degrees_of_freedom = 5.0;
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let mut rng = SimRng::from_seed(4);
        let mut state = MarketState::default();
        let values: Vec<f64> = (0..60_000)
            .map(|_| generator.generate(&params.allocation, &mut state, &mut rng))
            .collect();
        let stats = ReturnStatistics::from_returns(&values).expect("stats");
        let us = ReturnStatistics::from_returns(
            &data.series(AssetClass::UsEquity).expect("us").returns,
        )
        .expect("stats");
        assert!((stats.std_dev - us.std_dev).abs() < 0.02, "sd {}", stats.std_dev);
        assert!(stats.kurtosis > 1.0, "kurtosis {}", stats.kurtosis);
    }

    #[test]
    fn non_positive_definite_correlation_is_rejected() {
        let correlation = CorrelationMatrix::new()
            .with(AssetClass::UsEquity, AssetClass::Bonds, 0.9)
            .and_then(|m| m.with(AssetClass::UsEquity, AssetClass::Gold, 0.9))
            .and_then(|m| m.with(AssetClass::Bonds, AssetClass::Gold, -0.9))
            .expect("in range");
        let data = HistoricalData::new(vec![0.02], correlation);
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::Parametric);
        params.allocation = PortfolioAllocation {
            us_equity: 0.4,
            bonds: 0.3,
            gold: 0.3,
            ..PortfolioAllocation::empty()
        };
        let err = ReturnGenerator::new(&data, &params).expect_err("indefinite");
        assert_eq!(err, ConfigError::CorrelationNotPositiveDefinite);

        params.sampling_strategy = SamplingStrategy::HistoricalBootstrap;
        assert!(ReturnGenerator::new(&data, &params).is_ok());
    }

    #[test]
    fn inflation_models() {
        let data = tiny_data();
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::HistoricalBootstrap);
        let mut rng = SimRng::from_seed(6);
        let mut state = MarketState::default();

        params.inflation_model = InflationModel::Fixed;
        params.fixed_inflation_rate = 0.031;
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        assert_eq!(generator.inflation(&mut state, &mut rng), 0.031);

        params.inflation_model = InflationModel::Historical;
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        for _ in 0..16 {
            let i = generator.inflation(&mut state, &mut rng);
            assert!([0.01, 0.02, 0.03].contains(&i));
        }

        let empty = HistoricalData::new(Vec::new(), CorrelationMatrix::new());
        let generator = ReturnGenerator::new(&empty, &params).expect("generator");
        assert_eq!(generator.inflation(&mut state, &mut rng), 0.031);
    }

    #[test]
    fn stochastic_inflation_reverts_to_its_mean() {
        let data = tiny_data();
        let mut params = single_asset_params(AssetClass::UsEquity, SamplingStrategy::HistoricalBootstrap);
        params.inflation_model = InflationModel::Stochastic;
        let generator = ReturnGenerator::new(&data, &params).expect("generator");
        let mut rng = SimRng::from_seed(12);
        let mut state = MarketState::default();
        let draws: Vec<f64> = (0..20_000)
            .map(|_| generator.inflation(&mut state, &mut rng))
            .collect();
        assert!(draws.iter().all(|d| *d >= 0.0));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - STOCHASTIC_INFLATION_MEAN).abs() < 0.002, "{mean}");
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_generated_returns_are_finite_and_above_floor(
            seed in any::<u64>(),
            strategy_idx in 0usize..3,
            fat_tails in any::<bool>(),
            us_bp in 0u32..10_000,
        ) {
            let strategy = [
                SamplingStrategy::Parametric,
                SamplingStrategy::HistoricalBootstrap,
                SamplingStrategy::BlockBootstrap,
            ][strategy_idx];
            let us = us_bp as f64 / 10_000.0;
            let mut params = single_asset_params(AssetClass::UsEquity, strategy);
            params.fat_tails = fat_tails;
            params.allocation = PortfolioAllocation {
                us_equity: us,
                crypto: (1.0 - us) * 0.5,
                cash: (1.0 - us) * 0.5,
                ..PortfolioAllocation::empty()
            };
            let data = HistoricalData::builtin();
            let generator = ReturnGenerator::new(&data, &params).expect("generator");
            let mut rng = SimRng::from_seed(seed);
            let mut state = MarketState::default();
            for _ in 0..64 {
                let r = generator.generate(&params.allocation, &mut state, &mut rng);
                prop_assert!(r.is_finite());
                prop_assert!(r >= RETURN_FLOOR - 1e-12);
            }
        }
    }
}
