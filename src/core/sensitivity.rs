use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::SimulationEngine;
use super::error::{SimulationError, require};
use super::history::HistoricalDataSource;
use super::types::{PortfolioAllocation, SimulationParameters};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensitivityVariable {
    RetirementAge,
    AnnualSpending,
    AnnualContribution,
    /// US + international equity share of the equity/bond sleeve.
    EquityShare,
    LifeExpectancy,
}

impl SensitivityVariable {
    pub const ALL: [SensitivityVariable; 5] = [
        SensitivityVariable::AnnualSpending,
        SensitivityVariable::EquityShare,
        SensitivityVariable::RetirementAge,
        SensitivityVariable::AnnualContribution,
        SensitivityVariable::LifeExpectancy,
    ];

    pub fn base_value(self, params: &SimulationParameters) -> f64 {
        match self {
            SensitivityVariable::RetirementAge => params.retirement_age as f64,
            SensitivityVariable::AnnualSpending => params.annual_spending,
            SensitivityVariable::AnnualContribution => params.annual_contribution,
            SensitivityVariable::EquityShare => {
                let a = &params.allocation;
                let sleeve = a.us_equity + a.intl_equity + a.bonds;
                if sleeve > 0.0 {
                    (a.us_equity + a.intl_equity) / sleeve
                } else {
                    0.0
                }
            }
            SensitivityVariable::LifeExpectancy => params.life_expectancy as f64,
        }
    }

    /// Copy of `params` with this variable set to `value`. Ages are rounded.
    pub fn apply(self, params: &SimulationParameters, value: f64) -> SimulationParameters {
        let mut out = params.clone();
        match self {
            SensitivityVariable::RetirementAge => out.retirement_age = whole_years(value),
            SensitivityVariable::AnnualSpending => out.annual_spending = value,
            SensitivityVariable::AnnualContribution => out.annual_contribution = value,
            SensitivityVariable::EquityShare => {
                out.allocation = resplit_equity(&params.allocation, value);
            }
            SensitivityVariable::LifeExpectancy => out.life_expectancy = whole_years(value),
        }
        out
    }

    /// Whether raising the variable makes ruin more likely.
    pub fn riskier_when_higher(self) -> bool {
        matches!(
            self,
            SensitivityVariable::AnnualSpending | SensitivityVariable::LifeExpectancy
        )
    }

    /// Values swept by [`run_comprehensive_sensitivity`].
    pub fn standard_grid(self, params: &SimulationParameters) -> Vec<f64> {
        let base = self.base_value(params);
        match self {
            SensitivityVariable::AnnualSpending => {
                [0.7, 0.85, 1.0, 1.15, 1.3].map(|m| base * m).to_vec()
            }
            SensitivityVariable::AnnualContribution => {
                [0.0, 0.5, 1.0, 1.5, 2.0].map(|m| base * m).to_vec()
            }
            SensitivityVariable::EquityShare => {
                [0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9].to_vec()
            }
            SensitivityVariable::RetirementAge => [-4.0, -2.0, 0.0, 2.0, 4.0]
                .into_iter()
                .map(|d| base + d)
                .filter(|age| {
                    *age >= params.current_age as f64 && *age <= params.life_expectancy as f64
                })
                .collect(),
            SensitivityVariable::LifeExpectancy => [-5.0, 0.0, 5.0, 10.0]
                .into_iter()
                .map(|d| base + d)
                .filter(|age| {
                    *age > params.current_age as f64 && *age >= params.retirement_age as f64
                })
                .collect(),
        }
    }
}

fn whole_years(value: f64) -> u32 {
    value.round().clamp(0.0, u32::MAX as f64) as u32
}

/// Splits the equity/bond sleeve so equities hold `share` of it. US and
/// international keep their relative mix; other classes are untouched.
pub fn resplit_equity(allocation: &PortfolioAllocation, share: f64) -> PortfolioAllocation {
    let share = share.clamp(0.0, 1.0);
    let equity = allocation.us_equity + allocation.intl_equity;
    let sleeve = equity + allocation.bonds;
    let (us_mix, intl_mix) = if equity > 0.0 {
        (allocation.us_equity / equity, allocation.intl_equity / equity)
    } else {
        (1.0, 0.0)
    };

    PortfolioAllocation {
        us_equity: sleeve * share * us_mix,
        intl_equity: sleeve * share * intl_mix,
        bonds: sleeve * (1.0 - share),
        ..*allocation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityPoint {
    pub value: f64,
    pub success_rate: f64,
    pub median_ending: f64,
    pub p10_ending: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityResult {
    pub variable: SensitivityVariable,
    pub base_value: f64,
    pub test_values: Vec<f64>,
    pub results: Vec<SensitivityPoint>,
    /// Success-rate points per unit of the variable, end point to end point.
    pub sensitivity: f64,
}

/// Re-runs the engine once per value of `variable`, everything else held at
/// `base`. Every run shares `base.seed`.
pub fn analyze_sensitivity<D: HistoricalDataSource + ?Sized>(
    engine: &SimulationEngine<'_, D>,
    base: &SimulationParameters,
    variable: SensitivityVariable,
    values: &[f64],
) -> Result<SensitivityResult, SimulationError> {
    base.validate()?;

    let mut results = Vec::with_capacity(values.len());
    for &value in values {
        let run = engine.run(&variable.apply(base, value))?;
        debug!(?variable, value, success_rate = run.success_rate, "sensitivity point");
        results.push(SensitivityPoint {
            value,
            success_rate: run.success_rate,
            median_ending: run.percentiles.p50,
            p10_ending: run.percentiles.p10,
        });
    }

    let sensitivity = match (results.first(), results.last()) {
        (Some(first), Some(last)) if results.len() > 1 && last.value != first.value => {
            (last.success_rate - first.success_rate) / (last.value - first.value)
        }
        _ => 0.0,
    };

    Ok(SensitivityResult {
        variable,
        base_value: variable.base_value(base),
        test_values: values.to_vec(),
        results,
        sensitivity,
    })
}

/// One sweep per [`SensitivityVariable`] over its standard grid.
pub fn run_comprehensive_sensitivity<D: HistoricalDataSource + ?Sized>(
    engine: &SimulationEngine<'_, D>,
    base: &SimulationParameters,
) -> Result<Vec<SensitivityResult>, SimulationError> {
    SensitivityVariable::ALL
        .into_iter()
        .map(|variable| {
            let grid = variable.standard_grid(base);
            analyze_sensitivity(engine, base, variable, &grid)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct BreakevenConfig {
    /// Percent, as reported in `SimulationResult::success_rate`.
    pub target_success_rate: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakevenResult {
    pub variable: SensitivityVariable,
    pub target_success_rate: f64,
    /// Riskiest value that still meets the target.
    pub solved_value: Option<f64>,
    pub achieved_success_rate: Option<f64>,
    pub iterations: Vec<BreakevenIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

fn validate_breakeven(config: &BreakevenConfig) -> Result<(), SimulationError> {
    require(
        (0.0..=100.0).contains(&config.target_success_rate),
        "targetSuccessRate",
        "between 0 and 100",
        config.target_success_rate,
    )?;
    require(
        config.search_max > config.search_min,
        "searchMax",
        "> searchMin",
        config.search_max,
    )?;
    require(config.search_min.is_finite(), "searchMin", "finite", config.search_min)?;
    require(config.tolerance > 0.0, "tolerance", "> 0", config.tolerance)?;
    require(
        config.max_iterations > 0,
        "maxIterations",
        "> 0",
        config.max_iterations as f64,
    )?;
    Ok(())
}

/// Bisects `variable` for the point where the success rate crosses
/// `config.target_success_rate`. Assumes success is monotone in the variable.
pub fn find_breakeven<D: HistoricalDataSource + ?Sized>(
    engine: &SimulationEngine<'_, D>,
    base: &SimulationParameters,
    variable: SensitivityVariable,
    config: BreakevenConfig,
) -> Result<BreakevenResult, SimulationError> {
    base.validate()?;
    validate_breakeven(&config)?;

    let success_at =
        |value: f64| -> Result<f64, SimulationError> {
            Ok(engine.run(&variable.apply(base, value))?.success_rate)
        };
    let meets = |rate: f64| rate + 1e-12 >= config.target_success_rate;
    let higher_is_riskier = variable.riskier_when_higher();

    // Safe end first, risky end second.
    let (safe_end, risky_end) = if higher_is_riskier {
        (config.search_min, config.search_max)
    } else {
        (config.search_max, config.search_min)
    };

    let mut iterations = Vec::new();
    let mut converged = false;
    let solved_value;
    let feasible;
    let message;

    if !meets(success_at(safe_end)?) {
        solved_value = None;
        feasible = false;
        message = "Target is not met anywhere within the search bounds.".to_string();
    } else if meets(success_at(risky_end)?) {
        solved_value = Some(risky_end);
        converged = true;
        feasible = true;
        message = "Target is still met at the riskiest bound; widen the search.".to_string();
    } else {
        // `safe` always meets the target, `risky` never does.
        let mut safe = safe_end;
        let mut risky = risky_end;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (safe + risky) * 0.5;
            let rate = success_at(mid)?;
            iterations.push(BreakevenIteration {
                iteration: it,
                lower_bound: safe.min(risky),
                upper_bound: safe.max(risky),
                candidate_value: mid,
                success_rate: rate,
            });

            if meets(rate) {
                safe = mid;
            } else {
                risky = mid;
            }

            if (risky - safe).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_value = Some(safe);
        feasible = true;
        message = if converged {
            "Found break-even value.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    let achieved_success_rate = match solved_value {
        Some(value) => Some(success_at(value)?),
        None => None,
    };

    Ok(BreakevenResult {
        variable,
        target_success_rate: config.target_success_rate,
        solved_value,
        achieved_success_rate,
        iterations,
        converged,
        feasible,
        message,
    })
}
