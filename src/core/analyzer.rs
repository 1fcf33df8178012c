use super::engine::Ensemble;
use super::stats::percentile_sorted;
use super::types::{
    Insight, InsightKind, Percentiles, SimulationParameters, SimulationResult, YearPercentiles,
};

const PERCENTILE_POINTS: [f64; 7] = [5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0];

/// Reduces a finished ensemble to a [`SimulationResult`]. Deterministic.
pub fn analyze(params: &SimulationParameters, ensemble: &Ensemble) -> SimulationResult {
    let n = ensemble.len();
    let successes = ensemble.final_balances.iter().filter(|b| **b > 0.0).count();
    let success_rate = if n == 0 {
        0.0
    } else {
        successes as f64 / n as f64 * 100.0
    };

    let mut sorted_finals = ensemble.final_balances.clone();
    sorted_finals.sort_by(|a, b| a.total_cmp(b));
    let percentiles = percentiles_of(&sorted_finals);
    let mean_final_balance = if n == 0 {
        0.0
    } else {
        sorted_finals.iter().sum::<f64>() / n as f64
    };

    let result = SimulationResult {
        success_rate,
        median_final_balance: percentiles.p50,
        mean_final_balance,
        percentiles,
        yearly_percentiles: yearly_percentiles(params, &ensemble.trajectories),
        sample_paths: ensemble.sample_paths.clone(),
        max_drawdown_median: median_path_drawdown(ensemble),
        probability_of_ruin: 100.0 - success_rate,
        ruin_year: median_ruin_year(&ensemble.ruin_years),
        insights: Vec::new(),
        params: params.clone(),
    };
    SimulationResult {
        insights: insights(params, &result),
        ..result
    }
}

fn percentiles_of(sorted: &[f64]) -> Percentiles {
    let [p5, p10, p25, p50, p75, p90, p95] = PERCENTILE_POINTS.map(|p| percentile_sorted(sorted, p));
    Percentiles {
        p5,
        p10,
        p25,
        p50,
        p75,
        p90,
        p95,
    }
}

fn yearly_percentiles(
    params: &SimulationParameters,
    trajectories: &[Vec<f64>],
) -> Vec<YearPercentiles> {
    let years = params.total_years();
    let mut column = Vec::with_capacity(trajectories.len());
    (1..=years)
        .map(|year| {
            column.clear();
            column.extend(
                trajectories
                    .iter()
                    .filter_map(|t| t.get(year as usize).copied()),
            );
            column.sort_by(|a, b| a.total_cmp(b));
            YearPercentiles {
                year,
                age: params.current_age + year,
                balances: percentiles_of(&column),
            }
        })
        .collect()
}

/// Largest peak-to-trough fall as a fraction of the running peak.
pub fn max_drawdown(trajectory: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &balance in trajectory {
        peak = peak.max(balance);
        if peak > 0.0 {
            worst = worst.max((peak - balance) / peak);
        }
    }
    worst
}

/// Drawdown of the path whose terminal balance sits at the median rank.
fn median_path_drawdown(ensemble: &Ensemble) -> f64 {
    if ensemble.is_empty() {
        return 0.0;
    }
    let mut order: Vec<usize> = (0..ensemble.len()).collect();
    order.sort_by(|a, b| {
        ensemble.final_balances[*a].total_cmp(&ensemble.final_balances[*b])
    });
    let median = order[order.len() / 2];
    ensemble
        .trajectories
        .get(median)
        .map_or(0.0, |t| max_drawdown(t))
}

fn median_ruin_year(ruin_years: &[u32]) -> Option<u32> {
    if ruin_years.is_empty() {
        return None;
    }
    let mut sorted = ruin_years.to_vec();
    sorted.sort_unstable();
    Some(sorted[sorted.len() / 2])
}

fn insights(params: &SimulationParameters, result: &SimulationResult) -> Vec<Insight> {
    let rate = result.success_rate;
    let mut out = Vec::new();

    let headline = if rate >= 95.0 {
        Insight {
            kind: InsightKind::Success,
            message: format!(
                "Excellent! {rate:.0}% success rate. You're well-positioned for retirement."
            ),
        }
    } else if rate >= 80.0 {
        Insight {
            kind: InsightKind::Success,
            message: format!(
                "Good position with {rate:.0}% success rate. Consider small adjustments for more security."
            ),
        }
    } else if rate >= 60.0 {
        Insight {
            kind: InsightKind::Warning,
            message: format!(
                "{rate:.0}% success rate needs attention. Consider: saving more, working longer, or reducing planned spending."
            ),
        }
    } else {
        Insight {
            kind: InsightKind::Danger,
            message: format!(
                "High risk of running out of money ({:.0}% failure rate). Significant changes needed.",
                100.0 - rate
            ),
        }
    };
    out.push(headline);

    if params.accumulation_years() < 5 && params.allocation.us_equity > 0.5 {
        out.push(Insight {
            kind: InsightKind::Warning,
            message: "With retirement close, consider reducing equity exposure to protect against sequence of returns risk.".to_string(),
        });
    }

    if params.allocation.crypto > 0.10 {
        out.push(Insight {
            kind: InsightKind::Warning,
            message: format!(
                "{:.0}% crypto allocation adds significant volatility. Historical crypto drawdowns exceed 80%.",
                params.allocation.crypto * 100.0
            ),
        });
    }

    if params.social_security_age < 70 && params.social_security_monthly > 0.0 && rate < 90.0 {
        out.push(Insight {
            kind: InsightKind::Warning,
            message: "Delaying Social Security to age 70 increases benefits by 8%/year and improves success rate.".to_string(),
        });
    }

    out
}
