//! Deterministic replays over historical return sequences: how much the
//! order of returns matters, and which withdrawal rates survived every
//! rolling window of the record.

use serde::Serialize;

use super::history::{AssetClassSeries, HistoricalDataSource};
use super::types::AssetClass;

/// Starting portfolio for every replay.
pub const REPLAY_START_BALANCE: f64 = 1_000_000.0;
const REPLAY_INFLATION: f64 = 0.025;
const FALLBACK_BOND_RETURN: f64 = 0.03;

pub const DEFAULT_TEST_RATES: [f64; 7] = [0.03, 0.035, 0.04, 0.045, 0.05, 0.055, 0.06];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutcome {
    pub final_balance: f64,
    pub survived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRisk {
    pub actual_order: ReplayOutcome,
    pub reverse_order: ReplayOutcome,
    /// Best returns first.
    pub best_case: ReplayOutcome,
    /// Worst returns first.
    pub worst_case: ReplayOutcome,
    /// `(best - worst) / best`, or 1.0 when either ordering depletes.
    pub sequence_impact: f64,
}

fn replay(returns: &[f64], withdrawal_rate: f64) -> ReplayOutcome {
    let mut balance = REPLAY_START_BALANCE;
    let mut withdrawal = balance * withdrawal_rate;
    for r in returns {
        balance = (balance - withdrawal) * (1.0 + r);
        withdrawal *= 1.0 + REPLAY_INFLATION;
        if balance <= 0.0 {
            return ReplayOutcome {
                final_balance: 0.0,
                survived: false,
            };
        }
    }
    ReplayOutcome {
        final_balance: balance,
        survived: true,
    }
}

/// Replays the first `duration` returns withdraw-then-grow in four orders.
pub fn analyze_sequence_risk(returns: &[f64], withdrawal_rate: f64, duration: usize) -> SequenceRisk {
    let window = &returns[..duration.min(returns.len())];

    let mut reversed = window.to_vec();
    reversed.reverse();
    let mut ascending = window.to_vec();
    ascending.sort_by(|a, b| a.total_cmp(b));
    let descending: Vec<f64> = ascending.iter().rev().copied().collect();

    let best_case = replay(&descending, withdrawal_rate);
    let worst_case = replay(&ascending, withdrawal_rate);
    let sequence_impact = if best_case.final_balance > 0.0 && worst_case.final_balance > 0.0 {
        (best_case.final_balance - worst_case.final_balance) / best_case.final_balance
    } else {
        1.0
    };

    SequenceRisk {
        actual_order: replay(window, withdrawal_rate),
        reverse_order: replay(&reversed, withdrawal_rate),
        best_case,
        worst_case,
        sequence_impact,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorstYear {
    pub year: i32,
    pub balance: f64,
}

/// One rolling retirement window of the historical record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowResult {
    pub start_year: i32,
    pub end_year: i32,
    pub duration: usize,
    /// Highest tested rate that never depleted; 0 when none survived.
    pub max_safe_rate: f64,
    /// Ending balance under `max_safe_rate`.
    pub ending_balance: f64,
    /// Lowest balance seen under `max_safe_rate`.
    pub worst_year: WorstYear,
}

fn return_in(series: Option<&AssetClassSeries>, year: i32, fallback: f64) -> f64 {
    series
        .and_then(|s| {
            let index = usize::try_from(year - s.first_year).ok()?;
            s.returns.get(index).copied()
        })
        .unwrap_or(fallback)
}

/// Backtests each of `test_rates` over every `duration`-year window of the
/// US equity record, with the rest of the portfolio in bonds. Withdrawals
/// grow with realised inflation, which is read index-aligned with the equity
/// series.
pub fn historical_safe_withdrawal_rates<D: HistoricalDataSource + ?Sized>(
    data: &D,
    stock_share: f64,
    duration: usize,
    test_rates: &[f64],
) -> Vec<WindowResult> {
    let Some(stocks) = data.series(AssetClass::UsEquity) else {
        return Vec::new();
    };
    if duration == 0 || duration > stocks.len() {
        return Vec::new();
    }
    let bonds = data.series(AssetClass::Bonds);
    let inflation = data.inflation();
    let bond_share = 1.0 - stock_share;

    (0..=stocks.len() - duration)
        .map(|start| {
            let start_year = stocks.calendar_year(start);
            let mut result = WindowResult {
                start_year,
                end_year: start_year + duration as i32,
                duration,
                max_safe_rate: 0.0,
                ending_balance: 0.0,
                worst_year: WorstYear {
                    year: start_year,
                    balance: REPLAY_START_BALANCE,
                },
            };

            for &rate in test_rates {
                let mut balance = REPLAY_START_BALANCE;
                let mut withdrawal = balance * rate;
                let mut worst = result.worst_year;
                worst.balance = balance;
                let mut survived = true;

                for offset in 0..duration {
                    let index = start + offset;
                    let year = stocks.calendar_year(index);
                    let stock_return = stocks.returns[index];
                    let bond_return = return_in(bonds, year, FALLBACK_BOND_RETURN);
                    let cpi = inflation.get(index).copied().unwrap_or(REPLAY_INFLATION);

                    balance -= withdrawal;
                    balance *= 1.0 + stock_share * stock_return + bond_share * bond_return;
                    withdrawal *= 1.0 + cpi;

                    if balance < worst.balance {
                        worst = WorstYear { year, balance };
                    }
                    if balance <= 0.0 {
                        survived = false;
                        break;
                    }
                }

                if survived && rate > result.max_safe_rate {
                    result.max_safe_rate = rate;
                    result.ending_balance = balance;
                    result.worst_year = worst;
                }
            }
            result
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeWithdrawalSummary {
    pub worst: f64,
    pub p10: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p90: f64,
    pub best: f64,
    pub avg_ending_balance: f64,
}

/// Nearest-rank summary of the per-window safe rates. `None` without windows.
pub fn safe_withdrawal_percentiles(windows: &[WindowResult]) -> Option<SafeWithdrawalSummary> {
    if windows.is_empty() {
        return None;
    }
    let mut rates: Vec<f64> = windows.iter().map(|w| w.max_safe_rate).collect();
    rates.sort_by(|a, b| a.total_cmp(b));
    let rank = |p: f64| rates[((rates.len() as f64 * p) as usize).min(rates.len() - 1)];

    Some(SafeWithdrawalSummary {
        worst: rates[0],
        p10: rank(0.10),
        p25: rank(0.25),
        median: rank(0.50),
        p75: rank(0.75),
        p90: rank(0.90),
        best: rates[rates.len() - 1],
        avg_ending_balance: windows.iter().map(|w| w.ending_balance).sum::<f64>()
            / windows.len() as f64,
    })
}
