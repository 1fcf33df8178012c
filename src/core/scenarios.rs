//! End-to-end runs over the bundled history.

use super::engine::run_simulation;
use super::types::{
    AssetClass, InflationModel, InsightKind, PortfolioAllocation, SamplingStrategy, SimulationParameters,
    SimulationResult, WithdrawalPolicyKind,
};
use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

fn baseline() -> SimulationParameters {
    SimulationParameters {
        current_age: 35,
        retirement_age: 65,
        life_expectancy: 95,
        current_balance: 500_000.0,
        annual_contribution: 25_000.0,
        contribution_growth_rate: 0.02,
        annual_spending: 20_000.0,
        allocation: PortfolioAllocation {
            us_equity: 0.50,
            intl_equity: 0.15,
            bonds: 0.25,
            cash: 0.10,
            ..PortfolioAllocation::empty()
        },
        glide_path: false,
        social_security_monthly: 0.0,
        effective_tax_rate: 0.0,
        capital_gains_rate: 0.0,
        tax_deferred_fraction: 0.0,
        simulations: 1_000,
        sampling_strategy: SamplingStrategy::HistoricalBootstrap,
        ..SimulationParameters::default()
    }
}

fn crypto_heavy() -> SimulationParameters {
    let mut params = baseline();
    params.allocation = PortfolioAllocation {
        us_equity: 0.10,
        intl_equity: 0.03,
        bonds: 0.05,
        cash: 0.02,
        crypto: 0.80,
        ..PortfolioAllocation::empty()
    };
    params
}

fn assert_monotone(values: [f64; 7]) {
    for pair in values.windows(2) {
        assert!(pair[0] <= pair[1], "percentiles out of order: {values:?}");
    }
}

fn assert_well_formed(result: &SimulationResult) {
    assert!((0.0..=100.0).contains(&result.success_rate));
    assert_eq!(result.success_rate + result.probability_of_ruin, 100.0);
    assert_monotone(result.percentiles.as_array());
    for year in &result.yearly_percentiles {
        assert_monotone(year.balances.as_array());
    }
}

#[test]
fn accumulating_saver_retires_comfortably() {
    let result = run_simulation(&baseline()).expect("valid baseline");
    assert!(result.success_rate > 90.0, "success {}", result.success_rate);
    assert!(
        result.percentiles.p50 > 1_000_000.0,
        "median {}",
        result.percentiles.p50
    );
    assert_well_formed(&result);
    assert_eq!(result.yearly_percentiles.len(), 60);
    assert_eq!(result.yearly_percentiles[59].age, 95);
    assert_eq!(result.insights[0].kind, InsightKind::Success);
}

#[test]
fn crypto_concentration_widens_spread_and_is_flagged() {
    let base = run_simulation(&baseline()).expect("valid baseline");
    let crypto = run_simulation(&crypto_heavy()).expect("valid crypto run");
    assert_well_formed(&crypto);
    assert!(
        crypto.percentiles.spread() >= 10.0 * base.percentiles.spread(),
        "crypto spread {} vs baseline {}",
        crypto.percentiles.spread(),
        base.percentiles.spread()
    );
    assert!(
        crypto
            .insights
            .iter()
            .any(|i| i.kind == InsightKind::Warning && i.message.starts_with("80% crypto")),
        "{:?}",
        crypto.insights
    );
    assert!(!base.insights.iter().any(|i| i.message.contains("crypto")));
}

#[test]
fn identical_inputs_give_identical_results() {
    let mut params = baseline();
    params.simulations = 300;
    for strategy in [
        SamplingStrategy::Parametric,
        SamplingStrategy::HistoricalBootstrap,
        SamplingStrategy::BlockBootstrap,
    ] {
        params.sampling_strategy = strategy;
        let first = run_simulation(&params).expect("valid");
        let second = run_simulation(&params).expect("valid");
        assert_eq!(first, second, "{strategy:?}");
    }
}

#[test]
fn identical_paths_give_flat_ordered_bands() {
    let params = SimulationParameters {
        allocation: PortfolioAllocation::single(AssetClass::Cash),
        inflation_model: InflationModel::Fixed,
        ..baseline()
    };
    let result = run_simulation(&params).expect("valid");
    assert_well_formed(&result);
    for year in &result.yearly_percentiles {
        let bands = year.balances.as_array();
        assert!(bands.iter().all(|b| *b == bands[0]), "year {}: {bands:?}", year.year);
    }
}

#[test]
fn malformed_allocation_fails_fast() {
    let mut params = baseline();
    params.allocation.cash = 0.20;
    assert!(run_simulation(&params).is_err());
}

#[test]
fn balance_based_spending_survives_every_path() {
    let mut params = baseline();
    params.withdrawal_policy = WithdrawalPolicyKind::PercentageOfBalance;
    params.simulations = 200;
    let result = run_simulation(&params).expect("valid");
    assert_eq!(result.success_rate, 100.0);
    assert_eq!(result.ruin_year, None);
}

#[test]
fn overspending_retiree_ruins_and_reports_when() {
    let params = SimulationParameters {
        current_age: 65,
        retirement_age: 65,
        life_expectancy: 95,
        current_balance: 300_000.0,
        annual_contribution: 0.0,
        annual_spending: 60_000.0,
        withdrawal_policy: WithdrawalPolicyKind::ConstantDollar,
        social_security_monthly: 0.0,
        inflation_model: InflationModel::Fixed,
        simulations: 200,
        ..baseline()
    };
    let result = run_simulation(&params).expect("valid");
    assert!(result.success_rate < 60.0, "success {}", result.success_rate);
    assert!(result.ruin_year.is_some());
    assert_eq!(result.insights[0].kind, InsightKind::Danger);
    assert_well_formed(&result);
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(12))]

    #[test]
    fn prop_results_are_well_formed(
        seed in 0u64..10_000,
        spending in 10_000.0f64..120_000.0,
        strategy in 0usize..3,
        policy in 0usize..6,
    ) {
        let strategies = [
            SamplingStrategy::Parametric,
            SamplingStrategy::HistoricalBootstrap,
            SamplingStrategy::BlockBootstrap,
        ];
        let policies = [
            WithdrawalPolicyKind::FixedPercentage,
            WithdrawalPolicyKind::ConstantDollar,
            WithdrawalPolicyKind::PercentageOfBalance,
            WithdrawalPolicyKind::Guardrails,
            WithdrawalPolicyKind::FloorCeiling,
            WithdrawalPolicyKind::RmdStyle,
        ];
        let params = SimulationParameters {
            current_age: 55,
            annual_spending: spending,
            sampling_strategy: strategies[strategy],
            withdrawal_policy: policies[policy],
            simulations: 100,
            seed,
            ..baseline()
        };
        let result = run_simulation(&params).expect("valid");
        prop_assert!((0.0..=100.0).contains(&result.success_rate));
        prop_assert_eq!(result.success_rate + result.probability_of_ruin, 100.0);
        for pair in result.percentiles.as_array().windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        for year in &result.yearly_percentiles {
            for pair in year.balances.as_array().windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
