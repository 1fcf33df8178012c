use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use crate::core::{
    AssetClass, DEFAULT_TEST_RATES, HistoricalData, HistoricalDataSource, InflationModel,
    PortfolioAllocation, ReturnStatistics, SafeWithdrawalSummary, SamplingStrategy,
    SensitivityResult, SequenceRisk, SimulationEngine, SimulationParameters, SimulationResult,
    WindowResult, WithdrawalPolicyKind, analyze_sequence_risk, historical_safe_withdrawal_rates,
    run_comprehensive_sensitivity, run_simulation, safe_withdrawal_percentiles,
};

const MIN_API_SIMULATIONS: u32 = 100;
const MAX_API_SIMULATIONS: u32 = 10_000;
const SENSITIVITY_SIMULATIONS: u32 = 500;
const API_SAMPLE_PATHS: usize = 50;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliWithdrawalPolicy {
    FixedPercentage,
    ConstantDollar,
    PercentageOfBalance,
    Guardrails,
    FloorCeiling,
    RmdStyle,
}

impl From<CliWithdrawalPolicy> for WithdrawalPolicyKind {
    fn from(value: CliWithdrawalPolicy) -> Self {
        match value {
            CliWithdrawalPolicy::FixedPercentage => WithdrawalPolicyKind::FixedPercentage,
            CliWithdrawalPolicy::ConstantDollar => WithdrawalPolicyKind::ConstantDollar,
            CliWithdrawalPolicy::PercentageOfBalance => WithdrawalPolicyKind::PercentageOfBalance,
            CliWithdrawalPolicy::Guardrails => WithdrawalPolicyKind::Guardrails,
            CliWithdrawalPolicy::FloorCeiling => WithdrawalPolicyKind::FloorCeiling,
            CliWithdrawalPolicy::RmdStyle => WithdrawalPolicyKind::RmdStyle,
        }
    }
}

impl From<WithdrawalPolicyKind> for CliWithdrawalPolicy {
    fn from(value: WithdrawalPolicyKind) -> Self {
        match value {
            WithdrawalPolicyKind::FixedPercentage => CliWithdrawalPolicy::FixedPercentage,
            WithdrawalPolicyKind::ConstantDollar => CliWithdrawalPolicy::ConstantDollar,
            WithdrawalPolicyKind::PercentageOfBalance => CliWithdrawalPolicy::PercentageOfBalance,
            WithdrawalPolicyKind::Guardrails => CliWithdrawalPolicy::Guardrails,
            WithdrawalPolicyKind::FloorCeiling => CliWithdrawalPolicy::FloorCeiling,
            WithdrawalPolicyKind::RmdStyle => CliWithdrawalPolicy::RmdStyle,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSamplingStrategy {
    Parametric,
    HistoricalBootstrap,
    BlockBootstrap,
}

impl From<CliSamplingStrategy> for SamplingStrategy {
    fn from(value: CliSamplingStrategy) -> Self {
        match value {
            CliSamplingStrategy::Parametric => SamplingStrategy::Parametric,
            CliSamplingStrategy::HistoricalBootstrap => SamplingStrategy::HistoricalBootstrap,
            CliSamplingStrategy::BlockBootstrap => SamplingStrategy::BlockBootstrap,
        }
    }
}

impl From<SamplingStrategy> for CliSamplingStrategy {
    fn from(value: SamplingStrategy) -> Self {
        match value {
            SamplingStrategy::Parametric => CliSamplingStrategy::Parametric,
            SamplingStrategy::HistoricalBootstrap => CliSamplingStrategy::HistoricalBootstrap,
            SamplingStrategy::BlockBootstrap => CliSamplingStrategy::BlockBootstrap,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliInflationModel {
    Fixed,
    Historical,
    Stochastic,
}

impl From<CliInflationModel> for InflationModel {
    fn from(value: CliInflationModel) -> Self {
        match value {
            CliInflationModel::Fixed => InflationModel::Fixed,
            CliInflationModel::Historical => InflationModel::Historical,
            CliInflationModel::Stochastic => InflationModel::Stochastic,
        }
    }
}

impl From<InflationModel> for CliInflationModel {
    fn from(value: InflationModel) -> Self {
        match value {
            InflationModel::Fixed => CliInflationModel::Fixed,
            InflationModel::Historical => CliInflationModel::Historical,
            InflationModel::Stochastic => CliInflationModel::Stochastic,
        }
    }
}

/// Query/JSON overlay on the API defaults. Rates and weights are percent,
/// matching the CLI flags.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    current_balance: Option<f64>,
    annual_contribution: Option<f64>,
    contribution_growth_rate: Option<f64>,
    annual_spending: Option<f64>,

    withdrawal_policy: Option<WithdrawalPolicyKind>,
    guardrail_floor_rate: Option<f64>,
    guardrail_ceiling_rate: Option<f64>,

    us_equity: Option<f64>,
    intl_equity: Option<f64>,
    bonds: Option<f64>,
    reits: Option<f64>,
    gold: Option<f64>,
    crypto: Option<f64>,
    cash: Option<f64>,
    glide_path: Option<bool>,

    social_security_age: Option<u32>,
    social_security_monthly: Option<f64>,
    effective_tax_rate: Option<f64>,
    capital_gains_rate: Option<f64>,
    tax_deferred_fraction: Option<f64>,

    simulations: Option<u32>,
    sampling_strategy: Option<SamplingStrategy>,
    block_size: Option<u32>,
    fat_tails: Option<bool>,
    fat_tail_degrees_of_freedom: Option<f64>,
    inflation_model: Option<InflationModel>,
    inflation_rate: Option<f64>,
    seed: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "nestegg",
    about = "Monte Carlo retirement simulator (historical, block bootstrap or correlated sampling)"
)]
pub struct Cli {
    #[arg(long, default_value_t = 35)]
    current_age: u32,
    #[arg(long, default_value_t = 65)]
    retirement_age: u32,
    #[arg(long, default_value_t = 95)]
    life_expectancy: u32,
    #[arg(long, default_value_t = 500_000.0)]
    current_balance: f64,
    #[arg(long, default_value_t = 25_000.0)]
    annual_contribution: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Yearly growth of contributions in percent"
    )]
    contribution_growth_rate: f64,
    #[arg(
        long,
        default_value_t = 20_000.0,
        help = "Retirement spending in today's dollars"
    )]
    annual_spending: f64,

    #[arg(long, value_enum, default_value_t = CliWithdrawalPolicy::Guardrails)]
    withdrawal_policy: CliWithdrawalPolicy,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Guardrails raise spending below this withdrawal rate, in percent"
    )]
    guardrail_floor_rate: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Guardrails cut spending above this withdrawal rate, in percent"
    )]
    guardrail_ceiling_rate: f64,

    #[arg(long, default_value_t = 50.0, help = "US equity weight in percent")]
    us_equity: f64,
    #[arg(long, default_value_t = 15.0, help = "International equity weight in percent")]
    intl_equity: f64,
    #[arg(long, default_value_t = 25.0, help = "Bond weight in percent")]
    bonds: f64,
    #[arg(long, default_value_t = 5.0, help = "REIT weight in percent")]
    reits: f64,
    #[arg(long, default_value_t = 0.0, help = "Gold weight in percent")]
    gold: f64,
    #[arg(long, default_value_t = 0.0, help = "Crypto weight in percent")]
    crypto: f64,
    #[arg(long, default_value_t = 5.0, help = "Cash weight in percent")]
    cash: f64,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    glide_path: bool,

    #[arg(long, default_value_t = 67)]
    social_security_age: u32,
    #[arg(
        long,
        default_value_t = 2_500.0,
        help = "Monthly Social Security benefit in today's dollars"
    )]
    social_security_monthly: f64,
    #[arg(long, default_value_t = 22.0, help = "Tax on tax-deferred withdrawals in percent")]
    effective_tax_rate: f64,
    #[arg(long, default_value_t = 15.0, help = "Tax drag on taxable gains in percent")]
    capital_gains_rate: f64,
    #[arg(
        long,
        default_value_t = 60.0,
        help = "Share of assets in tax-deferred accounts in percent"
    )]
    tax_deferred_fraction: f64,

    #[arg(long, default_value_t = 1_000)]
    simulations: u32,
    #[arg(long, value_enum, default_value_t = CliSamplingStrategy::HistoricalBootstrap)]
    sampling_strategy: CliSamplingStrategy,
    #[arg(long, default_value_t = 3, help = "Years per block under block bootstrap")]
    block_size: u32,
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    fat_tails: bool,
    #[arg(long, default_value_t = 5.0)]
    fat_tail_degrees_of_freedom: f64,
    #[arg(long, value_enum, default_value_t = CliInflationModel::Historical)]
    inflation_model: CliInflationModel,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Fixed inflation rate in percent; also the fixed-percentage policy's assumption"
    )]
    inflation_rate: f64,
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "info", help = "Fallback when RUST_LOG is unset")]
    pub log_level: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct SensitivityResponse {
    variables: Vec<SensitivityResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetClassSummary {
    asset: AssetClass,
    start_year: i32,
    end_year: i32,
    years: usize,
    #[serde(flatten)]
    statistics: ReturnStatistics,
    best_year: i32,
    worst_year: i32,
}

#[derive(Debug, Clone, Serialize)]
struct MethodDescription {
    name: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MethodologyResponse {
    asset_classes: Vec<AssetClassSummary>,
    inflation: Option<ReturnStatistics>,
    methods: Vec<MethodDescription>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SafeWithdrawalQuery {
    /// Percent.
    stock_allocation: Option<f64>,
    duration: Option<usize>,
    /// Percent.
    withdrawal_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafeWithdrawalResponse {
    summary: Option<SafeWithdrawalSummary>,
    windows: Vec<WindowResult>,
    sequence_risk: SequenceRisk,
}

const METHODS: [MethodDescription; 3] = [
    MethodDescription {
        name: "historical-bootstrap",
        description: "Each simulated year replays one randomly chosen historical year for every asset class at once, keeping cross-asset co-movement.",
    },
    MethodDescription {
        name: "block-bootstrap",
        description: "Simulated years are drawn as runs of consecutive historical years, keeping short-term momentum and mean reversion.",
    },
    MethodDescription {
        name: "parametric",
        description: "Returns are drawn from a correlated multivariate distribution fitted to each class's historical mean and volatility, optionally Student-t for fat tails.",
    },
];

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn percent(value: f64) -> f64 {
    value / 100.0
}

pub fn build_params(cli: &Cli) -> Result<SimulationParameters, String> {
    let params = SimulationParameters {
        current_age: cli.current_age,
        retirement_age: cli.retirement_age,
        life_expectancy: cli.life_expectancy,
        current_balance: cli.current_balance,
        annual_contribution: cli.annual_contribution,
        contribution_growth_rate: percent(cli.contribution_growth_rate),
        annual_spending: cli.annual_spending,
        withdrawal_policy: cli.withdrawal_policy.into(),
        guardrail_floor_rate: percent(cli.guardrail_floor_rate),
        guardrail_ceiling_rate: percent(cli.guardrail_ceiling_rate),
        allocation: PortfolioAllocation {
            us_equity: percent(cli.us_equity),
            intl_equity: percent(cli.intl_equity),
            bonds: percent(cli.bonds),
            reits: percent(cli.reits),
            gold: percent(cli.gold),
            crypto: percent(cli.crypto),
            cash: percent(cli.cash),
        },
        glide_path: cli.glide_path,
        social_security_age: cli.social_security_age,
        social_security_monthly: cli.social_security_monthly,
        effective_tax_rate: percent(cli.effective_tax_rate),
        capital_gains_rate: percent(cli.capital_gains_rate),
        tax_deferred_fraction: percent(cli.tax_deferred_fraction),
        simulations: cli.simulations,
        sampling_strategy: cli.sampling_strategy.into(),
        block_size: cli.block_size,
        fat_tails: cli.fat_tails,
        fat_tail_degrees_of_freedom: cli.fat_tail_degrees_of_freedom,
        inflation_model: cli.inflation_model.into(),
        fixed_inflation_rate: percent(cli.inflation_rate),
        seed: cli.seed,
    };
    params.validate().map_err(|e| e.to_string())?;
    Ok(params)
}

/// Runs one simulation from CLI flags and renders the result as JSON.
pub fn run_cli(cli: &Cli) -> Result<String, String> {
    let params = build_params(cli)?;
    let result = run_simulation(&params).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&result).map_err(|e| format!("failed to encode result: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/sensitivity", post(sensitivity_handler))
        .route("/api/methodology", get(methodology_handler))
        .route("/api/safe-withdrawal", get(safe_withdrawal_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "retirement simulation API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let params = match api_params_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => {
            warn!(error = %msg, "rejected simulate request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    info!(
        simulations = params.simulations,
        strategy = ?params.sampling_strategy,
        "simulate request"
    );

    match tokio::task::spawn_blocking(move || run_simulation(&params)).await {
        Ok(Ok(result)) => json_response(StatusCode::OK, truncate_for_response(result)),
        Ok(Err(e)) => {
            warn!(error = %e, "simulation failed");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("simulation task failed: {e}"),
        ),
    }
}

async fn sensitivity_handler(Json(payload): Json<SimulatePayload>) -> Response {
    let mut params = match api_params_from_payload(payload) {
        Ok(params) => params,
        Err(msg) => {
            warn!(error = %msg, "rejected sensitivity request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    params.simulations = params.simulations.min(SENSITIVITY_SIMULATIONS);
    info!(simulations = params.simulations, "sensitivity request");

    let outcome = tokio::task::spawn_blocking(move || {
        let data = HistoricalData::builtin();
        run_comprehensive_sensitivity(&SimulationEngine::new(&data), &params)
    })
    .await;

    match outcome {
        Ok(Ok(variables)) => json_response(StatusCode::OK, SensitivityResponse { variables }),
        Ok(Err(e)) => {
            warn!(error = %e, "sensitivity sweep failed");
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("sensitivity task failed: {e}"),
        ),
    }
}

async fn methodology_handler() -> Response {
    json_response(StatusCode::OK, build_methodology(&HistoricalData::builtin()))
}

async fn safe_withdrawal_handler(Query(query): Query<SafeWithdrawalQuery>) -> Response {
    let stock_share = percent(query.stock_allocation.unwrap_or(60.0));
    let duration = query.duration.unwrap_or(30);
    let withdrawal_rate = percent(query.withdrawal_rate.unwrap_or(4.0));
    if !(0.0..=1.0).contains(&stock_share) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "stockAllocation must be between 0 and 100",
        );
    }
    if !(10..=50).contains(&duration) {
        return error_response(StatusCode::BAD_REQUEST, "duration must be between 10 and 50");
    }
    if !(withdrawal_rate.is_finite() && withdrawal_rate >= 0.0) {
        return error_response(StatusCode::BAD_REQUEST, "withdrawalRate must be >= 0");
    }

    let data = HistoricalData::builtin();
    let windows = historical_safe_withdrawal_rates(&data, stock_share, duration, &DEFAULT_TEST_RATES);
    let us_returns = data
        .series(AssetClass::UsEquity)
        .map(|s| s.returns.as_slice())
        .unwrap_or(&[]);
    json_response(
        StatusCode::OK,
        SafeWithdrawalResponse {
            summary: safe_withdrawal_percentiles(&windows),
            sequence_risk: analyze_sequence_risk(us_returns, withdrawal_rate, duration),
            windows,
        },
    )
}

fn build_methodology<D: HistoricalDataSource + ?Sized>(data: &D) -> MethodologyResponse {
    let asset_classes = AssetClass::ALL
        .into_iter()
        .filter_map(|asset| {
            let series = data.series(asset)?;
            let statistics = ReturnStatistics::from_returns(&series.returns)?;
            let extreme = |better: fn(f64, f64) -> bool| {
                let mut best = 0;
                for (i, r) in series.returns.iter().enumerate() {
                    if better(*r, series.returns[best]) {
                        best = i;
                    }
                }
                series.calendar_year(best)
            };
            Some(AssetClassSummary {
                asset,
                start_year: series.first_year,
                end_year: series.last_year(),
                years: series.len(),
                statistics,
                best_year: extreme(|a, b| a > b),
                worst_year: extreme(|a, b| a < b),
            })
        })
        .collect();

    MethodologyResponse {
        asset_classes,
        inflation: ReturnStatistics::from_returns(data.inflation()),
        methods: METHODS.to_vec(),
    }
}

fn truncate_for_response(mut result: SimulationResult) -> SimulationResult {
    result.sample_paths.truncate(API_SAMPLE_PATHS);
    result
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_params_from_json(json: &str) -> Result<SimulationParameters, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_params_from_payload(payload)
}

fn api_params_from_payload(payload: SimulatePayload) -> Result<SimulationParameters, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = v;
    }
    if let Some(v) = payload.current_balance {
        cli.current_balance = v;
    }
    if let Some(v) = payload.annual_contribution {
        cli.annual_contribution = v;
    }
    if let Some(v) = payload.contribution_growth_rate {
        cli.contribution_growth_rate = v;
    }
    if let Some(v) = payload.annual_spending {
        cli.annual_spending = v;
    }

    if let Some(v) = payload.withdrawal_policy {
        cli.withdrawal_policy = v.into();
    }
    if let Some(v) = payload.guardrail_floor_rate {
        cli.guardrail_floor_rate = v;
    }
    if let Some(v) = payload.guardrail_ceiling_rate {
        cli.guardrail_ceiling_rate = v;
    }

    // A partial allocation replaces the default one rather than merging.
    let weights = [
        payload.us_equity,
        payload.intl_equity,
        payload.bonds,
        payload.reits,
        payload.gold,
        payload.crypto,
        payload.cash,
    ];
    if weights.iter().any(Option::is_some) {
        let [us, intl, bonds, reits, gold, crypto, cash] = weights.map(|w| w.unwrap_or(0.0));
        cli.us_equity = us;
        cli.intl_equity = intl;
        cli.bonds = bonds;
        cli.reits = reits;
        cli.gold = gold;
        cli.crypto = crypto;
        cli.cash = cash;
    }
    if let Some(v) = payload.glide_path {
        cli.glide_path = v;
    }

    if let Some(v) = payload.social_security_age {
        cli.social_security_age = v;
    }
    if let Some(v) = payload.social_security_monthly {
        cli.social_security_monthly = v;
    }
    if let Some(v) = payload.effective_tax_rate {
        cli.effective_tax_rate = v;
    }
    if let Some(v) = payload.capital_gains_rate {
        cli.capital_gains_rate = v;
    }
    if let Some(v) = payload.tax_deferred_fraction {
        cli.tax_deferred_fraction = v;
    }

    if let Some(v) = payload.simulations {
        cli.simulations = v;
    }
    cli.simulations = cli.simulations.clamp(MIN_API_SIMULATIONS, MAX_API_SIMULATIONS);
    if let Some(v) = payload.sampling_strategy {
        cli.sampling_strategy = v.into();
    }
    if let Some(v) = payload.block_size {
        cli.block_size = v;
    }
    if let Some(v) = payload.fat_tails {
        cli.fat_tails = v;
    }
    if let Some(v) = payload.fat_tail_degrees_of_freedom {
        cli.fat_tail_degrees_of_freedom = v;
    }
    if let Some(v) = payload.inflation_model {
        cli.inflation_model = v.into();
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }

    build_params(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 35,
        retirement_age: 65,
        life_expectancy: 95,
        current_balance: 500_000.0,
        annual_contribution: 25_000.0,
        contribution_growth_rate: 2.0,
        annual_spending: 20_000.0,
        withdrawal_policy: CliWithdrawalPolicy::Guardrails,
        guardrail_floor_rate: 3.0,
        guardrail_ceiling_rate: 5.0,
        us_equity: 50.0,
        intl_equity: 15.0,
        bonds: 25.0,
        reits: 5.0,
        gold: 0.0,
        crypto: 0.0,
        cash: 5.0,
        glide_path: true,
        social_security_age: 67,
        social_security_monthly: 2_500.0,
        effective_tax_rate: 22.0,
        capital_gains_rate: 15.0,
        tax_deferred_fraction: 60.0,
        simulations: 1_000,
        sampling_strategy: CliSamplingStrategy::HistoricalBootstrap,
        block_size: 3,
        fat_tails: true,
        fat_tail_degrees_of_freedom: 5.0,
        inflation_model: CliInflationModel::Historical,
        inflation_rate: 2.5,
        seed: 42,
        log_level: "info".to_string(),
    }
}
