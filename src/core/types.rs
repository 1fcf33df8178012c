use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, require};

/// Tolerance on the allocation weight sum.
pub const ALLOCATION_TOLERANCE: f64 = 1e-4;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetClass {
    UsEquity,
    IntlEquity,
    Bonds,
    Reits,
    Gold,
    Crypto,
    Cash,
}

impl AssetClass {
    pub const ALL: [AssetClass; 7] = [
        AssetClass::UsEquity,
        AssetClass::IntlEquity,
        AssetClass::Bonds,
        AssetClass::Reits,
        AssetClass::Gold,
        AssetClass::Crypto,
        AssetClass::Cash,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssetClass::UsEquity => "usEquity",
            AssetClass::IntlEquity => "intlEquity",
            AssetClass::Bonds => "bonds",
            AssetClass::Reits => "reits",
            AssetClass::Gold => "gold",
            AssetClass::Crypto => "crypto",
            AssetClass::Cash => "cash",
        }
    }

    /// Classes the glide path sells down when moving toward bonds.
    pub fn is_growth(self) -> bool {
        matches!(
            self,
            AssetClass::UsEquity | AssetClass::IntlEquity | AssetClass::Reits | AssetClass::Crypto
        )
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target weights per asset class. Weights must sum to 1.0; nothing here
/// normalises a malformed allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default = "PortfolioAllocation::empty", rename_all = "camelCase")]
pub struct PortfolioAllocation {
    pub us_equity: f64,
    pub intl_equity: f64,
    pub bonds: f64,
    pub reits: f64,
    pub gold: f64,
    pub crypto: f64,
    pub cash: f64,
}

impl Default for PortfolioAllocation {
    fn default() -> Self {
        Self {
            us_equity: 0.50,
            intl_equity: 0.15,
            bonds: 0.25,
            reits: 0.05,
            gold: 0.0,
            crypto: 0.0,
            cash: 0.05,
        }
    }
}

impl PortfolioAllocation {
    pub fn empty() -> Self {
        Self {
            us_equity: 0.0,
            intl_equity: 0.0,
            bonds: 0.0,
            reits: 0.0,
            gold: 0.0,
            crypto: 0.0,
            cash: 0.0,
        }
    }

    /// A single asset class at 100%.
    pub fn single(class: AssetClass) -> Self {
        let mut allocation = Self::empty();
        allocation.set(class, 1.0);
        allocation
    }

    pub fn weight(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::UsEquity => self.us_equity,
            AssetClass::IntlEquity => self.intl_equity,
            AssetClass::Bonds => self.bonds,
            AssetClass::Reits => self.reits,
            AssetClass::Gold => self.gold,
            AssetClass::Crypto => self.crypto,
            AssetClass::Cash => self.cash,
        }
    }

    pub fn set(&mut self, class: AssetClass, weight: f64) {
        match class {
            AssetClass::UsEquity => self.us_equity = weight,
            AssetClass::IntlEquity => self.intl_equity = weight,
            AssetClass::Bonds => self.bonds = weight,
            AssetClass::Reits => self.reits = weight,
            AssetClass::Gold => self.gold = weight,
            AssetClass::Crypto => self.crypto = weight,
            AssetClass::Cash => self.cash = weight,
        }
    }

    /// Non-zero weights in `AssetClass::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, f64)> + '_ {
        AssetClass::ALL
            .into_iter()
            .map(|class| (class, self.weight(class)))
            .filter(|(_, weight)| *weight > 0.0)
    }

    pub fn total(&self) -> f64 {
        AssetClass::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    pub fn growth_weight(&self) -> f64 {
        AssetClass::ALL
            .iter()
            .filter(|c| c.is_growth())
            .map(|c| self.weight(*c))
            .sum()
    }

    pub fn conservative_weight(&self) -> f64 {
        self.bonds + self.cash
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for class in AssetClass::ALL {
            let weight = self.weight(class);
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::AllocationWeight {
                    asset: class.label(),
                    weight,
                });
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > ALLOCATION_TOLERANCE {
            return Err(ConfigError::AllocationSum { total });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingStrategy {
    #[serde(alias = "correlated", alias = "monteCarlo")]
    Parametric,
    #[serde(alias = "historicalBootstrap", alias = "historical_bootstrap")]
    HistoricalBootstrap,
    #[serde(alias = "blockBootstrap", alias = "block_bootstrap")]
    BlockBootstrap,
}

impl FromStr for SamplingStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "parametric" | "correlated" | "montecarlo" => Ok(SamplingStrategy::Parametric),
            "historicalbootstrap" | "historical" | "bootstrap" => {
                Ok(SamplingStrategy::HistoricalBootstrap)
            }
            "blockbootstrap" | "block" => Ok(SamplingStrategy::BlockBootstrap),
            _ => Err(ConfigError::UnknownSamplingStrategy(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WithdrawalPolicyKind {
    #[serde(alias = "fixedPercentage", alias = "fixed_percentage", alias = "fixed")]
    FixedPercentage,
    #[serde(alias = "constantDollar", alias = "constant_dollar")]
    ConstantDollar,
    #[serde(
        alias = "percentageOfBalance",
        alias = "percentage_of_balance",
        alias = "percentage-of-portfolio"
    )]
    PercentageOfBalance,
    Guardrails,
    #[serde(alias = "floorCeiling", alias = "floor_ceiling")]
    FloorCeiling,
    #[serde(alias = "rmdStyle", alias = "rmd_style", alias = "rmd")]
    RmdStyle,
}

impl FromStr for WithdrawalPolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "fixedpercentage" | "fixed" => Ok(WithdrawalPolicyKind::FixedPercentage),
            "constantdollar" => Ok(WithdrawalPolicyKind::ConstantDollar),
            "percentageofbalance" | "percentageofportfolio" => {
                Ok(WithdrawalPolicyKind::PercentageOfBalance)
            }
            "guardrails" => Ok(WithdrawalPolicyKind::Guardrails),
            "floorceiling" => Ok(WithdrawalPolicyKind::FloorCeiling),
            "rmdstyle" | "rmd" => Ok(WithdrawalPolicyKind::RmdStyle),
            _ => Err(ConfigError::UnknownWithdrawalPolicy(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InflationModel {
    Fixed,
    Historical,
    #[serde(alias = "mean-reverting", alias = "meanReverting")]
    Stochastic,
}

impl FromStr for InflationModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "fixed" => Ok(InflationModel::Fixed),
            "historical" => Ok(InflationModel::Historical),
            "stochastic" | "meanreverting" => Ok(InflationModel::Stochastic),
            _ => Err(ConfigError::UnknownInflationModel(s.to_string())),
        }
    }
}

fn normalise_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Immutable configuration for one run. Rates are fractions (0.07 = 7%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Must be below `life_expectancy`. May exceed `retirement_age`, in which
    /// case the run starts in the withdrawing phase.
    pub current_age: u32,
    /// Must not exceed `life_expectancy`.
    pub retirement_age: u32,
    pub life_expectancy: u32,
    /// >= 0.
    pub current_balance: f64,
    /// Nominal dollars added each working year, >= 0.
    pub annual_contribution: f64,
    /// Yearly growth of the contribution, > -1.
    pub contribution_growth_rate: f64,
    /// Retirement spending in today's dollars, >= 0.
    pub annual_spending: f64,
    pub withdrawal_policy: WithdrawalPolicyKind,
    /// Guardrails raise spending when the withdrawal rate falls below this.
    pub guardrail_floor_rate: f64,
    /// Guardrails cut spending when the withdrawal rate rises above this.
    pub guardrail_ceiling_rate: f64,
    pub allocation: PortfolioAllocation,
    pub glide_path: bool,
    pub social_security_age: u32,
    /// Monthly benefit in today's dollars, >= 0.
    pub social_security_monthly: f64,
    /// Income tax on the tax-deferred share of withdrawals, in [0, 1].
    pub effective_tax_rate: f64,
    /// Drag on the taxable share of positive yearly gains, in [0, 1].
    pub capital_gains_rate: f64,
    /// Share of assets held in tax-deferred accounts, in [0, 1].
    pub tax_deferred_fraction: f64,
    pub simulations: u32,
    pub sampling_strategy: SamplingStrategy,
    /// Consecutive years per block under block bootstrap, > 0.
    pub block_size: u32,
    pub fat_tails: bool,
    /// Student-t degrees of freedom when `fat_tails` is on, > 2.
    pub fat_tail_degrees_of_freedom: f64,
    pub inflation_model: InflationModel,
    /// Used by the fixed inflation model and as the assumed inflation of
    /// the fixed-percentage withdrawal policy.
    pub fixed_inflation_rate: f64,
    pub seed: u64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            current_age: 35,
            retirement_age: 65,
            life_expectancy: 95,
            current_balance: 500_000.0,
            annual_contribution: 25_000.0,
            contribution_growth_rate: 0.02,
            annual_spending: 20_000.0,
            withdrawal_policy: WithdrawalPolicyKind::Guardrails,
            guardrail_floor_rate: 0.03,
            guardrail_ceiling_rate: 0.05,
            allocation: PortfolioAllocation::default(),
            glide_path: true,
            social_security_age: 67,
            social_security_monthly: 2_500.0,
            effective_tax_rate: 0.22,
            capital_gains_rate: 0.15,
            tax_deferred_fraction: 0.60,
            simulations: 1_000,
            sampling_strategy: SamplingStrategy::HistoricalBootstrap,
            block_size: 3,
            fat_tails: true,
            fat_tail_degrees_of_freedom: 5.0,
            inflation_model: InflationModel::Historical,
            fixed_inflation_rate: 0.025,
            seed: 42,
        }
    }
}

impl SimulationParameters {
    pub fn total_years(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.current_age)
    }

    pub fn accumulation_years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Years the RMD-style divisor assumes the retirement lasts.
    pub fn retirement_years(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.retirement_age)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retirement_age > self.life_expectancy {
            return Err(ConfigError::AgeOrdering(format!(
                "retirement age {} must not exceed life expectancy {}",
                self.retirement_age, self.life_expectancy
            )));
        }
        if self.current_age >= self.life_expectancy {
            return Err(ConfigError::AgeOrdering(format!(
                "current age {} must be below life expectancy {}",
                self.current_age, self.life_expectancy
            )));
        }
        if self.simulations == 0 {
            return Err(ConfigError::NoSimulations);
        }
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }

        require(
            self.current_balance >= 0.0,
            "currentBalance",
            ">= 0",
            self.current_balance,
        )?;
        require(
            self.annual_contribution >= 0.0,
            "annualContribution",
            ">= 0",
            self.annual_contribution,
        )?;
        require(
            self.contribution_growth_rate > -1.0,
            "contributionGrowthRate",
            "> -1",
            self.contribution_growth_rate,
        )?;
        require(
            self.annual_spending >= 0.0,
            "annualSpending",
            ">= 0",
            self.annual_spending,
        )?;
        require(
            self.social_security_monthly >= 0.0,
            "socialSecurityMonthly",
            ">= 0",
            self.social_security_monthly,
        )?;
        for (field, rate) in [
            ("effectiveTaxRate", self.effective_tax_rate),
            ("capitalGainsRate", self.capital_gains_rate),
            ("taxDeferredFraction", self.tax_deferred_fraction),
        ] {
            require((0.0..=1.0).contains(&rate), field, "between 0 and 1", rate)?;
        }
        require(
            self.guardrail_floor_rate > 0.0,
            "guardrailFloorRate",
            "> 0",
            self.guardrail_floor_rate,
        )?;
        require(
            self.guardrail_ceiling_rate >= self.guardrail_floor_rate,
            "guardrailCeilingRate",
            ">= guardrailFloorRate",
            self.guardrail_ceiling_rate,
        )?;
        require(
            self.fixed_inflation_rate > -1.0,
            "fixedInflationRate",
            "> -1",
            self.fixed_inflation_rate,
        )?;
        if self.fat_tails
            && !(self.fat_tail_degrees_of_freedom.is_finite()
                && self.fat_tail_degrees_of_freedom > 2.0)
        {
            return Err(ConfigError::DegreesOfFreedom(
                self.fat_tail_degrees_of_freedom,
            ));
        }

        self.allocation.validate()
    }
}

/// Terminal or per-year balance percentiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

impl Percentiles {
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.p5, self.p10, self.p25, self.p50, self.p75, self.p90, self.p95,
        ]
    }

    pub fn spread(&self) -> f64 {
        self.p95 - self.p5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearPercentiles {
    /// 1-based simulated year.
    pub year: u32,
    /// Age at the end of that year.
    pub age: u32,
    #[serde(flatten)]
    pub balances: Percentiles,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: String,
}

/// Aggregate outcome of one run. Built once by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Percent of paths with a strictly positive terminal balance.
    pub success_rate: f64,
    pub median_final_balance: f64,
    pub mean_final_balance: f64,
    pub percentiles: Percentiles,
    pub yearly_percentiles: Vec<YearPercentiles>,
    /// Raw trajectories for charting; starting balance first.
    pub sample_paths: Vec<Vec<f64>>,
    /// Peak-to-trough fraction on the median-terminal path.
    pub max_drawdown_median: f64,
    /// Always `100 - success_rate`.
    pub probability_of_ruin: f64,
    /// Median year index (0-based) in which ruined paths hit zero.
    pub ruin_year: Option<u32>,
    pub insights: Vec<Insight>,
    pub params: SimulationParameters,
}
