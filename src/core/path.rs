use super::glide::apply_glide_path;
use super::returns::{MarketState, ReturnGenerator};
use super::rng::SimRng;
use super::types::{PortfolioAllocation, SimulationParameters, WithdrawalPolicyKind};
use super::withdrawal::{WithdrawalRules, WithdrawalState};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Accumulating,
    Withdrawing,
    Ruined,
    Completed,
}

/// What the engine keeps from a finished trial.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutcome {
    /// Starting balance followed by one end-of-year balance per year.
    pub trajectory: Vec<f64>,
    /// Portfolio outflow per year; 0 while accumulating.
    pub withdrawals: Vec<f64>,
    /// 0-based year in which the balance first hit zero.
    pub ruin_year: Option<u32>,
}

impl PathOutcome {
    pub fn final_balance(&self) -> f64 {
        self.trajectory.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Retirement {
    initial_balance: f64,
    initial_withdrawal: f64,
    years: u32,
}

/// One life-cycle trial. Created per path, stepped once per simulated year,
/// consumed by [`SimulationPath::finish`].
pub struct SimulationPath<'a> {
    params: &'a SimulationParameters,
    generator: &'a ReturnGenerator,
    rules: WithdrawalRules,
    rng: SimRng,
    market: MarketState,
    allocation: PortfolioAllocation,
    year: u32,
    balance: f64,
    contribution: f64,
    spending: f64,
    price_index: f64,
    previous_withdrawal: Option<f64>,
    retirement: Option<Retirement>,
    ruin_year: Option<u32>,
    trajectory: Vec<f64>,
    withdrawals: Vec<f64>,
}

impl<'a> SimulationPath<'a> {
    pub fn new(
        params: &'a SimulationParameters,
        generator: &'a ReturnGenerator,
        rng: SimRng,
    ) -> Self {
        let years = params.total_years() as usize;
        let mut trajectory = Vec::with_capacity(years + 1);
        trajectory.push(params.current_balance);

        Self {
            params,
            generator,
            rules: WithdrawalRules::from_params(params),
            rng,
            market: MarketState::default(),
            allocation: params.allocation,
            year: 0,
            balance: params.current_balance,
            contribution: params.annual_contribution,
            spending: params.annual_spending,
            price_index: 1.0,
            previous_withdrawal: None,
            retirement: None,
            ruin_year: None,
            trajectory,
            withdrawals: Vec::with_capacity(years),
        }
    }

    pub fn age(&self) -> u32 {
        self.params.current_age + self.year
    }

    pub fn phase(&self) -> Phase {
        if self.ruin_year.is_some() {
            Phase::Ruined
        } else if self.year >= self.params.total_years() {
            Phase::Completed
        } else if self.age() >= self.params.retirement_age {
            Phase::Withdrawing
        } else {
            Phase::Accumulating
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Advances one simulated year. No-op once the horizon is reached.
    pub fn step(&mut self) {
        match self.phase() {
            Phase::Completed => return,
            Phase::Ruined => {
                self.trajectory.push(0.0);
                self.withdrawals.push(0.0);
            }
            Phase::Accumulating => {
                let inflation = self.grow();
                self.balance += self.contribution;
                self.contribution *= 1.0 + self.params.contribution_growth_rate;
                self.spending *= 1.0 + inflation;
                self.balance = self.balance.max(0.0);
                self.trajectory.push(self.balance);
                self.withdrawals.push(0.0);
            }
            Phase::Withdrawing => {
                let inflation = self.grow();
                let outflow = self.withdraw(inflation);
                self.spending *= 1.0 + inflation;
                if self.balance <= 0.0 {
                    self.balance = 0.0;
                    self.ruin_year = Some(self.year);
                }
                self.trajectory.push(self.balance);
                self.withdrawals.push(outflow);
            }
        }
        self.year += 1;
    }

    pub fn finish(mut self) -> PathOutcome {
        while self.year < self.params.total_years() {
            self.step();
        }
        PathOutcome {
            trajectory: self.trajectory,
            withdrawals: self.withdrawals,
            ruin_year: self.ruin_year,
        }
    }

    /// Glide, apply the year's return net of capital-gains drag, then draw
    /// inflation. Returns the inflation draw.
    fn grow(&mut self) -> f64 {
        if self.params.glide_path {
            self.allocation =
                apply_glide_path(&self.allocation, self.age(), self.params.retirement_age);
        }

        let r = self
            .generator
            .generate(&self.allocation, &mut self.market, &mut self.rng);
        let gain = self.balance * r;
        let drag = if gain > 0.0 {
            gain * self.params.capital_gains_rate * (1.0 - self.params.tax_deferred_fraction)
        } else {
            0.0
        };
        self.balance = (self.balance + gain - drag).max(0.0);

        let inflation = self.generator.inflation(&mut self.market, &mut self.rng);
        self.price_index *= 1.0 + inflation;
        inflation
    }

    fn withdraw(&mut self, inflation: f64) -> f64 {
        let retirement = *self.retirement.get_or_insert(Retirement {
            initial_balance: self.balance,
            initial_withdrawal: self.spending,
            years: 0,
        });

        let state = WithdrawalState {
            current_balance: self.balance,
            initial_balance: retirement.initial_balance,
            initial_withdrawal: retirement.initial_withdrawal,
            base_withdrawal: self.spending,
            previous_withdrawal: self.previous_withdrawal,
            year_index: retirement.years,
            inflation,
        };
        let amount = self.rules.compute(&state);
        self.previous_withdrawal = Some(amount);
        if let Some(r) = self.retirement.as_mut() {
            r.years += 1;
        }

        let social_security = if self.age() >= self.params.social_security_age {
            self.params.social_security_monthly * 12.0 * self.price_index
        } else {
            0.0
        };
        let net = (amount - social_security).max(0.0);
        let tax = net * self.params.tax_deferred_fraction * self.params.effective_tax_rate;
        let mut gross = net + tax;
        // A balance-sized policy amount is the gross outflow; tax comes out of it.
        if self.rules.kind == WithdrawalPolicyKind::PercentageOfBalance {
            gross = gross.min(amount);
        }

        let available = self.balance;
        self.balance -= gross;
        gross.min(available)
    }
}
