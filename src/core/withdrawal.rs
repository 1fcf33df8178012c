use super::types::{SimulationParameters, WithdrawalPolicyKind};

/// Size of a guardrails cut or raise.
pub const GUARDRAIL_ADJUSTMENT: f64 = 0.10;
const FLOOR_FRACTION: f64 = 0.80;
const CEILING_FRACTION: f64 = 1.20;

/// Inputs to one year's withdrawal decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalState {
    pub current_balance: f64,
    /// Balance in the first withdrawing year.
    pub initial_balance: f64,
    /// Spending in the first withdrawing year.
    pub initial_withdrawal: f64,
    /// Initial withdrawal drifted by realised inflation since retirement.
    pub base_withdrawal: f64,
    pub previous_withdrawal: Option<f64>,
    /// 0 in the first withdrawing year.
    pub year_index: u32,
    /// Inflation drawn for the current year.
    pub inflation: f64,
}

impl WithdrawalState {
    pub fn base_rate(&self) -> f64 {
        if self.initial_balance > 0.0 {
            self.initial_withdrawal / self.initial_balance
        } else {
            0.0
        }
    }
}

/// Run-wide withdrawal policy settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithdrawalRules {
    pub kind: WithdrawalPolicyKind,
    pub floor_rate: f64,
    pub ceiling_rate: f64,
    pub assumed_inflation: f64,
    pub assumed_remaining_years: u32,
}

impl WithdrawalRules {
    pub fn from_params(params: &SimulationParameters) -> Self {
        Self {
            kind: params.withdrawal_policy,
            floor_rate: params.guardrail_floor_rate,
            ceiling_rate: params.guardrail_ceiling_rate,
            assumed_inflation: params.fixed_inflation_rate,
            assumed_remaining_years: params.retirement_years(),
        }
    }

    /// Dollar amount to take this year. Never negative.
    pub fn compute(&self, state: &WithdrawalState) -> f64 {
        let balance = state.current_balance.max(0.0);
        let base_rate = state.base_rate();

        let amount = match self.kind {
            WithdrawalPolicyKind::FixedPercentage => {
                state.initial_withdrawal
                    * (1.0 + self.assumed_inflation).powi(state.year_index as i32)
            }
            WithdrawalPolicyKind::ConstantDollar => state.initial_withdrawal,
            WithdrawalPolicyKind::PercentageOfBalance => (balance * base_rate).min(balance),
            WithdrawalPolicyKind::Guardrails => self.guardrails(state, balance, base_rate),
            WithdrawalPolicyKind::FloorCeiling => {
                let floor = FLOOR_FRACTION * state.base_withdrawal;
                let ceiling = CEILING_FRACTION * state.base_withdrawal;
                (balance * base_rate).clamp(floor.min(ceiling), ceiling.max(floor))
            }
            WithdrawalPolicyKind::RmdStyle => {
                let remaining = self
                    .assumed_remaining_years
                    .saturating_sub(state.year_index)
                    .max(1);
                balance / remaining as f64
            }
        };
        amount.max(0.0)
    }

    fn guardrails(&self, state: &WithdrawalState, balance: f64, base_rate: f64) -> f64 {
        let Some(previous) = state.previous_withdrawal else {
            return balance * base_rate;
        };
        if balance <= 0.0 {
            return previous * (1.0 - GUARDRAIL_ADJUSTMENT);
        }

        let rate = previous / balance;
        if rate > self.ceiling_rate {
            previous * (1.0 - GUARDRAIL_ADJUSTMENT)
        } else if rate < self.floor_rate {
            previous * (1.0 + GUARDRAIL_ADJUSTMENT)
        } else {
            previous * (1.0 + state.inflation)
        }
    }
}
