use serde::Serialize;

use super::events::TimelineEvent;

pub const DEFAULT_INFLATION_RATE: f64 = 0.03;
pub const DEFAULT_INVESTMENT_RETURN: f64 = 0.07;
pub const DEFAULT_TAX_RATE: f64 = 0.22;
pub const DEFAULT_DEBT_INTEREST_RATE: f64 = 0.05;

pub const MIN_PROJECTION_YEARS: i32 = 1;
pub const MAX_PROJECTION_YEARS: i32 = 100;

/// Balances at or below this are rounding dust and get cleared.
pub const DEBT_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtObligation {
    pub label: Option<String>,
    pub amount: f64,
    pub interest_rate: f64,
    pub monthly_payment: f64,
}

impl DebtObligation {
    pub fn annual_payment(&self) -> f64 {
        self.monthly_payment * 12.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentVehicle {
    pub label: Option<String>,
    pub value: f64,
    pub monthly_contribution: f64,
    pub return_rate: f64,
    pub active: bool,
}

impl InvestmentVehicle {
    pub fn desired_annual_contribution(&self) -> f64 {
        if self.active {
            self.monthly_contribution * 12.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialState {
    pub cash: f64,
    pub debts: Vec<DebtObligation>,
    pub annual_income: f64,
    pub annual_spending: f64,
    pub investments: Vec<InvestmentVehicle>,
    pub career_path: Option<String>,
}

impl FinancialState {
    pub fn total_investments(&self) -> f64 {
        self.investments.iter().map(|v| v.value).sum()
    }

    pub fn total_debts(&self) -> f64 {
        self.debts.iter().map(|d| d.amount).sum()
    }

    pub fn net_worth(&self) -> f64 {
        self.cash + self.total_investments() - self.total_debts()
    }

    pub fn required_debt_service(&self) -> f64 {
        self.debts.iter().map(DebtObligation::annual_payment).sum()
    }

    pub fn desired_annual_contribution(&self) -> f64 {
        self.investments
            .iter()
            .map(InvestmentVehicle::desired_annual_contribution)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSettings {
    pub inflation_rate: f64,
    pub investment_return: f64,
    pub tax_rate: f64,
    pub debt_interest_rate: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            inflation_rate: DEFAULT_INFLATION_RATE,
            investment_return: DEFAULT_INVESTMENT_RETURN,
            tax_rate: DEFAULT_TAX_RATE,
            debt_interest_rate: DEFAULT_DEBT_INTEREST_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub base_year: i32,
    pub years: i32,
    pub starting_state: FinancialState,
    pub events: Vec<TimelineEvent>,
    pub settings: ProjectionSettings,
}

impl ProjectionConfig {
    /// Number of simulated years after the first, capped to the supported range.
    pub fn horizon(&self) -> u32 {
        self.years.clamp(MIN_PROJECTION_YEARS, MAX_PROJECTION_YEARS) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: i32,
    pub year_index: u32,
    pub taxes: f64,
    pub required_debt_service: f64,
    pub cashflow: f64,
    pub contribution_ratio: f64,
    pub total_contributed: f64,
    pub state: FinancialState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years: Vec<i32>,
    pub income: Vec<f64>,
    pub spending: Vec<f64>,
    pub taxes: Vec<f64>,
    pub cashflow: Vec<f64>,
    pub contributions: Vec<f64>,
    pub total_investments: Vec<f64>,
    pub total_debts: Vec<f64>,
    pub net_worth: Vec<f64>,
    pub real_net_worth: Vec<f64>,
    pub yearly_debug_states: Vec<YearSnapshot>,
}

impl ProjectionResult {
    pub fn with_capacity(points: usize) -> Self {
        Self {
            years: Vec::with_capacity(points),
            income: Vec::with_capacity(points),
            spending: Vec::with_capacity(points),
            taxes: Vec::with_capacity(points),
            cashflow: Vec::with_capacity(points),
            contributions: Vec::with_capacity(points),
            total_investments: Vec::with_capacity(points),
            total_debts: Vec::with_capacity(points),
            net_worth: Vec::with_capacity(points),
            real_net_worth: Vec::with_capacity(points),
            yearly_debug_states: Vec::with_capacity(points),
        }
    }
}
