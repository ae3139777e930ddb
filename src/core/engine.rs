use tracing::debug;

use super::events::TimelineEvent;
use super::types::{
    DEBT_EPSILON, DebtObligation, FinancialState, InvestmentVehicle, ProjectionConfig,
    ProjectionResult, ProjectionSettings, YearSnapshot,
};

#[derive(Debug, Clone, Copy)]
struct YearOutcome {
    income: f64,
    spending: f64,
    taxes: f64,
    required_debt_service: f64,
    cashflow: f64,
    contribution_ratio: f64,
    total_contributed: f64,
}

pub fn run_projection(config: &ProjectionConfig) -> ProjectionResult {
    let horizon = config.horizon();
    let settings = &config.settings;
    debug!(
        base_year = config.base_year,
        requested_years = config.years,
        horizon,
        events = config.events.len(),
        "running projection"
    );

    let mut result = ProjectionResult::with_capacity(horizon as usize + 1);
    let mut state = config.starting_state.clone();
    let mut price_index = 1.0;

    for year_index in 0..=horizon {
        let with_events = apply_year_events(&state, &config.events, year_index, settings);
        let (next, outcome) = advance_year(&with_events, settings);

        let year = config.base_year.saturating_add(year_index as i32);
        let net_worth = next.net_worth();
        let deflator = f64::max(price_index, 1e-9);

        result.years.push(year);
        result.income.push(outcome.income);
        result.spending.push(outcome.spending);
        result.taxes.push(outcome.taxes);
        result.cashflow.push(outcome.cashflow);
        result.contributions.push(outcome.total_contributed);
        result.total_investments.push(next.total_investments());
        result.total_debts.push(next.total_debts());
        result.net_worth.push(net_worth);
        result.real_net_worth.push(net_worth / deflator);
        result.yearly_debug_states.push(YearSnapshot {
            year,
            year_index,
            taxes: outcome.taxes,
            required_debt_service: outcome.required_debt_service,
            cashflow: outcome.cashflow,
            contribution_ratio: outcome.contribution_ratio,
            total_contributed: outcome.total_contributed,
            state: next.clone(),
        });

        price_index *= 1.0 + settings.inflation_rate;
        state = next;
    }

    result
}

fn apply_year_events(
    state: &FinancialState,
    events: &[TimelineEvent],
    year_index: u32,
    settings: &ProjectionSettings,
) -> FinancialState {
    events
        .iter()
        .filter(|event| event.year_offset == year_index)
        .fold(state.clone(), |current, event| event.apply(&current, settings))
}

fn advance_year(state: &FinancialState, settings: &ProjectionSettings) -> (FinancialState, YearOutcome) {
    let income = state.annual_income;
    let spending = state.annual_spending;
    // Flat rate on gross; the deduction model lives in net_income.
    let taxes = income * settings.tax_rate;
    let required_debt_service = state.required_debt_service();
    let cashflow = income - spending - taxes - required_debt_service;

    let (investments, contribution_ratio, total_contributed) =
        grow_investments(&state.investments, cashflow);
    let debts = service_debts(&state.debts, required_debt_service);

    let next = FinancialState {
        cash: state.cash + cashflow - total_contributed,
        debts,
        annual_income: income,
        annual_spending: spending,
        investments,
        career_path: state.career_path.clone(),
    };

    (
        next,
        YearOutcome {
            income,
            spending,
            taxes,
            required_debt_service,
            cashflow,
            contribution_ratio,
            total_contributed,
        },
    )
}

/// Compounds every vehicle and funds active ones, scaling all contributions
/// down together when positive cashflow cannot cover them.
fn grow_investments(
    investments: &[InvestmentVehicle],
    cashflow: f64,
) -> (Vec<InvestmentVehicle>, f64, f64) {
    let desired: f64 = investments
        .iter()
        .map(InvestmentVehicle::desired_annual_contribution)
        .sum();
    let ratio = if desired > 0.0 {
        (cashflow.max(0.0) / desired).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut total_contributed = 0.0;
    let grown = investments
        .iter()
        .map(|vehicle| {
            let contribution = if vehicle.active {
                (vehicle.monthly_contribution * 12.0 * ratio).max(0.0)
            } else {
                0.0
            };
            total_contributed += contribution;
            InvestmentVehicle {
                value: vehicle.value * (1.0 + vehicle.return_rate) + contribution,
                ..vehicle.clone()
            }
        })
        .collect();

    (grown, ratio, total_contributed)
}

/// Accrues interest and pays debts in list order from one shared pool.
fn service_debts(debts: &[DebtObligation], payment_pool: f64) -> Vec<DebtObligation> {
    let mut pool = payment_pool.max(0.0);
    debts
        .iter()
        .filter_map(|debt| {
            let accrued = debt.amount * (1.0 + debt.interest_rate);
            let payment = pool.min(accrued).max(0.0);
            pool -= payment;
            let amount = accrued - payment;
            (amount > DEBT_EPSILON).then(|| DebtObligation {
                amount,
                ..debt.clone()
            })
        })
        .collect()
}
