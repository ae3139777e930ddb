use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::types::{
    DEBT_EPSILON, DebtObligation, FinancialState, InvestmentVehicle, ProjectionSettings,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub year_offset: u32,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    IncomeChange(IncomeChange),
    SpendingChange(SpendingChange),
    AssetAdd(AssetAdd),
    AssetSale(AssetSale),
    DebtAdd(DebtAdd),
    DebtPayoff(DebtPayoff),
    InvestmentStart(InvestmentStart),
    InvestmentStop(InvestmentStop),
    LifestyleChange(LifestyleChange),
    CareerPathChange(CareerPathChange),
    /// Type tag outside the supported set.
    Unknown(String),
    /// Known type tag whose payload did not decode.
    Malformed { kind: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomeChange {
    pub new_income: Option<f64>,
    pub delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpendingChange {
    pub new_spending: Option<f64>,
    pub delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetAdd {
    pub label: Option<String>,
    pub value: f64,
    pub monthly_contribution: f64,
    pub return_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetSale {
    pub index: Option<usize>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtAdd {
    pub label: Option<String>,
    pub amount: f64,
    pub interest_rate: Option<f64>,
    pub monthly_payment: Option<f64>,
    pub term_years: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtPayoff {
    pub index: Option<usize>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentStart {
    pub index: Option<usize>,
    pub label: Option<String>,
    pub monthly_contribution: Option<f64>,
    pub initial_value: Option<f64>,
    pub return_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentStop {
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LifestyleChange {
    pub spending_multiplier: Option<f64>,
    pub spending_delta: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CareerPathChange {
    pub career_path: Option<String>,
    pub new_income: Option<f64>,
}

impl TimelineEvent {
    pub fn new(year_offset: u32, kind: EventKind) -> Self {
        Self { year_offset, kind }
    }

    /// Builds an event from its wire form. Never fails: unsupported tags and
    /// undecodable payloads become variants that the engine skips.
    pub fn from_raw(year_offset: u32, kind: &str, payload: Value) -> Self {
        let payload = if payload.is_null() {
            Value::Object(Default::default())
        } else {
            payload
        };

        let decoded = match kind {
            "income_change" => decode(payload).map(EventKind::IncomeChange),
            "spending_change" => decode(payload).map(EventKind::SpendingChange),
            "asset_add" => decode(payload).map(EventKind::AssetAdd),
            "asset_sale" => decode(payload).map(EventKind::AssetSale),
            "debt_add" => decode(payload).map(EventKind::DebtAdd),
            "debt_payoff" => decode(payload).map(EventKind::DebtPayoff),
            "investment_start" => decode(payload).map(EventKind::InvestmentStart),
            "investment_stop" => decode(payload).map(EventKind::InvestmentStop),
            "lifestyle_change" => decode(payload).map(EventKind::LifestyleChange),
            "career_path_change" => decode(payload).map(EventKind::CareerPathChange),
            other => Ok(EventKind::Unknown(other.to_string())),
        };

        let kind = decoded.unwrap_or_else(|e| EventKind::Malformed {
            kind: kind.to_string(),
            reason: e.to_string(),
        });
        Self { year_offset, kind }
    }

    pub fn type_tag(&self) -> &str {
        match &self.kind {
            EventKind::IncomeChange(_) => "income_change",
            EventKind::SpendingChange(_) => "spending_change",
            EventKind::AssetAdd(_) => "asset_add",
            EventKind::AssetSale(_) => "asset_sale",
            EventKind::DebtAdd(_) => "debt_add",
            EventKind::DebtPayoff(_) => "debt_payoff",
            EventKind::InvestmentStart(_) => "investment_start",
            EventKind::InvestmentStop(_) => "investment_stop",
            EventKind::LifestyleChange(_) => "lifestyle_change",
            EventKind::CareerPathChange(_) => "career_path_change",
            EventKind::Unknown(kind) => kind,
            EventKind::Malformed { kind, .. } => kind,
        }
    }

    /// Returns the state that results from applying this event to `state`.
    pub fn apply(&self, state: &FinancialState, settings: &ProjectionSettings) -> FinancialState {
        let mut next = state.clone();
        match &self.kind {
            EventKind::IncomeChange(change) => {
                next.annual_income = change
                    .new_income
                    .unwrap_or(state.annual_income + change.delta)
                    .max(0.0);
            }
            EventKind::SpendingChange(change) => {
                next.annual_spending = change
                    .new_spending
                    .unwrap_or(state.annual_spending + change.delta)
                    .max(0.0);
            }
            EventKind::AssetAdd(asset) => {
                next.investments.push(InvestmentVehicle {
                    label: asset.label.clone(),
                    value: asset.value.max(0.0),
                    monthly_contribution: asset.monthly_contribution.max(0.0),
                    return_rate: asset.return_rate.unwrap_or(settings.investment_return),
                    active: true,
                });
            }
            EventKind::AssetSale(sale) => {
                let Some(targets) = self.targets(sale.index, next.investments.len()) else {
                    return next;
                };
                let mut remaining = sale.amount.map_or(f64::INFINITY, |a| a.max(0.0));
                let mut emptied = vec![false; next.investments.len()];
                for idx in targets {
                    if remaining <= 0.0 {
                        break;
                    }
                    let vehicle = &mut next.investments[idx];
                    let sold = vehicle.value.max(0.0).min(remaining);
                    vehicle.value -= sold;
                    remaining -= sold;
                    next.cash += sold;
                    emptied[idx] = sold > 0.0 && vehicle.value <= DEBT_EPSILON;
                }
                let mut flags = emptied.into_iter();
                next.investments.retain(|_| !flags.next().unwrap_or(false));
            }
            EventKind::DebtAdd(debt) => {
                let amount = debt.amount.max(0.0);
                if amount <= DEBT_EPSILON {
                    warn!(
                        year_offset = self.year_offset,
                        amount = debt.amount,
                        "ignoring debt_add with no principal"
                    );
                    return next;
                }
                let interest_rate = debt.interest_rate.unwrap_or(settings.debt_interest_rate);
                let monthly_payment = debt
                    .monthly_payment
                    .or_else(|| {
                        debt.term_years
                            .filter(|years| *years > 0)
                            .map(|years| amortizing_monthly_payment(amount, interest_rate, years))
                    })
                    .unwrap_or(0.0)
                    .max(0.0);
                next.debts.push(DebtObligation {
                    label: debt.label.clone(),
                    amount,
                    interest_rate,
                    monthly_payment,
                });
            }
            EventKind::DebtPayoff(payoff) => {
                let Some(targets) = self.targets(payoff.index, next.debts.len()) else {
                    return next;
                };
                let mut remaining = payoff.amount.map_or(f64::INFINITY, |a| a.max(0.0));
                for idx in targets {
                    if remaining <= 0.0 {
                        break;
                    }
                    let debt = &mut next.debts[idx];
                    let paid = debt.amount.max(0.0).min(remaining);
                    debt.amount -= paid;
                    remaining -= paid;
                    next.cash -= paid;
                }
                next.debts.retain(|d| d.amount > DEBT_EPSILON);
            }
            EventKind::InvestmentStart(start) => match start.index {
                Some(idx) => {
                    let Some(vehicle) = next.investments.get_mut(idx) else {
                        self.warn_index(idx);
                        return next;
                    };
                    vehicle.active = true;
                    if let Some(contribution) = start.monthly_contribution {
                        vehicle.monthly_contribution = contribution.max(0.0);
                    }
                }
                None => next.investments.push(InvestmentVehicle {
                    label: start.label.clone(),
                    value: start.initial_value.unwrap_or(0.0).max(0.0),
                    monthly_contribution: start.monthly_contribution.unwrap_or(0.0).max(0.0),
                    return_rate: start.return_rate.unwrap_or(settings.investment_return),
                    active: true,
                }),
            },
            EventKind::InvestmentStop(stop) => {
                let Some(targets) = self.targets(stop.index, next.investments.len()) else {
                    return next;
                };
                for idx in targets {
                    next.investments[idx].active = false;
                }
            }
            EventKind::LifestyleChange(change) => {
                let multiplier = change.spending_multiplier.unwrap_or(1.0);
                next.annual_spending =
                    (state.annual_spending * multiplier + change.spending_delta).max(0.0);
            }
            EventKind::CareerPathChange(change) => {
                if let Some(path) = &change.career_path {
                    next.career_path = Some(path.clone());
                }
                if let Some(income) = change.new_income {
                    next.annual_income = income.max(0.0);
                }
            }
            EventKind::Unknown(kind) => {
                warn!(
                    year_offset = self.year_offset,
                    kind = %kind,
                    "ignoring unrecognized timeline event"
                );
            }
            EventKind::Malformed { kind, reason } => {
                warn!(
                    year_offset = self.year_offset,
                    kind = %kind,
                    reason = %reason,
                    "ignoring timeline event with malformed payload"
                );
            }
        }
        next
    }

    fn targets(&self, index: Option<usize>, len: usize) -> Option<Vec<usize>> {
        match index {
            Some(idx) if idx < len => Some(vec![idx]),
            Some(idx) => {
                self.warn_index(idx);
                None
            }
            None => Some((0..len).collect()),
        }
    }

    fn warn_index(&self, idx: usize) {
        warn!(
            year_offset = self.year_offset,
            kind = self.type_tag(),
            index = idx,
            "timeline event targets a missing entry; skipped"
        );
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(payload)
}

/// Level monthly payment that retires `principal` over `years` at `annual_rate`.
pub fn amortizing_monthly_payment(principal: f64, annual_rate: f64, years: u32) -> f64 {
    let periods = f64::from(years.saturating_mul(12));
    if periods == 0.0 {
        return principal.max(0.0);
    }
    let monthly_rate = annual_rate / 12.0;
    if monthly_rate.abs() < 1e-12 {
        return principal / periods;
    }
    principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-periods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_state() -> FinancialState {
        FinancialState {
            cash: 10_000.0,
            debts: vec![
                DebtObligation {
                    label: Some("car".to_string()),
                    amount: 8_000.0,
                    interest_rate: 0.06,
                    monthly_payment: 250.0,
                },
                DebtObligation {
                    label: Some("card".to_string()),
                    amount: 3_000.0,
                    interest_rate: 0.2,
                    monthly_payment: 100.0,
                },
            ],
            annual_income: 80_000.0,
            annual_spending: 40_000.0,
            investments: vec![
                InvestmentVehicle {
                    label: Some("index".to_string()),
                    value: 20_000.0,
                    monthly_contribution: 500.0,
                    return_rate: 0.07,
                    active: true,
                },
                InvestmentVehicle {
                    label: Some("bonds".to_string()),
                    value: 5_000.0,
                    monthly_contribution: 100.0,
                    return_rate: 0.03,
                    active: true,
                },
            ],
            career_path: None,
        }
    }

    fn apply(kind: &str, payload: Value) -> FinancialState {
        TimelineEvent::from_raw(0, kind, payload)
            .apply(&sample_state(), &ProjectionSettings::default())
    }

    #[test]
    fn from_raw_decodes_known_kinds_and_keeps_unknown_tags() {
        let event = TimelineEvent::from_raw(3, "debt_add", json!({"amount": 15000}));
        assert_eq!(event.year_offset, 3);
        assert!(matches!(event.kind, EventKind::DebtAdd(ref d) if d.amount == 15_000.0));

        let unknown = TimelineEvent::from_raw(1, "windfall", json!({"amount": 1}));
        assert_eq!(unknown.kind, EventKind::Unknown("windfall".to_string()));
        assert_eq!(unknown.type_tag(), "windfall");

        let null_payload = TimelineEvent::from_raw(0, "investment_stop", Value::Null);
        assert_eq!(
            null_payload.kind,
            EventKind::InvestmentStop(InvestmentStop { index: None })
        );
    }

    #[test]
    fn from_raw_marks_undecodable_payload_as_malformed() {
        let event = TimelineEvent::from_raw(0, "income_change", json!({"newIncome": "lots"}));
        assert!(matches!(event.kind, EventKind::Malformed { ref kind, .. } if kind == "income_change"));

        let state = sample_state();
        let next = event.apply(&state, &ProjectionSettings::default());
        assert_eq!(next, state);
    }

    #[test]
    fn unknown_event_leaves_state_untouched() {
        let state = sample_state();
        let next = TimelineEvent::from_raw(0, "lottery_win", json!({}))
            .apply(&state, &ProjectionSettings::default());
        assert_eq!(next, state);
    }

    #[test]
    fn income_change_prefers_absolute_value_over_delta() {
        assert_approx(apply("income_change", json!({"newIncome": 95000})).annual_income, 95_000.0);
        assert_approx(apply("income_change", json!({"delta": -5000})).annual_income, 75_000.0);
        assert_approx(apply("income_change", json!({"delta": -500000})).annual_income, 0.0);
    }

    #[test]
    fn spending_and_lifestyle_changes_adjust_spending() {
        assert_approx(apply("spending_change", json!({"newSpending": 30000})).annual_spending, 30_000.0);
        assert_approx(apply("spending_change", json!({"delta": 2500})).annual_spending, 42_500.0);
        assert_approx(
            apply("lifestyle_change", json!({"spendingMultiplier": 1.5, "spendingDelta": -1000}))
                .annual_spending,
            59_000.0,
        );
    }

    #[test]
    fn asset_add_uses_default_return_when_missing() {
        let next = apply("asset_add", json!({"value": 1000, "monthlyContribution": 50}));
        let added = next.investments.last().expect("vehicle added");
        assert_approx(added.value, 1_000.0);
        assert_approx(added.monthly_contribution, 50.0);
        assert_approx(added.return_rate, 0.07);
        assert!(added.active);
    }

    #[test]
    fn asset_sale_drains_vehicles_in_order_and_credits_cash() {
        let next = apply("asset_sale", json!({"amount": 22000}));
        assert_approx(next.cash, 32_000.0);
        assert_eq!(next.investments.len(), 1);
        assert_eq!(next.investments[0].label.as_deref(), Some("bonds"));
        assert_approx(next.investments[0].value, 3_000.0);

        let all = apply("asset_sale", json!({}));
        assert!(all.investments.is_empty());
        assert_approx(all.cash, 35_000.0);
    }

    #[test]
    fn asset_sale_with_missing_index_is_ignored() {
        let state = sample_state();
        let next = TimelineEvent::from_raw(0, "asset_sale", json!({"index": 9}))
            .apply(&state, &ProjectionSettings::default());
        assert_eq!(next, state);
    }

    #[test]
    fn debt_add_derives_payment_from_term() {
        let next = apply("debt_add", json!({"amount": 12000, "interestRate": 0.0, "termYears": 1}));
        let debt = next.debts.last().expect("debt added");
        assert_approx(debt.monthly_payment, 1_000.0);

        let defaulted = apply("debt_add", json!({"amount": 15000}));
        let debt = defaulted.debts.last().expect("debt added");
        assert_approx(debt.interest_rate, 0.05);
        assert_approx(debt.monthly_payment, 0.0);
    }

    #[test]
    fn debt_add_with_an_enormous_term_pays_interest_only() {
        let next = apply("debt_add", json!({"amount": 1000, "termYears": 400_000_000u32}));
        let debt = next.debts.last().expect("debt added");
        assert_approx(debt.monthly_payment, 1_000.0 * 0.05 / 12.0);

        let flat = amortizing_monthly_payment(1_000.0, 0.0, u32::MAX);
        assert!(flat > 0.0 && flat.is_finite());
    }

    #[test]
    fn debt_payoff_pays_from_cash_and_clears_debts() {
        let partial = apply("debt_payoff", json!({"index": 1, "amount": 1000}));
        assert_approx(partial.debts[1].amount, 2_000.0);
        assert_approx(partial.cash, 9_000.0);

        let full = apply("debt_payoff", json!({}));
        assert!(full.debts.is_empty());
        assert_approx(full.cash, -1_000.0);
    }

    #[test]
    fn investment_stop_and_start_toggle_contributions() {
        let stopped = apply("investment_stop", json!({"index": 0}));
        assert!(!stopped.investments[0].active);
        assert!(stopped.investments[1].active);

        let restarted = TimelineEvent::from_raw(
            1,
            "investment_start",
            json!({"index": 0, "monthlyContribution": 750}),
        )
        .apply(&stopped, &ProjectionSettings::default());
        assert!(restarted.investments[0].active);
        assert_approx(restarted.investments[0].monthly_contribution, 750.0);

        let fresh = apply("investment_start", json!({"monthlyContribution": 200}));
        assert_eq!(fresh.investments.len(), 3);
        assert_approx(fresh.investments[2].value, 0.0);
    }

    #[test]
    fn career_path_change_sets_tag_and_income() {
        let next = apply(
            "career_path_change",
            json!({"careerPath": "nursing", "newIncome": 72000}),
        );
        assert_eq!(next.career_path.as_deref(), Some("nursing"));
        assert_approx(next.annual_income, 72_000.0);
    }

    #[test]
    fn amortizing_payment_matches_standard_formula() {
        let payment = amortizing_monthly_payment(200_000.0, 0.06, 30);
        assert!((payment - 1_199.10).abs() < 0.01, "got {payment}");
    }
}
