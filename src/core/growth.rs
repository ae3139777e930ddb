use std::collections::BTreeMap;

use serde::Serialize;

/// Horizons, in years, reported for every holding.
pub const PROJECTION_HORIZONS: [u32; 5] = [1, 5, 10, 20, 30];

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentHolding {
    pub ticker: String,
    pub current_value: f64,
    pub monthly_contribution: f64,
    pub annual_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProjection {
    pub ticker: String,
    pub projections: BTreeMap<u32, f64>,
    pub total_contributed: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioProjection {
    pub total_portfolio: BTreeMap<u32, f64>,
    pub by_investment: Vec<InvestmentProjection>,
}

/// Future value with monthly compounding and end-of-month contributions.
pub fn future_value(present_value: f64, monthly_contribution: f64, annual_return: f64, years: u32) -> f64 {
    let periods = f64::from(years.saturating_mul(12));
    let monthly_rate = annual_return / 12.0;
    if monthly_rate == 0.0 {
        return present_value + monthly_contribution * periods;
    }
    let growth = (1.0 + monthly_rate).powf(periods);
    present_value * growth + monthly_contribution * ((growth - 1.0) / monthly_rate)
}

pub fn calculate_projections(investments: &[InvestmentHolding]) -> PortfolioProjection {
    let mut total_portfolio: BTreeMap<u32, f64> =
        PROJECTION_HORIZONS.iter().map(|&year| (year, 0.0)).collect();

    let by_investment = investments
        .iter()
        .map(|holding| {
            let mut projections = BTreeMap::new();
            let mut total_contributed = BTreeMap::new();
            for year in PROJECTION_HORIZONS {
                let value = future_value(
                    holding.current_value,
                    holding.monthly_contribution,
                    holding.annual_return,
                    year,
                );
                projections.insert(year, value);
                total_contributed.insert(
                    year,
                    holding.current_value + holding.monthly_contribution * f64::from(year * 12),
                );
                *total_portfolio.entry(year).or_insert(0.0) += value;
            }
            InvestmentProjection {
                ticker: holding.ticker.clone(),
                projections,
                total_contributed,
            }
        })
        .collect();

    PortfolioProjection {
        total_portfolio,
        by_investment,
    }
}
