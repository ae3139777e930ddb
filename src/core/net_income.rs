use serde::Serialize;

pub const DEFAULT_FEDERAL_BRACKET: f64 = 0.22;
pub const DEFAULT_STATE_BRACKET: f64 = 0.05;
pub const DEFAULT_STANDARD_DEDUCTION: f64 = 13_850.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettings {
    pub federal_bracket: f64,
    pub state_bracket: f64,
    pub standard_deduction: f64,
    pub additional_deductions: f64,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            federal_bracket: DEFAULT_FEDERAL_BRACKET,
            state_bracket: DEFAULT_STATE_BRACKET,
            standard_deduction: DEFAULT_STANDARD_DEDUCTION,
            additional_deductions: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomBenefit {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitSettings {
    pub health_insurance: f64,
    pub retirement_contribution: f64,
    pub employer_match: f64,
    pub military_housing_allowance: f64,
    pub military_subsistence_allowance: f64,
    pub custom_benefits: Vec<CustomBenefit>,
}

impl BenefitSettings {
    /// Employee-side deductions. Employer match is not one.
    pub fn total_deductions(&self) -> f64 {
        self.health_insurance
            + self.retirement_contribution
            + self.military_allowances()
            + self.custom_benefits.iter().map(|b| b.amount).sum::<f64>()
    }

    pub fn military_allowances(&self) -> f64 {
        self.military_housing_allowance + self.military_subsistence_allowance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetIncomeBreakdown {
    pub gross_income: f64,
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub total_tax: f64,
    pub total_benefits: f64,
    pub net_annual_income: f64,
    pub net_monthly_income: f64,
    pub effective_tax_rate: f64,
}

/// Flat-bracket approximation: both brackets apply to the whole taxable amount.
///
/// `net_annual_income` is gross less tax only. Benefit costs stay in take-home;
/// see [`take_home_income`] for the figure with them removed.
pub fn calculate_net_income(
    gross_annual_income: f64,
    tax: &TaxSettings,
    benefits: &BenefitSettings,
) -> NetIncomeBreakdown {
    let total_benefits = benefits.total_deductions();
    let taxable_income = (gross_annual_income
        - tax.standard_deduction
        - total_benefits
        - tax.additional_deductions)
        .max(0.0);

    let federal_tax = taxable_income * tax.federal_bracket;
    let state_tax = taxable_income * tax.state_bracket;
    let total_tax = federal_tax + state_tax;
    let net_annual_income = gross_annual_income - total_tax;

    NetIncomeBreakdown {
        gross_income: gross_annual_income,
        taxable_income,
        federal_tax,
        state_tax,
        total_tax,
        total_benefits,
        net_annual_income,
        net_monthly_income: net_annual_income / 12.0,
        effective_tax_rate: if gross_annual_income > 0.0 {
            total_tax / gross_annual_income
        } else {
            0.0
        },
    }
}

/// Net income with the employee's health and retirement costs removed.
pub fn take_home_income(breakdown: &NetIncomeBreakdown, benefits: &BenefitSettings) -> f64 {
    breakdown.net_annual_income - benefits.health_insurance - benefits.retirement_contribution
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_settings_reproduce_reference_breakdown() {
        let result =
            calculate_net_income(100_000.0, &TaxSettings::default(), &BenefitSettings::default());

        assert_approx(result.gross_income, 100_000.0);
        assert_approx(result.taxable_income, 86_150.0);
        assert_approx(result.federal_tax, 18_953.0);
        assert_approx(result.state_tax, 4_307.5);
        assert_approx(result.total_tax, 23_260.5);
        assert_approx(result.total_benefits, 0.0);
        assert_approx(result.net_annual_income, 76_739.5);
        assert_approx(result.net_monthly_income, 76_739.5 / 12.0);
        assert_approx(result.effective_tax_rate, 0.232_605);
    }

    #[test]
    fn benefits_reduce_taxable_income_but_not_take_home() {
        let benefits = BenefitSettings {
            health_insurance: 3_000.0,
            retirement_contribution: 5_000.0,
            employer_match: 4_000.0,
            military_housing_allowance: 0.0,
            military_subsistence_allowance: 0.0,
            custom_benefits: vec![CustomBenefit {
                name: "hsa".to_string(),
                amount: 1_000.0,
            }],
        };
        let result = calculate_net_income(100_000.0, &TaxSettings::default(), &benefits);

        // Employer match is not deducted.
        assert_approx(result.total_benefits, 9_000.0);
        assert_approx(result.taxable_income, 77_150.0);
        assert_approx(result.net_annual_income, 100_000.0 - result.total_tax);
        assert_approx(
            take_home_income(&result, &benefits),
            result.net_annual_income - 8_000.0,
        );
    }

    #[test]
    fn taxable_income_is_floored_at_zero() {
        let tax = TaxSettings {
            additional_deductions: 5_000.0,
            ..TaxSettings::default()
        };
        let result = calculate_net_income(10_000.0, &tax, &BenefitSettings::default());
        assert_approx(result.taxable_income, 0.0);
        assert_approx(result.total_tax, 0.0);
        assert_approx(result.net_annual_income, 10_000.0);
    }

    #[test]
    fn zero_gross_has_zero_effective_rate() {
        let result = calculate_net_income(0.0, &TaxSettings::default(), &BenefitSettings::default());
        assert_approx(result.effective_tax_rate, 0.0);
        assert_approx(result.net_monthly_income, 0.0);
    }
}
