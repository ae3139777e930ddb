use serde::Serialize;
use tracing::debug;

use super::net_income::{BenefitSettings, TaxSettings, calculate_net_income, take_home_income};
use super::types::{MAX_PROJECTION_YEARS, MIN_PROJECTION_YEARS};

pub const DEFAULT_COMPARISON_YEARS: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanningProfile {
    pub profile_id: Option<String>,
    pub tax_settings: TaxSettings,
    pub starting_net_worth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathExpenses {
    /// Annual cost of living, paid in training and earning years alike.
    pub living_expenses: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplate {
    pub template_name: String,
    pub duration_years: u32,
    pub starting_salary: f64,
    pub salary_growth_rate: f64,
    pub education_cost: f64,
    pub military_specific: bool,
    pub default_benefits: BenefitSettings,
    pub default_expenses: PathExpenses,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathPhase {
    Training,
    Earning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathYear {
    pub year: u32,
    pub phase: PathPhase,
    pub gross_income: f64,
    pub net_income: f64,
    pub taxes: f64,
    pub expenses: f64,
    pub net_worth: f64,
    pub cumulative_earnings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub template_name: String,
    pub education_cost: f64,
    pub total_earnings: f64,
    pub total_taxes: f64,
    pub final_net_worth: f64,
    pub yearly_data: Vec<PathYear>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathComparison {
    pub results: Vec<PathResult>,
    pub break_even_year: Option<u32>,
    pub long_term_difference: f64,
    pub projection_years: u32,
}

/// Projects every template over the same horizon and compares outcomes.
///
/// `break_even_year` looks only at the first two results, in input order.
/// `long_term_difference` spans best to worst across all of them.
pub fn compare_paths(
    profile: &PlanningProfile,
    templates: &[PathTemplate],
    projection_years: u32,
) -> PathComparison {
    let projection_years =
        projection_years.clamp(MIN_PROJECTION_YEARS as u32, MAX_PROJECTION_YEARS as u32);
    debug!(
        profile = profile.profile_id.as_deref().unwrap_or("anonymous"),
        templates = templates.len(),
        projection_years,
        "comparing career paths"
    );

    let results: Vec<PathResult> = templates
        .iter()
        .map(|template| project_path(profile, template, projection_years))
        .collect();

    let break_even_year = match results.as_slice() {
        [first, second, ..] => find_break_even_year(first, second),
        _ => None,
    };

    let best = results
        .iter()
        .map(|r| r.final_net_worth)
        .max_by(f64::total_cmp);
    let worst = results
        .iter()
        .map(|r| r.final_net_worth)
        .min_by(f64::total_cmp);
    let long_term_difference = match (best, worst) {
        (Some(best), Some(worst)) => best - worst,
        _ => 0.0,
    };

    PathComparison {
        results,
        break_even_year,
        long_term_difference,
        projection_years,
    }
}

fn project_path(profile: &PlanningProfile, template: &PathTemplate, years: u32) -> PathResult {
    let benefits = &template.default_benefits;
    let living_expenses = template.default_expenses.living_expenses;

    let mut net_worth = profile.starting_net_worth;
    let mut salary = template.starting_salary;
    let mut total_earnings = 0.0;
    let mut total_taxes = 0.0;
    let mut yearly_data = Vec::with_capacity(years as usize);

    for year in 1..=years {
        if year <= template.duration_years {
            net_worth -= living_expenses;
            yearly_data.push(PathYear {
                year,
                phase: PathPhase::Training,
                gross_income: 0.0,
                net_income: 0.0,
                taxes: 0.0,
                expenses: living_expenses,
                net_worth,
                cumulative_earnings: total_earnings,
            });
            continue;
        }

        // Raises start with the second earning year.
        if year > template.duration_years + 1 {
            salary *= 1.0 + template.salary_growth_rate;
        }

        let breakdown = calculate_net_income(salary, &profile.tax_settings, benefits);
        let mut net_income = take_home_income(&breakdown, benefits);
        if template.military_specific {
            // Housing and subsistence allowances are paid tax-free on top of salary.
            net_income += benefits.military_allowances();
        }
        net_worth += net_income - living_expenses + benefits.employer_match;
        total_earnings += salary;
        total_taxes += breakdown.total_tax;

        yearly_data.push(PathYear {
            year,
            phase: PathPhase::Earning,
            gross_income: salary,
            net_income,
            taxes: breakdown.total_tax,
            expenses: living_expenses,
            net_worth,
            cumulative_earnings: total_earnings,
        });
    }

    PathResult {
        template_name: template.template_name.clone(),
        education_cost: template.education_cost,
        total_earnings,
        total_taxes,
        final_net_worth: net_worth,
        yearly_data,
    }
}

/// First year at which the sign of `a - b` strictly flips from the year before.
/// First year whose difference has the opposite sign to the last non-zero one.
/// Years where the paths are level carry the previous leader forward.
fn find_break_even_year(a: &PathResult, b: &PathResult) -> Option<u32> {
    let mut leader = 0.0;
    for (x, y) in a.yearly_data.iter().zip(&b.yearly_data) {
        let diff = x.net_worth - y.net_worth;
        if diff == 0.0 {
            continue;
        }
        let sign = diff.signum();
        if leader != 0.0 && sign != leader {
            return Some(x.year);
        }
        leader = sign;
    }
    None
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

    fn untaxed_profile() -> PlanningProfile {
        PlanningProfile {
            profile_id: Some("p-1".to_string()),
            tax_settings: TaxSettings {
                federal_bracket: 0.0,
                state_bracket: 0.0,
                standard_deduction: 0.0,
                additional_deductions: 0.0,
            },
            starting_net_worth: 0.0,
        }
    }

    fn template(name: &str, duration: u32, salary: f64, growth: f64, living: f64) -> PathTemplate {
        PathTemplate {
            template_name: name.to_string(),
            duration_years: duration,
            starting_salary: salary,
            salary_growth_rate: growth,
            education_cost: 0.0,
            military_specific: false,
            default_benefits: BenefitSettings::default(),
            default_expenses: PathExpenses {
                living_expenses: living,
            },
        }
    }

    #[test]
    fn training_years_burn_living_expenses_without_income() {
        let result = compare_paths(
            &untaxed_profile(),
            &[template("college", 2, 50_000.0, 0.0, 20_000.0)],
            4,
        );
        let years = &result.results[0].yearly_data;
        assert_eq!(years[0].phase, PathPhase::Training);
        assert_approx(years[0].gross_income, 0.0);
        assert_approx(years[0].taxes, 0.0);
        assert_approx(years[1].net_worth, -40_000.0);
        assert_eq!(years[2].phase, PathPhase::Earning);
        assert_approx(years[3].net_worth, 20_000.0);
    }

    #[test]
    fn salary_growth_starts_in_second_earning_year() {
        let result = compare_paths(
            &untaxed_profile(),
            &[template("trade", 1, 40_000.0, 0.1, 0.0)],
            4,
        );
        let years = &result.results[0].yearly_data;
        assert_approx(years[1].gross_income, 40_000.0);
        assert_approx(years[2].gross_income, 44_000.0);
        assert_approx(years[3].gross_income, 48_400.0);
        assert_approx(result.results[0].total_earnings, 132_400.0);
    }

    #[test]
    fn earning_year_uses_net_income_calculator_and_benefit_costs() {
        let profile = PlanningProfile::default();
        let mut path = template("job", 0, 100_000.0, 0.0, 30_000.0);
        path.default_benefits = BenefitSettings {
            health_insurance: 2_000.0,
            retirement_contribution: 5_000.0,
            employer_match: 2_500.0,
            ..BenefitSettings::default()
        };
        let result = compare_paths(&profile, &[path], 1);
        let year = &result.results[0].yearly_data[0];

        // taxable = 100000 - 13850 - 7000 = 79150; tax = 79150 * 0.27
        let tax = 79_150.0 * 0.27;
        assert_approx(year.taxes, tax);
        assert_approx(year.net_income, 100_000.0 - tax - 7_000.0);
        assert_approx(year.net_worth, 100_000.0 - tax - 7_000.0 - 30_000.0 + 2_500.0);
        assert_approx(result.results[0].total_taxes, tax);
    }

    #[test]
    fn military_allowances_are_added_back_untaxed() {
        let mut path = template("army", 0, 30_000.0, 0.0, 0.0);
        path.military_specific = true;
        path.default_benefits.military_housing_allowance = 12_000.0;
        path.default_benefits.military_subsistence_allowance = 3_000.0;
        let mut civilian = path.clone();
        civilian.military_specific = false;

        let result = compare_paths(&PlanningProfile::default(), &[path, civilian], 1);
        let army = &result.results[0].yearly_data[0];
        let civ = &result.results[1].yearly_data[0];
        assert_approx(army.net_income - civ.net_income, 15_000.0);
        // taxable = 30000 - 13850 - 15000 = 1150
        assert_approx(army.taxes, 1_150.0 * 0.27);
    }

    #[test]
    fn break_even_uses_first_two_paths_in_input_order() {
        let work_now = template("work", 0, 40_000.0, 0.0, 30_000.0);
        let degree = template("degree", 2, 90_000.0, 0.0, 30_000.0);
        let result = compare_paths(&untaxed_profile(), &[work_now, degree], 10);

        // work: +10k/yr. degree: -30k, -60k, then +60k/yr.
        // diff: 40k, 80k, 30k, then -20k in year 4.
        assert_eq!(result.break_even_year, Some(4));
        assert_approx(result.results[0].final_net_worth, 100_000.0);
        assert_approx(result.results[1].final_net_worth, 420_000.0);
        assert_approx(result.long_term_difference, 320_000.0);
    }

    #[test]
    fn break_even_counts_an_overtake_through_a_level_year() {
        let steady = template("steady", 0, 10_000.0, 0.0, 0.0);
        let retrain = template("retrain", 1, 40_000.0, 0.0, 10_000.0);
        let result = compare_paths(&untaxed_profile(), &[steady, retrain], 5);

        // diff: +20k, 0, -20k, -40k, -60k.
        let diffs: Vec<f64> = result.results[0]
            .yearly_data
            .iter()
            .zip(&result.results[1].yearly_data)
            .map(|(a, b)| a.net_worth - b.net_worth)
            .collect();
        assert_approx(diffs[1], 0.0);
        assert_eq!(result.break_even_year, Some(3));
    }

    #[test]
    fn paths_that_start_level_have_no_break_even_until_the_lead_changes() {
        let a = template("a", 0, 10_000.0, 0.0, 0.0);
        let mut b = a.clone();
        b.template_name = "b".to_string();
        let level = compare_paths(&untaxed_profile(), &[a.clone(), b], 4);
        assert_eq!(level.break_even_year, None);

        let slower = template("slower", 0, 5_000.0, 0.0, 0.0);
        let ahead = compare_paths(&untaxed_profile(), &[a, slower], 4);
        assert_eq!(ahead.break_even_year, None);
    }

    #[test]
    fn long_term_difference_spans_all_paths_while_break_even_ignores_third() {
        let a = template("a", 0, 50_000.0, 0.0, 0.0);
        let b = template("b", 0, 40_000.0, 0.0, 0.0);
        let c = template("c", 3, 200_000.0, 0.0, 0.0);
        let result = compare_paths(&untaxed_profile(), &[a, b, c], 5);

        // a always leads b, so no flip even though c overtakes both.
        assert_eq!(result.break_even_year, None);
        assert_approx(result.long_term_difference, 400_000.0 - 200_000.0);
    }

    #[test]
    fn fewer_than_two_paths_have_no_break_even_and_no_spread() {
        let single = compare_paths(
            &untaxed_profile(),
            &[template("solo", 0, 10_000.0, 0.0, 0.0)],
            3,
        );
        assert_eq!(single.break_even_year, None);
        assert_approx(single.long_term_difference, 0.0);

        let empty = compare_paths(&untaxed_profile(), &[], 3);
        assert!(empty.results.is_empty());
        assert_eq!(empty.break_even_year, None);
    }

    #[test]
    fn projection_years_are_clamped() {
        let result = compare_paths(
            &untaxed_profile(),
            &[template("t", 0, 1.0, 0.0, 0.0)],
            0,
        );
        assert_eq!(result.projection_years, 1);
        assert_eq!(result.results[0].yearly_data.len(), 1);
    }

    #[test]
    fn starting_net_worth_seeds_every_path() {
        let mut profile = untaxed_profile();
        profile.starting_net_worth = 5_000.0;
        let result = compare_paths(&profile, &[template("t", 1, 0.0, 0.0, 1_000.0)], 1);
        assert_approx(result.results[0].final_net_worth, 4_000.0);
    }
}
