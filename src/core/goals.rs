use chrono::{Datelike, NaiveDate};
use serde::Serialize;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoal {
    pub id: String,
    pub goal_name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: NaiveDate,
    pub priority: u8,
    pub monthly_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalAllocation {
    pub goal_id: String,
    pub goal_name: String,
    pub priority: u8,
    pub months_remaining: i64,
    pub needed: f64,
    pub allocated: f64,
    pub shortfall: f64,
    pub monthly_budget: f64,
    pub budget_covers_need: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub allocations: Vec<GoalAllocation>,
    pub total_shortfall: f64,
    pub remaining_income: f64,
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
pub fn calendar_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + to.month() as i64 - from.month() as i64
}

/// Greedy allocation of monthly income to goals, highest priority first.
///
/// Ties on priority go to the nearer target date. Once income runs out every
/// later goal gets nothing; there is no rebalancing pass.
pub fn calculate_allocations(
    goals: &[SavingsGoal],
    net_monthly_income: f64,
    as_of: NaiveDate,
) -> AllocationSummary {
    let mut ordered: Vec<&SavingsGoal> = goals.iter().collect();
    ordered.sort_by(|a, b| {
        clamp_priority(b.priority)
            .cmp(&clamp_priority(a.priority))
            .then_with(|| a.target_date.cmp(&b.target_date))
    });

    let mut remaining = net_monthly_income.max(0.0);
    let mut total_shortfall = 0.0;
    let mut allocations = Vec::with_capacity(ordered.len());

    for goal in ordered {
        let months_remaining = calendar_months_between(as_of, goal.target_date).max(1);
        let amount_needed = (goal.target_amount - goal.current_amount).max(0.0);
        let needed = amount_needed / months_remaining as f64;

        let allocated = remaining.min(needed);
        remaining -= allocated;
        let shortfall = (needed - allocated).max(0.0);
        total_shortfall += shortfall;

        allocations.push(GoalAllocation {
            goal_id: goal.id.clone(),
            goal_name: goal.goal_name.clone(),
            priority: clamp_priority(goal.priority),
            months_remaining,
            needed,
            allocated,
            shortfall,
            monthly_budget: goal.monthly_budget,
            budget_covers_need: goal.monthly_budget >= needed,
        });
    }

    AllocationSummary {
        allocations,
        total_shortfall,
        remaining_income: remaining,
    }
}

fn clamp_priority(priority: u8) -> u8 {
    priority.clamp(MIN_PRIORITY, MAX_PRIORITY)
}
