mod engine;
mod events;
mod goals;
mod growth;
mod net_income;
mod opportunity;
mod types;

pub use engine::run_projection;
pub use events::{
    AssetAdd, AssetSale, CareerPathChange, DebtAdd, DebtPayoff, EventKind, IncomeChange,
    InvestmentStart, InvestmentStop, LifestyleChange, SpendingChange, TimelineEvent,
    amortizing_monthly_payment,
};
pub use goals::{
    AllocationSummary, GoalAllocation, MAX_PRIORITY, MIN_PRIORITY, SavingsGoal,
    calculate_allocations, calendar_months_between,
};
pub use growth::{
    InvestmentHolding, InvestmentProjection, PROJECTION_HORIZONS, PortfolioProjection,
    calculate_projections, future_value,
};
pub use net_income::{
    BenefitSettings, CustomBenefit, DEFAULT_FEDERAL_BRACKET, DEFAULT_STANDARD_DEDUCTION,
    DEFAULT_STATE_BRACKET, NetIncomeBreakdown, TaxSettings, calculate_net_income,
    take_home_income,
};
pub use opportunity::{
    DEFAULT_COMPARISON_YEARS, PathComparison, PathExpenses, PathPhase, PathResult, PathTemplate,
    PathYear, PlanningProfile, compare_paths,
};
pub use types::{
    DEBT_EPSILON, DEFAULT_DEBT_INTEREST_RATE, DEFAULT_INFLATION_RATE, DEFAULT_INVESTMENT_RETURN,
    DEFAULT_TAX_RATE, DebtObligation, FinancialState, InvestmentVehicle, MAX_PROJECTION_YEARS,
    MIN_PROJECTION_YEARS, ProjectionConfig, ProjectionResult, ProjectionSettings, YearSnapshot,
};
