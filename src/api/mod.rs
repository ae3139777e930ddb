use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AllocationSummary, BenefitSettings, CustomBenefit, DEFAULT_COMPARISON_YEARS,
    DEFAULT_FEDERAL_BRACKET, DEFAULT_STANDARD_DEDUCTION, DEFAULT_STATE_BRACKET, DebtObligation,
    FinancialState, InvestmentHolding, InvestmentVehicle, PathExpenses, PathTemplate,
    PlanningProfile, ProjectionConfig, ProjectionResult, ProjectionSettings, SavingsGoal,
    TaxSettings, TimelineEvent, calculate_allocations, calculate_net_income,
    calculate_projections, compare_paths, run_projection,
};

const DEFAULT_PROJECTION_YEARS: i32 = 30;
const DEFAULT_GOAL_PRIORITY: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "lifeplan",
    about = "Deterministic household and career financial projections"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Default annual inflation in percent, used when a projection omits it"
    )]
    pub inflation_rate: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Default annual investment return in percent"
    )]
    pub investment_return: f64,
    #[arg(
        long,
        default_value_t = 22.0,
        help = "Flat tax rate on gross income in percent for timeline projections"
    )]
    pub tax_rate: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Default annual interest rate on added debts in percent"
    )]
    pub debt_interest_rate: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("--{flag} must be {expected}, got {value}")]
    OutOfRange {
        flag: &'static str,
        expected: &'static str,
        value: f64,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("Invalid JSON payload: {0}")]
    Payload(String),
    #[error("{field} {reason}")]
    InvalidField { field: String, reason: String },
    #[error("{field} is not a valid date: {value}")]
    InvalidDate { field: String, value: String },
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = %self, "rejecting request");
        error_response(StatusCode::BAD_REQUEST, &self.to_string())
    }
}

pub fn build_settings(args: &ServeArgs) -> Result<ProjectionSettings, ConfigError> {
    if !args.inflation_rate.is_finite() || args.inflation_rate <= -100.0 {
        return Err(ConfigError::OutOfRange {
            flag: "inflation-rate",
            expected: "> -100",
            value: args.inflation_rate,
        });
    }

    if !args.investment_return.is_finite() || args.investment_return <= -100.0 {
        return Err(ConfigError::OutOfRange {
            flag: "investment-return",
            expected: "> -100",
            value: args.investment_return,
        });
    }

    if !(0.0..=100.0).contains(&args.tax_rate) {
        return Err(ConfigError::OutOfRange {
            flag: "tax-rate",
            expected: "between 0 and 100",
            value: args.tax_rate,
        });
    }

    if !args.debt_interest_rate.is_finite() || args.debt_interest_rate < 0.0 {
        return Err(ConfigError::OutOfRange {
            flag: "debt-interest-rate",
            expected: ">= 0",
            value: args.debt_interest_rate,
        });
    }

    Ok(ProjectionSettings {
        inflation_rate: args.inflation_rate / 100.0,
        investment_return: args.investment_return / 100.0,
        tax_rate: args.tax_rate / 100.0,
        debt_interest_rate: args.debt_interest_rate / 100.0,
    })
}

#[derive(Clone, Debug)]
struct AppState {
    defaults: ProjectionSettings,
}

pub fn router(defaults: ProjectionSettings) -> Router {
    Router::new()
        .route("/api/projection", post(projection_handler))
        .route("/api/net-income", post(net_income_handler))
        .route("/api/investments/projections", post(growth_handler))
        .route("/api/goals/allocations", post(allocations_handler))
        .route("/api/paths/compare", post(compare_handler))
        .fallback(not_found_handler)
        .with_state(AppState { defaults })
}

pub async fn run_http_server(host: IpAddr, port: u16, defaults: ProjectionSettings) -> std::io::Result<()> {
    let addr = SocketAddr::new(host, port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, ?defaults, "lifeplan HTTP API listening");

    axum::serve(listener, router(defaults)).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsPayload {
    inflation_rate: Option<f64>,
    investment_return: Option<f64>,
    tax_rate: Option<f64>,
    debt_interest_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DebtPayload {
    label: Option<String>,
    amount: Option<f64>,
    interest_rate: Option<f64>,
    monthly_payment: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InvestmentPayload {
    label: Option<String>,
    value: Option<f64>,
    monthly_contribution: Option<f64>,
    return_rate: Option<f64>,
    active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StatePayload {
    cash: Option<f64>,
    debts: Vec<DebtPayload>,
    annual_income: Option<f64>,
    annual_spending: Option<f64>,
    investments: Vec<InvestmentPayload>,
    career_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EventPayload {
    year_offset: u32,
    #[serde(rename = "type")]
    kind: String,
    payload: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectionPayload {
    base_year: Option<i32>,
    years: Option<i32>,
    starting_state: StatePayload,
    events: Vec<EventPayload>,
    settings: SettingsPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxSettingsPayload {
    federal_bracket: Option<f64>,
    state_bracket: Option<f64>,
    standard_deduction: Option<f64>,
    additional_deductions: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CustomBenefitPayload {
    name: String,
    amount: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BenefitsPayload {
    health_insurance: Option<f64>,
    retirement_contribution: Option<f64>,
    employer_match: Option<f64>,
    military_housing_allowance: Option<f64>,
    military_subsistence_allowance: Option<f64>,
    custom_benefits: Vec<CustomBenefitPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NetIncomePayload {
    gross_annual_income: Option<f64>,
    tax_settings: TaxSettingsPayload,
    benefits: BenefitsPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HoldingPayload {
    ticker: Option<String>,
    current_value: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_return: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GrowthPayload {
    investments: Vec<HoldingPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GoalPayload {
    id: Option<String>,
    goal_name: Option<String>,
    target_amount: Option<f64>,
    current_amount: Option<f64>,
    target_date: Option<String>,
    priority: Option<u8>,
    monthly_budget: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AllocationPayload {
    goals: Vec<GoalPayload>,
    net_monthly_income: Option<f64>,
    as_of: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProfilePayload {
    profile_id: Option<String>,
    tax_settings: TaxSettingsPayload,
    starting_net_worth: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ExpensesPayload {
    living_expenses: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TemplatePayload {
    template_name: Option<String>,
    duration_years: Option<u32>,
    starting_salary: Option<f64>,
    salary_growth_rate: Option<f64>,
    education_cost: Option<f64>,
    military_specific: Option<bool>,
    default_benefits: BenefitsPayload,
    default_expenses: ExpensesPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    profile: ProfilePayload,
    templates: Vec<TemplatePayload>,
    projection_years: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionResponse {
    base_year: i32,
    horizon: u32,
    settings: ProjectionSettings,
    #[serde(flatten)]
    result: ProjectionResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocationResponse {
    as_of: NaiveDate,
    #[serde(flatten)]
    summary: AllocationSummary,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(rejection)?;
    let config = projection_config_from_payload(payload, state.defaults, Local::now().year())?;
    let result = run_projection(&config);
    Ok(json_response(
        StatusCode::OK,
        ProjectionResponse {
            base_year: config.base_year,
            horizon: config.horizon(),
            settings: config.settings,
            result,
        },
    ))
}

async fn net_income_handler(
    payload: Result<Json<NetIncomePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(rejection)?;
    let (gross, tax, benefits) = net_income_request_from_payload(payload)?;
    Ok(json_response(
        StatusCode::OK,
        calculate_net_income(gross, &tax, &benefits),
    ))
}

async fn growth_handler(
    State(state): State<AppState>,
    payload: Result<Json<GrowthPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(rejection)?;
    let holdings = holdings_from_payload(payload, &state.defaults)?;
    Ok(json_response(StatusCode::OK, calculate_projections(&holdings)))
}

async fn allocations_handler(
    payload: Result<Json<AllocationPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(rejection)?;
    let (goals, income, as_of) = allocation_request_from_payload(payload, Local::now().date_naive())?;
    Ok(json_response(
        StatusCode::OK,
        AllocationResponse {
            as_of,
            summary: calculate_allocations(&goals, income, as_of),
        },
    ))
}

async fn compare_handler(
    payload: Result<Json<ComparePayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(rejection)?;
    let (profile, templates, years) = compare_request_from_payload(payload)?;
    Ok(json_response(
        StatusCode::OK,
        compare_paths(&profile, &templates, years),
    ))
}

fn rejection(err: JsonRejection) -> ApiError {
    ApiError::Payload(err.body_text())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn finite(field: &str, value: f64) -> Result<f64, ApiError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ApiError::InvalidField {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        })
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64, ApiError> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(ApiError::InvalidField {
            field: field.to_string(),
            reason: "must be >= 0".to_string(),
        });
    }
    Ok(value)
}

fn rate(field: &str, value: f64) -> Result<f64, ApiError> {
    let value = finite(field, value)?;
    if value <= -1.0 {
        return Err(ApiError::InvalidField {
            field: field.to_string(),
            reason: "must be > -1".to_string(),
        });
    }
    Ok(value)
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ApiError::InvalidDate {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

fn settings_from_payload(
    payload: SettingsPayload,
    defaults: ProjectionSettings,
) -> Result<ProjectionSettings, ApiError> {
    Ok(ProjectionSettings {
        inflation_rate: rate(
            "settings.inflationRate",
            payload.inflation_rate.unwrap_or(defaults.inflation_rate),
        )?,
        investment_return: rate(
            "settings.investmentReturn",
            payload.investment_return.unwrap_or(defaults.investment_return),
        )?,
        tax_rate: non_negative(
            "settings.taxRate",
            payload.tax_rate.unwrap_or(defaults.tax_rate),
        )?,
        debt_interest_rate: non_negative(
            "settings.debtInterestRate",
            payload.debt_interest_rate.unwrap_or(defaults.debt_interest_rate),
        )?,
    })
}

fn state_from_payload(
    payload: StatePayload,
    settings: &ProjectionSettings,
) -> Result<FinancialState, ApiError> {
    let debts = payload
        .debts
        .into_iter()
        .enumerate()
        .map(|(idx, debt)| {
            let field = |name: &str| format!("startingState.debts[{idx}].{name}");
            Ok(DebtObligation {
                label: debt.label,
                amount: non_negative(&field("amount"), debt.amount.unwrap_or(0.0))?,
                interest_rate: non_negative(
                    &field("interestRate"),
                    debt.interest_rate.unwrap_or(settings.debt_interest_rate),
                )?,
                monthly_payment: non_negative(
                    &field("monthlyPayment"),
                    debt.monthly_payment.unwrap_or(0.0),
                )?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let investments = payload
        .investments
        .into_iter()
        .enumerate()
        .map(|(idx, vehicle)| {
            let field = |name: &str| format!("startingState.investments[{idx}].{name}");
            Ok(InvestmentVehicle {
                label: vehicle.label,
                value: finite(&field("value"), vehicle.value.unwrap_or(0.0))?,
                monthly_contribution: non_negative(
                    &field("monthlyContribution"),
                    vehicle.monthly_contribution.unwrap_or(0.0),
                )?,
                return_rate: rate(
                    &field("returnRate"),
                    vehicle.return_rate.unwrap_or(settings.investment_return),
                )?,
                active: vehicle.active.unwrap_or(true),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(FinancialState {
        cash: finite("startingState.cash", payload.cash.unwrap_or(0.0))?,
        debts,
        annual_income: non_negative(
            "startingState.annualIncome",
            payload.annual_income.unwrap_or(0.0),
        )?,
        annual_spending: non_negative(
            "startingState.annualSpending",
            payload.annual_spending.unwrap_or(0.0),
        )?,
        investments,
        career_path: payload.career_path,
    })
}

fn projection_config_from_payload(
    payload: ProjectionPayload,
    defaults: ProjectionSettings,
    current_year: i32,
) -> Result<ProjectionConfig, ApiError> {
    let settings = settings_from_payload(payload.settings, defaults)?;
    let starting_state = state_from_payload(payload.starting_state, &settings)?;
    let events = payload
        .events
        .into_iter()
        .map(|event| TimelineEvent::from_raw(event.year_offset, &event.kind, event.payload))
        .collect();

    Ok(ProjectionConfig {
        base_year: payload.base_year.unwrap_or(current_year),
        years: payload.years.unwrap_or(DEFAULT_PROJECTION_YEARS),
        starting_state,
        events,
        settings,
    })
}

fn tax_settings_from_payload(prefix: &str, payload: TaxSettingsPayload) -> Result<TaxSettings, ApiError> {
    let field = |name: &str| format!("{prefix}.{name}");
    Ok(TaxSettings {
        federal_bracket: non_negative(
            &field("federalBracket"),
            payload.federal_bracket.unwrap_or(DEFAULT_FEDERAL_BRACKET),
        )?,
        state_bracket: non_negative(
            &field("stateBracket"),
            payload.state_bracket.unwrap_or(DEFAULT_STATE_BRACKET),
        )?,
        standard_deduction: non_negative(
            &field("standardDeduction"),
            payload.standard_deduction.unwrap_or(DEFAULT_STANDARD_DEDUCTION),
        )?,
        additional_deductions: non_negative(
            &field("additionalDeductions"),
            payload.additional_deductions.unwrap_or(0.0),
        )?,
    })
}

fn benefits_from_payload(prefix: &str, payload: BenefitsPayload) -> Result<BenefitSettings, ApiError> {
    let field = |name: &str| format!("{prefix}.{name}");
    let custom_benefits = payload
        .custom_benefits
        .into_iter()
        .enumerate()
        .map(|(idx, benefit)| {
            Ok(CustomBenefit {
                amount: non_negative(
                    &field(&format!("customBenefits[{idx}].amount")),
                    benefit.amount.unwrap_or(0.0),
                )?,
                name: benefit.name,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(BenefitSettings {
        health_insurance: non_negative(
            &field("healthInsurance"),
            payload.health_insurance.unwrap_or(0.0),
        )?,
        retirement_contribution: non_negative(
            &field("retirementContribution"),
            payload.retirement_contribution.unwrap_or(0.0),
        )?,
        employer_match: non_negative(
            &field("employerMatch"),
            payload.employer_match.unwrap_or(0.0),
        )?,
        military_housing_allowance: non_negative(
            &field("militaryHousingAllowance"),
            payload.military_housing_allowance.unwrap_or(0.0),
        )?,
        military_subsistence_allowance: non_negative(
            &field("militarySubsistenceAllowance"),
            payload.military_subsistence_allowance.unwrap_or(0.0),
        )?,
        custom_benefits,
    })
}

fn net_income_request_from_payload(
    payload: NetIncomePayload,
) -> Result<(f64, TaxSettings, BenefitSettings), ApiError> {
    let Some(gross) = payload.gross_annual_income else {
        return Err(ApiError::InvalidField {
            field: "grossAnnualIncome".to_string(),
            reason: "is required".to_string(),
        });
    };
    Ok((
        non_negative("grossAnnualIncome", gross)?,
        tax_settings_from_payload("taxSettings", payload.tax_settings)?,
        benefits_from_payload("benefits", payload.benefits)?,
    ))
}

fn holdings_from_payload(
    payload: GrowthPayload,
    defaults: &ProjectionSettings,
) -> Result<Vec<InvestmentHolding>, ApiError> {
    payload
        .investments
        .into_iter()
        .enumerate()
        .map(|(idx, holding)| {
            let field = |name: &str| format!("investments[{idx}].{name}");
            Ok(InvestmentHolding {
                ticker: holding.ticker.unwrap_or_default(),
                current_value: non_negative(
                    &field("currentValue"),
                    holding.current_value.unwrap_or(0.0),
                )?,
                monthly_contribution: non_negative(
                    &field("monthlyContribution"),
                    holding.monthly_contribution.unwrap_or(0.0),
                )?,
                annual_return: rate(
                    &field("annualReturn"),
                    holding.annual_return.unwrap_or(defaults.investment_return),
                )?,
            })
        })
        .collect()
}

fn allocation_request_from_payload(
    payload: AllocationPayload,
    today: NaiveDate,
) -> Result<(Vec<SavingsGoal>, f64, NaiveDate), ApiError> {
    let as_of = match payload.as_of.as_deref() {
        Some(raw) => parse_date("asOf", raw)?,
        None => today,
    };
    let income = finite("netMonthlyIncome", payload.net_monthly_income.unwrap_or(0.0))?;

    let goals = payload
        .goals
        .into_iter()
        .enumerate()
        .map(|(idx, goal)| {
            let field = |name: &str| format!("goals[{idx}].{name}");
            let target_date = match goal.target_date.as_deref() {
                Some(raw) => parse_date(&field("targetDate"), raw)?,
                None => {
                    return Err(ApiError::InvalidField {
                        field: field("targetDate"),
                        reason: "is required".to_string(),
                    });
                }
            };
            Ok(SavingsGoal {
                id: goal.id.unwrap_or_else(|| idx.to_string()),
                goal_name: goal.goal_name.unwrap_or_default(),
                target_amount: non_negative(
                    &field("targetAmount"),
                    goal.target_amount.unwrap_or(0.0),
                )?,
                current_amount: non_negative(
                    &field("currentAmount"),
                    goal.current_amount.unwrap_or(0.0),
                )?,
                target_date,
                priority: goal.priority.unwrap_or(DEFAULT_GOAL_PRIORITY),
                monthly_budget: non_negative(
                    &field("monthlyBudget"),
                    goal.monthly_budget.unwrap_or(0.0),
                )?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok((goals, income, as_of))
}

fn compare_request_from_payload(
    payload: ComparePayload,
) -> Result<(PlanningProfile, Vec<PathTemplate>, u32), ApiError> {
    if payload.templates.is_empty() {
        return Err(ApiError::EmptyInput("templates"));
    }

    let profile = PlanningProfile {
        profile_id: payload.profile.profile_id,
        tax_settings: tax_settings_from_payload("profile.taxSettings", payload.profile.tax_settings)?,
        starting_net_worth: finite(
            "profile.startingNetWorth",
            payload.profile.starting_net_worth.unwrap_or(0.0),
        )?,
    };

    let templates = payload
        .templates
        .into_iter()
        .enumerate()
        .map(|(idx, template)| {
            let field = |name: &str| format!("templates[{idx}].{name}");
            Ok(PathTemplate {
                template_name: template
                    .template_name
                    .unwrap_or_else(|| format!("Path {}", idx + 1)),
                duration_years: template.duration_years.unwrap_or(0),
                starting_salary: non_negative(
                    &field("startingSalary"),
                    template.starting_salary.unwrap_or(0.0),
                )?,
                salary_growth_rate: rate(
                    &field("salaryGrowthRate"),
                    template.salary_growth_rate.unwrap_or(0.0),
                )?,
                education_cost: non_negative(
                    &field("educationCost"),
                    template.education_cost.unwrap_or(0.0),
                )?,
                military_specific: template.military_specific.unwrap_or(false),
                default_benefits: benefits_from_payload(
                    &field("defaultBenefits"),
                    template.default_benefits,
                )?,
                default_expenses: PathExpenses {
                    living_expenses: non_negative(
                        &field("defaultExpenses.livingExpenses"),
                        template.default_expenses.living_expenses.unwrap_or(0.0),
                    )?,
                },
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok((
        profile,
        templates,
        payload.projection_years.unwrap_or(DEFAULT_COMPARISON_YEARS),
    ))
}
