use axum::{
    Router,
    extract::Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use clap::{Parser, ValueEnum};
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    CreditCard, Debt, Loan, Strategy, amortization_schedule, balance_trajectory, build_plan,
    compare_strategies, months_to_payoff, normalize_debts, summarize,
};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{field} must be a finite number >= 0, got {value}")]
    InvalidAmount { field: String, value: f64 },
    #[error("budget is required")]
    MissingBudget,
    #[error("budget must be a finite number, got {0}")]
    InvalidBudget(f64),
    #[error("loans[{index}].termMonths must be > 0")]
    ZeroTerm { index: usize },
    #[error("failed to read {path}: {source}")]
    ReadDebts {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid debts JSON: {0}")]
    ParseDebts(#[source] serde_json::Error),
    #[error("failed to encode report: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Avalanche,
    Snowball,
    HighestBalance,
    DueDate,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Avalanche => Strategy::Avalanche,
            CliStrategy::Snowball => Strategy::Snowball,
            CliStrategy::HighestBalance => Strategy::HighestBalance,
            CliStrategy::DueDate => Strategy::DueDate,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ReportKind {
    Summary,
    Months,
    Trajectory,
    Schedule,
    Plan,
    Compare,
}

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Debt payoff planner (avalanche, snowball, highest balance, due date)"
)]
struct Cli {
    #[arg(long, help = "JSON file with `cards` and `loans` arrays")]
    debts: PathBuf,
    #[arg(long, help = "Monthly amount available for all debt payments")]
    budget: f64,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
    #[arg(long, help = "First payment month (YYYY-MM-DD), used for the payoff date")]
    start_date: Option<Date>,
    #[arg(long, value_enum, default_value_t = ReportKind::Summary)]
    report: ReportKind,
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DebtRecords {
    cards: Vec<CreditCard>,
    loans: Vec<Loan>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    cards: Vec<CreditCard>,
    loans: Vec<Loan>,
    budget: Option<f64>,
    strategy: Option<Strategy>,
    start_date: Option<Date>,
}

#[derive(Debug, Clone)]
struct PlanRequest {
    debts: Vec<Debt>,
    budget: f64,
    strategy: Strategy,
    start_date: Option<Date>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn run_cli(args: Vec<String>) -> Result<(), PlanError> {
    let cli = Cli::parse_from(args);
    if let Err(e) = crate::logging::init_logging(&cli.log_level) {
        eprintln!("Warning: logging unavailable: {e}");
    }

    let raw = fs::read_to_string(&cli.debts).map_err(|source| PlanError::ReadDebts {
        path: cli.debts.clone(),
        source,
    })?;
    let records = records_from_json(&raw)?;
    let request = build_request(
        &records.cards,
        &records.loans,
        Some(cli.budget),
        cli.strategy.into(),
        cli.start_date,
    )?;
    tracing::debug!(
        debts = request.debts.len(),
        budget = request.budget,
        strategy = request.strategy.name(),
        "Running payoff report"
    );

    let report = render_report(&request, cli.report)?;
    println!("{report}");
    Ok(())
}

fn records_from_json(json: &str) -> Result<DebtRecords, PlanError> {
    serde_json::from_str(json).map_err(PlanError::ParseDebts)
}

fn render_report(request: &PlanRequest, kind: ReportKind) -> Result<String, PlanError> {
    let debts = request.debts.as_slice();
    let (budget, strategy, start_date) = (request.budget, request.strategy, request.start_date);

    let encoded = match kind {
        ReportKind::Summary => {
            serde_json::to_string_pretty(&summarize(debts, budget, strategy, start_date))
        }
        ReportKind::Months => serde_json::to_string(&months_to_payoff(debts, budget, strategy)),
        ReportKind::Trajectory => {
            serde_json::to_string(&balance_trajectory(debts, budget, strategy))
        }
        ReportKind::Schedule => {
            serde_json::to_string_pretty(&amortization_schedule(debts, budget, strategy))
        }
        ReportKind::Plan => {
            serde_json::to_string_pretty(&build_plan(debts, budget, strategy, start_date))
        }
        ReportKind::Compare => {
            serde_json::to_string_pretty(&compare_strategies(debts, budget, start_date))
        }
    };
    encoded.map_err(PlanError::Encode)
}

fn build_request(
    cards: &[CreditCard],
    loans: &[Loan],
    budget: Option<f64>,
    strategy: Strategy,
    start_date: Option<Date>,
) -> Result<PlanRequest, PlanError> {
    let budget = budget.ok_or(PlanError::MissingBudget)?;
    if !budget.is_finite() {
        return Err(PlanError::InvalidBudget(budget));
    }

    for (idx, card) in cards.iter().enumerate() {
        check_amount(&format!("cards[{idx}].balance"), card.balance)?;
        check_amount(
            &format!("cards[{idx}].installmentAmount"),
            card.installment_amount,
        )?;
        if let Some(rate) = card.annual_rate {
            check_amount(&format!("cards[{idx}].annualRate"), rate)?;
        }
    }

    for (idx, loan) in loans.iter().enumerate() {
        check_amount(&format!("loans[{idx}].balance"), loan.balance)?;
        if let Some(rate) = loan.annual_rate {
            check_amount(&format!("loans[{idx}].annualRate"), rate)?;
        }
        if let Some(payment) = loan.monthly_payment {
            check_amount(&format!("loans[{idx}].monthlyPayment"), payment)?;
        }
        if loan.monthly_payment.is_none() && loan.term_months == Some(0) {
            return Err(PlanError::ZeroTerm { index: idx });
        }
    }

    Ok(PlanRequest {
        debts: normalize_debts(cards, loans),
        budget,
        strategy,
        start_date,
    })
}

fn check_amount(field: &str, value: f64) -> Result<(), PlanError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlanError::InvalidAmount {
            field: field.to_string(),
            value,
        })
    }
}

fn request_from_payload(payload: PlanPayload) -> Result<PlanRequest, PlanError> {
    build_request(
        &payload.cards,
        &payload.loans,
        payload.budget,
        payload.strategy.unwrap_or_default(),
        payload.start_date,
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<PlanRequest, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    request_from_payload(payload).map_err(|e| e.to_string())
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/plan", post(plan_handler))
        .route("/api/compare", post(compare_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Payoff HTTP API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_handler(Json(payload): Json<PlanPayload>) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(e) => return bad_request(e),
    };

    let plan = build_plan(
        &request.debts,
        request.budget,
        request.strategy,
        request.start_date,
    );
    tracing::info!(
        strategy = request.strategy.name(),
        debts = request.debts.len(),
        feasible = plan.summary.feasible,
        months = ?plan.summary.months,
        "Plan computed"
    );
    json_response(StatusCode::OK, plan)
}

async fn compare_handler(Json(payload): Json<PlanPayload>) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(e) => return bad_request(e),
    };

    let summaries = compare_strategies(&request.debts, request.budget, request.start_date);
    tracing::info!(debts = request.debts.len(), "Strategies compared");
    json_response(StatusCode::OK, summaries)
}

fn bad_request(err: PlanError) -> Response {
    tracing::warn!(error = %err, "Rejected plan request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
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
