use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::Strategy;

/// A revolving-balance account as supplied by the record store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreditCard {
    pub balance: f64,
    /// Nominal annual rate as a fraction; `None` means the card default.
    pub annual_rate: Option<f64>,
    /// Remaining installments on an active installment plan.
    pub installments: u32,
    pub installment_amount: f64,
    pub due_date: Option<Date>,
}

/// An installment loan as supplied by the record store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Loan {
    pub balance: f64,
    pub annual_rate: Option<f64>,
    pub monthly_payment: Option<f64>,
    pub term_months: Option<u32>,
    pub due_date: Option<Date>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debt {
    pub balance: f64,
    pub annual_rate: f64,
    pub min_payment: f64,
    pub due_date: Option<Date>,
}

impl Debt {
    pub fn is_active(&self) -> bool {
        self.balance > 0.0
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.0
    }
}

/// Aggregate movement across all debts for one simulated month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRow {
    pub month: u32,
    pub start: f64,
    pub payment: f64,
    pub interest: f64,
    pub end: f64,
}

/// Result of advancing a debt set by exactly one month.
#[derive(Debug, Clone)]
pub struct MonthStep {
    pub debts: Vec<Debt>,
    pub start_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub end_balance: f64,
    /// Index into `debts` of the debt that received the surplus.
    pub target: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSummary {
    pub strategy: Strategy,
    pub feasible: bool,
    pub months: Option<u32>,
    pub starting_balance: f64,
    pub minimum_payment_total: f64,
    pub total_interest: f64,
    pub total_paid: f64,
    pub payoff_date: Option<Date>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPlan {
    pub summary: PayoffSummary,
    pub trajectory: Vec<f64>,
    pub schedule: Vec<ScheduleRow>,
}
