use jiff::{ToSpan, civil::Date};

use super::types::{Debt, MonthStep, PayoffPlan, PayoffSummary, ScheduleRow};
use super::Strategy;

/// Hard bound on simulated months.
pub const MAX_MONTHS: u32 = 600;
/// Balances at or below this after a step are treated as paid off.
pub const PAID_OFF_EPSILON: f64 = 0.01;

pub fn total_balance(debts: &[Debt]) -> f64 {
    debts.iter().map(|d| d.balance).sum()
}

pub fn minimum_payment_total(debts: &[Debt]) -> f64 {
    debts.iter().map(|d| d.min_payment).sum()
}

/// A budget is feasible when it is positive and covers every minimum payment.
pub fn is_feasible(debts: &[Debt], budget: f64) -> bool {
    budget > 0.0 && minimum_payment_total(debts) <= budget
}

/// Advances every active debt by one month.
///
/// Each active debt accrues `balance * annual_rate / 12` and receives its
/// minimum payment; the highest-priority active debt under `strategy` also
/// receives whatever budget is left after all active minimums. A debt whose
/// balance falls to `PAID_OFF_EPSILON` or below is cleared and its minimum
/// payment released to the surplus pool of later months. The input slice is
/// never modified.
pub fn step_month(debts: &[Debt], budget: f64, strategy: Strategy) -> MonthStep {
    let order = strategy.prioritize(debts);
    let active_minimums: f64 = order.iter().map(|&idx| debts[idx].min_payment).sum();
    let surplus = (budget - active_minimums).max(0.0);
    let target = order.first().copied();

    let mut next = debts.to_vec();
    let mut payment_total = 0.0;
    let mut interest_total = 0.0;

    for &idx in &order {
        let debt = &mut next[idx];
        let interest = debt.balance * debt.monthly_rate();
        let payment = if Some(idx) == target {
            debt.min_payment + surplus
        } else {
            debt.min_payment
        };

        let owed = debt.balance + interest;
        let remaining = owed - payment;
        if remaining <= PAID_OFF_EPSILON {
            debt.balance = 0.0;
            debt.min_payment = 0.0;
        } else {
            debt.balance = remaining;
        }

        // Surplus beyond the target's payoff amount is counted but not redistributed.
        payment_total += payment;
        interest_total += interest;
    }

    MonthStep {
        start_balance: total_balance(debts),
        end_balance: total_balance(&next),
        payment: payment_total,
        interest: interest_total,
        target,
        debts: next,
    }
}

/// Month-by-month run of the stepper. Yields one row per simulated month and
/// ends once no debt carries a balance. The caller bounds the length.
#[derive(Debug, Clone)]
pub struct MonthlySimulation {
    debts: Vec<Debt>,
    budget: f64,
    strategy: Strategy,
    month: u32,
}

impl MonthlySimulation {
    pub fn new(debts: &[Debt], budget: f64, strategy: Strategy) -> Self {
        Self {
            debts: debts.to_vec(),
            budget,
            strategy,
            month: 0,
        }
    }
}

impl Iterator for MonthlySimulation {
    type Item = ScheduleRow;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.debts.iter().any(Debt::is_active) {
            return None;
        }

        let step = step_month(&self.debts, self.budget, self.strategy);
        self.month += 1;
        let row = ScheduleRow {
            month: self.month,
            start: step.start_balance,
            payment: step.payment,
            interest: step.interest,
            end: step.end_balance,
        };
        self.debts = step.debts;
        Some(row)
    }
}

/// Months until every balance reaches zero. `None` when the budget is
/// infeasible or the payoff would take longer than `MAX_MONTHS`.
pub fn months_to_payoff(debts: &[Debt], budget: f64, strategy: Strategy) -> Option<u32> {
    if debts.is_empty() {
        return Some(0);
    }
    if !is_feasible(debts, budget) {
        return None;
    }

    let months = MonthlySimulation::new(debts, budget, strategy)
        .take(MAX_MONTHS as usize + 1)
        .count() as u32;
    (months <= MAX_MONTHS).then_some(months)
}

/// Total outstanding balance before the first month and after each simulated
/// month, capped at `MAX_MONTHS` entries.
pub fn balance_trajectory(debts: &[Debt], budget: f64, strategy: Strategy) -> Vec<f64> {
    if debts.is_empty() {
        return Vec::new();
    }
    let initial = total_balance(debts);
    if !is_feasible(debts, budget) {
        return vec![initial];
    }

    std::iter::once(initial)
        .chain(MonthlySimulation::new(debts, budget, strategy).map(|row| row.end))
        .take(MAX_MONTHS as usize)
        .collect()
}

/// Aggregate amortization rows, capped at `MAX_MONTHS` rows. An infeasible
/// budget yields a single row with no payment and no interest.
pub fn amortization_schedule(
    debts: &[Debt],
    budget: f64,
    strategy: Strategy,
) -> Vec<ScheduleRow> {
    if debts.is_empty() {
        return Vec::new();
    }
    if !is_feasible(debts, budget) {
        let total = total_balance(debts);
        return vec![ScheduleRow {
            month: 1,
            start: total,
            payment: 0.0,
            interest: 0.0,
            end: total,
        }];
    }

    MonthlySimulation::new(debts, budget, strategy)
        .take(MAX_MONTHS as usize)
        .collect()
}

pub fn summarize(
    debts: &[Debt],
    budget: f64,
    strategy: Strategy,
    start_date: Option<Date>,
) -> PayoffSummary {
    let schedule = amortization_schedule(debts, budget, strategy);
    summary_from_schedule(debts, budget, strategy, start_date, &schedule)
}

/// Every report for one strategy, computed from the same inputs.
pub fn build_plan(
    debts: &[Debt],
    budget: f64,
    strategy: Strategy,
    start_date: Option<Date>,
) -> PayoffPlan {
    let schedule = amortization_schedule(debts, budget, strategy);
    let trajectory = balance_trajectory(debts, budget, strategy);
    let summary = summary_from_schedule(debts, budget, strategy, start_date, &schedule);
    PayoffPlan {
        summary,
        trajectory,
        schedule,
    }
}

pub fn compare_strategies(
    debts: &[Debt],
    budget: f64,
    start_date: Option<Date>,
) -> Vec<PayoffSummary> {
    Strategy::ALL
        .iter()
        .map(|&strategy| summarize(debts, budget, strategy, start_date))
        .collect()
}

fn summary_from_schedule(
    debts: &[Debt],
    budget: f64,
    strategy: Strategy,
    start_date: Option<Date>,
    schedule: &[ScheduleRow],
) -> PayoffSummary {
    let months = months_to_payoff(debts, budget, strategy);
    let payoff_date = match (start_date, months) {
        (Some(start), Some(months)) => start.checked_add(i64::from(months).months()).ok(),
        _ => None,
    };

    PayoffSummary {
        strategy,
        feasible: debts.is_empty() || is_feasible(debts, budget),
        months,
        starting_balance: total_balance(debts),
        minimum_payment_total: minimum_payment_total(debts),
        total_interest: schedule.iter().map(|row| row.interest).sum(),
        total_paid: schedule.iter().map(|row| row.payment).sum(),
        payoff_date,
    }
}
