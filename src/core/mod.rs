mod engine;
mod normalize;
mod strategy;
mod types;

pub use engine::{
    MAX_MONTHS, MonthlySimulation, PAID_OFF_EPSILON, amortization_schedule, balance_trajectory,
    build_plan, compare_strategies, is_feasible, minimum_payment_total, months_to_payoff,
    step_month, summarize, total_balance,
};
pub use normalize::{amortized_payment, normalize_debts};
pub use strategy::Strategy;
pub use types::{
    CreditCard, Debt, Loan, MonthStep, PayoffPlan, PayoffSummary, ScheduleRow,
};
