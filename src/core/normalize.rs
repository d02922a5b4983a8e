use super::{CreditCard, Debt, Loan};

pub const DEFAULT_CARD_RATE: f64 = 0.20;
pub const DEFAULT_LOAN_RATE: f64 = 0.0;
/// Share of the balance owed monthly on a card without an installment plan.
pub const CARD_MIN_PAYMENT_RATE: f64 = 0.05;

/// Builds the engine's debt snapshot from source records. Records without an
/// outstanding balance are dropped.
pub fn normalize_debts(cards: &[CreditCard], loans: &[Loan]) -> Vec<Debt> {
    cards
        .iter()
        .filter(|card| card.balance > 0.0)
        .map(card_to_debt)
        .chain(
            loans
                .iter()
                .filter(|loan| loan.balance > 0.0)
                .map(loan_to_debt),
        )
        .collect()
}

fn card_to_debt(card: &CreditCard) -> Debt {
    let min_payment = if card.installments > 0 {
        card.installment_amount.max(0.0)
    } else {
        card.balance * CARD_MIN_PAYMENT_RATE
    };
    Debt {
        balance: card.balance,
        annual_rate: card.annual_rate.unwrap_or(DEFAULT_CARD_RATE).max(0.0),
        min_payment,
        due_date: card.due_date,
    }
}

fn loan_to_debt(loan: &Loan) -> Debt {
    let annual_rate = loan.annual_rate.unwrap_or(DEFAULT_LOAN_RATE).max(0.0);
    let min_payment = match (loan.monthly_payment, loan.term_months) {
        (Some(payment), _) => payment.max(0.0),
        (None, Some(term)) => amortized_payment(loan.balance, annual_rate, term),
        (None, None) => 0.0,
    };
    Debt {
        balance: loan.balance,
        annual_rate,
        min_payment,
        due_date: loan.due_date,
    }
}

/// Level monthly payment that retires `principal` over `term_months` at a
/// nominal `annual_rate` compounded monthly.
pub fn amortized_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let months = term_months.max(1) as f64;
    let rate = annual_rate / 12.0;
    if rate.abs() < 1e-12 {
        return principal / months;
    }

    let denom = 1.0 - (1.0 + rate).powf(-months);
    if denom <= 1e-12 {
        principal
    } else {
        principal * rate / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn card_without_plan_owes_five_percent_at_default_rate() {
        let cards = [CreditCard {
            balance: 2_000.0,
            ..CreditCard::default()
        }];
        let debts = normalize_debts(&cards, &[]);
        assert_eq!(debts.len(), 1);
        assert_approx(debts[0].min_payment, 100.0);
        assert_approx(debts[0].annual_rate, 0.20);
        assert!(debts[0].due_date.is_none());
    }

    #[test]
    fn card_with_active_plan_owes_installment_amount() {
        let cards = [CreditCard {
            balance: 2_000.0,
            annual_rate: Some(0.31),
            installments: 6,
            installment_amount: 180.0,
            due_date: Some(date(2026, 11, 10)),
        }];
        let debts = normalize_debts(&cards, &[]);
        assert_approx(debts[0].min_payment, 180.0);
        assert_approx(debts[0].annual_rate, 0.31);
        assert_eq!(debts[0].due_date, Some(date(2026, 11, 10)));
    }

    #[test]
    fn loan_uses_given_payment_and_zero_default_rate() {
        let loans = [Loan {
            balance: 12_000.0,
            monthly_payment: Some(350.0),
            ..Loan::default()
        }];
        let debts = normalize_debts(&[], &loans);
        assert_approx(debts[0].min_payment, 350.0);
        assert_approx(debts[0].annual_rate, 0.0);
    }

    #[test]
    fn loan_without_payment_derives_it_from_term() {
        let loans = [Loan {
            balance: 10_000.0,
            annual_rate: Some(0.06),
            term_months: Some(60),
            ..Loan::default()
        }];
        let debts = normalize_debts(&[], &loans);
        assert!((debts[0].min_payment - 193.328).abs() < 1e-3);
    }

    #[test]
    fn empty_and_zero_balance_records_yield_no_debts() {
        assert!(normalize_debts(&[], &[]).is_empty());
        let cards = [CreditCard::default()];
        let loans = [Loan {
            balance: 0.0,
            monthly_payment: Some(200.0),
            ..Loan::default()
        }];
        assert!(normalize_debts(&cards, &loans).is_empty());
    }

    #[test]
    fn amortized_payment_handles_zero_rate_and_zero_term() {
        assert_approx(amortized_payment(1_200.0, 0.0, 12), 100.0);
        assert_approx(amortized_payment(1_200.0, 0.0, 0), 1_200.0);
        assert_approx(amortized_payment(0.0, 0.1, 12), 0.0);
    }

    #[test]
    fn amortized_payment_retires_principal_exactly_over_term() {
        let principal = 5_000.0;
        let rate = 0.12;
        let payment = amortized_payment(principal, rate, 24);
        let mut balance = principal;
        for _ in 0..24 {
            balance = balance * (1.0 + rate / 12.0) - payment;
        }
        assert!(balance.abs() < 1e-6, "residual {balance}");
    }
}
