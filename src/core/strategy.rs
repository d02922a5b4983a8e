use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use super::Debt;

/// Surplus allocation policy. Each variant is a total order over active debts;
/// the first debt in that order receives the month's surplus.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Avalanche,
    Snowball,
    HighestBalance,
    DueDate,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Avalanche,
        Strategy::Snowball,
        Strategy::HighestBalance,
        Strategy::DueDate,
    ];

    /// Parses a strategy token. Unrecognized names fall back to avalanche.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "snowball" => Strategy::Snowball,
            "highest_balance" | "highestbalance" => Strategy::HighestBalance,
            "due_date" | "duedate" => Strategy::DueDate,
            _ => Strategy::Avalanche,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Avalanche => "avalanche",
            Strategy::Snowball => "snowball",
            Strategy::HighestBalance => "highest_balance",
            Strategy::DueDate => "due_date",
        }
    }

    pub fn compare(self, a: &Debt, b: &Debt) -> Ordering {
        match self {
            Strategy::Avalanche => b.annual_rate.total_cmp(&a.annual_rate),
            Strategy::Snowball => a.balance.total_cmp(&b.balance),
            Strategy::HighestBalance => b.balance.total_cmp(&a.balance),
            // Missing due dates sort after every concrete date.
            Strategy::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }

    /// Returns indices of the active debts in priority order. Ties keep input order.
    pub fn prioritize(self, debts: &[Debt]) -> Vec<usize> {
        let mut active: Vec<usize> = (0..debts.len())
            .filter(|&idx| debts[idx].is_active())
            .collect();
        active.sort_by(|&a, &b| self.compare(&debts[a], &debts[b]));
        active
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        Ok(Strategy::from_name(&token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn debt(balance: f64, annual_rate: f64) -> Debt {
        Debt {
            balance,
            annual_rate,
            min_payment: 0.0,
            due_date: None,
        }
    }

    #[test]
    fn from_name_accepts_known_tokens_and_falls_back_to_avalanche() {
        assert_eq!(Strategy::from_name("snowball"), Strategy::Snowball);
        assert_eq!(
            Strategy::from_name("highest_balance"),
            Strategy::HighestBalance
        );
        assert_eq!(
            Strategy::from_name("Highest-Balance"),
            Strategy::HighestBalance
        );
        assert_eq!(Strategy::from_name("due_date"), Strategy::DueDate);
        assert_eq!(Strategy::from_name("avalanche"), Strategy::Avalanche);
        assert_eq!(Strategy::from_name("lottery"), Strategy::Avalanche);
        assert_eq!(Strategy::from_name(""), Strategy::Avalanche);
    }

    #[test]
    fn deserialize_unknown_token_is_avalanche() {
        let parsed: Strategy = serde_json::from_str("\"minimum-only\"").expect("string token");
        assert_eq!(parsed, Strategy::Avalanche);
        let parsed: Strategy = serde_json::from_str("\"due-date\"").expect("string token");
        assert_eq!(parsed, Strategy::DueDate);
    }

    #[test]
    fn avalanche_puts_highest_rate_first() {
        let debts = [debt(500.0, 0.10), debt(900.0, 0.24), debt(100.0, 0.18)];
        assert_eq!(Strategy::Avalanche.prioritize(&debts), vec![1, 2, 0]);
    }

    #[test]
    fn snowball_and_highest_balance_are_mirror_orders() {
        let debts = [debt(500.0, 0.10), debt(900.0, 0.24), debt(100.0, 0.18)];
        assert_eq!(Strategy::Snowball.prioritize(&debts), vec![2, 0, 1]);
        assert_eq!(Strategy::HighestBalance.prioritize(&debts), vec![1, 0, 2]);
    }

    #[test]
    fn due_date_sorts_missing_dates_last() {
        let mut debts = [debt(500.0, 0.10), debt(900.0, 0.24), debt(100.0, 0.18)];
        debts[1].due_date = Some(date(2026, 3, 15));
        debts[2].due_date = Some(date(2026, 3, 2));
        assert_eq!(Strategy::DueDate.prioritize(&debts), vec![2, 1, 0]);
    }

    #[test]
    fn prioritize_skips_cleared_debts() {
        let debts = [debt(0.0, 0.30), debt(250.0, 0.05)];
        assert_eq!(Strategy::Avalanche.prioritize(&debts), vec![1]);
    }
}
