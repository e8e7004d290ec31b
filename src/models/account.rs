//! Account listing row.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `accounts` table, as listed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub account_id: i64,
    pub customer_name: String,
    pub balance: f64,
}

impl Account {
    /// One-line rendering used by the CLI account listing.
    pub fn summary_line(&self) -> String {
        format!(
            "#{:>3} | {:<12} | Balance = {:.2}",
            self.account_id, self.customer_name, self.balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_aligns_columns() {
        let account = Account {
            account_id: 7,
            customer_name: "Dana".to_string(),
            balance: 1250.5,
        };
        assert_eq!(account.summary_line(), "#  7 | Dana         | Balance = 1250.50");
    }

    #[test]
    fn summary_line_handles_negative_balances() {
        let account = Account {
            account_id: 104,
            customer_name: "Overdrawn Co".to_string(),
            balance: -12.5,
        };
        assert_eq!(
            account.summary_line(),
            "#104 | Overdrawn Co | Balance = -12.50"
        );
    }
}
