use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// One parsed row of card activity. Exactly one of `credit`/`refund` is
/// populated — the extractor drops rows that violate this before a
/// `Transaction` is ever built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub credit: Money,
    pub refund: Money,
    /// Running account balance after this row. Zero when the statement
    /// does not carry a balance column.
    pub balance: Money,
}

impl Transaction {
    /// Credit positive, refund negative.
    pub fn signed_amount(&self) -> Money {
        self.credit - self.refund
    }
}
