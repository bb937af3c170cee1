use rust_decimal::Decimal;

use super::{ValidationError, MAX_AMOUNT};
use crate::schedule;

/// A single payment received from a client.
#[derive(Debug, Clone, PartialEq)]
pub struct Installment {
    pub id: Option<i64>,
    pub client_id: i64,
    pub amount: Decimal,
    /// Format: "YYYY-MM-DD"
    pub date: String,
    pub created_at: String,
}

impl Installment {
    pub fn new(client_id: i64, amount: Decimal, date: String) -> Self {
        Self {
            id: None,
            client_id,
            amount,
            date,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(self.amount));
        }
        if schedule::parse_plan_date(&self.date).is_none() {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }
        Ok(())
    }
}
