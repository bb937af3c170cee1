use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::{ValidationError, MAX_AMOUNT};
use crate::schedule;

/// National mobile numbers, with or without the `+20` / `20` country prefix.
static PHONE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:\+?20)?1[0125][0-9]{8}$").ok());

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    pub total: Decimal,
    pub months: u32,
    /// Format: "YYYY-MM-DD"
    pub start_date: String,
    pub created_at: String,
}

impl Client {
    pub fn new(name: String, phone: String, total: Decimal, months: u32, start_date: String) -> Self {
        Self {
            id: None,
            name,
            phone,
            total,
            months,
            start_date,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Equal share of the total owed per month. Zero when the plan has no months.
    pub fn monthly_installment(&self) -> Decimal {
        if self.months == 0 {
            return Decimal::ZERO;
        }
        self.total / Decimal::from(self.months)
    }

    pub fn end_date(&self) -> schedule::EndDate {
        schedule::project_end_date(&self.start_date, f64::from(self.months))
    }

    /// Reject records that would break the schedule invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !is_valid_phone(&self.phone) {
            return Err(ValidationError::InvalidPhone(self.phone.clone()));
        }
        if self.total <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveTotal(self.total));
        }
        if self.total > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(self.total));
        }
        if self.months == 0 {
            return Err(ValidationError::ZeroMonths);
        }
        if schedule::parse_plan_date(&self.start_date).is_none() {
            return Err(ValidationError::InvalidDate(self.start_date.clone()));
        }
        Ok(())
    }
}

impl std::fmt::Display for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Strip the separators people type into phone fields.
pub fn clean_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect()
}

pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned = clean_phone(phone);
    PHONE_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(&cleaned))
}
