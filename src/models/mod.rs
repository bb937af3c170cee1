mod client;
mod installment;

use rust_decimal::Decimal;
use thiserror::Error;

pub use client::{clean_phone, is_valid_phone, Client};
pub use installment::Installment;

/// Largest total or payment accepted: 10^15.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Input rejected at the data-entry boundary, before it reaches the schedule engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid mobile number: {0}")]
    InvalidPhone(String),

    #[error("total must be positive, got {0}")]
    NonPositiveTotal(Decimal),

    #[error("months must be at least 1")]
    ZeroMonths,

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("amount {0} exceeds the limit of {max}", max = MAX_AMOUNT)]
    AmountTooLarge(Decimal),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}
